// ============================================================================
// This code is part of Rusty-Amorph.
// ----------------------------------------------------------------------------
// MIT License
//
// Copyright (c) 2023-present Javad Abdi, Mark C. Jeffrey
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
// ============================================================================

use crate::per_thread::CpuSpaced;
use super::{Fifo, SerialLifo, Worklist};

type Chunk<T> = SerialLifo<T>;

struct ProcRec<T> {
    curr: Option<Box<Chunk<T>>>,
    next: Option<Box<Chunk<T>>>,
    next_size: usize,
}

impl<T> Default for ProcRec<T> {
    fn default() -> Self {
        Self { curr: None, next: None, next_size: 0 }
    }
}

/// A two-level queue. Each worker pops from its *curr* chunk and pushes
/// into its *next* chunk; chunks sealed at `CHUNK` items move through a
/// shared FIFO, so contention on the shared queue is one event per chunk
/// boundary while the global order stays near-FIFO.
pub struct ChunkedFifo<T, const CHUNK: usize = 64, const PUSH_LOCAL: bool = true> {
    shared: Fifo<Box<Chunk<T>>>,
    local: CpuSpaced<ProcRec<T>>,
}

impl<T: Send, const CHUNK: usize, const PUSH_LOCAL: bool> ChunkedFifo<T, CHUNK, PUSH_LOCAL> {
    pub fn new() -> Self {
        Self {
            shared: Fifo::new(),
            local: CpuSpaced::new(ProcRec::default),
        }
    }

    fn push_next(&self, n: &mut ProcRec<T>, val: T) {
        if n.next.is_none() {
            n.next = Some(Box::new(Chunk::new()));
            n.next_size = 0;
        }
        if n.next_size == CHUNK {
            self.shared.push(n.next.take().unwrap());
            n.next = Some(Box::new(Chunk::new()));
            n.next_size = 0;
        }
        n.next.as_ref().unwrap().push(val);
        n.next_size += 1;
    }

    fn push_local(&self, n: &mut ProcRec<T>, val: T) {
        if n.curr.is_none() {
            self.fill_curr(n);
        }
        match &n.curr {
            Some(c) => c.push(val),
            None => self.push_next(n, val),
        }
    }

    fn fill_curr(&self, n: &mut ProcRec<T>) {
        match self.shared.pop() {
            Some(c) => n.curr = Some(c),
            None => {
                // take over next
                n.curr = n.next.take();
                n.next_size = 0;
            }
        }
    }
}

impl<T: Send, const CHUNK: usize, const PUSH_LOCAL: bool> Default
    for ChunkedFifo<T, CHUNK, PUSH_LOCAL>
{
    fn default() -> Self { Self::new() }
}

impl<T: Send, const CHUNK: usize, const PUSH_LOCAL: bool> Worklist<T>
    for ChunkedFifo<T, CHUNK, PUSH_LOCAL>
{
    fn push(&self, val: T) {
        let n = self.local.get();
        if PUSH_LOCAL {
            self.push_local(n, val);
        } else {
            self.push_next(n, val);
        }
    }

    fn pop(&self) -> Option<T> {
        let n = self.local.get();
        loop {
            if n.curr.is_none() {
                self.fill_curr(n);
            }
            let popped = match &n.curr {
                Some(c) => c.pop(),
                None => return None,
            };
            match popped {
                Some(v) => return Some(v),
                None => { n.curr = None; }
            }
        }
    }

    /// Conservative: only the caller's chunks and the shared queue are
    /// inspected; another worker's local chunks are invisible.
    fn empty(&self) -> bool {
        let n = self.local.get();
        if let Some(c) = &n.curr {
            if !c.empty() { return false; }
        }
        if let Some(c) = &n.next {
            if !c.empty() { return false; }
        }
        self.shared.empty()
    }

    /// Aborted items always go to *next* so a failing chunk cannot starve
    /// its own retries.
    fn aborted(&self, val: T) {
        let n = self.local.get();
        self.push_next(n, val);
    }

    fn fill_initial(&mut self, items: impl IntoIterator<Item = T>) {
        let n = self.local.get();
        for v in items {
            self.push_next(n, v);
        }
        if let Some(c) = n.next.take() {
            self.shared.push(c);
            n.next_size = 0;
        }
    }
}
