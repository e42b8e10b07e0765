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

//! Scalable local worklists. This module contains the leaf containers and
//! the adaptor that lifts any single-threaded ordered container into a
//! worklist; `chunked`, `obim` and `cache` build composite policies on top.

pub mod cache;
pub mod chunked;
pub mod obim;

pub use cache::CacheByIntegerMetric;
pub use chunked::ChunkedFifo;
pub use obim::OrderedByIntegerMetric;

use std::cell::UnsafeCell;
use std::collections::{BinaryHeap, VecDeque};

use crate::lock::SimpleLock;

/// The capability set every scheduler policy exposes to the execution loop.
/// `aborted` re-publishes an item whose iteration lost a conflict and
/// defaults to `push`; `fill_initial` seeds the container from the driver
/// thread before the region starts and is not thread safe.
pub trait Worklist<T>: Sync {
    fn push(&self, val: T);
    fn pop(&self) -> Option<T>;
    fn empty(&self) -> bool;

    fn aborted(&self, val: T) {
        self.push(val);
    }

    fn fill_initial(&mut self, items: impl IntoIterator<Item = T>) where Self: Sized {
        for v in items {
            self.push(v);
        }
    }
}

/// A single-threaded ordered container. `front` and `top` are normalized
/// into one `pop` so stacks, queues and heaps expose a common "next"
/// operation.
pub trait SeqContainer<T>: Default {
    fn push(&mut self, val: T);
    fn pop(&mut self) -> Option<T>;
    fn empty(&self) -> bool;
}

impl<T> SeqContainer<T> for Vec<T> {
    fn push(&mut self, val: T) { Vec::push(self, val); }
    fn pop(&mut self) -> Option<T> { Vec::pop(self) }
    fn empty(&self) -> bool { self.is_empty() }
}

impl<T> SeqContainer<T> for VecDeque<T> {
    fn push(&mut self, val: T) { self.push_back(val); }
    fn pop(&mut self) -> Option<T> { self.pop_front() }
    fn empty(&self) -> bool { self.is_empty() }
}

impl<T: Ord> SeqContainer<T> for BinaryHeap<T> {
    fn push(&mut self, val: T) { BinaryHeap::push(self, val); }
    fn pop(&mut self) -> Option<T> { BinaryHeap::pop(self) }
    fn empty(&self) -> bool { self.is_empty() }
}

/// Pairs a sequential container with a `SimpleLock` so the same code
/// serves a serial chunk (`CONCURRENT = false`, lock elided) and a shared
/// worklist (`CONCURRENT = true`).
pub struct Adaptor<Q, const CONCURRENT: bool> {
    lock: SimpleLock<CONCURRENT>,
    q: UnsafeCell<Q>,
}

unsafe impl<Q: Send, const CONCURRENT: bool> Sync for Adaptor<Q, CONCURRENT> {}

impl<Q: Default, const CONCURRENT: bool> Adaptor<Q, CONCURRENT> {
    pub fn new() -> Self {
        Self { lock: SimpleLock::new(), q: UnsafeCell::new(Q::default()) }
    }
}

impl<Q: Default, const CONCURRENT: bool> Default for Adaptor<Q, CONCURRENT> {
    fn default() -> Self { Self::new() }
}

impl<T, Q, const CONCURRENT: bool> Worklist<T> for Adaptor<Q, CONCURRENT>
where
    T: Send,
    Q: SeqContainer<T> + Send,
{
    fn push(&self, val: T) {
        self.lock.lock();
        unsafe { (*self.q.get()).push(val); }
        self.lock.unlock();
    }

    fn pop(&self) -> Option<T> {
        self.lock.lock();
        let r = unsafe { (*self.q.get()).pop() };
        self.lock.unlock();
        r
    }

    fn empty(&self) -> bool {
        self.lock.lock();
        let r = unsafe { (*self.q.get()).empty() };
        self.lock.unlock();
        r
    }
}

pub type Lifo<T> = Adaptor<Vec<T>, true>;
pub type Fifo<T> = Adaptor<VecDeque<T>, true>;
pub type PriQueue<T> = Adaptor<BinaryHeap<T>, true>;

pub type SerialLifo<T> = Adaptor<Vec<T>, false>;
