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

//! The operator-execution loop. `for_each` drains a worklist to quiescence
//! with one worker per pool thread; iterations acquire conflict tokens on
//! the nodes they touch, and a lost conflict aborts the iteration, discards
//! its pushes and re-publishes the item through `Worklist::aborted`.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::arena::IterArena;
use crate::atomics::write_min;
use crate::graph::CsrGraph;
use crate::parallel::ParallelFor;
use crate::worklist::Worklist;
use crate::DefInt;

/// Signal that the running iteration lost a conflict and must be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aborted;

pub type IterResult = Result<(), Aborted>;

/// Selects whether an access participates in conflict detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodFlag {
    Unprotected,
    Write,
}

const FREE: u32 = u32::MAX;

/// Per-node conflict word. `u32::MAX` is free; the non-deterministic loop
/// stores a worker token, the deterministic engine stores the minimum
/// reserving iteration id.
#[derive(Debug)]
pub struct NodeLock(AtomicU32);

impl NodeLock {
    pub fn new() -> Self {
        Self(AtomicU32::new(FREE))
    }

    fn try_acquire(&self, token: u32) -> bool {
        let cur = self.0.load(Ordering::Relaxed);
        if cur == token { return true; }
        cur == FREE
            && self.0
                .compare_exchange(FREE, token, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }

    fn reserve_min(&self, id: u32) {
        write_min(&self.0, id);
    }

    pub(crate) fn held_with(&self, id: u32) -> bool {
        self.0.load(Ordering::Relaxed) == id
    }

    pub(crate) fn release(&self) {
        self.0.store(FREE, Ordering::Release);
    }
}

impl Default for NodeLock {
    fn default() -> Self { Self::new() }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum CtxMode {
    /// Conflict tokens; acquire either succeeds or aborts the iteration.
    NonDet,
    /// No conflict bookkeeping (operator declared does-not-need-aborts, or
    /// the deterministic engine proved the iterations disjoint).
    Free,
    /// Deterministic reserve pass: acquisitions record a minimum id.
    DetReserve,
    /// Deterministic commit pass: acquisitions verify or claim ownership.
    DetCommit,
}

/// Per-iteration context handed to the operator.
pub struct LoopCtx<T> {
    mode: CtxMode,
    token: u32,
    first_pass: bool,
    pub(crate) pushes: Vec<T>,
    pub(crate) acquired: Vec<usize>,
    pub(crate) reached_cautious: bool,
    break_requested: bool,
    arena: IterArena,
}

impl<T> LoopCtx<T> {
    pub(crate) fn new(mode: CtxMode, token: u32, first_pass: bool, arena_bytes: usize) -> Self {
        Self {
            mode,
            token,
            first_pass,
            pushes: Vec::new(),
            acquired: Vec::new(),
            reached_cautious: false,
            break_requested: false,
            arena: IterArena::with_capacity(arena_bytes),
        }
    }

    /// Publishes `item` when this iteration commits.
    #[inline(always)]
    pub fn push(&mut self, item: T) {
        self.pushes.push(item);
    }

    /// Asks the driver to end the parallel region after this iteration.
    pub fn break_loop(&mut self) {
        self.break_requested = true;
    }

    #[inline(always)]
    pub fn is_first_pass(&self) -> bool {
        self.first_pass
    }

    /// Marks the point after which the iteration touches no new objects.
    /// In a deterministic reserve pass this ends the pass.
    pub fn cautious_point(&mut self) -> IterResult {
        if self.mode == CtxMode::DetReserve {
            self.reached_cautious = true;
            return Err(Aborted);
        }
        Ok(())
    }

    /// Acquires a conflict token; `Err(Aborted)` aborts the iteration.
    pub fn acquire(&mut self, lock: &NodeLock) -> IterResult {
        match self.mode {
            CtxMode::Free => Ok(()),
            CtxMode::NonDet => {
                if lock.try_acquire(self.token) {
                    self.acquired.push(lock as *const NodeLock as usize);
                    Ok(())
                } else {
                    Err(Aborted)
                }
            }
            CtxMode::DetReserve => {
                lock.reserve_min(self.token);
                self.acquired.push(lock as *const NodeLock as usize);
                Ok(())
            }
            CtxMode::DetCommit => {
                if lock.held_with(self.token) || lock.try_acquire(self.token) {
                    self.acquired.push(lock as *const NodeLock as usize);
                    Ok(())
                } else {
                    Err(Aborted)
                }
            }
        }
    }

    /// Protected or unprotected node payload access; the write flag routes
    /// through conflict detection first.
    pub fn node_data<'g, N, E>(
        &mut self,
        g: &'g CsrGraph<N, E>,
        n: DefInt,
        flag: MethodFlag,
    ) -> Result<&'g mut N, Aborted> {
        if flag == MethodFlag::Write {
            self.acquire(g.lock(n))?;
        }
        Ok(g.data_mut(n))
    }

    /// Per-iteration scratch; freed on commit or abort.
    pub fn scratch<S: Copy>(&mut self, n: usize) -> &mut [S] {
        self.arena.alloc(n)
    }

    pub(crate) fn release_all(&mut self) {
        for &p in &self.acquired {
            unsafe { (*(p as *const NodeLock)).release(); }
        }
        self.acquired.clear();
    }

    fn reset(&mut self) {
        self.reached_cautious = false;
        self.arena.reset();
    }
}

/// Static operator traits for a loop.
#[derive(Clone, Copy)]
pub struct LoopConfig {
    pub name: &'static str,
    pub needs_aborts: bool,
    pub arena_bytes: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { name: "for_each", needs_aborts: true, arena_bytes: 4096 }
    }
}

/// Applies `op` to every index exactly once; stealing is rayon's.
pub fn do_all<F>(range: Range<usize>, op: F, granularity: Option<usize>)
where
    F: Fn(usize) + Send + Sync,
{
    range.par_for(op, granularity);
}

/// Drains `wl` to quiescence.
pub fn for_each<T, W, F>(wl: &W, op: F, cfg: LoopConfig)
where
    T: Send,
    W: Worklist<T>,
    F: Fn(&T, &mut LoopCtx<T>) -> IterResult + Sync,
{
    for_each_break::<T, W, F, fn() -> bool>(wl, op, None, cfg);
}

/// As `for_each`, but polls `brk` between items; a true return ends the
/// region, leaving unconsumed items to the driver's maintenance phase.
pub fn for_each_break<T, W, F, B>(wl: &W, op: F, brk: Option<B>, cfg: LoopConfig)
where
    T: Send,
    W: Worklist<T>,
    F: Fn(&T, &mut LoopCtx<T>) -> IterResult + Sync,
    B: Fn() -> bool + Sync,
{
    let workers = rayon::current_num_threads();
    let idle = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);

    rayon::broadcast(|bctx| {
        let mode = if cfg.needs_aborts { CtxMode::NonDet } else { CtxMode::Free };
        let mut ctx = LoopCtx::<T>::new(mode, bctx.index() as u32, false, cfg.arena_bytes);

        'work: loop {
            if stop.load(Ordering::Acquire) {
                break;
            }
            match wl.pop() {
                Some(item) => {
                    match op(&item, &mut ctx) {
                        Ok(()) => {
                            ctx.release_all();
                            for v in ctx.pushes.drain(..) {
                                wl.push(v);
                            }
                        }
                        Err(Aborted) => {
                            ctx.release_all();
                            ctx.pushes.clear();
                            wl.aborted(item);
                        }
                    }
                    ctx.reset();
                    if ctx.break_requested
                        || brk.as_ref().map(|b| b()).unwrap_or(false)
                    {
                        stop.store(true, Ordering::Release);
                        break;
                    }
                }
                None => {
                    idle.fetch_add(1, Ordering::SeqCst);
                    loop {
                        if stop.load(Ordering::Acquire) {
                            break 'work;
                        }
                        let e = wl.empty();
                        // While every worker is idle no one can push, so
                        // an emptiness observation made here is stable.
                        if idle.load(Ordering::SeqCst) == workers && e {
                            stop.store(true, Ordering::Release);
                            break 'work;
                        }
                        if !e {
                            idle.fetch_sub(1, Ordering::SeqCst);
                            continue 'work;
                        }
                        std::hint::spin_loop();
                    }
                }
            }
        }
    });
}
