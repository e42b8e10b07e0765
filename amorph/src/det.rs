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

//! The deterministic execution engine. Items are processed in rounds in
//! stable id order: a parallel reserve pass runs each operator up to its
//! cautious point, writing the minimum reserving id into every touched
//! conflict word; items still holding all their reservations commit in a
//! second parallel pass, the rest retry next round. Two runs on the same
//! input produce identical results regardless of thread count.

use std::cmp::{max, min};
use std::sync::atomic::Ordering;

use rayon::prelude::*;

use crate::executor::{Aborted, CtxMode, IterResult, LoopConfig, LoopCtx, NodeLock};

struct ReserveRec {
    acquired: Vec<usize>,
    ok: bool,
}

#[inline]
fn release(ptrs: &[usize]) {
    for &p in ptrs {
        unsafe { (*(p as *const NodeLock)).release(); }
    }
}

/// Runs `op` over `initial` (plus everything it pushes) in deterministic
/// rounds. `id` assigns every item its stable ordering key; `brk` is
/// polled between rounds. Whether the commit pass re-runs the whole body
/// (base) or resumes after a first-pass acquisition block (disjoint) is
/// the operator's choice via `is_first_pass`.
pub fn for_each_det<T, F, I, B>(
    initial: Vec<T>,
    op: F,
    id: I,
    brk: Option<B>,
    cfg: LoopConfig,
) where
    T: Clone + Send + Sync,
    F: Fn(&T, &mut LoopCtx<T>) -> IterResult + Sync,
    I: Fn(&T) -> u32 + Sync,
    B: Fn() -> bool + Sync,
{
    let mut pending = initial;
    let mut current_round_size = pending.len() / 4 + 1;

    while !pending.is_empty() {
        if let Some(b) = &brk {
            if b() { return; }
        }

        pending.sort_by_key(|v| id(v));
        let max_round_size = pending.len();
        let size = min(current_round_size, pending.len());
        let round = &pending[..size];
        let ids: Vec<u32> = round.iter().map(|v| id(v)).collect();
        // a duplicate of an id already in the round would share its
        // reservations; defer it instead of committing both concurrently
        let dup: Vec<bool> = (0..size).map(|i| i > 0 && ids[i] == ids[i - 1]).collect();

        // reserve
        let recs: Vec<ReserveRec> = round
            .par_iter()
            .enumerate()
            .map(|(i, item)| {
                if dup[i] {
                    return ReserveRec { ok: false, acquired: Vec::new() };
                }
                let mut ctx =
                    LoopCtx::<T>::new(CtxMode::DetReserve, ids[i], true, cfg.arena_bytes);
                let r = op(item, &mut ctx);
                ReserveRec {
                    ok: r.is_ok() || ctx.reached_cautious,
                    acquired: std::mem::take(&mut ctx.acquired),
                }
            })
            .collect();

        // commit the items that still hold every reservation
        let commits: Vec<(bool, Vec<T>, Vec<usize>)> = round
            .par_iter()
            .enumerate()
            .map(|(i, item)| {
                let my = ids[i];
                let holds = recs[i].ok
                    && recs[i].acquired.iter().all(|&p| {
                        unsafe { &*(p as *const NodeLock) }.held_with(my)
                    });
                if !holds {
                    return (false, Vec::new(), Vec::new());
                }
                let mut ctx =
                    LoopCtx::<T>::new(CtxMode::DetCommit, my, false, cfg.arena_bytes);
                match op(item, &mut ctx) {
                    Ok(()) => (
                        true,
                        std::mem::take(&mut ctx.pushes),
                        std::mem::take(&mut ctx.acquired),
                    ),
                    Err(Aborted) => (false, Vec::new(), std::mem::take(&mut ctx.acquired)),
                }
            })
            .collect();

        // free every conflict word touched this round
        recs.par_iter().for_each(|r| release(&r.acquired));
        commits.par_iter().for_each(|c| release(&c.2));
        std::sync::atomic::fence(Ordering::SeqCst);

        // keep iterations that failed for next round, then the new work
        let mut next: Vec<T> = Vec::new();
        let mut new_items: Vec<T> = Vec::new();
        for (i, (done, pushes, _)) in commits.into_iter().enumerate() {
            if done {
                new_items.extend(pushes);
            } else {
                next.push(round[i].clone());
            }
        }
        let number_keep = next.len();
        next.extend(new_items);
        let tail = pending.split_off(size);
        next.extend(tail);
        pending = next;

        // adjust round size based on the number of failed attempts
        if number_keep as f32 / size as f32 > 0.2 {
            current_round_size = max(
                current_round_size / 2,
                max(max_round_size / 64 + 1, number_keep),
            );
        } else if (number_keep as f32 / size as f32) < 0.1 {
            current_round_size = min(current_round_size * 2, max_round_size);
        }
    }
}
