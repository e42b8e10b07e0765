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
use super::Worklist;

/// A bucketed priority scheduler keyed by a small nonnegative integer
/// metric. Each thread keeps a cursor at the lowest bucket it last saw
/// non-empty; the cursor is best effort, not a global minimum, so the
/// schedule is weakly priority ordered. A pop that runs off the end parks
/// the cursor there and the next pop wraps to zero to pick up freshly
/// produced low-priority work.
pub struct OrderedByIntegerMetric<T, I, C>
where
    I: Fn(&T) -> usize,
{
    buckets: Vec<C>,
    indexer: I,
    cursor: CpuSpaced<usize>,
    monotonic: bool,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T, I, C> OrderedByIntegerMetric<T, I, C>
where
    I: Fn(&T) -> usize,
    C: Default,
{
    /// `range` is the largest metric the indexer can produce.
    pub fn new(range: usize, indexer: I) -> Self {
        Self {
            buckets: (0..=range).map(|_| C::default()).collect(),
            indexer,
            cursor: CpuSpaced::new(|| 0),
            monotonic: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// As `new`, but debug-asserts that no push targets a bucket below the
    /// caller's cursor, i.e. the indexer is non-decreasing over an item's
    /// lifetime.
    pub fn new_monotonic(range: usize, indexer: I) -> Self {
        let mut s = Self::new(range, indexer);
        s.monotonic = true;
        s
    }
}

impl<T, I, C> Worklist<T> for OrderedByIntegerMetric<T, I, C>
where
    T: Send,
    I: Fn(&T) -> usize + Sync + Send,
    C: Worklist<T>,
{
    fn push(&self, val: T) {
        let index = (self.indexer)(&val);
        debug_assert!(index < self.buckets.len(), "metric out of range");
        let cur = self.cursor.get();
        if self.monotonic {
            debug_assert!(*cur >= self.buckets.len() || index >= *cur,
                "monotonic metric decreased");
        }
        self.buckets[index].push(val);
        if *cur > index {
            *cur = index;
        }
    }

    fn pop(&self) -> Option<T> {
        let cur = self.cursor.get();
        if *cur >= self.buckets.len() {
            // wrapped off the end on the previous call
            *cur = 0;
        }
        loop {
            if let Some(v) = self.buckets[*cur].pop() {
                return Some(v);
            }
            *cur += 1;
            if *cur == self.buckets.len() {
                return None;
            }
        }
    }

    fn empty(&self) -> bool {
        self.buckets.iter().all(|b| b.empty())
    }

    fn aborted(&self, val: T) {
        self.push(val);
    }

    /// Routes the seed through each bucket's own `fill_initial` so the
    /// items are visible to every worker, not parked in the driver
    /// thread's local chunks.
    fn fill_initial(&mut self, items: impl IntoIterator<Item = T>) {
        let mut per_bucket: Vec<Vec<T>> = (0..self.buckets.len()).map(|_| Vec::new()).collect();
        for v in items {
            let b = (self.indexer)(&v);
            debug_assert!(b < per_bucket.len(), "metric out of range");
            per_bucket[b].push(v);
        }
        for (b, vs) in per_bucket.into_iter().enumerate() {
            if !vs.is_empty() {
                self.buckets[b].fill_initial(vs);
            }
        }
    }
}
