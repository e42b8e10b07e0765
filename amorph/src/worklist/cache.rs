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

/// A small per-thread slot array in front of a parent worklist. Pushes
/// keep the lowest-metric items CPU-local, spilling displaced items to the
/// parent; pops serve any cached item before consulting the parent.
pub struct CacheByIntegerMetric<P, T, I, const SIZE: usize = 4> {
    parent: P,
    cache: CpuSpaced<[Option<T>; SIZE]>,
    indexer: I,
}

impl<P, T, I, const SIZE: usize> CacheByIntegerMetric<P, T, I, SIZE>
where
    T: Send,
    I: Fn(&T) -> usize,
{
    pub fn new(parent: P, indexer: I) -> Self {
        Self {
            parent,
            cache: CpuSpaced::new(|| std::array::from_fn(|_| None)),
            indexer,
        }
    }
}

impl<P, T, I, const SIZE: usize> Worklist<T> for CacheByIntegerMetric<P, T, I, SIZE>
where
    P: Worklist<T>,
    T: Send,
    I: Fn(&T) -> usize + Sync + Send,
{
    fn push(&self, val: T) {
        let c = self.cache.get();
        let mut val = val;
        let mut val_index = (self.indexer)(&val);

        for slot in c.iter_mut() {
            match slot {
                Some(cached) => {
                    if val_index < (self.indexer)(cached) {
                        std::mem::swap(cached, &mut val);
                        val_index = (self.indexer)(&val);
                    }
                }
                None => {
                    *slot = Some(val);
                    return;
                }
            }
        }
        // val is either an old cached entry or the pushed one
        self.parent.push(val);
    }

    fn pop(&self) -> Option<T> {
        let c = self.cache.get();
        for slot in c.iter_mut() {
            if slot.is_some() {
                return slot.take();
            }
        }
        self.parent.pop()
    }

    fn empty(&self) -> bool {
        let c = self.cache.get();
        if c.iter().any(|s| s.is_some()) {
            return false;
        }
        self.parent.empty()
    }

    fn aborted(&self, val: T) {
        self.push(val);
    }

    fn fill_initial(&mut self, items: impl IntoIterator<Item = T>) {
        self.parent.fill_initial(items);
    }
}
