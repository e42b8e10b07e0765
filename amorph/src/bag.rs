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

/// An unordered, append-only container. Pushes land in the caller's
/// per-thread vector; `into_vec` concatenates the cells once the region
/// is over.
pub struct Bag<T> {
    local: CpuSpaced<Vec<T>>,
}

impl<T: Send> Bag<T> {
    pub fn new() -> Self {
        Self { local: CpuSpaced::new(Vec::new) }
    }

    #[inline(always)]
    pub fn push(&self, v: T) {
        self.local.get().push(v);
    }

    pub fn len(&mut self) -> usize {
        self.local.iter_mut().map(|c| c.len()).sum()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.local.fold(|acc, mut c| acc.append(&mut c))
    }
}

impl<T: Send> Default for Bag<T> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn collects_across_threads() {
        let bag = Bag::new();
        (0..100u32).into_par_iter().for_each(|i| bag.push(i));
        let mut v = bag.into_vec();
        v.sort_unstable();
        assert_eq!(v, (0..100).collect::<Vec<_>>());
    }
}
