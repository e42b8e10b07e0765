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

use std::cell::UnsafeCell;

/// One cell per rayon worker, plus a spare slot for the driver thread.
/// During a parallel region a cell is only touched by the thread it belongs
/// to; after the region the driver walks the cells with `iter_mut` or folds
/// them back together with `fold`.
pub struct CpuSpaced<T> {
    cells: Vec<UnsafeCell<T>>,
}

unsafe impl<T: Send> Sync for CpuSpaced<T> {}

impl<T> CpuSpaced<T> {
    pub fn new(init: impl Fn() -> T) -> Self {
        let slots = rayon::current_num_threads() + 1;
        Self { cells: (0..slots).map(|_| UnsafeCell::new(init())).collect() }
    }

    #[inline(always)]
    fn slot() -> usize {
        match rayon::current_thread_index() {
            Some(i) => i,
            None => rayon::current_num_threads(),
        }
    }

    /// The calling thread's cell. The reference must not be held across a
    /// point where the same thread calls `get` again.
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub fn get(&self) -> &mut T {
        unsafe { &mut *self.cells[Self::slot()].get() }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.cells.iter_mut().map(|c| c.get_mut())
    }

    /// Folds every cell into the first with `merge` and returns the result.
    pub fn fold(mut self, merge: impl Fn(&mut T, T)) -> T {
        let mut cells = self.cells.drain(..).map(|c| c.into_inner());
        let mut acc = cells.next().expect("CpuSpaced has at least one cell");
        for c in cells {
            merge(&mut acc, c);
        }
        acc
    }
}
