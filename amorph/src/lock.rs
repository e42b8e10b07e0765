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

use std::sync::atomic::{AtomicBool, Ordering};

/// A test-and-test-and-set spin lock. With `CONCURRENT = false` every
/// operation compiles to a no-op, so the same container can serve
/// single-threaded and multi-threaded callers without duplicating code.
/// Holds are expected to be O(1) work; fairness is not promised.
pub struct SimpleLock<const CONCURRENT: bool> {
    held: AtomicBool,
}

impl<const CONCURRENT: bool> SimpleLock<CONCURRENT> {
    pub const fn new() -> Self {
        Self { held: AtomicBool::new(false) }
    }

    #[inline(always)]
    pub fn lock(&self) {
        if !CONCURRENT { return; }
        loop {
            if !self.held.swap(true, Ordering::Acquire) { return; }
            while self.held.load(Ordering::Relaxed) {
                std::hint::spin_loop();
            }
        }
    }

    #[inline(always)]
    pub fn try_lock(&self) -> bool {
        if !CONCURRENT { return true; }
        !self.held.swap(true, Ordering::Acquire)
    }

    #[inline(always)]
    pub fn unlock(&self) {
        if !CONCURRENT { return; }
        self.held.store(false, Ordering::Release);
    }
}

impl<const CONCURRENT: bool> Default for SimpleLock<CONCURRENT> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_mode_is_free() {
        let l = SimpleLock::<false>::new();
        l.lock();
        assert!(l.try_lock());
        l.unlock();
    }

    #[test]
    fn concurrent_mode_excludes() {
        let l = SimpleLock::<true>::new();
        l.lock();
        assert!(!l.try_lock());
        l.unlock();
        assert!(l.try_lock());
        l.unlock();
    }
}
