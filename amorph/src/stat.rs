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

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{ Instant, Duration };

/// A timer that can be used to time regions of code.
pub struct Timer<'a> {
    total_so_far: Duration,
    last: Instant,
    on: bool,
    name: &'a str,
}

impl<'a> Timer<'a> {
    /// prints `d` in seconds
    pub fn report(&self, d: Duration, name: &str) {
        if name.is_empty() {
            println!("{}:\t{:.6}", self.name, d.as_secs_f64());
        } else {
            println!("{}:{}:\t{:.6}", self.name, name, d.as_secs_f64());
        }
    }

    /// Creates a new timer with the given name.
    pub fn new(name: &'a str) -> Self {
        Timer {
            total_so_far: Duration::ZERO,
            last: Instant::now(),
            on: false,
            name,
        }
    }

    /// Starts the timer.
    pub fn start(&mut self) {
        self.on = true;
        self.last = Instant::now();
    }

    /// Stops the timer and returns the time since the last `start` or `next`.
    pub fn stop(&mut self) -> Duration {
        self.on = false;
        let d = Instant::now() - self.last;
        self.total_so_far += d;
        d
    }

    /// Resets and turns off the timer.
    pub fn reset(&mut self) {
        self.total_so_far = Duration::ZERO;
        self.on = false;
    }

    /// Returns the total time when timer was on since the last `new` or `reset`.
    pub fn total_time(&self) -> Duration {
        if self.on {
            self.total_so_far + (Instant::now() - self.last)
        } else {
            self.total_so_far
        }
    }

    /// Prints the total time when timer was on since the last `new` or `reset`.
    pub fn total(&self) {
        let tt = self.total_time();
        self.report(tt, "total");
    }
}

#[inline(always)]
fn cell_slot() -> usize {
    match rayon::current_thread_index() {
        Some(i) => i,
        None => rayon::current_num_threads(),
    }
}

/// A named counter accumulated per thread and reduced on demand.
pub struct Statistic {
    name: &'static str,
    cells: Vec<AtomicU64>,
}

impl Statistic {
    pub fn new(name: &'static str) -> Self {
        let slots = rayon::current_num_threads() + 1;
        Self { name, cells: (0..slots).map(|_| AtomicU64::new(0)).collect() }
    }

    #[inline(always)]
    pub fn add(&self, v: u64) {
        self.cells[cell_slot()].fetch_add(v, Ordering::Relaxed);
    }

    pub fn reduce(&self) -> u64 {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    pub fn report(&self) {
        println!("{}:\t{}", self.name, self.reduce());
    }
}

/// A signed accumulator whose per-thread running value is also visible to
/// the adding thread; the discharge driver checks its local share against
/// the relabel threshold without a global reduction.
pub struct Accumulator {
    cells: Vec<AtomicI64>,
}

impl Accumulator {
    pub fn new() -> Self {
        let slots = rayon::current_num_threads() + 1;
        Self { cells: (0..slots).map(|_| AtomicI64::new(0)).collect() }
    }

    /// Adds `v` to the caller's cell and returns the cell's new value.
    #[inline(always)]
    pub fn local_add(&self, v: i64) -> i64 {
        self.cells[cell_slot()].fetch_add(v, Ordering::Relaxed) + v
    }

    pub fn add(&self, v: i64) {
        self.local_add(v);
    }

    pub fn reduce(&self) -> i64 {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }
}

impl Default for Accumulator {
    fn default() -> Self { Self::new() }
}

/// Prints a resident-set snapshot in pages, read from procfs.
pub fn report_mem_info(name: &str) {
    if let Ok(statm) = std::fs::read_to_string("/proc/self/statm") {
        let mut fields = statm.split_whitespace();
        let total = fields.next().unwrap_or("0");
        let resident = fields.next().unwrap_or("0");
        println!("{}:\ttotal {} pages, resident {} pages", name, total, resident);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn statistic_reduces_over_threads() {
        let s = Statistic::new("TestCount");
        (0..500usize).into_par_iter().for_each(|_| s.add(2));
        assert_eq!(s.reduce(), 1000);
    }

    #[test]
    fn accumulator_local_values_grow() {
        let a = Accumulator::new();
        assert_eq!(a.local_add(3), 3);
        assert_eq!(a.local_add(4), 7);
        assert_eq!(a.reduce(), 7);
    }
}
