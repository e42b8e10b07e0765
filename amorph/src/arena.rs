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

/// A bounded bump region for per-iteration scratch. The execution loop
/// resets it on iteration commit or abort; allocation past the bound is a
/// resource-exhaustion fatal. Word-backed so carved slices stay aligned
/// for any T up to 8-byte alignment.
pub struct IterArena {
    buf: Vec<u64>,
    used: usize, // bytes
}

impl IterArena {
    pub fn with_capacity(bytes: usize) -> Self {
        Self { buf: vec![0u64; (bytes + 7) / 8], used: 0 }
    }

    /// A scratch slice living until the end of the iteration. Contents are
    /// unspecified.
    pub fn alloc<T: Copy>(&mut self, n: usize) -> &mut [T] {
        let align = std::mem::align_of::<T>();
        debug_assert!(align <= 8);
        let start = (self.used + align - 1) & !(align - 1);
        let bytes = n * std::mem::size_of::<T>();
        assert!(start + bytes <= self.buf.len() * 8, "per-iteration arena exhausted");
        self.used = start + bytes;
        unsafe {
            std::slice::from_raw_parts_mut(
                (self.buf.as_mut_ptr() as *mut u8).add(start) as *mut T,
                n,
            )
        }
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_and_reset() {
        let mut a = IterArena::with_capacity(64);
        let s: &mut [u32] = a.alloc(8);
        s.fill(7);
        assert_eq!(s[7], 7);
        a.reset();
        let t: &mut [u64] = a.alloc(8);
        t.fill(1);
        assert_eq!(t[0], 1);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn overflows_panic() {
        let mut a = IterArena::with_capacity(16);
        let _ = a.alloc::<u64>(3);
    }
}
