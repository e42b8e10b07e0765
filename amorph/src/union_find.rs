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

use std::sync::atomic::AtomicU32;

use crate::{DefInt, ORDER};

/// A concurrent union-find over node indices: one parent link and a small
/// rank per node. A node is a root iff it is its own parent. `find` splices
/// grandparents during descent, so the parent chain stays short amortized;
/// `merge` is lock-free link-by-rank.
pub struct UnionFind {
    parents: Vec<AtomicU32>,
    ranks: Vec<AtomicU32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parents: (0..n).map(|i| AtomicU32::new(i as u32)).collect(),
            ranks: (0..n).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    #[inline(always)]
    fn parent(&self, u: DefInt) -> DefInt {
        self.parents[u as usize].load(ORDER)
    }

    /// The root of `u`'s component, halving the path on the way down.
    pub fn find(&self, mut u: DefInt) -> DefInt {
        loop {
            let p = self.parent(u);
            if p == u { return u; }
            let gp = self.parent(p);
            if gp == p { return p; }
            self.parents[u as usize].store(gp, ORDER);
            u = gp;
        }
    }

    /// As `find`, then points every visited node directly at the root.
    /// Idempotent: a second call moves no parent pointer.
    pub fn find_and_compress(&self, u: DefInt) -> DefInt {
        let root = self.find(u);
        let mut v = u;
        while v != root {
            let p = self.parents[v as usize].swap(root, ORDER);
            v = p;
        }
        root
    }

    /// Links the components of `u` and `v`. Returns true iff they were
    /// distinct and this call performed the link.
    pub fn merge(&self, u: DefInt, v: DefInt) -> bool {
        loop {
            let ru = self.find(u);
            let rv = self.find(v);
            if ru == rv { return false; }

            let (rank_u, rank_v) = (
                self.ranks[ru as usize].load(ORDER),
                self.ranks[rv as usize].load(ORDER),
            );
            // lower rank links under higher; ties link the larger index
            // under the smaller and bump the winner's rank
            let (winner, loser) = if rank_u > rank_v {
                (ru, rv)
            } else if rank_v > rank_u {
                (rv, ru)
            } else if ru < rv {
                (ru, rv)
            } else {
                (rv, ru)
            };

            if self.parents[loser as usize]
                .compare_exchange(loser, winner, ORDER, ORDER)
                .is_ok()
            {
                if rank_u == rank_v {
                    let _ = self.ranks[winner as usize].compare_exchange(
                        rank_u,
                        rank_u + 1,
                        ORDER,
                        ORDER,
                    );
                }
                return true;
            }
        }
    }

    /// The component representative of `u`.
    pub fn component(&self, u: DefInt) -> DefInt {
        self.find(u)
    }

    pub fn set_component(&self, u: DefInt, c: DefInt) {
        self.parents[u as usize].store(c, ORDER);
    }

    /// Claims `u` for component `c`; true iff `u` was still its own
    /// component and this call claimed it.
    pub fn try_set_component(&self, u: DefInt, c: DefInt) -> bool {
        self.parents[u as usize]
            .compare_exchange(u, c, ORDER, ORDER)
            .is_ok()
    }
}
