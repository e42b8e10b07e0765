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

use std::ops::Range;

use crate::executor::NodeLock;
use crate::{make_mut, DefInt};

/// Degree below which `find_edge` scans linearly instead of bisecting.
const LINEAR_SEARCH_DEGREE: usize = 32;

/// A static directed multigraph in CSR form with a fixed-size payload per
/// node and per edge, and one conflict word per node. Topology is immutable
/// once built. Payload accessors hand out mutable references from a shared
/// graph; coordinating them through conflict words, atomics or algorithm
/// semantics is the caller's contract.
#[derive(Debug)]
pub struct CsrGraph<N, E> {
    offsets: Vec<u64>,
    dsts: Vec<DefInt>,
    edge_data: Vec<E>,
    node_data: Vec<N>,
    locks: Vec<NodeLock>,
}

impl<N: Default, E> CsrGraph<N, E> {
    pub fn from_csr(offsets: Vec<u64>, dsts: Vec<DefInt>, edge_data: Vec<E>) -> Self {
        debug_assert!(!offsets.is_empty());
        debug_assert_eq!(*offsets.last().unwrap() as usize, dsts.len());
        debug_assert_eq!(dsts.len(), edge_data.len());
        let n = offsets.len() - 1;
        Self {
            offsets,
            dsts,
            edge_data,
            node_data: (0..n).map(|_| N::default()).collect(),
            locks: (0..n).map(|_| NodeLock::new()).collect(),
        }
    }

    /// Builds a graph from an edge list; adjacency lists come out sorted
    /// by destination id.
    pub fn from_edges(n: usize, edges: &[(DefInt, DefInt, E)]) -> Self
    where
        E: Clone,
    {
        let mut offsets = vec![0u64; n + 1];
        for &(u, _, _) in edges {
            offsets[u as usize + 1] += 1;
        }
        for i in 0..n {
            offsets[i + 1] += offsets[i];
        }
        let mut cursor: Vec<usize> = offsets[..n].iter().map(|&o| o as usize).collect();
        let mut dsts = vec![0 as DefInt; edges.len()];
        let mut edge_data: Vec<E> = Vec::with_capacity(edges.len());
        unsafe { edge_data.set_len(edges.len()); }
        for (u, v, w) in edges {
            let c = cursor[*u as usize];
            dsts[c] = *v;
            // each slot is written exactly once
            unsafe { std::ptr::write(edge_data.as_mut_ptr().add(c), w.clone()); }
            cursor[*u as usize] += 1;
        }
        let mut g = Self::from_csr(offsets, dsts, edge_data);
        g.sort_edges_by_dst();
        g
    }
}

impl<N, E> CsrGraph<N, E> {
    pub fn num_nodes(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.dsts.len()
    }

    pub fn nodes(&self) -> Range<DefInt> {
        0..self.num_nodes() as DefInt
    }

    /// Outgoing edge indices of `n`, sorted by destination id.
    #[inline(always)]
    pub fn edges(&self, n: DefInt) -> Range<usize> {
        self.offsets[n as usize] as usize..self.offsets[n as usize + 1] as usize
    }

    #[inline(always)]
    pub fn edge_dst(&self, e: usize) -> DefInt {
        self.dsts[e]
    }

    #[inline(always)]
    pub fn data(&self, n: DefInt) -> &N {
        &self.node_data[n as usize]
    }

    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub fn data_mut(&self, n: DefInt) -> &mut N {
        unsafe { make_mut!(&self.node_data[n as usize], N).unwrap() }
    }

    #[inline(always)]
    pub fn edge_data(&self, e: usize) -> &E {
        &self.edge_data[e]
    }

    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub fn edge_data_mut(&self, e: usize) -> &mut E {
        unsafe { make_mut!(&self.edge_data[e], E).unwrap() }
    }

    #[inline(always)]
    pub fn lock(&self, n: DefInt) -> &NodeLock {
        &self.locks[n as usize]
    }

    /// The index of edge (u, v): a linear scan for small degrees, a binary
    /// search otherwise. Adjacency lists must be sorted.
    pub fn find_edge(&self, u: DefInt, v: DefInt) -> Option<usize> {
        let range = self.edges(u);
        if range.len() < LINEAR_SEARCH_DEGREE {
            self.dsts[range.clone()]
                .iter()
                .position(|&d| d == v)
                .map(|i| range.start + i)
        } else {
            self.dsts[range.clone()]
                .binary_search(&v)
                .ok()
                .map(|i| range.start + i)
        }
    }

    /// Sorts every adjacency list (and its payloads) by destination id.
    pub fn sort_edges_by_dst(&mut self)
    where
        E: Clone,
    {
        for n in 0..self.num_nodes() {
            let range = self.edges(n as DefInt);
            let mut pairs: Vec<(DefInt, E)> = range
                .clone()
                .map(|e| (self.dsts[e], self.edge_data[e].clone()))
                .collect();
            pairs.sort_unstable_by_key(|p| p.0);
            for (k, e) in range.enumerate() {
                self.dsts[e] = pairs[k].0;
                self.edge_data[e] = pairs[k].1.clone();
            }
        }
    }
}
