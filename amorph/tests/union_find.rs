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

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use amorph::union_find::UnionFind;

#[test]
fn merge_reports_distinct_components_once() {
    let uf = UnionFind::new(4);
    assert!(uf.merge(0, 1));
    assert!(!uf.merge(1, 0));
    assert!(uf.merge(2, 3));
    assert!(uf.merge(0, 3));
    assert!(!uf.merge(1, 2));
    let root = uf.find(0);
    assert!((0..4).all(|i| uf.find(i) == root));
}

#[test]
fn find_and_compress_is_idempotent() {
    let uf = UnionFind::new(64);
    for i in 0..63u32 {
        uf.merge(i, i + 1);
    }
    let first: Vec<u32> = (0..64).map(|i| uf.find_and_compress(i)).collect();
    let second: Vec<u32> = (0..64).map(|i| uf.find_and_compress(i)).collect();
    assert_eq!(first, second);
    let root = first[0];
    assert!(first.iter().all(|&r| r == root));
}

#[test]
fn parallel_merges_count_the_tree_edges() {
    // a few chains merged concurrently; successful merges must equal
    // nodes minus components
    let n = 1024u32;
    let uf = UnionFind::new(n as usize);
    let links = AtomicUsize::new(0);
    (0..n - 1).into_par_iter().for_each(|i| {
        if uf.merge(i, i + 1) {
            links.fetch_add(1, Ordering::Relaxed);
        }
    });
    let roots = (0..n).filter(|&i| uf.find(i) == i).count();
    assert_eq!(roots, 1);
    assert_eq!(links.load(Ordering::Relaxed), n as usize - roots);
    assert!((0..n - 1).all(|i| uf.find(i) == uf.find(i + 1)));
}

#[test]
fn component_claims_are_exclusive() {
    let uf = UnionFind::new(8);
    assert!(uf.try_set_component(3, 0));
    assert!(!uf.try_set_component(3, 5));
    assert_eq!(uf.component(3), 0);
    uf.set_component(4, 0);
    assert_eq!(uf.component(4), 0);
}
