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

//! Parallel spanning forest over a symmetric graph: a demonstration BFS, an
//! asynchronous union-find sweep, and a blocked asynchronous variant that
//! bounds the edges processed per work item to follow machine topology.

use std::fmt;

use clap::ValueEnum;
use rayon::prelude::*;

use amorph::bag::Bag;
use amorph::executor::{self, IterResult, LoopConfig, LoopCtx};
use amorph::graph::CsrGraph;
use amorph::stat::Statistic;
use amorph::union_find::UnionFind;
use amorph::worklist::{ChunkedFifo, Worklist};
use amorph::DefInt;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Algo {
    #[clap(name = "demo")]
    Demo,
    #[clap(name = "asynchronous")]
    Asynchronous,
    #[clap(name = "blockedasync")]
    BlockedAsync,
}

impl fmt::Display for Algo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Algo::Demo => write!(f, "demo"),
            Algo::Asynchronous => write!(f, "asynchronous"),
            Algo::BlockedAsync => write!(f, "blockedasync"),
        }
    }
}

pub type SfGraph = CsrGraph<(), i32>;
pub type TreeEdge = (DefInt, DefInt);

/// A continuation: resume scanning `src`'s adjacency at edge index `start`.
#[derive(Clone, Copy)]
pub struct WorkItem {
    src: DefInt,
    start: usize,
}

pub struct SpanningForest {
    pub graph: SfGraph,
    pub uf: UnionFind,
}

/// The first package keeps NUMA-local nodes unbounded; the boundary is
/// approximated as the first half of the pool.
fn on_first_package() -> bool {
    let t = rayon::current_thread_index().unwrap_or(0);
    t < (rayon::current_num_threads() + 1) / 2
}

impl SpanningForest {
    pub fn new(graph: SfGraph) -> Self {
        let n = graph.num_nodes();
        Self { graph, uf: UnionFind::new(n) }
    }

    pub fn run(&self, algo: Algo) -> Vec<TreeEdge> {
        match algo {
            Algo::Demo => self.demo(),
            Algo::Asynchronous => self.asynchronous(),
            Algo::BlockedAsync => self.blocked_async(),
        }
    }

    /// A modified BFS from an arbitrary root; neighbors are claimed by CAS
    /// so each lands in the tree exactly once. Assumes one connected
    /// component.
    fn demo(&self) -> Vec<TreeEdge> {
        let tree = Bag::new();
        if self.graph.num_nodes() == 0 {
            return Vec::new();
        }
        let root: DefInt = 0;

        let mut wl = ChunkedFifo::<DefInt, 64>::new();
        wl.fill_initial([root]);
        executor::for_each(
            &wl,
            |&src, ctx: &mut LoopCtx<DefInt>| -> IterResult {
                ctx.acquire(self.graph.lock(src))?;
                for e in self.graph.edges(src) {
                    let dst = self.graph.edge_dst(e);
                    if self.uf.component(dst) == root {
                        continue;
                    }
                    if self.uf.try_set_component(dst, root) {
                        tree.push((src, dst));
                        ctx.push(dst);
                    }
                }
                Ok(())
            },
            LoopConfig { name: "Demo", ..Default::default() },
        );
        tree.into_vec()
    }

    /// Merge along every edge; a successful merge emits the edge.
    fn asynchronous(&self) -> Vec<TreeEdge> {
        let tree = Bag::new();
        let empty_merges = Statistic::new("EmptyMerges");

        executor::do_all(
            0..self.graph.num_nodes(),
            |u| {
                let src = u as DefInt;
                for e in self.graph.edges(src) {
                    let dst = self.graph.edge_dst(e);
                    if self.uf.merge(src, dst) {
                        tree.push((src, dst));
                    } else {
                        empty_merges.add(1);
                    }
                }
            },
            Some(64),
        );
        self.normalize();
        empty_merges.report();
        tree.into_vec()
    }

    /// Adds the next tree edge reachable from `src` starting at `start`.
    /// Stops after `LIMIT` edges (0 = unbounded) or the first failed merge,
    /// publishing a continuation item.
    fn process<const MAKE_CONTINUATION: bool, const LIMIT: usize>(
        &self,
        src: DefInt,
        start: usize,
        tree: &Bag<TreeEdge>,
        push: &mut dyn FnMut(WorkItem),
    ) {
        let mut count = 0;
        let end = self.graph.edges(src).end;
        for e in start..end {
            count += 1;
            let dst = self.graph.edge_dst(e);
            if self.uf.merge(src, dst) {
                tree.push((src, dst));
                if LIMIT == 0 || count != LIMIT {
                    continue;
                }
            }
            if MAKE_CONTINUATION || (LIMIT != 0 && count == LIMIT) {
                push(WorkItem { src, start: e + 1 });
                break;
            }
        }
    }

    /// Seeds every node with a locality-bounded pass, then drains the
    /// continuations with work stealing.
    fn blocked_async(&self) -> Vec<TreeEdge> {
        let tree = Bag::new();
        let items = Bag::new();

        executor::do_all(
            0..self.graph.num_nodes(),
            |u| {
                let src = u as DefInt;
                let start = self.graph.edges(src).start;
                let mut push = |w: WorkItem| items.push(w);
                if on_first_package() {
                    self.process::<true, 0>(src, start, &tree, &mut push);
                } else {
                    self.process::<true, 1>(src, start, &tree, &mut push);
                }
            },
            Some(64),
        );

        let mut wl = ChunkedFifo::<WorkItem, 128>::new();
        wl.fill_initial(items.into_vec());
        executor::for_each(
            &wl,
            |item: &WorkItem, ctx: &mut LoopCtx<WorkItem>| -> IterResult {
                let mut push = |w: WorkItem| ctx.push(w);
                self.process::<true, 0>(item.src, item.start, &tree, &mut push);
                Ok(())
            },
            LoopConfig { name: "Merge", needs_aborts: false, ..Default::default() },
        );
        self.normalize();
        tree.into_vec()
    }

    /// Points every node at its compressed root.
    fn normalize(&self) {
        executor::do_all(
            0..self.graph.num_nodes(),
            |u| {
                let src = u as DefInt;
                self.uf.set_component(src, self.uf.find_and_compress(src));
            },
            Some(4096),
        );
    }

    /// The emitted edge multiset is a spanning forest: every edge's
    /// endpoints share a component, every tree edge's endpoints share a
    /// component, and edge count equals nodes minus roots.
    pub fn verify(&self, tree: &[TreeEdge]) -> Result<(), String> {
        let n = self.graph.num_nodes();

        let bad = (0..n as DefInt).into_par_iter().find_any(|&src| {
            self.graph.edges(src).any(|e| {
                self.uf.find(src) != self.uf.find(self.graph.edge_dst(e))
            })
        });
        if let Some(src) = bad {
            return Err(format!("not in same component: {} and a neighbor", src));
        }

        if let Some(&(u, v)) = tree
            .par_iter()
            .find_any(|&&(u, v)| self.uf.find(u) != self.uf.find(v))
        {
            return Err(format!("tree edge ({}, {}) spans components", u, v));
        }

        let roots = (0..n as DefInt)
            .into_par_iter()
            .filter(|&u| self.uf.find(u) == u)
            .count();
        if n - roots != tree.len() {
            return Err(format!(
                "generated graph is not a forest: expected {} edges but found {}",
                n - roots,
                tree.len()
            ));
        }

        println!("Num trees: {}", roots);
        println!("Tree edges: {}", tree.len());
        Ok(())
    }
}
