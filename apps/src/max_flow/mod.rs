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

//! Preflow-push maximum flow. Discharges active nodes along admissible
//! residual edges, relabeling as needed; a periodic bulk-synchronous
//! global relabel recomputes heights by reverse BFS from the sink.

mod gr;

pub use gr::{load_flow_graph, write_pfp_graph};

use std::cmp::min;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::AtomicBool;

use clap::ValueEnum;

use amorph::atomics::write_min_i32;
use amorph::bag::Bag;
use amorph::det::for_each_det;
use amorph::executor::{self, IterResult, LoopConfig, LoopCtx, MethodFlag};
use amorph::graph::CsrGraph;
use amorph::stat::{Accumulator, Timer};
use amorph::worklist::{ChunkedFifo, OrderedByIntegerMetric, Worklist};
use amorph::{DefInt, ORDER};

/// Alpha parameter of the original Goldberg algorithm controlling when
/// global relabeling occurs.
pub const ALPHA: i64 = 6;

/// Beta parameter of the original Goldberg algorithm: the extra weight a
/// discharge contributes when it relabeled its node.
pub const BETA: i64 = 12;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum DetAlgo {
    #[clap(name = "nondet")]
    Nondet,
    #[clap(name = "detBase")]
    DetBase,
    #[clap(name = "detDisjoint")]
    DetDisjoint,
}

impl fmt::Display for DetAlgo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DetAlgo::Nondet => write!(f, "nondet"),
            DetAlgo::DetBase => write!(f, "detBase"),
            DetAlgo::DetDisjoint => write!(f, "detDisjoint"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FlowNode {
    pub id: DefInt,
    pub excess: i64,
    pub height: i32,
    pub current: i32,
}

impl Default for FlowNode {
    fn default() -> Self {
        Self { id: 0, excess: 0, height: 1, current: 0 }
    }
}

impl fmt::Display for FlowNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(id: {}, excess: {}, height: {}, current: {})",
            self.id, self.excess, self.height, self.current
        )
    }
}

pub type FlowGraph = CsrGraph<FlowNode, i32>;

#[derive(Debug)]
pub struct PreflowPush {
    pub graph: FlowGraph,
    pub source: DefInt,
    pub sink: DefInt,
    pub global_relabel_interval: i64,
    should_global_relabel: AtomicBool,
}

impl PreflowPush {
    /// `relabel` selects the global-relabel interval: negative never, zero
    /// the ALPHA*n + m/3 default, positive a literal interval.
    pub fn new(
        graph: FlowGraph,
        source: DefInt,
        sink: DefInt,
        relabel: i64,
    ) -> Result<Self, String> {
        let n = graph.num_nodes();
        if source == sink || source as usize >= n || sink as usize >= n {
            return Err("invalid source or sink".to_string());
        }
        executor::do_all(
            0..n,
            |i| {
                graph.data_mut(i as DefInt).id = i as DefInt;
            },
            Some(4096),
        );
        graph.data_mut(source).height = n as i32;
        let global_relabel_interval = if relabel == 0 {
            ALPHA * n as i64 + graph.num_edges() as i64 / 3
        } else {
            relabel
        };
        Ok(Self {
            graph,
            source,
            sink,
            global_relabel_interval,
            should_global_relabel: AtomicBool::new(false),
        })
    }

    pub fn flow(&self) -> i64 {
        self.graph.data(self.sink).excess
    }

    pub fn check_sorting(&self) -> Result<(), String> {
        for n in self.graph.nodes() {
            let mut prev: Option<DefInt> = None;
            for e in self.graph.edges(n) {
                let dst = self.graph.edge_dst(e);
                if let Some(p) = prev {
                    if p == dst {
                        return Err(format!(
                            "adjacency list of {} cannot have duplicates", n
                        ));
                    }
                    if p > dst {
                        return Err(format!("adjacency list of {} unsorted", n));
                    }
                }
                prev = Some(dst);
            }
        }
        Ok(())
    }

    fn reduce_capacity(&self, e: usize, src: DefInt, dst: DefInt, amount: i64) {
        let rev = self
            .graph
            .find_edge(dst, src)
            .unwrap_or_else(|| panic!("no reverse edge for ({}, {})", src, dst));
        *self.graph.edge_data_mut(e) -= amount as i32;
        *self.graph.edge_data_mut(rev) += amount as i32;
    }

    /// Acquires `src` and its whole out-neighborhood.
    fn acquire(&self, src: DefInt, ctx: &mut LoopCtx<DefInt>) -> IterResult {
        ctx.acquire(self.graph.lock(src))?;
        for e in self.graph.edges(src) {
            ctx.acquire(self.graph.lock(self.graph.edge_dst(e)))?;
        }
        Ok(())
    }

    fn relabel(&self, src: DefInt) {
        let n = self.graph.num_nodes() as i32;
        let mut min_height = i32::MAX;
        let mut min_edge = 0;

        let mut current = 0;
        for e in self.graph.edges(src) {
            let cap = *self.graph.edge_data(e);
            if cap > 0 {
                let dnode = self.graph.data(self.graph.edge_dst(e));
                if dnode.height < min_height {
                    min_height = dnode.height;
                    min_edge = current;
                }
            }
            current += 1;
        }

        assert!(min_height != i32::MAX, "relabel of {} found no residual edge", src);
        min_height += 1;

        let node = self.graph.data_mut(src);
        if min_height < n {
            node.height = min_height;
            node.current = min_edge;
        } else {
            node.height = n;
        }
    }

    /// One discharge of `src`: pushes flow along admissible edges starting
    /// from the node's current-edge cursor, relabeling when the scan runs
    /// dry. Returns true iff a relabel occurred.
    fn discharge(&self, src: DefInt, ctx: &mut LoopCtx<DefInt>) -> bool {
        let n = self.graph.num_nodes() as i32;
        let mut relabeled = false;

        {
            let node = self.graph.data(src);
            if node.excess == 0 || node.height >= n {
                return false;
            }
        }

        loop {
            // re-fetched each round; relabel rewrites height and cursor
            let node = self.graph.data_mut(src);
            let mut finished = false;
            let mut current = node.current;
            let range = self.graph.edges(src);

            for e in range.start + current as usize..range.end {
                let dst = self.graph.edge_dst(e);
                let cap = *self.graph.edge_data(e);
                if cap > 0 {
                    let dnode = self.graph.data_mut(dst);
                    if node.height - 1 == dnode.height {
                        // push flow
                        let amount = min(node.excess, cap as i64);
                        self.reduce_capacity(e, src, dst, amount);

                        // only add once
                        if dst != self.sink && dst != self.source && dnode.excess == 0 {
                            ctx.push(dst);
                        }

                        debug_assert!(node.excess >= amount);
                        node.excess -= amount;
                        dnode.excess += amount;

                        if node.excess == 0 {
                            finished = true;
                            node.current = current;
                            break;
                        }
                    }
                }
                current += 1;
            }

            if finished {
                break;
            }

            self.relabel(src);
            relabeled = true;

            if self.graph.data(src).height == n {
                break;
            }
        }

        relabeled
    }

    /// Reverse BFS over residual edges: lowers a neighbor's height to ours
    /// plus one whenever the residual edge towards us can carry flow.
    fn update_heights(
        &self,
        src: DefInt,
        ctx: &mut LoopCtx<DefInt>,
        det: DetAlgo,
    ) -> IterResult {
        if det != DetAlgo::Nondet {
            if ctx.is_first_pass() {
                for e in self.graph.edges(src) {
                    let dst = self.graph.edge_dst(e);
                    let rev = self
                        .graph
                        .find_edge(dst, src)
                        .unwrap_or_else(|| panic!("no reverse edge for ({}, {})", dst, src));
                    if *self.graph.edge_data(rev) > 0 {
                        ctx.acquire(self.graph.lock(dst))?;
                    }
                }
                // the commit pass may only touch what is reserved here
                ctx.acquire(self.graph.lock(src))?;
            }
            if det == DetAlgo::DetDisjoint && ctx.is_first_pass() {
                return Ok(());
            }
            ctx.node_data(&self.graph, src, MethodFlag::Write)?;
            ctx.cautious_point()?;
        }

        for e in self.graph.edges(src) {
            let dst = self.graph.edge_dst(e);
            let rev = self
                .graph
                .find_edge(dst, src)
                .unwrap_or_else(|| panic!("no reverse edge for ({}, {})", dst, src));
            if *self.graph.edge_data(rev) > 0 {
                let dnode = self.graph.data_mut(dst);
                let new_height = self.graph.data(src).height + 1;
                if write_min_i32(&mut dnode.height, new_height) {
                    ctx.push(dst);
                }
            }
        }
        Ok(())
    }

    /// Bulk-synchronous height recomputation; rebuilds the active set into
    /// `incoming`.
    fn global_relabel(&self, incoming: &mut Vec<DefInt>, det: DetAlgo) {
        let n = self.graph.num_nodes();

        let mut t1 = Timer::new("ResetHeightsTime");
        t1.start();
        executor::do_all(
            0..n,
            |i| {
                let node = self.graph.data_mut(i as DefInt);
                node.height = n as i32;
                node.current = 0;
                if i as DefInt == self.sink {
                    node.height = 0;
                }
            },
            Some(4096),
        );
        t1.stop();
        t1.total();

        let mut t = Timer::new("UpdateHeightsTime");
        t.start();
        let cfg = LoopConfig { name: "UpdateHeights", needs_aborts: false, ..Default::default() };
        match det {
            DetAlgo::Nondet => {
                let mut wl = ChunkedFifo::<DefInt, 64>::new();
                wl.fill_initial([self.sink]);
                executor::for_each(
                    &wl,
                    |&src, ctx| self.update_heights(src, ctx, det),
                    cfg,
                );
            }
            DetAlgo::DetBase | DetAlgo::DetDisjoint => {
                for_each_det(
                    vec![self.sink],
                    |&src, ctx| self.update_heights(src, ctx, det),
                    |&v| self.graph.data(v).id,
                    None::<fn() -> bool>,
                    cfg,
                );
            }
        }
        t.stop();
        t.total();

        let mut t2 = Timer::new("FindWorkTime");
        t2.start();
        let work = Bag::new();
        executor::do_all(
            0..n,
            |i| {
                let src = i as DefInt;
                let node = self.graph.data(src);
                if src == self.sink || src == self.source || node.height >= n as i32 {
                    return;
                }
                if node.excess > 0 {
                    work.push(src);
                }
            },
            Some(4096),
        );
        *incoming = work.into_vec();
        t2.stop();
        t2.total();
    }

    fn initialize_preflow(&self, initial: &mut Vec<DefInt>) {
        for e in self.graph.edges(self.source) {
            let dst = self.graph.edge_dst(e);
            let cap = *self.graph.edge_data(e);
            self.reduce_capacity(e, self.source, dst, cap as i64);
            self.graph.data_mut(dst).excess += cap as i64;
            if cap > 0 {
                initial.push(dst);
            }
        }
    }

    /// Drains the active set, interleaving discharge phases with global
    /// relabels until no work remains.
    pub fn run(&self, det: DetAlgo, use_hl_order: bool) {
        let n = self.graph.num_nodes();
        let mut initial = Vec::new();
        self.initialize_preflow(&mut initial);

        while !initial.is_empty() {
            let mut t_discharge = Timer::new("DischargeTime");
            t_discharge.start();
            let counter = Accumulator::new();

            match det {
                DetAlgo::Nondet => {
                    let limit = if self.global_relabel_interval > 0 {
                        self.global_relabel_interval / rayon::current_num_threads() as i64
                    } else {
                        i64::MAX
                    };
                    let op = |src: &DefInt, ctx: &mut LoopCtx<DefInt>| -> IterResult {
                        self.acquire(*src, ctx)?;
                        let mut increment = 1;
                        if self.discharge(*src, ctx) {
                            increment += BETA;
                        }
                        let v = counter.local_add(increment);
                        if self.global_relabel_interval > 0 && v >= limit {
                            self.should_global_relabel.store(true, ORDER);
                            ctx.break_loop();
                        }
                        Ok(())
                    };
                    let cfg = LoopConfig { name: "Discharge", ..Default::default() };
                    if use_hl_order {
                        // higher nodes drain first
                        let indexer = |v: &DefInt| {
                            (n as i32 - self.graph.data(*v).height).clamp(0, n as i32) as usize
                        };
                        let mut wl = OrderedByIntegerMetric::<DefInt, _, ChunkedFifo<DefInt, 16>>
                            ::new(n, indexer);
                        wl.fill_initial(initial.iter().copied());
                        executor::for_each(&wl, op, cfg);
                    } else {
                        let mut wl = ChunkedFifo::<DefInt, 64>::new();
                        wl.fill_initial(initial.iter().copied());
                        executor::for_each(&wl, op, cfg);
                    }
                }
                DetAlgo::DetBase | DetAlgo::DetDisjoint => {
                    let op = |src: &DefInt, ctx: &mut LoopCtx<DefInt>| -> IterResult {
                        if ctx.is_first_pass() {
                            self.acquire(*src, ctx)?;
                        }
                        if det == DetAlgo::DetDisjoint && ctx.is_first_pass() {
                            return Ok(());
                        }
                        ctx.node_data(&self.graph, *src, MethodFlag::Write)?;
                        ctx.cautious_point()?;

                        let mut increment = 1;
                        if self.discharge(*src, ctx) {
                            increment += BETA;
                        }
                        counter.add(increment);
                        Ok(())
                    };
                    let brk = || {
                        if self.global_relabel_interval > 0
                            && counter.reduce() >= self.global_relabel_interval
                        {
                            self.should_global_relabel.store(true, ORDER);
                            true
                        } else {
                            false
                        }
                    };
                    for_each_det(
                        initial.clone(),
                        op,
                        |&v| self.graph.data(v).id,
                        Some(brk),
                        LoopConfig { name: "Discharge", ..Default::default() },
                    );
                }
            }
            t_discharge.stop();
            t_discharge.total();

            if self.should_global_relabel.swap(false, ORDER) {
                let mut t = Timer::new("GlobalRelabelTime");
                t.start();
                initial.clear();
                self.global_relabel(&mut initial, det);
                println!(" Flow after global relabel: {}", self.flow());
                t.stop();
                t.total();
            } else {
                break;
            }
        }
    }

    fn check_heights(&self) -> Result<(), String> {
        for src in self.graph.nodes() {
            let sh = self.graph.data(src).height;
            for e in self.graph.edges(src) {
                let cap = *self.graph.edge_data(e);
                let dh = self.graph.data(self.graph.edge_dst(e)).height;
                if cap > 0 && sh > dh + 1 {
                    return Err(format!("height violated at {}", self.graph.data(src)));
                }
            }
        }
        Ok(())
    }

    /// Every non-source/sink node either drained its excess or was lifted
    /// out of play, and its excess matches the net flow over its edges in
    /// the original capacities.
    fn check_conservation(&self, orig: &PreflowPush) -> Result<(), String> {
        let n = self.graph.num_nodes();
        if orig.graph.num_nodes() != n || orig.graph.num_edges() != self.graph.num_edges() {
            return Err("original graph does not match".to_string());
        }

        for src in self.graph.nodes() {
            if src == self.source || src == self.sink {
                continue;
            }
            let node = self.graph.data(src);
            if node.excess != 0 && node.height != n as i32 {
                return Err(format!("non-zero excess at {}", node));
            }

            let mut sum: i64 = 0;
            for e in self.graph.edges(src) {
                debug_assert_eq!(self.graph.edge_dst(e), orig.graph.edge_dst(e));
                let ocap = *orig.graph.edge_data(e) as i64;
                let cap = *self.graph.edge_data(e) as i64;
                let mut delta: i64 = 0;
                if ocap > 0 {
                    delta -= ocap - cap;
                } else {
                    delta += cap;
                }
                sum += delta;
            }
            if node.excess != sum {
                return Err(format!(
                    "not pseudoflow: {} != {} at {}",
                    node.excess, sum, node
                ));
            }
        }
        Ok(())
    }

    fn check_augmenting_path(&self) -> Result<(), String> {
        let n = self.graph.num_nodes();
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();

        visited[self.source as usize] = true;
        queue.push_back(self.source);

        while let Some(src) = queue.pop_front() {
            for e in self.graph.edges(src) {
                let dst = self.graph.edge_dst(e);
                if !visited[dst as usize] && *self.graph.edge_data(e) > 0 {
                    visited[dst as usize] = true;
                    queue.push_back(dst);
                }
            }
        }

        if visited[self.sink as usize] {
            return Err("augmenting path exists".to_string());
        }
        Ok(())
    }

    /// Partial verification against a freshly loaded copy of the input.
    pub fn verify(&self, orig: &PreflowPush) -> Result<(), String> {
        self.check_heights()?;
        self.check_conservation(orig)?;
        self.check_augmenting_path()
    }
}
