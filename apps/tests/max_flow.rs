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

use amorph::graph::CsrGraph;
use amorph::graph_io::GrFile;
use amorph::DefInt;
use amorph_apps::max_flow::{load_flow_graph, DetAlgo, FlowGraph, PreflowPush};

/// Builds a flow network from directed arcs, adding the zero-capacity
/// reverse edges discharge relies on.
fn flow_graph(n: usize, arcs: &[(DefInt, DefInt, i32)]) -> FlowGraph {
    let mut edges: Vec<(DefInt, DefInt, i32)> = arcs.to_vec();
    let mut pairs: Vec<(DefInt, DefInt)> = arcs.iter().map(|&(u, v, _)| (u, v)).collect();
    pairs.sort_unstable();
    for &(u, v, _) in arcs {
        if pairs.binary_search(&(v, u)).is_err() {
            edges.push((v, u, 0));
        }
    }
    CsrGraph::from_edges(n, &edges)
}

fn run_flow(
    n: usize,
    arcs: &[(DefInt, DefInt, i32)],
    source: DefInt,
    sink: DefInt,
    relabel: i64,
    det: DetAlgo,
    use_hl: bool,
) -> i64 {
    let app = PreflowPush::new(flow_graph(n, arcs), source, sink, relabel).unwrap();
    app.check_sorting().unwrap();
    app.run(det, use_hl);
    let orig = PreflowPush::new(flow_graph(n, arcs), source, sink, relabel).unwrap();
    app.verify(&orig).unwrap();
    app.flow()
}

const DIAMOND: &[(DefInt, DefInt, i32)] =
    &[(0, 1, 5), (0, 2, 3), (1, 3, 4), (2, 3, 6)];

#[test]
fn diamond_max_flow_is_7() {
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::Nondet, false), 7);
}

#[test]
fn diamond_with_hl_order() {
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::Nondet, true), 7);
}

#[test]
fn diamond_deterministic_base() {
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::DetBase, false), 7);
}

#[test]
fn diamond_deterministic_disjoint() {
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::DetDisjoint, false), 7);
}

#[test]
fn diamond_with_forced_global_relabels() {
    // a tiny interval makes every discharge phase end in a global relabel
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 1, DetAlgo::Nondet, false), 7);
    assert_eq!(run_flow(4, DIAMOND, 0, 3, 1, DetAlgo::DetBase, false), 7);
}

#[test]
fn diamond_without_global_relabels() {
    assert_eq!(run_flow(4, DIAMOND, 0, 3, -1, DetAlgo::Nondet, false), 7);
}

#[test]
fn triangle_unit_max_flow_is_2() {
    let arcs = &[(0, 1, 1), (1, 2, 1), (0, 2, 1)];
    assert_eq!(run_flow(3, arcs, 0, 2, 0, DetAlgo::Nondet, false), 2);
}

#[test]
fn bottleneck_chain_max_flow_is_1() {
    let arcs = &[(0, 1, 10), (1, 2, 1), (2, 3, 10)];
    assert_eq!(run_flow(4, arcs, 0, 3, 0, DetAlgo::Nondet, false), 1);
}

#[test]
fn repeated_runs_agree_on_the_flow_value() {
    let a = run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::Nondet, false);
    let b = run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::Nondet, true);
    let c = run_flow(4, DIAMOND, 0, 3, 0, DetAlgo::DetDisjoint, false);
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn source_equal_to_sink_is_rejected() {
    let err = PreflowPush::new(flow_graph(4, DIAMOND), 0, 0, 0).unwrap_err();
    assert_eq!(err, "invalid source or sink");
}

#[test]
fn out_of_range_sink_is_rejected() {
    assert!(PreflowPush::new(flow_graph(4, DIAMOND), 0, 9, 0).is_err());
}

#[test]
fn loading_preprocesses_reverse_edges_and_drops_self_loops() {
    // the diamond as a plain forward-only file, plus a self-loop on 1
    let mut p = std::env::temp_dir();
    p.push(format!("amorph-pfp-{}.gr", std::process::id()));
    let path = p.to_str().unwrap().to_string();
    let f = GrFile {
        offsets: vec![0, 2, 4, 5, 5],
        dsts: vec![1, 2, 1, 3, 3],
        edge_data: Some(vec![5, 3, 9, 4, 6]),
    };
    f.write(&path).unwrap();

    let g = load_flow_graph(&path, false, false).unwrap();
    assert!(g.find_edge(1, 1).is_none());
    assert!(g.find_edge(3, 1).is_some());

    let app = PreflowPush::new(g, 0, 3, 0).unwrap();
    app.check_sorting().unwrap();
    app.run(DetAlgo::Nondet, false);
    assert_eq!(app.flow(), 7);

    let _ = std::fs::remove_file(format!("{}.pfp", path));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn larger_layered_network() {
    // two parallel diamonds sharing source and sink
    let arcs = &[
        (0, 1, 4), (0, 2, 4), (1, 3, 3), (2, 3, 3),
        (0, 4, 5), (4, 5, 2), (5, 3, 9),
    ];
    assert_eq!(run_flow(6, arcs, 0, 3, 0, DetAlgo::Nondet, false), 8);
    assert_eq!(run_flow(6, arcs, 0, 3, 0, DetAlgo::DetBase, false), 8);
}
