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
use amorph::DefInt;
use amorph_apps::spanning_forest::{Algo, SfGraph, SpanningForest};

/// Builds the symmetric closure of an undirected edge list.
fn symmetric_graph(n: usize, undirected: &[(DefInt, DefInt)]) -> SfGraph {
    let mut edges: Vec<(DefInt, DefInt, i32)> = Vec::with_capacity(undirected.len() * 2);
    for &(u, v) in undirected {
        edges.push((u, v, 1));
        edges.push((v, u, 1));
    }
    CsrGraph::from_edges(n, &edges)
}

const TWO_COMPONENTS: &[(DefInt, DefInt)] = &[(0, 1), (1, 2), (0, 2), (3, 4), (4, 5)];

fn check_two_components(algo: Algo) {
    let app = SpanningForest::new(symmetric_graph(6, TWO_COMPONENTS));
    let tree = app.run(algo);
    assert_eq!(tree.len(), 4);
    app.verify(&tree).unwrap();

    // both triangles collapse, the two components stay apart
    assert_eq!(app.uf.find(0), app.uf.find(2));
    assert_eq!(app.uf.find(3), app.uf.find(5));
    assert_ne!(app.uf.find(0), app.uf.find(3));
}

#[test]
fn two_component_forest_asynchronous() {
    check_two_components(Algo::Asynchronous);
}

#[test]
fn two_component_forest_blocked_async() {
    check_two_components(Algo::BlockedAsync);
}

#[test]
fn demo_spans_a_connected_graph() {
    let app = SpanningForest::new(symmetric_graph(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]));
    let tree = app.run(Algo::Demo);
    assert_eq!(tree.len(), 3);
    app.verify(&tree).unwrap();
}

#[test]
fn every_edge_ends_inside_one_component() {
    let app = SpanningForest::new(symmetric_graph(6, TWO_COMPONENTS));
    let tree = app.run(Algo::Asynchronous);
    for u in app.graph.nodes() {
        for e in app.graph.edges(u) {
            assert_eq!(app.uf.find(u), app.uf.find(app.graph.edge_dst(e)));
        }
    }
    // every emitted edge joined two distinct components at emission time,
    // so the count matches nodes minus roots
    let roots = app.graph.nodes().filter(|&u| app.uf.find(u) == u).count();
    assert_eq!(tree.len(), app.graph.num_nodes() - roots);
}

#[test]
fn empty_graph_returns_immediately() {
    for algo in [Algo::Demo, Algo::Asynchronous, Algo::BlockedAsync] {
        let app = SpanningForest::new(symmetric_graph(0, &[]));
        let tree = app.run(algo);
        assert!(tree.is_empty());
        app.verify(&tree).unwrap();
    }
}

#[test]
fn isolated_nodes_stay_roots() {
    let app = SpanningForest::new(symmetric_graph(5, &[(1, 2)]));
    let tree = app.run(Algo::BlockedAsync);
    assert_eq!(tree.len(), 1);
    app.verify(&tree).unwrap();
}

#[test]
fn larger_random_ish_graph_is_a_forest() {
    // a deterministic scattering of edges over 200 nodes
    let n = 200usize;
    let mut undirected = Vec::new();
    for i in 0..n as DefInt {
        let j = (i * 7 + 3) % n as DefInt;
        if i != j {
            undirected.push((i, j));
        }
        if i % 3 == 0 {
            let k = (i * 11 + 1) % n as DefInt;
            if i != k {
                undirected.push((i, k));
            }
        }
    }
    let app = SpanningForest::new(symmetric_graph(n, &undirected));
    let tree = app.run(Algo::Asynchronous);
    app.verify(&tree).unwrap();

    let blocked = SpanningForest::new(symmetric_graph(n, &undirected));
    let tree2 = blocked.run(Algo::BlockedAsync);
    blocked.verify(&tree2).unwrap();
    assert_eq!(tree.len(), tree2.len());
}
