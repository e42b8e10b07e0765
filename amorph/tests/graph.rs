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

fn tmp_path(name: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("amorph-{}-{}", std::process::id(), name));
    p.to_str().unwrap().to_string()
}

#[test]
fn from_edges_sorts_adjacency_by_destination() {
    let edges = vec![(0u32, 2u32, 7i32), (0, 1, 5), (1, 3, 4), (2, 3, 6)];
    let g: CsrGraph<(), i32> = CsrGraph::from_edges(4, &edges);
    assert_eq!(g.num_nodes(), 4);
    assert_eq!(g.num_edges(), 4);
    let dsts: Vec<u32> = g.edges(0).map(|e| g.edge_dst(e)).collect();
    assert_eq!(dsts, vec![1, 2]);
    assert_eq!(*g.edge_data(g.find_edge(0, 2).unwrap()), 7);
    assert_eq!(*g.edge_data(g.find_edge(0, 1).unwrap()), 5);
}

#[test]
fn find_edge_linear_and_bisecting_paths_agree() {
    // node 0 has a degree large enough for the bisecting path
    let n = 64;
    let mut edges: Vec<(u32, u32, i32)> = (1..n as u32).map(|v| (0, v, v as i32)).collect();
    edges.push((1, 2, -1));
    let g: CsrGraph<(), i32> = CsrGraph::from_edges(n, &edges);
    for v in 1..n as u32 {
        let e = g.find_edge(0, v).unwrap();
        assert_eq!(g.edge_dst(e), v);
        assert_eq!(*g.edge_data(e), v as i32);
    }
    assert_eq!(g.find_edge(1, 2).map(|e| g.edge_dst(e)), Some(2));
    assert_eq!(g.find_edge(1, 3), None);
    assert_eq!(g.find_edge(2, 0), None);
}

#[test]
fn gr_round_trip_is_byte_identical() {
    let f = GrFile {
        offsets: vec![0, 2, 3, 3],
        dsts: vec![1, 2, 0],
        edge_data: Some(vec![5, 3, 4]),
    };
    let a = tmp_path("roundtrip-a.gr");
    let b = tmp_path("roundtrip-b.gr");
    f.write(&a).unwrap();
    let g = GrFile::read(&a).unwrap();
    g.write(&b).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    let _ = std::fs::remove_file(&a);
    let _ = std::fs::remove_file(&b);
}

#[test]
fn gr_round_trip_without_payloads() {
    let f = GrFile {
        offsets: vec![0, 1, 2],
        dsts: vec![1, 0],
        edge_data: None,
    };
    let a = tmp_path("unit-a.gr");
    let b = tmp_path("unit-b.gr");
    f.write(&a).unwrap();
    let g = GrFile::read(&a).unwrap();
    assert!(g.edge_data.is_none());
    g.write(&b).unwrap();
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    let _ = std::fs::remove_file(&a);
    let _ = std::fs::remove_file(&b);
}

#[test]
fn bad_headers_are_rejected() {
    let p = tmp_path("bad.gr");
    std::fs::write(&p, vec![0u8; 16]).unwrap();
    assert!(GrFile::read(&p).is_err());
    std::fs::write(&p, {
        let mut v = Vec::new();
        v.extend_from_slice(&9u64.to_le_bytes()); // unknown version
        v.extend_from_slice(&4u64.to_le_bytes());
        v.extend_from_slice(&1u64.to_le_bytes());
        v.extend_from_slice(&0u64.to_le_bytes());
        v.extend_from_slice(&[0u8; 16]);
        v
    })
    .unwrap();
    assert!(GrFile::read(&p).is_err());
    let _ = std::fs::remove_file(&p);
}

#[test]
fn into_graph_defaults_missing_capacities() {
    let f = GrFile {
        offsets: vec![0, 1, 2],
        dsts: vec![1, 0],
        edge_data: None,
    };
    let g: CsrGraph<(), i32> = f.into_graph();
    assert_eq!(*g.edge_data(0), 0);
    assert_eq!(*g.edge_data(1), 0);
}
