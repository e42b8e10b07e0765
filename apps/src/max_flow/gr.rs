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

//! Flow-network preprocessing. Discharge needs a zero-capacity reverse
//! edge for every forward edge; `write_pfp_graph` materializes them once
//! into a `.pfp` companion file that later runs load directly.

use std::path::Path;

use amorph::graph_io::{GrFile, GR_SUFFIX_PFP};
use amorph::DefInt;

use super::{FlowGraph, FlowNode};

/// Rewrites `input` as a flow network: self-loops dropped, a capacity-zero
/// reverse edge added wherever one is absent, adjacency sorted by
/// destination id.
pub fn write_pfp_graph(input: &str, output: &str, use_unit_capacity: bool) -> Result<(), String> {
    let f = GrFile::read(input)?;
    let n = f.num_nodes();

    let mut edges: Vec<(DefInt, DefInt, i32)> = Vec::with_capacity(f.num_edges() * 2);
    let mut pairs: Vec<(DefInt, DefInt)> = Vec::with_capacity(f.num_edges());
    for u in 0..n as DefInt {
        let lo = f.offsets[u as usize] as usize;
        let hi = f.offsets[u as usize + 1] as usize;
        for e in lo..hi {
            let v = f.dsts[e];
            if u == v {
                continue;
            }
            let cap = if use_unit_capacity {
                1
            } else {
                f.edge_data.as_ref().map(|d| d[e]).unwrap_or(1)
            };
            edges.push((u, v, cap));
            pairs.push((u, v));
        }
    }
    pairs.sort_unstable();

    let mut reverses: Vec<(DefInt, DefInt, i32)> = Vec::new();
    for &(u, v, _) in &edges {
        if pairs.binary_search(&(v, u)).is_err() {
            reverses.push((v, u, 0));
        }
    }
    edges.append(&mut reverses);
    edges.sort_unstable_by_key(|&(u, v, _)| (u, v));

    let mut offsets = vec![0u64; n + 1];
    for &(u, _, _) in &edges {
        offsets[u as usize + 1] += 1;
    }
    for i in 0..n {
        offsets[i + 1] += offsets[i];
    }
    let out = GrFile {
        offsets,
        dsts: edges.iter().map(|&(_, v, _)| v).collect(),
        edge_data: Some(edges.iter().map(|&(_, _, c)| c).collect()),
    };
    out.write(output)
}

/// Loads a flow network, preprocessing the input on first use. With
/// `use_symmetric` the input is taken as-is and every capacity becomes 1.
pub fn load_flow_graph(
    input: &str,
    use_unit_capacity: bool,
    use_symmetric: bool,
) -> Result<FlowGraph, String> {
    if use_symmetric {
        let f = GrFile::read(input)?;
        let m = f.num_edges();
        let g: FlowGraph = f.into_graph::<FlowNode>();
        for e in 0..m {
            *g.edge_data_mut(e) = 1;
        }
        return Ok(g);
    }

    let path = if input.ends_with(GR_SUFFIX_PFP) {
        input.to_string()
    } else {
        let pfp = format!("{}.pfp", input);
        if !Path::new(&pfp).exists() {
            println!("Writing new input file: {}", pfp);
            write_pfp_graph(input, &pfp, use_unit_capacity)?;
        }
        pfp
    };
    Ok(GrFile::read(&path)?.into_graph::<FlowNode>())
}
