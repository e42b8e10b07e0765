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

//! Binary CSR graph files. Little-endian layout: header {version, edge
//! unit size, num nodes, num edges} as u64, node-index array (n+1 x u64),
//! destination array (m x u32), zero padding to 8 bytes, then m edge
//! payloads of the unit size (absent when the unit is 0).

use std::fs;

use crate::graph::CsrGraph;
use crate::verbose_println;
use crate::{maybe_uninit_vec, DefInt};

pub const GR_VERSION: u64 = 1;
pub const GR_SUFFIX_PFP: &str = ".gr.pfp";

/// The raw contents of a `.gr` file.
pub struct GrFile {
    pub offsets: Vec<u64>,
    pub dsts: Vec<DefInt>,
    pub edge_data: Option<Vec<i32>>,
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(bytes[at..at + 8].try_into().unwrap())
}

impl GrFile {
    pub fn num_nodes(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn num_edges(&self) -> usize {
        self.dsts.len()
    }

    pub fn read(path: &str) -> Result<Self, String> {
        let bytes = fs::read(path).map_err(|e| format!("cannot read {}: {}", path, e))?;
        if bytes.len() < 32 {
            return Err(format!("bad graph header in {}", path));
        }

        verbose_println!("reading file header...");
        let version = read_u64(&bytes, 0);
        let edge_unit = read_u64(&bytes, 8);
        let n = read_u64(&bytes, 16) as usize;
        let m = read_u64(&bytes, 24) as usize;
        if version != GR_VERSION || (edge_unit != 0 && edge_unit != 4) {
            return Err(format!("bad graph header in {}", path));
        }

        let index_bytes = (n + 1) * 8;
        let dst_bytes = m * 4;
        let padded_dst_bytes = (dst_bytes + 7) & !7;
        let payload_bytes = if edge_unit == 0 { 0 } else { m * 4 };
        if bytes.len() < 32 + index_bytes + padded_dst_bytes + payload_bytes {
            return Err(format!("truncated graph file {}", path));
        }

        verbose_println!("reading offsets (n={n})...");
        let mut offsets: Vec<u64> = maybe_uninit_vec![0u64; n + 1];
        for (i, o) in offsets.iter_mut().enumerate() {
            *o = read_u64(&bytes, 32 + i * 8);
        }
        if offsets[0] != 0 || offsets[n] as usize != m || offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(format!("bad node index in {}", path));
        }

        verbose_println!("reading edges (m={m})...");
        let dst_base = 32 + index_bytes;
        let mut dsts: Vec<DefInt> = maybe_uninit_vec![0 as DefInt; m];
        for (i, d) in dsts.iter_mut().enumerate() {
            let at = dst_base + i * 4;
            *d = DefInt::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            if *d as usize >= n {
                return Err(format!("edge destination out of range in {}", path));
            }
        }

        let edge_data = if edge_unit == 0 {
            None
        } else {
            let data_base = dst_base + padded_dst_bytes;
            let mut data: Vec<i32> = maybe_uninit_vec![0i32; m];
            for (i, c) in data.iter_mut().enumerate() {
                let at = data_base + i * 4;
                *c = i32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            }
            Some(data)
        };

        verbose_println!("graph loaded.");
        Ok(Self { offsets, dsts, edge_data })
    }

    pub fn write(&self, path: &str) -> Result<(), String> {
        let n = self.num_nodes();
        let m = self.num_edges();
        let edge_unit: u64 = if self.edge_data.is_some() { 4 } else { 0 };

        let dst_bytes = m * 4;
        let padded_dst_bytes = (dst_bytes + 7) & !7;
        let total = 32 + (n + 1) * 8 + padded_dst_bytes + if edge_unit == 0 { 0 } else { m * 4 };
        let mut bytes: Vec<u8> = Vec::with_capacity(total);

        bytes.extend_from_slice(&GR_VERSION.to_le_bytes());
        bytes.extend_from_slice(&edge_unit.to_le_bytes());
        bytes.extend_from_slice(&(n as u64).to_le_bytes());
        bytes.extend_from_slice(&(m as u64).to_le_bytes());
        for o in &self.offsets {
            bytes.extend_from_slice(&o.to_le_bytes());
        }
        for d in &self.dsts {
            bytes.extend_from_slice(&d.to_le_bytes());
        }
        bytes.resize(32 + (n + 1) * 8 + padded_dst_bytes, 0);
        if let Some(data) = &self.edge_data {
            for c in data {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }

        fs::write(path, bytes).map_err(|e| format!("cannot write {}: {}", path, e))
    }

    /// Materializes the graph; missing payloads become zero capacities.
    pub fn into_graph<N: Default>(self) -> CsrGraph<N, i32> {
        let m = self.num_edges();
        let edge_data = self.edge_data.unwrap_or_else(|| vec![0; m]);
        CsrGraph::from_csr(self.offsets, self.dsts, edge_data)
    }
}
