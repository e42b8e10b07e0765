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

use clap::Parser;

use amorph::graph_io::GrFile;
use amorph::parallel::config_rayon;
use amorph::stat::{report_mem_info, Timer};
use amorph_apps::spanning_forest::{Algo, SpanningForest};

/// computes the spanning forest of a symmetric graph
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// the input graph's filename
    #[clap(value_parser, required = true)]
    ifname: String,

    /// the algorithm to use
    #[clap(long, value_enum, default_value_t = Algo::BlockedAsync)]
    algo: Algo,

    /// the number of worker threads (0 = one per core)
    #[clap(short, long, value_parser, default_value_t = 0)]
    threads: usize,

    /// skip result verification
    #[clap(long)]
    noverify: bool,
}

fn main() {
    let args = Args::parse();
    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()
            .unwrap();
    }
    config_rayon();

    let mut t_init = Timer::new("InitializeTime");
    t_init.start();
    let app = match GrFile::read(&args.ifname) {
        Ok(f) => SpanningForest::new(f.into_graph()),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    t_init.stop();
    t_init.total();
    println!("Num nodes: {}", app.graph.num_nodes());

    report_mem_info("MeminfoPre");
    let mut t = Timer::new("Total");
    t.start();
    let tree = app.run(args.algo);
    t.stop();
    t.total();
    report_mem_info("MeminfoPost");

    if !args.noverify {
        if let Err(e) = app.verify(&tree) {
            eprintln!("verification failed: {}", e);
            std::process::exit(1);
        }
    }
}
