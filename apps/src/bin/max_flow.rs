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

use amorph::parallel::config_rayon;
use amorph::stat::{report_mem_info, Timer};
use amorph_apps::max_flow::{load_flow_graph, DetAlgo, PreflowPush};

/// finds the maximum flow in a network using the preflow push technique
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
struct Args {
    /// the input graph's filename
    #[clap(value_parser, required = true)]
    ifname: String,

    /// the source node id
    #[clap(value_parser, required = true)]
    source: u32,

    /// the sink node id
    #[clap(value_parser, required = true)]
    sink: u32,

    /// use the HL ordering heuristic
    #[clap(long = "useHLOrder")]
    use_hl_order: bool,

    /// assume all capacities are unit
    #[clap(long = "useUnitCapacity")]
    use_unit_capacity: bool,

    /// assume the input graph is symmetric and has unit capacities
    #[clap(long = "useSymmetricDirectly")]
    use_symmetric_directly: bool,

    /// relabel interval: < 0 no relabeling, 0 use the default interval,
    /// > 0 relabel every X iterations
    #[clap(long, value_parser, default_value_t = 0)]
    relabel: i64,

    /// deterministic algorithm
    #[clap(long = "detAlgo", value_enum, default_value_t = DetAlgo::Nondet)]
    det_algo: DetAlgo,

    /// the number of worker threads (0 = one per core)
    #[clap(short, long, value_parser, default_value_t = 0)]
    threads: usize,

    /// skip result verification
    #[clap(long)]
    noverify: bool,
}

fn load(args: &Args) -> Result<PreflowPush, String> {
    let graph = load_flow_graph(
        &args.ifname,
        args.use_unit_capacity,
        args.use_symmetric_directly,
    )?;
    let app = PreflowPush::new(graph, args.source, args.sink, args.relabel)?;
    app.check_sorting()?;
    Ok(app)
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
    let app = match load(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    t_init.stop();
    t_init.total();

    println!("number of nodes: {}", app.graph.num_nodes());
    println!("global relabel interval: {}", app.global_relabel_interval);

    report_mem_info("MeminfoPre");
    let mut t = Timer::new("Total");
    t.start();
    app.run(args.det_algo, args.use_hl_order);
    t.stop();
    t.total();
    report_mem_info("MeminfoPost");

    println!("Flow is {}", app.flow());

    if !args.noverify {
        let orig = match load(&args) {
            Ok(orig) => orig,
            Err(e) => {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = app.verify(&orig) {
            eprintln!("verification failed: {}", e);
            std::process::exit(1);
        }
        println!("(Partially) Verified");
    }
}
