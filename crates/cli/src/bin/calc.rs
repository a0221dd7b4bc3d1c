use std::process::ExitCode;

use cmdtree_cli::{calc, report};
use cmdtree_core::CommandGraph;

fn main() -> ExitCode {
    env_logger::init();

    let mut graph = CommandGraph::from_env();
    calc::register(&mut graph);
    report::run(graph)
}
