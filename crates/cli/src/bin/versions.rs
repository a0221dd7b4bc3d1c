use std::process::ExitCode;

use cmdtree_cli::{report, versions};
use cmdtree_core::CommandGraph;

fn main() -> ExitCode {
    env_logger::init();

    let mut graph = CommandGraph::from_env();
    versions::register(&mut graph);
    report::run(graph)
}
