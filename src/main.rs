use clap::Parser;

use crate::cli::Cli;
use mesh_viewer::run;

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli.into())
}
