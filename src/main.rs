use anyhow::Result;
use clap::Parser;
use pagepool::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
