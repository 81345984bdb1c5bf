use clap::Parser;
use meteo_normalizer::cli::{run, Cli};
use meteo_normalizer::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
