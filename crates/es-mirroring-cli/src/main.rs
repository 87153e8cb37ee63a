mod cmd;
mod output;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};

use self::cmd::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    fluvio_future::subscriber::init_tracer(None);

    let cli = Cli::parse();
    fluvio_future::task::run_block_on(cli.process()).map_err(|err| eyre!("{err:?}"))?;
    Ok(())
}
