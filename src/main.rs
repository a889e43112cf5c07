mod cli;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

fn main() -> Result<()> {
    env_logger::init_from_env(Env::new().filter("WRAPPED_CONCAT_LOG"));
    let cli = cli::Cli::parse();
    wrapped_concat::run(cli.into_config()?)?;
    Ok(())
}
