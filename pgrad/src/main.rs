use anyhow::Result;
use clap::Parser;
use pgrad::{run, Args};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let summary = run(&args)?;
    log::debug!("{:?}", summary);

    Ok(())
}
