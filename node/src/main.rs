use clap::Parser as _;

use graph::prelude::*;
use graph::prelude::tokio;
use graph::{env::EnvVars, log::logger};

use quire_node::{launcher, opt};

fn main() -> Result<(), Error> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { main_inner().await })
}

async fn main_inner() -> Result<(), Error> {
    let env_vars = Arc::new(EnvVars::from_env()?);
    let opt = opt::Opt::parse();

    // Set up logger
    let logger = logger(opt.debug);

    launcher::run(logger, opt, env_vars).await
}
