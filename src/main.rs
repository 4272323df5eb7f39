use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use leafdb::config::{Config, Invocation, USAGE};

fn main() {
    if let Err(e) = run() {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)?;

    let config = match Config::from_args(std::env::args().skip(1))? {
        Invocation::Run(config) => config,
        Invocation::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Invocation::Version => {
            println!("leafdb {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
    };

    let table = leafdb::open(&config.db_path)
        .with_context(|| format!("failed to open database at {:?}", config.db_path))?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    leafdb::repl::run(table, stdin.lock(), &mut stdout.lock())
}
