#![forbid(unsafe_code)]

mod cli;
mod shutdown;
mod startup;

use anyhow::Result;

use cli::Command;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::parse();

    match cli.command {
        Some(Command::Version) => {
            println!("ledgerd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => startup::run(&cli).await,
    }
}
