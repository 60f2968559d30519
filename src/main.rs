//! vaultstream - password-based authenticated encryption for archive storage.

use std::process;

use clap::Parser;
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: failed to install logging subscriber");
    }

    let cli = vaultstream::cli::Cli::parse();
    if let Err(e) = vaultstream::cli::run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
