//! detbench entry point

use clap::Parser;
use detbench::cli::{Cli, Commands};
use detbench::logging;
use detbench::shutdown::ShutdownController;
use tracing::warn;

fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Run(args) => {
                let shutdown = ShutdownController::default();
                let signal = shutdown.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        warn!("Interrupt received, stopping after the current frame");
                        signal.request_shutdown();
                    }
                });
                detbench::cli::run::execute(args, shutdown).await
            }
            Commands::Compress(args) => detbench::cli::compress::execute(&args).await,
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
