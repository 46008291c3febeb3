use modsync_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    // .env first: it may carry TOKEN and RUST_LOG.
    let dotenv = dotenvy::dotenv();

    let log_file = match logging::init_logging() {
        Ok(path) => Some(path),
        Err(_) => {
            logging::init_logging_stderr();
            None
        }
    };
    if let Ok(path) = &dotenv {
        tracing::debug!("loaded environment from {}", path.display());
    }

    if let Err(err) = Cli::run_from_args().await {
        tracing::error!("fatal: {:#}", err);
        eprintln!("modsync error: {:#}", err);
        if let Some(path) = log_file {
            eprintln!("details in {}", path.display());
        }
        std::process::exit(1);
    }
}
