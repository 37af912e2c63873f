//! Thin process entry point.
//!
//! Loads configuration, builds an `App`, and exits with the documented
//! exit codes. The ingestion/search/reindex/indexer command surface
//! itself is a thin CLI collaborator left out of scope — this binary
//! only proves the wiring starts and stops cleanly.

use codeindex::infrastructure::config::ConfigLoader;
use codeindex::App;
use codeindex_domain::error::Error;

#[tokio::main]
async fn main() {
    std::process::exit(run().await);
}

async fn run() -> i32 {
    let config = match ConfigLoader::new().load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return 2;
        }
    };

    let app = match App::init(config) {
        Ok(app) => app,
        Err(e @ Error::Config { .. }) => {
            eprintln!("configuration error: {e}");
            return 2;
        }
        Err(e @ Error::Validation { .. }) => {
            eprintln!("validation error: {e}");
            return 3;
        }
        Err(e) => {
            eprintln!("operational error: {e}");
            return 1;
        }
    };

    tracing::info!(index = %app.config.index_name, "codeindex core ready");

    let exit_code = match tokio::signal::ctrl_c().await {
        Ok(()) => 130,
        Err(e) => {
            eprintln!("failed to install signal handler: {e}");
            1
        }
    };

    app.cleanup();
    exit_code
}
