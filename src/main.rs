// src/main.rs

use gotest_watch::engine::ShutdownOutcome;
use gotest_watch::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = match run_main().await {
        Ok(ShutdownOutcome::Clean) => 0,
        Ok(ShutdownOutcome::TimedOut) => 1,
        Err(err) => {
            eprintln!("gotest-watch error: {err:?}");
            1
        }
    };

    // The stdin reader sits in a blocking read that cannot be interrupted,
    // which would keep the runtime from shutting down; exit explicitly.
    std::process::exit(code);
}

async fn run_main() -> anyhow::Result<ShutdownOutcome> {
    let args = cli::parse();
    logging::init_logging(args.log_level, args.log_file.as_deref())?;
    run(args).await
}
