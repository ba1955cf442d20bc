#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

use clap::Parser;
use thisslime::TracingError;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_unwrap::ResultExt;

use hangbot::{
    cli::Cli,
    console::Console,
    framework::{logging, Config},
    Hangman,
};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    logging::init_tracing();

    info!(version = env!("CARGO_PKG_VERSION"), "hangbot starting");

    let config = Config::load(&Config::path(cli.config))
        .expect_or_log("config should be valid")
        .with_data_dir(cli.data_dir);

    let result = match Hangman::open(
        &config.data_dir,
        config.cooldowns,
        config.game.max_guesses,
    )
    .await
    {
        Ok(hangman) => {
            Console::new(hangman)
                .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
        }
        Err(err) => Err(err.into()),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            err.trace();
            error!("stopping");
            std::process::ExitCode::FAILURE
        }
    }
}
