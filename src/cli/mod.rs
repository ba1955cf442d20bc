use std::path::PathBuf;

#[derive(clap::Parser, Debug)]
#[command(version, about = "Hangman games for chat channels, played over stdin")]
pub struct Cli {
    /// Config file to read instead of `HANGBOT_TOML` or `./hangbot.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides `data_dir` from the config.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}
