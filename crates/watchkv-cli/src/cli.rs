use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "watchkv",
    about = "watchkv: observable in-memory key-value store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with [store] and [poller] sections
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the set/get/remove scenario against a registered store
    Demo(DemoArgs),
    /// Mirror a simulated world into a store for a number of polls
    Poll(PollArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// Registry name for the demo store
    #[arg(long, default_value = "scores")]
    pub name: String,
}

#[derive(Args)]
pub struct PollArgs {
    /// Number of updates to print before stopping
    #[arg(short = 'n', long, default_value = "5")]
    pub ticks: usize,
}
