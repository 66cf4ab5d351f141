//! tagscope CLI - inspect scripting-variable synchronization plans
//!
//! Prints the synchronization table and the per-callback declaration and
//! re-binding plan for tags registered in a `tagscope.toml`.

mod commands;
mod logging;
mod output;

use clap::Parser;
use commands::Commands;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "tagscope",
    author,
    version,
    about = "Scripting-variable synchronization plans for custom template tags",
    long_about = "tagscope computes, for each lifecycle callback of a tag handler, which\n\
                  scripting variables generated code must declare or re-bind.\n\n\
                  Tags are registered in a tagscope.toml file."
)]
pub struct Cli {
    #[arg(
        long,
        value_enum,
        default_value = "warn",
        global = true,
        help = "Set the log level"
    )]
    pub log_level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli);

    match cli.command {
        Commands::Table(args) => args.run(),
        Commands::Plan(args) => args.run(),
        Commands::Check(args) => args.run(),
    }
}
