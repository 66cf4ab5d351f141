//! Table command - prints the synchronization table

use anyhow::Result;
use clap::Args;
use tagscope_core::SynchronizationTable;

use crate::commands::configure_colors;
use crate::output::{json, pretty};

#[derive(Args, Debug)]
pub struct TableArgs {
    /// Output format (pretty, json)
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl TableArgs {
    pub fn run(&self) -> Result<()> {
        configure_colors(self.no_color);
        let table = SynchronizationTable::global();

        match self.format.as_str() {
            "json" => println!("{}", json::table_to_json(table)?),
            "pretty" => print!("{}", pretty::format_table(table)),
            other => anyhow::bail!("Invalid format '{}'. Valid values: pretty, json", other),
        }

        Ok(())
    }
}
