//! Check command - plans every registered tag and reports translation errors

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::process;
use tagscope_core::config::{NameSource, TagConfig};
use tagscope_core::{Attributes, TagLibrary, TranslationError};

use crate::commands::{configure_colors, load_library};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to tagscope.toml (defaults to the nearest one above the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl CheckArgs {
    pub fn run(&self) -> Result<()> {
        configure_colors(self.no_color);

        let library = load_library(self.config.as_deref())?;
        if library.is_empty() {
            println!("No tags registered.");
            return Ok(());
        }

        let failures = check_library(&library);
        for tag in library.tags() {
            match failures.iter().find(|err| err.tag() == tag.name) {
                Some(err) => println!("{} {}", "error:".red().bold(), err),
                None => println!("{} {} ({})", "ok:".green().bold(), tag.name, tag.kind),
            }
        }

        println!();
        if failures.is_empty() {
            println!("{}", format!("{} tags checked", library.len()).green());
            return Ok(());
        }

        println!(
            "{}",
            format!("{} of {} tags failed", failures.len(), library.len())
                .red()
                .bold()
        );
        process::exit(1);
    }
}

/// Plans each tag with a synthesized identifier for every attribute-named variable.
pub fn check_library(library: &TagLibrary) -> Vec<TranslationError> {
    library
        .tags()
        .filter_map(|tag| library.plan(&tag.name, &placeholder_attributes(tag)).err())
        .collect()
}

fn placeholder_attributes(tag: &TagConfig) -> Attributes {
    tag.variables
        .iter()
        .enumerate()
        .filter_map(|(index, var)| match var.name_source() {
            Some(NameSource::FromAttribute(attribute)) => {
                Some((attribute.to_string(), format!("_attr{}", index)))
            }
            _ => None,
        })
        .collect()
}
