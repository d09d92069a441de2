/* PSPP - a program for statistical analysis.
 * Copyright (C) 2023 Free Software Foundation, Inc.
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>. */


use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use env_logger::Env;
use log::{LevelFilter, debug};
use spss_converter::settings::Settings;
use thiserror::Error as ThisError;

use crate::{convert::Convert, show::Show};

mod convert;
mod show;

/// Convert SPSS data and metadata to and from common interchange formats.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more details (repeat for even more).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file with default conversion options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Debug)]
enum Command {
    Convert(Convert),
    Show(Show),
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Command::Convert(convert) => convert.run(),
            Command::Show(show) => show.run(),
        }
    }
}

/// A file format that the command line tools can read or write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FileFormat {
    /// Delimited text.
    Csv,

    /// JSON.
    Json,

    /// YAML.
    Yaml,

    /// Office Open XML spreadsheet.
    Xlsx,
}

impl TryFrom<&Path> for FileFormat {
    type Error = anyhow::Error;

    fn try_from(value: &Path) -> std::result::Result<Self, Self::Error> {
        let extension = value
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(anyhow!(
                "{}: unknown file format (use -I or -O to specify one)",
                value.display()
            )),
        }
    }
}

#[derive(ThisError, Debug)]
#[error("{0}: unknown encoding")]
struct UnknownEncodingError(String);

fn parse_encoding(arg: &str) -> Result<&'static Encoding, UnknownEncodingError> {
    match Encoding::for_label_no_replacement(arg.as_bytes()) {
        Some(encoding) => Ok(encoding),
        None => Err(UnknownEncodingError(arg.to_string())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str())).init();

    if let Some(config) = &cli.config {
        let settings = Settings::load(config)?;
        debug!("loaded settings from {}", config.display());
        if settings.init().is_err() {
            return Err(anyhow!("settings were already initialized"));
        }
    }

    cli.command.run()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::FileFormat;

    #[test]
    fn format_from_extension() {
        assert_eq!(FileFormat::try_from(Path::new("a.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::try_from(Path::new("a/b.yml")).unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::try_from(Path::new("b.xlsx")).unwrap(), FileFormat::Xlsx);
        assert!(FileFormat::try_from(Path::new("b.sav")).is_err());
        assert!(FileFormat::try_from(Path::new("noextension")).is_err());
    }
}
