// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io, path::Path, path::PathBuf};

use agendum_core::{Calendar, CalendarError, Config};
use agendum_ical::ParseError;
use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{ArgMatches, Command};
use colored::Colorize;
use tokio::fs;

use crate::arg::CommonArgs;

/// Parse a calendar file and report every problem found.
#[derive(Debug, Clone)]
pub struct CmdCheck {
    pub file: PathBuf,
}

impl CmdCheck {
    pub const NAME: &str = "check";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Parse a calendar file and report problems")
            .arg(CommonArgs::file())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
        }
    }

    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "checking calendar...");
        let src = fs::read_to_string(&self.file)
            .await
            .map_err(|e| format!("Failed to read file {}: {e}", self.file.display()))?;

        let calendar = match Calendar::parse_with_options(&src, &config.parse_options()) {
            Ok(calendar) => calendar,
            Err(CalendarError::Parse(err)) => {
                report_parse_error(&self.file, &src, &err, &mut io::stderr())?;
                return Err(format!("{} is not a valid calendar", self.file.display()).into());
            }
            Err(err) => return Err(err.into()),
        };

        let errors = calendar.errors();
        for message in &errors {
            println!("{} {}", "Warning:".yellow(), message);
        }
        if errors.is_empty() {
            println!(
                "{} {}: {} components",
                "OK".green(),
                self.file.display(),
                calendar.len()
            );
        } else {
            println!("{}: {} problems found", self.file.display(), errors.len());
        }
        Ok(())
    }
}

/// Render a parse error as a report pointing at the offending source.
pub fn report_parse_error(
    path: &Path,
    src: &str,
    err: &ParseError,
    w: &mut impl io::Write,
) -> io::Result<()> {
    let name = path.display().to_string();
    let range = err.span().range();
    Report::build(ReportKind::Error, (name.clone(), range.clone()))
        .with_config(ariadne::Config::new().with_index_type(ariadne::IndexType::Byte))
        .with_message(err.to_string())
        .with_label(
            Label::new((name.clone(), range))
                .with_message("here")
                .with_color(Color::Red),
        )
        .finish()
        .write((name, Source::from(src)), w)
}
