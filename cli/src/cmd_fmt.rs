// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, path::PathBuf};

use agendum_core::{Config, io::load_calendar};
use clap::{ArgMatches, Command, arg, value_parser};
use tokio::fs;

use crate::arg::CommonArgs;

/// Re-serialize a calendar file in canonical form.
#[derive(Debug, Clone)]
pub struct CmdFmt {
    pub file: PathBuf,
    pub fold: Option<usize>,
    pub write: bool,
}

impl CmdFmt {
    pub const NAME: &str = "fmt";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Re-serialize a calendar file")
            .arg(CommonArgs::file())
            .arg(
                arg!(--fold <WIDTH> "Fold lines longer than WIDTH octets, 0 to disable")
                    .value_parser(value_parser!(usize)),
            )
            .arg(arg!(-w --write "Write the result back to the file instead of stdout"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
            fold: matches.get_one("fold").copied(),
            write: matches.get_flag("write"),
        }
    }

    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "formatting calendar...");
        let mut options = config.format_options();
        match self.fold {
            Some(1) => return Err("Fold width must be 0 (no folding) or at least 2".into()),
            Some(width) => options = options.folding((width > 0).then_some(width)),
            None => {}
        }

        let calendar = load_calendar(&self.file, config).await?;
        let content = calendar.serialize_with(&options)?;
        if self.write {
            fs::write(&self.file, content)
                .await
                .map_err(|e| format!("Failed to write file {}: {e}", self.file.display()))?;
        } else {
            print!("{content}");
        }
        Ok(())
    }
}
