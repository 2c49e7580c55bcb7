// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io, path::PathBuf};

use agendum_core::{Calendar, ComponentId, Config, io::load_calendar};
use agendum_ical::Temporal;
use agendum_ical::keyword::{KW_DTSTART, KW_RECURRENCE_ID, KW_SUMMARY, KW_UID};
use clap::{ArgMatches, Command, arg, value_parser};
use colored::{Color, Colorize};

use crate::arg::CommonArgs;
use crate::util::{OutputFormat, parse_temporal, today};

/// List the occurrences of the series in a calendar file.
#[derive(Debug, Clone)]
pub struct CmdOccurrences {
    pub file: PathBuf,
    pub uid: Option<String>,
    pub from: Option<String>,
    pub until: Option<String>,
    pub limit: Option<usize>,
    pub output_format: OutputFormat,
}

impl CmdOccurrences {
    pub const NAME: &str = "occurrences";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("occ")
            .about("List occurrences of recurring components")
            .arg(CommonArgs::file())
            .arg(arg!(--uid <UID> "Only list the series with this UID"))
            .arg(arg!(--from <DATE> "First occurrence to list, defaults to today"))
            .arg(arg!(--until <DATE> "List occurrences strictly before this"))
            .arg(
                arg!(--limit <N> "Maximum number of occurrences per series")
                    .value_parser(value_parser!(usize)),
            )
            .arg(CommonArgs::output_format())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
            uid: matches.get_one("uid").cloned(),
            from: matches.get_one("from").cloned(),
            until: matches.get_one("until").cloned(),
            limit: matches.get_one("limit").copied(),
            output_format: CommonArgs::get_output_format(matches),
        }
    }

    pub async fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing occurrences...");
        let calendar = load_calendar(&self.file, config).await?;
        let rows = self.collect(&calendar, config)?;
        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => write_table(&mut io::stdout(), &rows)?,
        }
        Ok(())
    }

    fn collect(
        &self,
        calendar: &Calendar,
        config: &Config,
    ) -> Result<Vec<OccurrenceRow>, Box<dyn Error>> {
        let from = match &self.from {
            Some(from) => parse_temporal(from)?,
            None => today(),
        };
        let until = match &self.until {
            Some(until) => parse_temporal(until)?,
            None => {
                let days = jiff::Span::new().days(i64::from(config.default_window_days));
                from.with_civil(from.civil().checked_add(days)?)
            }
        };
        let limit = self.limit.unwrap_or(config.occurrence_limit);

        let series: Vec<ComponentId> = match &self.uid {
            Some(uid) => {
                let (id, _) = calendar
                    .find(uid)
                    .ok_or_else(|| format!("No series with UID {uid}"))?;
                vec![id]
            }
            None => calendar
                .components()
                .filter(|(_, c)| c.get_one(KW_RECURRENCE_ID).is_none())
                .filter(|(_, c)| c.temporal(KW_DTSTART).is_some())
                .map(|(id, _)| id)
                .collect(),
        };

        let mut rows = vec![];
        for id in series {
            let Some(start) = calendar.get(id).and_then(|c| c.temporal(KW_DTSTART)) else {
                continue;
            };
            let end = until.coerce_like(start);
            let occurrences = calendar
                .series(id, &from)?
                .take_while(|o| o.start < end)
                .take(limit);

            for occurrence in occurrences {
                let Some(component) = calendar.get(occurrence.component) else {
                    continue;
                };
                let text = |name: &str| {
                    component
                        .get_one(name)
                        .and_then(|p| p.value().as_text())
                        .map(str::to_string)
                };
                rows.push(OccurrenceRow {
                    sort_key: occurrence.start.clone(),
                    start: occurrence.start.to_string(),
                    kind: component.kind().to_string(),
                    uid: text(KW_UID).unwrap_or_default(),
                    summary: text(KW_SUMMARY),
                    recurrence_id: occurrence.recurrence_id.map(|rid| rid.to_string()),
                });
            }
        }
        // series of different kinds interleave by wall clock
        rows.sort_by(|a, b| a.sort_key.civil().cmp(&b.sort_key.civil()));
        Ok(rows)
    }
}

#[derive(Debug, Clone, serde::Serialize)]
struct OccurrenceRow {
    #[serde(skip)]
    sort_key: Temporal,
    start: String,
    kind: String,
    uid: String,
    summary: Option<String>,
    recurrence_id: Option<String>,
}

fn write_table(w: &mut impl io::Write, rows: &[OccurrenceRow]) -> io::Result<()> {
    let width_of = |f: fn(&OccurrenceRow) -> usize| rows.iter().map(f).max().unwrap_or(0);
    let start_width = width_of(|r| r.start.len());
    let uid_width = width_of(|r| r.uid.len());

    for row in rows {
        // moved occurrences stand out
        let color = match row.recurrence_id {
            Some(_) => Color::Yellow,
            None => Color::Cyan,
        };
        let start = format!("{:<start_width$}", row.start);
        let uid = format!("{:<uid_width$}", row.uid);
        writeln!(
            w,
            "{} {} {}",
            start.color(color),
            uid.dimmed(),
            row.summary.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}
