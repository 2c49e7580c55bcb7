// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{Calendar, Config};

/// Read and parse one `.ics` file.
///
/// # Errors
///
/// If the file cannot be read or does not hold exactly one valid calendar.
#[tracing::instrument(skip(config))]
pub async fn load_calendar(path: &Path, config: &Config) -> Result<Calendar, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read file {}: {e}", path.display()))?;

    let calendar = Calendar::parse_with_options(&content, &config.parse_options())?
        .with_uid_generator(config.uid_generator());
    tracing::debug!(components = calendar.len(), "loaded calendar");
    Ok(calendar)
}

/// Serialize a calendar and write it to `path`.
///
/// # Errors
///
/// If formatting or writing fails.
#[tracing::instrument(skip(calendar, config))]
pub async fn save_calendar(
    path: &Path,
    calendar: &Calendar,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let content = calendar
        .serialize_with(&config.format_options())
        .map_err(|e| format!("Failed to format calendar: {e}"))?;

    fs::write(path, content)
        .await
        .map_err(|e| format!("Failed to write calendar file {}: {e}", path.display()))?;
    Ok(())
}

/// Load every `.ics` file of a directory, in path order. Files that fail to
/// load are logged and skipped.
///
/// # Errors
///
/// If the directory cannot be read.
#[tracing::instrument(skip(config))]
pub async fn load_dir(
    dir: &Path,
    config: &Config,
) -> Result<Vec<(PathBuf, Calendar)>, Box<dyn Error>> {
    let mut reader = fs::read_dir(dir)
        .await
        .map_err(|e| format!("Failed to read directory: {e}"))?;

    // reading is concurrent; parsing stays here since calendars are not Send
    let mut handles = vec![];
    while let Some(entry) = reader.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "ics") {
            handles.push(tokio::spawn(async move {
                let content = fs::read_to_string(&path).await;
                (path, content)
            }));
        }
    }

    let mut calendars = Vec::with_capacity(handles.len());
    for handle in handles {
        let (path, content) = handle.await?;
        let parsed = content
            .map_err(Box::<dyn Error>::from)
            .and_then(|c| Ok(Calendar::parse_with_options(&c, &config.parse_options())?));
        match parsed {
            Ok(calendar) => calendars.push((path, calendar.with_uid_generator(config.uid_generator()))),
            Err(err) => tracing::error!(path = %path.display(), %err, "failed to load file"),
        }
    }
    calendars.sort_by(|a, b| a.0.cmp(&b.0));

    tracing::debug!(count = calendars.len(), "total .ics files loaded");
    Ok(calendars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Agendum//Test//EN\r
BEGIN:VEVENT\r
UID:test-event-single\r
DTSTAMP:20250115T120000Z\r
DTSTART:20250115T100000Z\r
DTEND:20250115T110000Z\r
SUMMARY:Single Event\r
END:VEVENT\r
END:VCALENDAR\r
";

    #[tokio::test]
    async fn load_and_save_round_trip() {
        // Arrange
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("event.ics");
        fs::write(&path, EVENT).await.expect("Failed to write test file");
        let config = Config::default();

        // Act
        let calendar = load_calendar(&path, &config).await.unwrap();
        let copy = temp_dir.path().join("copy.ics");
        save_calendar(&copy, &calendar, &config).await.unwrap();

        // Assert
        assert!(calendar.find("test-event-single").is_some());
        let written = fs::read_to_string(&copy).await.unwrap();
        assert_eq!(written, EVENT);
    }

    #[tokio::test]
    async fn load_dir_skips_other_and_corrupted_files() {
        // Arrange
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dir = temp_dir.path();
        fs::write(dir.join("b.ics"), EVENT).await.unwrap();
        fs::write(dir.join("a.ics"), EVENT.replace("test-event-single", "other"))
            .await
            .unwrap();
        fs::write(dir.join("corrupted.ics"), "INVALID CALENDAR CONTENT")
            .await
            .unwrap();
        fs::write(dir.join("notes.md"), "# Notes").await.unwrap();

        // Act
        let calendars = load_dir(dir, &Config::default()).await.unwrap();

        // Assert
        let names: Vec<_> = calendars
            .iter()
            .filter_map(|(p, _)| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["a.ics", "b.ics"]);
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let err = load_calendar(&temp_dir.path().join("missing.ics"), &Config::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
