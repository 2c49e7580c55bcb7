// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use agendum_core::APP_NAME;
use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use crate::cmd_check::CmdCheck;
use crate::cmd_fmt::CmdFmt;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_occurrences::CmdOccurrences;
use crate::cmd_uid::CmdUid;
use crate::config::parse_config;

/// Run the Agendum command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    match Cli::parse() {
        Ok(cli) => {
            init_tracing(cli.verbose);
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    }
    Ok(())
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    if let Err(e) = result {
        eprintln!("{} failed to initialize logging: {e}", "Warning:".yellow());
    }
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// Log debug messages
    pub verbose: bool,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Check, format and expand iCalendar files.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $AGENDUM_CONFIG, then \
$XDG_CONFIG_HOME/agendum/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/agendum/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath)
                    .global(true),
            )
            .arg(arg!(-v --verbose "Log debug messages to stderr").global(true))
            .subcommand(CmdCheck::command())
            .subcommand(CmdFmt::command())
            .subcommand(CmdOccurrences::command())
            .subcommand(CmdUid::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdCheck::NAME, matches)) => Check(CmdCheck::from(matches)),
            Some((CmdFmt::NAME, matches)) => Fmt(CmdFmt::from(matches)),
            Some((CmdOccurrences::NAME, matches)) => Occurrences(CmdOccurrences::from(matches)),
            Some((CmdUid::NAME, matches)) => Uid(CmdUid::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches))
            }
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
            None => return Err("No command given".into()),
        };

        let config = matches.get_one("config").cloned();
        let verbose = matches.get_flag("verbose");
        Ok(Cli {
            config,
            verbose,
            command,
        })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Parse a calendar file and report problems
    Check(CmdCheck),

    /// Re-serialize a calendar file
    Fmt(CmdFmt),

    /// List occurrences of recurring components
    Occurrences(CmdOccurrences),

    /// Generate UIDs
    Uid(CmdUid),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        if let GenerateCompletion(a) = self {
            return a.run();
        }

        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        match self {
            Check(a) => a.run(&config).await,
            Fmt(a) => a.run(&config).await,
            Occurrences(a) => a.run(&config).await,
            Uid(a) => a.run(&config),
            GenerateCompletion(a) => a.run(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_generate_completion::Shell;
    use crate::util::OutputFormat;

    #[test]
    fn test_parse_config() {
        let cli = Cli::try_parse_from(vec!["test", "-c", "/tmp/config.toml", "uid"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Uid(_)));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = vec!["test", "check", "a.ics", "-v", "--config", "/tmp/config.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(matches!(cli.command, Commands::Check(_)));
    }

    #[test]
    fn test_parse_requires_command() {
        assert!(Cli::try_parse_from(vec!["test"]).is_err());
        assert!(Cli::try_parse_from(vec!["test", "unknown"]).is_err());
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(vec!["test", "check", "a.ics"]).unwrap();
        match cli.command {
            Commands::Check(cmd) => assert_eq!(cmd.file, PathBuf::from("a.ics")),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_parse_fmt() {
        let cli = Cli::try_parse_from(vec!["test", "fmt", "a.ics", "--fold", "60"]).unwrap();
        match cli.command {
            Commands::Fmt(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("a.ics"));
                assert_eq!(cmd.fold, Some(60));
            }
            _ => panic!("Expected Fmt command"),
        }
    }

    #[test]
    fn test_parse_occurrences() {
        let args = vec!["test", "occurrences", "a.ics", "--output-format", "json"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Occurrences(cmd) => {
                assert_eq!(cmd.output_format, OutputFormat::Json);
            }
            _ => panic!("Expected Occurrences command"),
        }
    }

    #[test]
    fn test_parse_uid() {
        let cli = Cli::try_parse_from(vec!["test", "uid", "--count", "5"]).unwrap();
        match cli.command {
            Commands::Uid(cmd) => assert_eq!(cmd.count, 5),
            _ => panic!("Expected Uid command"),
        }
    }

    #[test]
    fn test_parse_generate_completions() {
        let args = vec!["test", "generate-completion", "zsh"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::GenerateCompletion(cmd) => {
                assert_eq!(cmd.shell, Shell::Zsh);
            }
            _ => panic!("Expected GenerateCompletion command"),
        }
    }
}
