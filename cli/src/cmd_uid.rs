// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io};

use agendum_core::Config;
use clap::{ArgMatches, Command, arg, value_parser};

/// Print freshly generated UIDs.
#[derive(Debug, Clone, Copy)]
pub struct CmdUid {
    pub count: usize,
}

impl CmdUid {
    pub const NAME: &str = "uid";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Generate UIDs following the configured policy")
            .arg(
                arg!(-n --count <N> "Number of UIDs to generate")
                    .value_parser(value_parser!(usize))
                    .default_value("1"),
            )
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            count: matches.get_one("count").copied().unwrap_or(1),
        }
    }

    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "generating uids...");
        self.generate(config, &mut io::stdout())?;
        Ok(())
    }

    pub fn generate(self, config: &Config, w: &mut impl io::Write) -> io::Result<()> {
        let mut generator = config.uid_generator();
        for _ in 0..self.count {
            writeln!(w, "{}", generator.generate())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendum_core::UidPolicy;

    #[test]
    fn test_parse_uid() {
        let cmd = Command::new("test").subcommand(CmdUid::command());
        let matches = cmd.try_get_matches_from(["test", "uid", "-n", "3"]).unwrap();
        let parsed = CmdUid::from(matches.subcommand_matches(CmdUid::NAME).unwrap());
        assert_eq!(parsed.count, 3);

        let cmd = Command::new("test").subcommand(CmdUid::command());
        let matches = cmd.try_get_matches_from(["test", "uid"]).unwrap();
        let parsed = CmdUid::from(matches.subcommand_matches(CmdUid::NAME).unwrap());
        assert_eq!(parsed.count, 1);
    }

    #[test]
    fn generates_distinct_uids() {
        let config = Config {
            uid_domain: "@example.com".to_string(),
            ..Config::default()
        };
        let mut out = vec![];
        CmdUid { count: 3 }.generate(&config, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        let uids: Vec<_> = out.lines().collect();
        assert_eq!(uids.len(), 3);
        assert!(uids.iter().all(|u| u.ends_with("@example.com")));
        assert!(uids[0] != uids[1] && uids[1] != uids[2]);
    }

    #[test]
    fn uuid_policy_yields_uuids() {
        let config = Config {
            uid_policy: UidPolicy::Uuid,
            ..Config::default()
        };
        let mut out = vec![];
        CmdUid { count: 1 }.generate(&config, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.trim().len(), 36);
    }
}
