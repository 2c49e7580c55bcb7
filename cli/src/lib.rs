// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end of Agendum.

mod arg;
mod cli;
mod cmd_check;
mod cmd_fmt;
mod cmd_generate_completion;
mod cmd_occurrences;
mod cmd_uid;
mod config;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_check::CmdCheck;
pub use crate::cmd_fmt::CmdFmt;
pub use crate::cmd_generate_completion::{CmdGenerateCompletion, Shell};
pub use crate::cmd_occurrences::CmdOccurrences;
pub use crate::cmd_uid::CmdUid;
pub use crate::config::parse_config;
pub use crate::util::OutputFormat;
