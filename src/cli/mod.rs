//! Subcommand implementations. Each `run` prints its own results and
//! returns an error when the command should exit non-zero.

pub mod analyze;
pub mod init;
pub mod package;
pub mod validate;
