use std::path::Path;
use crate::Error;

/// Invokes external tools. `run` captures stdout of a command that is
/// expected to exit successfully; `launch` starts a detached process and
/// returns as soon as it has been spawned.
pub trait Runner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, Error>;

    /// Like `run`, for listing tools such as lsof that exit 1 when nothing
    /// matched or some entries were unreadable. A non-zero exit is accepted
    /// when it produced stdout or left stderr blank.
    fn query(&self, program: &str, args: &[&str]) -> Result<String, Error>;

    fn launch(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), Error>;
}

pub use system::System;

mod system;

#[cfg(test)]
pub mod mock;
