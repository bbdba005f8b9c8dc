use std::fmt;
use libc::pid_t;
use crate::project::Kind;

#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    Launch(String, String),
    Exit(String, Option<i32>, String),
    Busy,
    MissingProject(pid_t),
    Unsupported(Kind),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Launch(cmd, e)          => write!(f, "failed to launch {}: {}", cmd, e),
            Error::Exit(cmd, Some(n), err) => write!(f, "{} exited with {}: {}", cmd, n, err.trim()),
            Error::Exit(cmd, None, err)    => write!(f, "{} killed by signal: {}", cmd, err.trim()),
            Error::Busy                    => write!(f, "scan already in progress"),
            Error::MissingProject(pid)     => write!(f, "no project context for pid {}", pid),
            Error::Unsupported(kind)       => write!(f, "no start command for {} projects", kind),
        }
    }
}
