use std::path::PathBuf;
use libc::pid_t;
use serde::{Serialize, Deserialize};

/// What the process table and the open-files tool could tell us about a
/// pid. Either lookup may fail independently.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Process {
    pub pid:  pid_t,
    pub name: Option<String>,
    pub cwd:  Option<PathBuf>,
}

pub use cache::Cache;
pub use lookup::{parse_cwd, parse_name, Resolver};

mod cache;
mod lookup;
