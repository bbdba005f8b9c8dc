use libc::pid_t;
use serde::{Serialize, Deserialize};
use crate::project::Project;

/// One open endpoint as reported by the connection listing, enriched with
/// its owning process and, when classification succeeded, its project.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Connection {
    pub port:     u16,
    pub pid:      pid_t,
    pub name:     String,
    pub command:  String,
    pub user:     String,
    pub protocol: Protocol,
    pub status:   Status,
    pub project:  Option<Project>,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    TCP,
    UDP,
    Unknown,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Listening,
    Established,
    Other,
}

/// Cross-scan identity of a connection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Key(pub u16, pub pid_t);

impl Connection {
    pub fn key(&self) -> Key {
        Key(self.port, self.pid)
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Unknown
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Other
    }
}

pub use parse::{Parser, MIN_FIELDS};

mod parse;
