use std::collections::HashSet;
use std::sync::Arc;
use crate::sockets::{Connection, Key};

pub type Snapshot = Arc<Vec<Connection>>;

#[derive(Clone, Debug)]
pub enum Event {
    Scanned(Snapshot),
    Failed(String),
}

/// Anything that can be asked to re-enumerate connections soon.
pub trait Refresh: Send + Sync {
    fn refresh(&self);
}

#[derive(Debug, Default, Eq, PartialEq)]
pub struct Diff {
    pub added:   Vec<Key>,
    pub removed: Vec<Key>,
}

/// Keys present in only one of two snapshots, sorted.
pub fn diff(old: &[Connection], new: &[Connection]) -> Diff {
    let old = old.iter().map(Connection::key).collect::<HashSet<_>>();
    let new = new.iter().map(Connection::key).collect::<HashSet<_>>();

    let mut added   = new.difference(&old).copied().collect::<Vec<_>>();
    let mut removed = old.difference(&new).copied().collect::<Vec<_>>();
    added.sort();
    removed.sort();

    Diff { added, removed }
}

pub use scanner::Scanner;

mod scanner;
