use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use libc::pid_t;
use log::{log_enabled, trace};
use log::Level::Trace;
use super::{Process, Resolver};

/// Memoizes lookups for the duration of one scan so a process holding
/// several sockets is only resolved once.
pub struct Cache<'r> {
    resolver: &'r Resolver,
    procs:    HashMap<pid_t, Arc<Process>>,
}

impl<'r> Cache<'r> {
    pub fn new(resolver: &'r Resolver) -> Self {
        Self {
            resolver: resolver,
            procs:    HashMap::new(),
        }
    }

    pub fn get(&mut self, pid: pid_t) -> Arc<Process> {
        let resolver = self.resolver;
        match self.procs.entry(pid) {
            Entry::Occupied(e) => e.get().clone(),
            Entry::Vacant(e)   => e.insert(load(resolver, pid)).clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

fn load(resolver: &Resolver, pid: pid_t) -> Arc<Process> {
    let proc = resolver.lookup(pid);

    if log_enabled!(Trace) {
        let name = proc.name.as_deref().unwrap_or("??");
        let cwd  = proc.cwd.as_ref().map(|p| p.display().to_string());
        trace!("pid {} is '{}' in {}", pid, name, cwd.as_deref().unwrap_or("??"));
    }

    Arc::new(proc)
}
