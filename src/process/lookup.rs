use std::path::{Path, PathBuf};
use std::sync::Arc;
use libc::pid_t;
use log::debug;
use crate::command::Runner;
use crate::config::Tools;
use super::Process;

pub struct Resolver {
    runner: Arc<dyn Runner>,
    tools:  Tools,
}

impl Resolver {
    pub fn new(runner: Arc<dyn Runner>, tools: Tools) -> Self {
        Self { runner, tools }
    }

    pub fn lookup(&self, pid: pid_t) -> Process {
        Process {
            pid:  pid,
            name: self.name(pid),
            cwd:  self.cwd(pid),
        }
    }

    pub fn name(&self, pid: pid_t) -> Option<String> {
        let pid = pid.to_string();
        let out = self.runner.run(&self.tools.ps, &["-p", &pid, "-o", "comm="]).map_err(|e| {
            debug!("name lookup for {} failed: {}", pid, e);
        }).ok()?;
        parse_name(&out)
    }

    pub fn cwd(&self, pid: pid_t) -> Option<PathBuf> {
        let pid = pid.to_string();
        let out = self.runner.query(&self.tools.lsof, &["-a", "-p", &pid, "-d", "cwd", "-Fn"]).map_err(|e| {
            debug!("cwd lookup for {} failed: {}", pid, e);
        }).ok()?;
        parse_cwd(&out)
    }
}

/// `ps -o comm=` may print the full executable path; keep the file name.
pub fn parse_name(out: &str) -> Option<String> {
    let line = out.lines().map(str::trim).find(|l| !l.is_empty())?;
    let name = Path::new(line).file_name().and_then(|n| n.to_str()).unwrap_or(line);
    Some(name.to_owned())
}

/// `lsof -F` emits one field per line prefixed with its identifier; the
/// `n` field carries the file name, here the working directory.
pub fn parse_cwd(out: &str) -> Option<PathBuf> {
    out.lines().find_map(|line| {
        let path = line.strip_prefix('n')?.trim();
        match path.is_empty() {
            true  => None,
            false => Some(PathBuf::from(path)),
        }
    })
}
