use std::collections::HashMap;
use std::fs;
use std::path::Path;
use log::debug;
use serde::Deserialize;
use crate::Error;
use crate::project::{Kind, Start};

const LOCKFILES: &[(&str, &str)] = &[
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock",      "yarn"),
    ("bun.lockb",      "bun"),
];

const DEFAULT_MANAGER: &str = "npm";

/// A concrete command line to bring a project back up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    pub program: String,
    pub args:    Vec<String>,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    scripts: HashMap<String, String>,
}

impl Command {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_owned(),
            args:    args.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn args(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }
}

pub fn command(kind: Kind, dir: &Path) -> Result<Command, Error> {
    match kind.traits().start {
        Start::Script             => Ok(Command::new(manager(dir), &["run", script(dir)])),
        Start::Fixed(prog, args)  => Ok(Command::new(prog, args)),
        Start::None               => Err(Error::Unsupported(kind)),
    }
}

pub fn manager(dir: &Path) -> &'static str {
    LOCKFILES.iter().find(|(lock, _)| {
        dir.join(lock).is_file()
    }).map(|(_, pm)| *pm).unwrap_or(DEFAULT_MANAGER)
}

// `start` only when the manifest declares it without `dev`.
fn script(dir: &Path) -> &'static str {
    let path = dir.join("package.json");
    let manifest = fs::read(&path).ok().and_then(|data| {
        serde_json::from_slice::<Manifest>(&data).map_err(|e| {
            debug!("invalid manifest {}: {}", path.display(), e);
        }).ok()
    });

    match manifest {
        Some(m) if !m.scripts.contains_key("dev") && m.scripts.contains_key("start") => "start",
        _                                                                          => "dev",
    }
}
