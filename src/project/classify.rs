use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use log::{debug, trace};
use serde::Deserialize;
use super::{Kind, PortRule, Project};

const NODE_DEPS: &[(&str, Kind)] = &[
    ("next",          Kind::NextJs),
    ("react",         Kind::React),
    ("vue",           Kind::Vue),
    ("@angular/core", Kind::Angular),
];

const PYTHON: &[&str] = &["requirements.txt", "pyproject.toml", "Pipfile", "setup.py"];

const EXTENSIONS: &[(&str, Kind)] = &[
    ("swift", Kind::Swift),
    ("kt",    Kind::Kotlin),
    ("dart",  Kind::Flutter),
    ("py",    Kind::Python),
    ("rb",    Kind::Ruby),
    ("go",    Kind::Go),
    ("rs",    Kind::Rust),
    ("cs",    Kind::DotNet),
    ("java",  Kind::Java),
    ("php",   Kind::Php),
    ("js",    Kind::Node),
    ("mjs",   Kind::Node),
    ("cjs",   Kind::Node),
    ("ts",    Kind::Node),
];

/// Layered project detection over a process's working directory: manifest,
/// then marker files, then dominant source extension, then the port prior.
pub struct Classifier {
    rules:   Vec<PortRule>,
    min_ext: usize,
}

#[derive(Debug)]
struct Guess {
    kind: Kind,
    name: Option<String>,
}

#[derive(Deserialize)]
struct Manifest {
    name:         Option<String>,
    #[serde(default)]
    dependencies: HashMap<String, serde_json::Value>,
}

impl Classifier {
    pub fn new(rules: Vec<PortRule>, min_ext: usize) -> Self {
        Self {
            rules:   rules,
            min_ext: min_ext.max(1),
        }
    }

    pub fn classify(&self, port: u16, name: &str, cwd: Option<&Path>) -> Option<Project> {
        let cwd   = cwd?;
        let prior = self.prior(port, name);

        let entries = match entries(cwd) {
            Ok(entries) => entries,
            Err(e)      => {
                debug!("unable to read {}: {}", cwd.display(), e);
                return None;
            }
        };

        let guess = manifest(cwd, &entries)
            .or_else(|| marker(cwd, &entries))
            .or_else(|| self.extension(&entries))
            .or_else(|| prior.map(|kind| Guess { kind, name: None }));

        let Guess { kind, name } = match guess {
            Some(guess) => guess,
            None        => {
                debug!("no project in {}", cwd.display());
                return None;
            }
        };

        trace!("{} is a {} project", cwd.display(), kind);

        Some(Project {
            name: name.unwrap_or_else(|| basename(cwd, kind)),
            kind: kind,
            path: Some(cwd.to_path_buf()),
        })
    }

    fn prior(&self, port: u16, name: &str) -> Option<Kind> {
        self.rules.iter().find(|r| r.matches(port, name)).map(|r| r.kind)
    }

    fn extension(&self, entries: &HashSet<String>) -> Option<Guess> {
        let mut counts = HashMap::new();

        for entry in entries {
            let ext = match Path::new(entry).extension().and_then(|e| e.to_str()) {
                Some(ext) => ext,
                None      => continue,
            };
            if let Some((_, kind)) = EXTENSIONS.iter().find(|(e, _)| *e == ext) {
                *counts.entry(*kind).or_insert(0usize) += 1;
            }
        }

        let max = counts.values().copied().max()?;
        let top = counts.iter().filter(|(_, n)| **n == max).collect::<Vec<_>>();

        match top.as_slice() {
            [(kind, n)] if **n >= self.min_ext => Some(Guess { kind: **kind, name: None }),
            _                                  => None,
        }
    }
}

fn entries(dir: &Path) -> io::Result<HashSet<String>> {
    Ok(fs::read_dir(dir)?.filter_map(|entry| {
        entry.ok()?.file_name().into_string().ok()
    }).collect())
}

fn manifest(dir: &Path, entries: &HashSet<String>) -> Option<Guess> {
    if !entries.contains("package.json") {
        return None;
    }

    let path = dir.join("package.json");
    let data = fs::read(&path).map_err(|e| {
        debug!("unable to read {}: {}", path.display(), e);
    }).ok()?;

    let manifest = serde_json::from_slice::<Manifest>(&data).map_err(|e| {
        debug!("invalid manifest {}: {}", path.display(), e);
    }).ok()?;

    let deps = &manifest.dependencies;
    let kind = NODE_DEPS.iter().find(|(dep, _)| {
        deps.contains_key(*dep)
    }).map(|(_, kind)| *kind).unwrap_or(Kind::Node);

    let name = manifest.name.filter(|name| !name.trim().is_empty());

    Some(Guess { kind, name })
}

fn marker(dir: &Path, entries: &HashSet<String>) -> Option<Guess> {
    let has  = |name: &str| entries.contains(name);
    let kind = |kind: Kind| Some(Guess { kind, name: None });

    if PYTHON.iter().any(|m| has(*m)) {
        return match has("manage.py") {
            true  => kind(Kind::Django),
            false => kind(Kind::Python),
        };
    }

    if has("Gemfile") {
        return match dir.join("config").join("routes.rb").is_file() {
            true  => kind(Kind::Rails),
            false => kind(Kind::Ruby),
        };
    }

    if has("go.mod") {
        let name = module(&dir.join("go.mod"));
        return Some(Guess { kind: Kind::Go, name });
    }

    if has("Cargo.toml") {
        return kind(Kind::Rust);
    }

    if has("pubspec.yaml") {
        return kind(Kind::Flutter);
    }

    if has("composer.json") {
        return match has("artisan") {
            true  => kind(Kind::Laravel),
            false => kind(Kind::Php),
        };
    }

    if has("build.gradle.kts") {
        return kind(Kind::Kotlin);
    }

    if has("pom.xml") || has("build.gradle") {
        return kind(Kind::Java);
    }

    if has("Package.swift") {
        return kind(Kind::Swift);
    }

    let dotnet = [".csproj", ".fsproj", ".sln"];
    if entries.iter().any(|e| dotnet.iter().any(|ext| e.ends_with(ext))) {
        return kind(Kind::DotNet);
    }

    None
}

// last path segment of the `module` directive
fn module(path: &Path) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    text.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        let name = rest.trim().trim_matches('"').rsplit('/').next()?;
        match name.is_empty() {
            true  => None,
            false => Some(name.to_owned()),
        }
    })
}

fn basename(dir: &Path, kind: Kind) -> String {
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_owned(),
        None       => format!("{} project", kind),
    }
}
