use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Serialize, Deserialize};
use crate::project::PortRule;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools:               Tools,
    pub listing:             Vec<String>,
    pub signal:              String,
    pub refresh_secs:        Option<u64>,
    pub release_ms:          u64,
    pub settle_ms:           u64,
    pub rules:               Vec<PortRule>,
    pub min_extension_files: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    pub lsof:   String,
    pub ps:     String,
    pub kill:   String,
    pub editor: String,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| {
            format!("reading config {}", path.display())
        })?;
        serde_json::from_slice(&data).with_context(|| {
            format!("parsing config {}", path.display())
        })
    }

    pub fn refresh(&self) -> Option<Duration> {
        self.refresh_secs.filter(|&n| n > 0).map(Duration::from_secs)
    }

    pub fn release(&self) -> Duration {
        Duration::from_millis(self.release_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        let listing = ["-iTCP", "-sTCP:LISTEN", "-P", "-n"];
        Self {
            tools:               Tools::default(),
            listing:             listing.iter().map(|s| s.to_string()).collect(),
            signal:              "-9".to_owned(),
            refresh_secs:        None,
            release_ms:          500,
            settle_ms:           3000,
            rules:               PortRule::defaults(),
            min_extension_files: 2,
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            lsof:   "lsof".to_owned(),
            ps:     "ps".to_owned(),
            kill:   "kill".to_owned(),
            editor: "code".to_owned(),
        }
    }
}
