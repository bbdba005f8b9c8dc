use std::path::PathBuf;
use serde::{Serialize, Deserialize, Deserializer};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Project {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Kind,
    pub path: Option<PathBuf>,
}

/// A weak prior: a process whose name contains `needle` and which is bound
/// to a port in `low..=high` is tentatively a `kind` project.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct PortRule {
    pub low:    u16,
    pub high:   u16,
    #[serde(deserialize_with = "lowercase")]
    pub needle: String,
    pub kind:   Kind,
}

impl PortRule {
    pub fn new(low: u16, high: u16, needle: &str, kind: Kind) -> Self {
        Self {
            low:    low,
            high:   high,
            needle: needle.to_ascii_lowercase(),
            kind:   kind,
        }
    }

    pub fn matches(&self, port: u16, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        (self.low..=self.high).contains(&port) && name.contains(&self.needle)
    }

    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(3000, 3999, "node",   Kind::React),
            Self::new(4000, 4999, "next",   Kind::NextJs),
            Self::new(4200, 4200, "node",   Kind::Angular),
            Self::new(5173, 5174, "node",   Kind::Vue),
            Self::new(8000, 8999, "python", Kind::Django),
        ]
    }
}

// needles are stored lowercase so matching only folds the process name
fn lowercase<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(String::deserialize(de)?.to_ascii_lowercase())
}

pub use classify::Classifier;
pub use kind::{Kind, Start, Traits};

mod classify;
mod kind;
