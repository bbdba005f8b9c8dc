use std::fmt;
use serde::{Serialize, Deserialize};

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    NextJs,
    React,
    Vue,
    Angular,
    Swift,
    Kotlin,
    Flutter,
    Node,
    Python,
    Ruby,
    Rails,
    Go,
    Rust,
    DotNet,
    Java,
    Php,
    Laravel,
    Django,
    Unknown,
}

/// How a project of a given kind is brought back up after a restart.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Start {
    /// Run a package.json script through the package manager picked by
    /// lockfile.
    Script,
    Fixed(&'static str, &'static [&'static str]),
    None,
}

#[derive(Copy, Clone, Debug)]
pub struct Traits {
    pub label: &'static str,
    pub icon:  &'static str,
    pub color: &'static str,
    pub start: Start,
}

impl Kind {
    pub fn traits(self) -> Traits {
        let (label, icon, color, start) = match self {
            Kind::NextJs  => ("Next.js", "▲", "#000000", Start::Script),
            Kind::React   => ("React",   "⚛", "#61dafb", Start::Script),
            Kind::Vue     => ("Vue",     "V", "#42b883", Start::Script),
            Kind::Angular => ("Angular", "A", "#dd0031", Start::Script),
            Kind::Node    => ("Node",    "⬢", "#339933", Start::Script),
            Kind::Swift   => ("Swift",   "S", "#f05138", Start::None),
            Kind::Kotlin  => ("Kotlin",  "K", "#7f52ff", Start::None),
            Kind::Flutter => ("Flutter", "F", "#02569b", Start::None),
            Kind::Python  => ("Python",  "P", "#3776ab", Start::None),
            Kind::Ruby    => ("Ruby",    "R", "#cc342d", Start::None),
            Kind::Java    => ("Java",    "J", "#b07219", Start::None),
            Kind::Php     => ("PHP",     "P", "#777bb4", Start::None),
            Kind::Unknown => ("Unknown", "?", "#8e8e93", Start::None),
            Kind::Rails   => ("Rails",   "R", "#cc0000", Start::Fixed("bin/rails", &["server"])),
            Kind::Go      => ("Go",      "G", "#00add8", Start::Fixed("go",        &["run", "."])),
            Kind::Rust    => ("Rust",    "R", "#dea584", Start::Fixed("cargo",     &["run"])),
            Kind::DotNet  => (".NET",    "N", "#512bd4", Start::Fixed("dotnet",    &["run"])),
            Kind::Laravel => ("Laravel", "L", "#ff2d20", Start::Fixed("php",       &["artisan", "serve"])),
            Kind::Django  => ("Django",  "D", "#092e20", Start::Fixed("python3",   &["manage.py", "runserver"])),
        };
        Traits { label, icon, color, start }
    }

    pub fn is_node(self) -> bool {
        self.traits().start == Start::Script
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.traits().label)
    }
}
