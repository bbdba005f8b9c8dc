use std::path::Path;
use std::str::FromStr;
use anyhow::Result;
use clap::ArgMatches;
use crate::config::Config;

pub fn opt<T: FromStr>(arg: Option<&str>) -> Result<Option<T>> {
    Ok(arg.map(|s| T::from_str(s).map_err(|_| {
        let msg  = format!("invalid argument value '{}'", s);
        let kind = clap::ErrorKind::InvalidValue;
        clap::Error::with_description(&msg, kind)
    })).transpose()?)
}

/// Loads the optional config file and applies command line overrides.
pub fn config(args: &ArgMatches) -> Result<Config> {
    let mut cfg = match args.value_of("config") {
        Some(path) => Config::load(Path::new(path))?,
        None       => Config::default(),
    };

    if let Some(editor) = args.value_of("editor") {
        cfg.tools.editor = editor.to_owned();
    }

    if let Some(settle) = opt(args.value_of("settle"))? {
        cfg.settle_ms = settle;
    }

    Ok(cfg)
}
