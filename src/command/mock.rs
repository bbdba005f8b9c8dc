use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use crate::Error;
use super::Runner;

type Reply = Box<dyn Fn(&str, &[&str]) -> Result<String, Error> + Send + Sync>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Call {
    pub program: String,
    pub args:    Vec<String>,
    pub cwd:     Option<PathBuf>,
}

/// Records every invocation and answers `run` and `query` from a closure.
/// Launches always succeed unless `fail_launch` is set.
pub struct Mock {
    reply:    Reply,
    runs:     Mutex<Vec<Call>>,
    launches: Mutex<Vec<Call>>,
    fail:     bool,
}

impl Mock {
    pub fn new<F>(reply: F) -> Self
    where
        F: Fn(&str, &[&str]) -> Result<String, Error> + Send + Sync + 'static,
    {
        Self {
            reply:    Box::new(reply),
            runs:     Mutex::new(Vec::new()),
            launches: Mutex::new(Vec::new()),
            fail:     false,
        }
    }

    pub fn fail_launch(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn runs(&self) -> Vec<Call> {
        self.runs.lock().clone()
    }

    pub fn launches(&self) -> Vec<Call> {
        self.launches.lock().clone()
    }

    pub fn count(&self, program: &str, first: &str) -> usize {
        self.runs.lock().iter().filter(|c| {
            c.program == program && c.args.first().map(String::as_str) == Some(first)
        }).count()
    }
}

impl Runner for Mock {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        self.runs.lock().push(call(program, args, None));
        (self.reply)(program, args)
    }

    fn query(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        self.run(program, args)
    }

    fn launch(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), Error> {
        self.launches.lock().push(call(program, args, cwd));
        match self.fail {
            true  => Err(Error::Launch(program.to_owned(), "mock".to_owned())),
            false => Ok(()),
        }
    }
}

fn call(program: &str, args: &[&str], cwd: Option<&Path>) -> Call {
    Call {
        program: program.to_owned(),
        args:    args.iter().map(|s| s.to_string()).collect(),
        cwd:     cwd.map(Path::to_path_buf),
    }
}
