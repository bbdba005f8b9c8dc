use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use log::{debug, trace, warn};
use crate::Error;
use super::Runner;

pub struct System;

impl Runner for System {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        let (status, stdout, stderr) = exec(program, args)?;
        match status.success() {
            true  => Ok(stdout),
            false => Err(Error::Exit(program.to_owned(), status.code(), stderr)),
        }
    }

    fn query(&self, program: &str, args: &[&str]) -> Result<String, Error> {
        let (status, stdout, stderr) = exec(program, args)?;
        match status.code() {
            _ if status.success()               => Ok(stdout),
            Some(_) if !stdout.is_empty()       => Ok(stdout),
            Some(_) if stderr.trim().is_empty() => Ok(stdout),
            code                                => {
                Err(Error::Exit(program.to_owned(), code, stderr))
            }
        }
    }

    fn launch(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<(), Error> {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            Error::Launch(program.to_owned(), e.to_string())
        })?;

        let name = program.to_owned();
        let pid  = child.id();

        debug!("launched {} as pid {}", name, pid);

        thread::spawn(move || match child.wait() {
            Ok(status) => debug!("{} ({}) exited: {}", name, pid, status),
            Err(e)     => warn!("{} ({}) wait failed: {}", name, pid, e),
        });

        Ok(())
    }
}

fn exec(program: &str, args: &[&str]) -> Result<(ExitStatus, String, String), Error> {
    trace!("running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Error::Launch(program.to_owned(), e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    Ok((output.status, stdout, stderr))
}
