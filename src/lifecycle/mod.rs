use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use libc::pid_t;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::time::sleep;
use crate::Error;
use crate::command::Runner;
use crate::config::Config;
use crate::scan::Refresh;
use crate::sockets::Connection;

/// Terminates and restarts the processes behind scanned connections and
/// asks for a rescan once the process table has had time to change.
pub struct Controller {
    runner:  Arc<dyn Runner>,
    refresh: Arc<dyn Refresh>,
    handle:  Handle,
    kill:    String,
    signal:  String,
    editor:  String,
    release: Duration,
    settle:  Duration,
}

impl Controller {
    pub fn new(runner: Arc<dyn Runner>, refresh: Arc<dyn Refresh>, cfg: &Config, handle: Handle) -> Self {
        Self {
            runner:  runner,
            refresh: refresh,
            handle:  handle,
            kill:    cfg.tools.kill.clone(),
            signal:  cfg.signal.clone(),
            editor:  cfg.tools.editor.clone(),
            release: cfg.release(),
            settle:  cfg.settle(),
        }
    }

    pub fn terminate(&self, pid: pid_t) -> Result<(), Error> {
        self.kill(pid)?;
        self.refresh.refresh();
        Ok(())
    }

    /// Kills the process behind `conn` and relaunches its project. Nothing
    /// is killed unless a start command can be determined first.
    pub fn restart(&self, conn: &Connection) -> Result<(), Error> {
        let missing = || Error::MissingProject(conn.pid);
        let project = conn.project.as_ref().ok_or_else(missing)?;
        let path    = project.path.as_deref().ok_or_else(missing)?;
        let start   = start::command(project.kind, path)?;

        info!("restarting {} ({}) on port {}", project.name, project.kind, conn.port);

        self.kill(conn.pid)?;

        if self.release > Duration::from_secs(0) {
            thread::sleep(self.release);
        }

        // rescan even if the relaunch below fails
        self.schedule(self.settle);

        self.runner.launch(&start.program, &start.args(), Some(path))?;
        debug!("started {} {} in {}", start.program, start.args.join(" "), path.display());

        Ok(())
    }

    pub fn open(&self, path: &Path) -> Result<(), Error> {
        let path = path.to_string_lossy().into_owned();
        self.runner.launch(&self.editor, &[path.as_str()], None).map_err(|e| {
            warn!("failed to open {} in {}: {}", path, self.editor, e);
            e
        })
    }

    fn kill(&self, pid: pid_t) -> Result<(), Error> {
        let pid = pid.to_string();
        self.runner.run(&self.kill, &[self.signal.as_str(), pid.as_str()])?;
        info!("killed pid {}", pid);
        Ok(())
    }

    fn schedule(&self, delay: Duration) {
        let refresh = self.refresh.clone();
        self.handle.spawn(async move {
            sleep(delay).await;
            refresh.refresh();
        });
    }
}

pub use start::{command, manager, Command};

mod start;

#[cfg(test)]
mod test;
