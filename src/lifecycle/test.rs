use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::sleep;
use std::time::Duration;
use anyhow::Result;
use tokio::runtime::Runtime;
use crate::Error;
use crate::command::System;
use crate::command::mock::Mock;
use crate::config::Config;
use crate::project::{Kind, Project};
use crate::scan::Refresh;
use crate::sockets::{Connection, Protocol, Status};
use super::{command, manager, Command, Controller};

#[derive(Default)]
struct Counter(AtomicUsize);

impl Refresh for Counter {
    fn refresh(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Counter {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn config() -> Config {
    Config {
        release_ms: 0,
        settle_ms:  20,
        ..Config::default()
    }
}

fn conn(project: Option<Project>) -> Connection {
    Connection {
        port:     3000,
        pid:      4242,
        name:     "node".to_owned(),
        command:  "node".to_owned(),
        user:     "alice".to_owned(),
        protocol: Protocol::TCP,
        status:   Status::Listening,
        project:  project,
    }
}

fn project(kind: Kind, path: Option<&Path>) -> Option<Project> {
    Some(Project {
        name: "shop".to_owned(),
        kind: kind,
        path: path.map(Path::to_path_buf),
    })
}

fn ok() -> Arc<Mock> {
    Arc::new(Mock::new(|_, _| Ok(String::new())))
}

#[test]
fn terminate_refreshes_once() -> Result<()> {
    let rt      = Runtime::new()?;
    let mock    = ok();
    let counter = Arc::new(Counter::default());
    let ctl     = Controller::new(mock.clone(), counter.clone(), &config(), rt.handle().clone());

    ctl.terminate(4242)?;

    let runs = mock.runs();
    assert_eq!(1,                runs.len());
    assert_eq!("kill",           runs[0].program);
    assert_eq!(vec!["-9", "4242"], runs[0].args);

    sleep(Duration::from_millis(100));
    assert_eq!(1, counter.count());

    Ok(())
}

#[test]
fn failed_terminate_does_not_refresh() -> Result<()> {
    let rt      = Runtime::new()?;
    let counter = Arc::new(Counter::default());
    let mock    = Arc::new(Mock::new(|program, _| {
        Err(Error::Exit(program.to_owned(), Some(1), "No such process".to_owned()))
    }));
    let ctl = Controller::new(mock, counter.clone(), &config(), rt.handle().clone());

    assert!(matches!(ctl.terminate(1), Err(Error::Exit(..))));
    assert_eq!(0, counter.count());

    Ok(())
}

#[test]
fn failing_kill_tool_reported() -> Result<()> {
    let rt      = Runtime::new()?;
    let counter = Arc::new(Counter::default());
    let mut cfg = config();
    cfg.tools.kill = "false".to_owned();

    let ctl = Controller::new(Arc::new(System), counter.clone(), &cfg, rt.handle().clone());
    assert!(matches!(ctl.terminate(4242), Err(Error::Exit(_, Some(1), _))));

    let dir = tempfile::tempdir()?;
    let result = ctl.restart(&conn(project(Kind::Go, Some(dir.path()))));
    assert!(matches!(result, Err(Error::Exit(..))));

    sleep(Duration::from_millis(60));
    assert_eq!(0, counter.count());

    Ok(())
}

#[test]
fn restart_without_project_kills_nothing() -> Result<()> {
    let rt      = Runtime::new()?;
    let mock    = ok();
    let counter = Arc::new(Counter::default());
    let ctl     = Controller::new(mock.clone(), counter.clone(), &config(), rt.handle().clone());

    assert_eq!(Err(Error::MissingProject(4242)), ctl.restart(&conn(None)));
    assert_eq!(Err(Error::MissingProject(4242)), ctl.restart(&conn(project(Kind::Go, None))));

    assert!(mock.runs().is_empty());
    assert!(mock.launches().is_empty());

    sleep(Duration::from_millis(60));
    assert_eq!(0, counter.count());

    Ok(())
}

#[test]
fn restart_unsupported_kills_nothing() -> Result<()> {
    let rt   = Runtime::new()?;
    let dir  = tempfile::tempdir()?;
    let mock = ok();
    let ctl  = Controller::new(mock.clone(), Arc::new(Counter::default()), &config(), rt.handle().clone());

    let result = ctl.restart(&conn(project(Kind::Python, Some(dir.path()))));
    assert_eq!(Err(Error::Unsupported(Kind::Python)), result);
    assert!(mock.runs().is_empty());

    Ok(())
}

#[test]
fn restart_node_project() -> Result<()> {
    let rt  = Runtime::new()?;
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("yarn.lock"), "")?;
    fs::write(dir.path().join("package.json"), r#"{"scripts": {"dev": "next dev"}}"#)?;

    let mock    = ok();
    let counter = Arc::new(Counter::default());
    let ctl     = Controller::new(mock.clone(), counter.clone(), &config(), rt.handle().clone());

    ctl.restart(&conn(project(Kind::NextJs, Some(dir.path()))))?;

    let runs = mock.runs();
    assert_eq!(1,                  runs.len());
    assert_eq!(vec!["-9", "4242"], runs[0].args);

    let launches = mock.launches();
    assert_eq!(1,                                  launches.len());
    assert_eq!("yarn",                             launches[0].program);
    assert_eq!(vec!["run", "dev"],                 launches[0].args);
    assert_eq!(Some(dir.path().to_path_buf()),     launches[0].cwd);

    assert_eq!(0, counter.count());
    sleep(Duration::from_millis(150));
    assert_eq!(1, counter.count());

    Ok(())
}

#[test]
fn restart_fixed_command() -> Result<()> {
    let rt   = Runtime::new()?;
    let dir  = tempfile::tempdir()?;
    let mock = ok();
    let ctl  = Controller::new(mock.clone(), Arc::new(Counter::default()), &config(), rt.handle().clone());

    ctl.restart(&conn(project(Kind::Django, Some(dir.path()))))?;

    let launch = &mock.launches()[0];
    assert_eq!("python3", launch.program);
    assert_eq!(vec!["manage.py", "runserver"], launch.args);

    Ok(())
}

#[test]
fn restart_launch_failure_still_rescans() -> Result<()> {
    let rt      = Runtime::new()?;
    let dir     = tempfile::tempdir()?;
    let mock    = Arc::new(Mock::new(|_, _| Ok(String::new())).fail_launch());
    let counter = Arc::new(Counter::default());
    let ctl     = Controller::new(mock.clone(), counter.clone(), &config(), rt.handle().clone());

    let result = ctl.restart(&conn(project(Kind::Go, Some(dir.path()))));
    assert!(matches!(result, Err(Error::Launch(..))));
    assert_eq!(1, mock.runs().len());
    assert_eq!(1, mock.launches().len());

    sleep(Duration::from_millis(150));
    assert_eq!(1, counter.count());

    Ok(())
}

#[test]
fn open_in_editor() -> Result<()> {
    let rt   = Runtime::new()?;
    let mock = ok();
    let ctl  = Controller::new(mock.clone(), Arc::new(Counter::default()), &config(), rt.handle().clone());

    ctl.open(Path::new("/srv/shop"))?;

    let launch = &mock.launches()[0];
    assert_eq!("code",            launch.program);
    assert_eq!(vec!["/srv/shop"], launch.args);
    assert_eq!(None,              launch.cwd);

    let failing = Arc::new(Mock::new(|_, _| Ok(String::new())).fail_launch());
    let ctl     = Controller::new(failing.clone(), Arc::new(Counter::default()), &config(), rt.handle().clone());
    assert!(ctl.open(Path::new("/srv/shop")).is_err());
    assert_eq!(1, failing.launches().len());

    Ok(())
}

#[test]
fn lockfile_selects_manager() -> Result<()> {
    let cases = [
        (Some("pnpm-lock.yaml"), "pnpm"),
        (Some("yarn.lock"),      "yarn"),
        (Some("bun.lockb"),      "bun"),
        (Some("package-lock.json"), "npm"),
        (None,                   "npm"),
    ];

    for (lock, pm) in &cases {
        let dir = tempfile::tempdir()?;
        if let Some(lock) = lock {
            fs::write(dir.path().join(lock), "")?;
        }
        assert_eq!(*pm, manager(dir.path()));
    }

    Ok(())
}

#[test]
fn start_script_choice() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let cmd = command(Kind::Angular, dir.path())?;
    assert_eq!(Command::new("npm", &["run", "dev"]), cmd);

    fs::write(dir.path().join("package.json"), r#"{"scripts": {"start": "ng serve"}}"#)?;
    let cmd = command(Kind::Angular, dir.path())?;
    assert_eq!(Command::new("npm", &["run", "start"]), cmd);

    fs::write(dir.path().join("package.json"), r#"{"scripts": {"start": "node .", "dev": "vite"}}"#)?;
    let cmd = command(Kind::Vue, dir.path())?;
    assert_eq!(Command::new("npm", &["run", "dev"]), cmd);

    Ok(())
}

#[test]
fn unsupported_kinds() {
    let dir = PathBuf::from("/tmp");
    for kind in &[Kind::Swift, Kind::Kotlin, Kind::Java, Kind::Php, Kind::Ruby, Kind::Unknown] {
        assert_eq!(Err(Error::Unsupported(*kind)), command(*kind, &dir));
    }
}
