use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use anyhow::{anyhow, Result};
use clap::{App, ArgMatches, load_yaml, value_t};
use crossbeam_channel::Receiver;
use env_logger::Builder;
use jemallocator::Jemalloc;
use libc::pid_t;
use log::{info, warn};
use log::LevelFilter::*;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag::register;
use tokio::runtime::Runtime;
use devports::args::{self, opt};
use devports::command::{Runner, System};
use devports::config::Config;
use devports::lifecycle::Controller;
use devports::scan::{diff, Event, Scanner, Snapshot};
use devports::sockets::Connection;

#[global_allocator]
static ALLOC: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let yaml = load_yaml!("args.yml");
    let ver  = env!("CARGO_PKG_VERSION");
    let args = App::from_yaml(&yaml).version(ver).get_matches();

    let (name, sub) = match args.subcommand() {
        (name, Some(sub)) => (name, sub),
        _                 => return Err(anyhow!("missing command")),
    };

    let (module, level) = match sub.occurrences_of("verbose") {
        0 => (Some(module_path!()), Info),
        1 => (Some(module_path!()), Debug),
        2 => (Some(module_path!()), Trace),
        _ => (None,                 Trace),
    };
    Builder::from_default_env().filter(module, level).init();

    let cfg = args::config(sub)?;

    info!("initializing devports {}", ver);

    let rt      = Runtime::new()?;
    let runner  = Arc::new(System) as Arc<dyn Runner>;
    let scanner = Scanner::new(runner.clone(), &cfg, rt.handle().clone());
    let refresh = Arc::new(scanner.clone());
    let control = Controller::new(runner, refresh, &cfg, rt.handle().clone());

    match name {
        "scan"    => scan(&scanner, sub),
        "watch"   => watch(&scanner, &cfg, sub),
        "kill"    => kill(&scanner, &control, sub),
        "restart" => restart(&scanner, &control, &cfg, sub),
        "open"    => open(&control, sub),
        _         => Err(anyhow!("unknown command '{}'", name)),
    }
}

fn scan(scanner: &Scanner, args: &ArgMatches) -> Result<()> {
    let snap = scanner.scan_now()?;
    print(&snap, args.is_present("json"))
}

fn watch(scanner: &Scanner, cfg: &Config, args: &ArgMatches) -> Result<()> {
    let json     = args.is_present("json");
    let interval = opt(args.value_of("interval"))?.map(Duration::from_secs);
    let interval = interval.or_else(|| cfg.refresh()).unwrap_or(Duration::from_secs(5));

    let shutdown = Arc::new(AtomicBool::new(false));
    register(SIGTERM, shutdown.clone())?;
    register(SIGINT,  shutdown.clone())?;

    let events = scanner.events();
    scanner.set_auto_refresh(Some(interval));
    scanner.scan();

    let timeout  = Duration::from_millis(100);
    let mut last = None::<Snapshot>;

    while !shutdown.load(Ordering::Acquire) {
        match events.recv_timeout(timeout) {
            Ok(Event::Scanned(snap)) => {
                let prev    = last.as_deref().map(Vec::as_slice).unwrap_or(&[]);
                let changes = diff(prev, &snap);

                for key in &changes.added {
                    info!("port {} opened by pid {}", key.0, key.1);
                }

                for key in &changes.removed {
                    info!("port {} closed by pid {}", key.0, key.1);
                }

                if last.is_none() || changes != Default::default() {
                    print(&snap, json)?;
                }

                last = Some(snap);
            }
            Ok(Event::Failed(e)) => warn!("scan failed: {}", e),
            Err(_)               => (),
        }
    }

    scanner.set_auto_refresh(None);

    Ok(())
}

fn kill(scanner: &Scanner, control: &Controller, args: &ArgMatches) -> Result<()> {
    let pid    = value_t!(args, "pid", pid_t)?;
    let events = scanner.events();

    drain(&events);
    control.terminate(pid)?;
    println!("killed {}", pid);

    let snap = next(&events, Duration::from_secs(30))?;
    print(&snap, false)
}

fn restart(scanner: &Scanner, control: &Controller, cfg: &Config, args: &ArgMatches) -> Result<()> {
    let port   = value_t!(args, "port", u16)?;
    let snap   = scanner.scan_now()?;
    let events = scanner.events();

    let conn = snap.iter().find(|c| c.port == port).ok_or_else(|| {
        anyhow!("nothing is listening on port {}", port)
    })?;

    drain(&events);
    control.restart(conn)?;

    let project = conn.project.as_ref().map(|p| p.name.as_str()).unwrap_or("?");
    println!("restarting {} on port {}", project, port);

    let snap = next(&events, cfg.settle() + Duration::from_secs(30))?;
    match snap.iter().find(|c| c.port == port) {
        Some(conn) => println!("port {} is back, pid {}", port, conn.pid),
        None       => println!("port {} is not bound yet", port),
    }

    Ok(())
}

fn open(control: &Controller, args: &ArgMatches) -> Result<()> {
    let path = value_t!(args, "path", String)?;
    Ok(control.open(Path::new(&path))?)
}

fn drain(events: &Receiver<Event>) {
    while events.try_recv().is_ok() {}
}

fn next(events: &Receiver<Event>, timeout: Duration) -> Result<Snapshot> {
    let deadline = Instant::now() + timeout;
    loop {
        let wait = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(wait)? {
            Event::Scanned(snap) => return Ok(snap),
            Event::Failed(e)     => return Err(anyhow!("scan failed: {}", e)),
        }
    }
}

fn print(conns: &[Connection], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(conns)?);
        return Ok(());
    }

    println!("{:<6} {:>7}  {:<16} {:<10} {:<12} {}", "PORT", "PID", "PROCESS", "USER", "TYPE", "PROJECT");

    for conn in conns {
        let (kind, project) = match &conn.project {
            Some(p) => {
                let traits = p.kind.traits();
                let path   = p.path.as_ref().map(|p| p.display().to_string()).unwrap_or_default();
                (format!("{} {}", traits.icon, traits.label), format!("{} {}", p.name, path))
            }
            None    => ("-".to_owned(), "-".to_owned()),
        };

        println!("{:<6} {:>7}  {:<16} {:<10} {:<12} {}",
                 conn.port, conn.pid, conn.name, conn.user, kind, project,
        );
    }

    Ok(())
}
