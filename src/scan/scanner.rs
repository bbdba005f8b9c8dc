use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use crate::Error;
use crate::command::Runner;
use crate::config::Config;
use crate::process::{Cache, Resolver};
use crate::project::Classifier;
use crate::sockets::{Connection, Parser};
use super::{Event, Refresh, Snapshot};

/// Drives scan cycles: list connections, resolve their processes, classify
/// their projects and publish the result as one immutable snapshot. At most
/// one cycle runs at a time; triggers arriving meanwhile are dropped.
#[derive(Clone)]
pub struct Scanner {
    inner: Arc<Inner>,
}

struct Inner {
    runner:   Arc<dyn Runner>,
    resolver: Resolver,
    classify: Classifier,
    parser:   Parser,
    lsof:     String,
    listing:  Vec<String>,
    handle:   Handle,
    running:  AtomicBool,
    current:  Mutex<Snapshot>,
    timer:    Mutex<Option<JoinHandle<()>>>,
    tx:       Sender<Event>,
    rx:       Receiver<Event>,
}

// Clears the in-flight flag when the cycle ends, even by unwinding.
struct Running(Arc<Inner>);

impl Scanner {
    pub fn new(runner: Arc<dyn Runner>, cfg: &Config, handle: Handle) -> Self {
        let (tx, rx) = bounded(64);

        let resolver = Resolver::new(runner.clone(), cfg.tools.clone());
        let classify = Classifier::new(cfg.rules.clone(), cfg.min_extension_files);

        Self {
            inner: Arc::new(Inner {
                runner:   runner,
                resolver: resolver,
                classify: classify,
                parser:   Parser::new(),
                lsof:     cfg.tools.lsof.clone(),
                listing:  cfg.listing.clone(),
                handle:   handle,
                running:  AtomicBool::new(false),
                current:  Mutex::new(Arc::new(Vec::new())),
                timer:    Mutex::new(None),
                tx:       tx,
                rx:       rx,
            }),
        }
    }

    /// Starts a scan in the background unless one is already running.
    /// Returns whether a scan was started.
    pub fn scan(&self) -> bool {
        let running = match acquire(&self.inner) {
            Some(running) => running,
            None          => {
                debug!("scan already in progress");
                return false;
            }
        };

        self.inner.handle.spawn_blocking(move || match running.0.cycle() {
            Ok(snap) => debug!("scan finished: {} connections", snap.len()),
            Err(e)   => debug!("scan failed: {}", e),
        });

        true
    }

    /// Runs a scan on the calling thread. Must not be called from within
    /// the runtime's async context.
    pub fn scan_now(&self) -> Result<Snapshot, Error> {
        let running = acquire(&self.inner).ok_or(Error::Busy)?;
        running.0.cycle()
    }

    pub fn set_auto_refresh(&self, period: Option<Duration>) {
        let mut timer = self.inner.timer.lock();

        if let Some(task) = timer.take() {
            task.abort();
            debug!("auto refresh stopped");
        }

        let period = match period {
            Some(period) if period > Duration::from_secs(0) => period,
            _                                                => return,
        };

        let inner = Arc::downgrade(&self.inner);
        *timer = Some(self.inner.handle.spawn(tick(inner, period)));

        info!("auto refresh every {:?}", period);
    }

    pub fn current(&self) -> Snapshot {
        self.inner.current.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub fn events(&self) -> Receiver<Event> {
        self.inner.rx.clone()
    }

    pub fn recv(&self) -> Option<Event> {
        self.inner.rx.try_recv().ok()
    }
}

impl Refresh for Scanner {
    fn refresh(&self) {
        self.scan();
    }
}

impl Inner {
    fn cycle(&self) -> Result<Snapshot, Error> {
        let args = self.listing.iter().map(String::as_str).collect::<Vec<_>>();

        let text = match self.runner.query(&self.lsof, &args) {
            Ok(text) => text,
            Err(e)   => {
                warn!("connection listing failed: {}", e);
                self.publish(Event::Failed(e.to_string()));
                return Err(e);
            }
        };

        let conns     = self.parser.parse(&text);
        let mut cache = Cache::new(&self.resolver);

        let records = conns.into_iter().map(|conn| {
            self.enrich(conn, &mut cache)
        }).collect::<Vec<_>>();

        debug!("resolved {} connections across {} processes", records.len(), cache.len());

        let snap = Arc::new(records);
        *self.current.lock() = snap.clone();
        self.publish(Event::Scanned(snap.clone()));

        Ok(snap)
    }

    fn enrich(&self, conn: Connection, cache: &mut Cache<'_>) -> Connection {
        let proc    = cache.get(conn.pid);
        let name    = proc.name.clone().unwrap_or_else(|| conn.command.clone());
        let project = self.classify.classify(conn.port, &name, proc.cwd.as_deref());
        Connection { name, project, ..conn }
    }

    fn publish(&self, event: Event) {
        match self.tx.try_send(event) {
            Ok(())                             => (),
            Err(TrySendError::Disconnected(_)) => (),
            Err(TrySendError::Full(event))     => {
                debug!("event queue full, dropping oldest event");
                let _ = self.rx.try_recv();
                let _ = self.tx.try_send(event);
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(task) = self.timer.get_mut().take() {
            task.abort();
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
    }
}

fn acquire(inner: &Arc<Inner>) -> Option<Running> {
    let flag = &inner.running;
    match flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_)  => Some(Running(inner.clone())),
        Err(_) => None,
    }
}

async fn tick(inner: Weak<Inner>, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);
    loop {
        interval.tick().await;
        match inner.upgrade() {
            Some(inner) => Scanner { inner }.refresh(),
            None        => break,
        }
    }
}
