// src/lifecycle.rs - Shutdown hooks run once when the editor exits

use log::{debug, error};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

type ShutdownHook<C> = Box<dyn FnOnce(&mut C) -> anyhow::Result<()>>;

/// Explicit application-lifecycle context. Components register what must
/// happen on exit; the owner of `C` runs the hooks exactly once.
pub struct Lifecycle<C> {
    hooks: Vec<(&'static str, ShutdownHook<C>)>,
    shut_down: bool,
}

impl<C> Default for Lifecycle<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Lifecycle<C> {
    pub fn new() -> Self {
        Self {
            hooks: Vec::new(),
            shut_down: false,
        }
    }

    pub fn on_shutdown<F>(&mut self, name: &'static str, hook: F)
    where
        F: FnOnce(&mut C) -> anyhow::Result<()> + 'static,
    {
        self.hooks.push((name, Box::new(hook)));
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Run every hook in registration order. A failing hook is logged and
    /// the rest still run. Returns the number of failures.
    pub fn shutdown(&mut self, context: &mut C) -> usize {
        if self.shut_down {
            return 0;
        }
        self.shut_down = true;

        let mut failures = 0;
        for (name, hook) in self.hooks.drain(..) {
            debug!("Running shutdown hook '{}'", name);
            if let Err(e) = hook(context) {
                error!("Shutdown hook '{}' failed: {:#}", name, e);
                failures += 1;
            }
        }
        failures
    }
}

/// Exit requests from outside the process. On Unix this covers SIGINT,
/// SIGTERM and SIGHUP; elsewhere only Ctrl-C.
///
/// Handlers are installed by `listen`, so a signal delivered while the
/// owner is busy is queued rather than killing the process.
pub struct Termination {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(unix)]
    hangup: Signal,
}

impl Termination {
    /// Must be called from inside a tokio runtime.
    #[cfg(unix)]
    pub fn listen() -> std::io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    #[cfg(not(unix))]
    pub fn listen() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next exit request and name it. Cancel-safe.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    }
}
