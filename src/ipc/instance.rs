// src/ipc/instance.rs - Single-instance coordination over a local socket
//
// The first process to bind the endpoint becomes the primary and keeps an
// accept loop running. Later launches find the endpoint occupied, forward
// their file arguments as one frame per connection, and exit.

use super::frame::{read_frame, write_frame};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};

/// Versioned so an incompatible build never talks to an old primary.
pub const ENDPOINT_NAME: &str = "smarttext-single-instance-v1";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(150);
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(800);
/// How long the primary waits for a connected peer to deliver its frame.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    Unbound,
    Primary,
    Secondary,
}

pub struct SingleInstance {
    endpoint: PathBuf,
    probe_timeout: Duration,
    send_timeout: Duration,
    state: InstanceState,
    messages: mpsc::UnboundedSender<String>,
    accept_task: Option<JoinHandle<()>>,
}

impl SingleInstance {
    /// Create a coordinator for `endpoint`. Messages forwarded by later
    /// launches arrive on the returned receiver once this process is primary.
    pub fn new(endpoint: PathBuf) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let instance = Self {
            endpoint,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            state: InstanceState::Unbound,
            messages: tx,
            accept_task: None,
        };
        (instance, rx)
    }

    pub fn with_timeouts(mut self, probe: Duration, send: Duration) -> Self {
        self.probe_timeout = probe;
        self.send_timeout = send;
        self
    }

    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// True when something accepts connections on the endpoint within the
    /// probe timeout.
    pub async fn probe_primary(&self) -> bool {
        match tokio::time::timeout(self.probe_timeout, connect(&self.endpoint)).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                debug!("Probe of {} failed: {}", self.endpoint.display(), e);
                false
            }
            Err(_) => {
                debug!("Probe of {} timed out", self.endpoint.display());
                false
            }
        }
    }

    /// Try to own the endpoint.
    ///
    /// A failed bind is only treated as "another primary exists" when a probe
    /// confirms it; otherwise the endpoint is a leftover from a crashed
    /// primary and is removed before one more bind attempt.
    pub async fn become_primary(&mut self) -> bool {
        if self.state == InstanceState::Primary {
            return true;
        }

        match bind(&self.endpoint) {
            Ok(listener) => {
                self.start_accepting(listener);
                return true;
            }
            Err(e) => debug!("Bind of {} failed: {}", self.endpoint.display(), e),
        }

        if self.probe_primary().await {
            info!("Primary instance already running at {}", self.endpoint.display());
            self.state = InstanceState::Secondary;
            return false;
        }

        // Two launches that both saw the same stale file can each get here.
        // If one unlinks after the other rebinds, both end up primary and the
        // first is unreachable. Removal is not atomic with the probe, so this
        // window stays open.
        warn!("Removing stale endpoint {}", self.endpoint.display());
        if let Err(e) = std::fs::remove_file(&self.endpoint) {
            debug!("Could not remove {}: {}", self.endpoint.display(), e);
        }

        match bind(&self.endpoint) {
            Ok(listener) => {
                self.start_accepting(listener);
                true
            }
            Err(e) => {
                warn!("Retry bind of {} failed: {}", self.endpoint.display(), e);
                self.state = InstanceState::Secondary;
                false
            }
        }
    }

    /// Deliver one message to the primary. Best effort: any connect, write
    /// or timeout failure returns false and nothing is retried.
    pub async fn send_message(&self, text: &str) -> bool {
        let send = async {
            let mut stream = connect(&self.endpoint).await?;
            write_frame(&mut stream, text)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            Ok::<_, std::io::Error>(())
        };

        match tokio::time::timeout(self.send_timeout, send).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!("Forwarding to {} failed: {}", self.endpoint.display(), e);
                false
            }
            Err(_) => {
                warn!("Forwarding to {} timed out", self.endpoint.display());
                false
            }
        }
    }

    /// Stop accepting and remove the endpoint if this process owns it.
    pub fn release(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        if self.state == InstanceState::Primary {
            if let Err(e) = std::fs::remove_file(&self.endpoint) {
                debug!("Could not remove {}: {}", self.endpoint.display(), e);
            }
            self.state = InstanceState::Unbound;
        }
    }

    fn start_accepting(&mut self, listener: Listener) {
        info!("Listening for other launches on {}", self.endpoint.display());
        self.state = InstanceState::Primary;
        self.accept_task = Some(tokio::spawn(accept_loop(listener, self.messages.clone())));
    }
}

impl Drop for SingleInstance {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(unix)]
type Listener = UnixListener;

#[cfg(unix)]
fn bind(endpoint: &Path) -> std::io::Result<Listener> {
    if let Some(parent) = endpoint.parent() {
        std::fs::create_dir_all(parent)?;
    }
    UnixListener::bind(endpoint)
}

#[cfg(unix)]
async fn connect(endpoint: &Path) -> std::io::Result<UnixStream> {
    UnixStream::connect(endpoint).await
}

#[cfg(unix)]
async fn accept_loop(listener: Listener, messages: mpsc::UnboundedSender<String>) {
    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let messages = messages.clone();
                tokio::spawn(async move {
                    match tokio::time::timeout(READ_TIMEOUT, read_frame(&mut stream)).await {
                        Ok(Ok(Some(msg))) => {
                            debug!("Received forwarded message: {}", msg);
                            let _ = messages.send(msg);
                        }
                        Ok(Ok(None)) => debug!("Probe connection closed"),
                        Ok(Err(e)) => warn!("Dropping malformed message: {}", e),
                        Err(_) => warn!("Peer connected but sent nothing in time"),
                    }
                });
            }
            Err(e) => {
                if messages.is_closed() {
                    break;
                }
                warn!("Accept failed: {}", e);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

// Without Unix sockets there is no endpoint: every process runs as its own
// primary and forwarding always fails.
#[cfg(not(unix))]
struct Listener;

#[cfg(not(unix))]
fn bind(_endpoint: &Path) -> std::io::Result<Listener> {
    warn!("Single-instance coordination is unavailable on this platform");
    Ok(Listener)
}

#[cfg(not(unix))]
async fn connect(_endpoint: &Path) -> std::io::Result<tokio::io::Sink> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "no single-instance endpoint on this platform",
    ))
}

#[cfg(not(unix))]
async fn accept_loop(_listener: Listener, _messages: mpsc::UnboundedSender<String>) {}
