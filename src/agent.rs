//! Lifecycle glue – connects the transport, then drives the collection
//! loop as a supervised background task.
//!
//! ## Control flow
//!
//! ```text
//! TelemetryAgent::start
//!   ├── TelemetryTransport::connect   (caller's task; failure → no loop)
//!   └── tokio::spawn(collection_loop) ──▶ AgentHandle { shutdown, task, stats }
//! ```
//!
//! The loop task exclusively owns the transport, the provider and the
//! snapshot – nothing is shared except the stats counters and the shutdown
//! channel, so the hot path takes no locks beyond one counter update.
//!
//! The loop ends when the supervisor signals shutdown or the transport
//! state leaves `Connected` (a failed send flips it). There is no
//! reconnect: a finished loop stays finished.

use crate::collector::Collector;
use crate::provider::WorldProvider;
use crate::transport::{TelemetryTransport, TransportError};
use crate::types::{AgentConfig, TelemetryStats};
use crate::{frame, protocol};
use anyhow::{Context, Result};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// TelemetryAgent
// ---------------------------------------------------------------------------

pub struct TelemetryAgent {
    config: AgentConfig,
    provider: Box<dyn WorldProvider>,
}

/// Supervision handle returned by [`TelemetryAgent::start`].
#[derive(Debug)]
pub struct AgentHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    stats: Arc<Mutex<TelemetryStats>>,
}

impl AgentHandle {
    pub fn stats(&self) -> TelemetryStats {
        self.stats.lock().clone()
    }

    /// True once the collection loop has ended (shutdown or disconnect).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Request shutdown and wait for the loop task to finish.
    pub async fn shutdown(self) -> TelemetryStats {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
        self.stats.lock().clone()
    }
}

impl TelemetryAgent {
    pub fn new(config: AgentConfig, provider: Box<dyn WorldProvider>) -> Self {
        Self { config, provider }
    }

    /// Connect and spawn the collection loop.
    ///
    /// Returns an error – and spawns nothing – when resolution, connect or
    /// the upgrade handshake fails.
    pub async fn start(self) -> Result<AgentHandle, TransportError> {
        let mut transport = TelemetryTransport::new();
        transport
            .connect(&self.config.host, self.config.port, &self.config.path)
            .await?;

        let stats = Arc::new(Mutex::new(TelemetryStats::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(collection_loop(
            transport,
            self.provider,
            self.config.clone(),
            stats.clone(),
            shutdown_rx,
        ));

        Ok(AgentHandle {
            shutdown: shutdown_tx,
            task,
            stats,
        })
    }

    /// Binary entry point: start, run until SIGINT or the loop ends, then
    /// shut down deterministically.
    pub async fn run(self) -> Result<()> {
        let host = self.config.host.clone();
        let port = self.config.port;

        let handle = self
            .start()
            .await
            .with_context(|| format!("failed to reach telemetry listener at {host}:{port}"))?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("telemetry agent shutting down (SIGINT)");
            }
            // The loop owns no way to restart itself; if it ends on its
            // own, the transport dropped.
            _ = wait_finished(&handle) => {
                warn!("collection loop ended – transport lost");
            }
        }

        let stats = handle.shutdown().await;
        info!(
            "telemetry agent stopped: {}",
            serde_json::to_string(&stats).unwrap_or_default()
        );
        Ok(())
    }
}

async fn wait_finished(handle: &AgentHandle) {
    while !handle.is_finished() {
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    }
}

// ---------------------------------------------------------------------------
// Collection loop
// ---------------------------------------------------------------------------

async fn collection_loop(
    mut transport: TelemetryTransport,
    mut provider: Box<dyn WorldProvider>,
    config: AgentConfig,
    stats: Arc<Mutex<TelemetryStats>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut collector = Collector::new();
    let mut timer = tokio::time::interval(config.interval);

    info!(
        "collection loop running at {} ms cadence",
        config.interval.as_millis()
    );

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = timer.tick() => {}
        }

        if !transport.is_connected() {
            warn!("transport no longer connected; stopping collection loop");
            break;
        }

        let snapshot = collector.collect(provider.entities());
        let enemy_count = snapshot.enemies.len();
        let payload = protocol::render_payload(snapshot, unix_seconds());

        let sent = publish_frame(&mut transport, &payload).await;

        let mut s = stats.lock();
        s.cycles = collector.cycles();
        s.enemies_last_cycle = enemy_count;
        if sent {
            s.frames_sent += 1;
        } else {
            s.send_failures += 1;
        }
    }
}

/// Encode `payload` and write it out.
///
/// Errors are logged and swallowed – a single failed send must not crash
/// the loop. The transport flips its own state on I/O failure, which ends
/// the loop at the top of the next cycle.
async fn publish_frame(transport: &mut TelemetryTransport, payload: &str) -> bool {
    match transport.send(frame::encode_text_frame(payload)).await {
        Ok(()) => true,
        Err(e) => {
            warn!("failed to publish snapshot frame: {}", e);
            false
        }
    }
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
