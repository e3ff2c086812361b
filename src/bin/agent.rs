//! livemap-agent binary
//!
//! Connects to a live-map listener and streams snapshot frames until SIGINT.
//!
//! The real deployment feeds the agent from an introspection adapter over a
//! foreign process; this binary substitutes a small simulated world so the
//! whole pipeline (handshake, framing, cadence, listener decoding) can be
//! soak-tested end to end.
//!
//! ## Configuration (flags / env)
//!
//! | Key                     | Default     | Description                    |
//! |-------------------------|-------------|--------------------------------|
//! | `LIVEMAP_HOST`          | `127.0.0.1` | Listener host                  |
//! | `LIVEMAP_PORT`          | `8080`      | Listener port                  |
//! | `LIVEMAP_PATH`          | `/ws`       | Upgrade request path           |
//! | `LIVEMAP_INTERVAL_MS`   | `100`       | Collection cadence             |

use anyhow::Result;
use clap::Parser;
use livemap_telemetry::{AgentConfig, EntityRecord, TelemetryAgent, Vec3, WorldProvider};
use std::time::Duration;

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "livemap-agent", about = "Live-map telemetry agent", version)]
struct Args {
    /// Listener host
    #[arg(long, env = "LIVEMAP_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Listener port
    #[arg(long, env = "LIVEMAP_PORT", default_value_t = 8080)]
    port: u16,

    /// Upgrade request path
    #[arg(long, env = "LIVEMAP_PATH", default_value = "/ws")]
    path: String,

    /// Collection cadence in milliseconds
    #[arg(long, env = "LIVEMAP_INTERVAL_MS", default_value_t = 100)]
    interval_ms: u64,
}

// ---------------------------------------------------------------------------
// Simulated world
// ---------------------------------------------------------------------------

/// Three hostiles orbiting the origin plus the self entity at the center.
/// Entity 2 never resolves a name, so listeners also see the "Unknown" path.
struct SimulatedWorld {
    step: u32,
}

impl WorldProvider for SimulatedWorld {
    fn entities(&mut self) -> Vec<EntityRecord> {
        self.step = self.step.wrapping_add(1);
        let t = self.step as f32 * 0.05;

        let mut records = vec![EntityRecord {
            position: Vec3::zero(),
            team: 0,
            health: 100,
            max_health: 100,
            visible: true,
            is_self: true,
            friendly: true,
            name: Some("self".into()),
        }];

        for i in 0..3u32 {
            let phase = t + i as f32 * 2.1;
            let radius = 40.0 + 10.0 * i as f32;
            let record = EntityRecord::hostile(
                Vec3::new(radius * phase.cos(), radius * phase.sin(), 0.0),
                1,
                25 * (i as i32 + 1),
                100,
            );
            records.push(match i {
                2 => record,
                _ => record.with_name(format!("drone-{i}")),
            });
        }

        records
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livemap_telemetry=debug".parse()?),
        )
        .init();

    let args = Args::parse();

    log::info!(
        "Starting livemap-agent (listener={}:{}{}, interval={}ms)",
        args.host,
        args.port,
        args.path,
        args.interval_ms,
    );

    let config = AgentConfig {
        host: args.host,
        port: args.port,
        path: args.path,
        interval: Duration::from_millis(args.interval_ms),
    };

    TelemetryAgent::new(config, Box::new(SimulatedWorld { step: 0 }))
        .run()
        .await
}
