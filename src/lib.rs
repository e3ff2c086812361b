//! Live-Map Telemetry Agent
//!
//! Streams periodic snapshots of observed entities to a remote map listener
//! over a persistent TCP socket carrying hand-framed WebSocket text frames.
//!
//! ## Architecture
//!
//! ```text
//! TelemetryAgent  (agent.rs)      ← lifecycle, 10 Hz collection loop
//!   ├── WorldProvider (provider.rs) ← opaque world-snapshot capability
//!   ├── Collector  (collector.rs)   ← snapshot rebuild + hostile filter
//!   ├── protocol.rs                 ← wire JSON document
//!   ├── frame.rs                    ← upgrade handshake + frame codec
//!   └── TelemetryTransport (transport.rs) ← the one socket
//! ```
//!
//! The transport is client→server only: after the upgrade handshake is
//! validated, nothing inbound is ever read. There is no reconnect and no
//! acknowledgement – the listener is trusted to keep up, and frames die
//! with the socket.

pub mod agent;
pub mod collector;
pub mod frame;
pub mod protocol;
pub mod provider;
pub mod transport;
pub mod types;

// Convenience re-exports
pub use agent::{AgentHandle, TelemetryAgent};
pub use collector::Collector;
pub use provider::{EntityRecord, WorldProvider};
pub use transport::{TelemetryTransport, TransportError, TransportState};
pub use types::{
    AgentConfig, EntityObservation, SelfObservation, TelemetryStats, Vec3, WorldSnapshot,
};
