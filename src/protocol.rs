//! Wire payload for the live-map listener.
//!
//! This module owns the one document that crosses the socket boundary: the
//! per-cycle `game_data` snapshot. The listener (and the map page behind it)
//! consumes it as-is, so **field order, nesting and number formatting are
//! all part of the contract**:
//!
//! | Field       | Shape                                               |
//! |-------------|-----------------------------------------------------|
//! | `type`      | literal `"game_data"`                               |
//! | `timestamp` | integer seconds since the Unix epoch                |
//! | `my_data`   | `{position: {x, y, z}, camp}`                       |
//! | `enemies`   | array of `{position, camp, hp, max_hp, name}`       |
//!
//! Position components are always rendered with exactly two fractional
//! digits (`12` → `12.00`). `name` is never `null` – failed lookups were
//! replaced with `"Unknown"` before the snapshot reached this module. The
//! document is a single line; frames never contain newlines.

use crate::types::{Vec3, WorldSnapshot};
use std::fmt::Write;

/// Literal discriminator carried in every snapshot document.
pub const PAYLOAD_TYPE: &str = "game_data";

/// Render `snapshot` into the wire JSON document.
///
/// `timestamp` is passed in rather than sampled here so output is
/// deterministic under test; the agent supplies wall-clock seconds.
pub fn render_payload(snapshot: &WorldSnapshot, timestamp: u64) -> String {
    // Hand-assembled: serde_json normalizes numbers, and the listener
    // expects fixed two-decimal position fields.
    let mut out = String::with_capacity(128 + snapshot.enemies.len() * 96);

    out.push('{');
    let _ = write!(out, "\"type\":\"{PAYLOAD_TYPE}\",");
    let _ = write!(out, "\"timestamp\":{timestamp},");

    out.push_str("\"my_data\":{");
    write_position(&mut out, snapshot.self_data.position);
    let _ = write!(out, ",\"camp\":{}", snapshot.self_data.team);
    out.push_str("},");

    out.push_str("\"enemies\":[");
    for (i, enemy) in snapshot.enemies.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('{');
        write_position(&mut out, enemy.position);
        let _ = write!(
            out,
            ",\"camp\":{},\"hp\":{},\"max_hp\":{},\"name\":{}",
            enemy.team,
            enemy.health,
            enemy.max_health,
            json_string(&enemy.name),
        );
        out.push('}');
    }
    out.push(']');
    out.push('}');

    out
}

fn write_position(out: &mut String, p: Vec3) {
    let _ = write!(
        out,
        "\"position\":{{\"x\":{:.2},\"y\":{:.2},\"z\":{:.2}}}",
        p.x, p.y, p.z
    );
}

/// Quote + escape a name so arbitrary provider strings keep the document
/// valid JSON.
fn json_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"Unknown\"".into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
