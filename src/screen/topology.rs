//! Monitor topology discovery via `swaymsg -t get_outputs`.

use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::screen::types::MonitorRect;

const SWAYMSG_TIMEOUT: Duration = Duration::from_secs(5);

/// One entry of `swaymsg -t get_outputs`. Fields we don't care about are
/// simply not declared.
#[derive(Debug, Deserialize)]
struct SwayOutput {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    rect: SwayRect,
}

#[derive(Debug, Deserialize, Default)]
struct SwayRect {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
}

fn default_width() -> u32 {
    1920
}

fn default_height() -> u32 {
    1080
}

/// Return the active monitors in compositor order. Never fails: if swaymsg is
/// missing, times out, returns garbage, or reports no active outputs, a
/// single synthetic fallback rectangle is returned instead.
pub async fn list_monitors() -> Vec<MonitorRect> {
    match query_sway_outputs().await {
        Ok(monitors) if !monitors.is_empty() => monitors,
        Ok(_) => {
            tracing::warn!("swaymsg reported no active outputs, using fallback monitor");
            vec![MonitorRect::fallback()]
        }
        Err(e) => {
            tracing::warn!(error = %e, "monitor topology unavailable, using fallback monitor");
            vec![MonitorRect::fallback()]
        }
    }
}

async fn query_sway_outputs() -> Result<Vec<MonitorRect>, String> {
    let child = Command::new("swaymsg")
        .args(["-t", "get_outputs"])
        .output();
    let output = tokio::time::timeout(SWAYMSG_TIMEOUT, child)
        .await
        .map_err(|_| "swaymsg timed out".to_string())?
        .map_err(|e| format!("swaymsg failed to start: {e}"))?;

    if !output.status.success() {
        return Err(format!(
            "swaymsg exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let outputs: Vec<SwayOutput> =
        serde_json::from_slice(&output.stdout).map_err(|e| format!("bad swaymsg JSON: {e}"))?;
    Ok(parse_outputs(outputs))
}

fn parse_outputs(outputs: Vec<SwayOutput>) -> Vec<MonitorRect> {
    outputs
        .into_iter()
        .filter(|o| o.active)
        .map(|o| MonitorRect {
            name: o.name.unwrap_or_else(|| "unknown".to_string()),
            x: o.rect.x,
            y: o.rect.y,
            width: o.rect.width,
            height: o.rect.height,
            primary: o.primary,
        })
        .collect()
}

/// Pick the target monitor out of the topology. An out-of-range index is
/// clamped to 0 rather than treated as an error; an empty list yields the
/// synthetic fallback rectangle.
pub fn select_monitor(monitors: &[MonitorRect], index: usize) -> MonitorRect {
    match monitors.get(index) {
        Some(monitor) => monitor.clone(),
        None => match monitors.first() {
            Some(first) => {
                tracing::warn!(
                    index,
                    available = monitors.len(),
                    fallback = %first.name,
                    "monitor index out of range, using monitor 0"
                );
                first.clone()
            }
            None => {
                tracing::warn!("no monitors reported, using synthetic fallback");
                MonitorRect::fallback()
            }
        },
    }
}
