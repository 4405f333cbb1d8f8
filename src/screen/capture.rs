//! Screenshot capture via the `grim` CLI. grim writes the PNG to stdout when
//! given `-` as the output path, so no temp files are involved.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::errors::{ScreenClickError, ScreenClickResult};
use crate::screen::topology;
use crate::screen::types::{MonitorRect, ScreenImage};

/// Capture a rectangular region of the global virtual screen.
pub async fn capture_region(
    rect: &MonitorRect,
    timeout: Duration,
) -> ScreenClickResult<ScreenImage> {
    let geometry = format!("{},{} {}x{}", rect.x, rect.y, rect.width, rect.height);
    run_grim(&["-g", &geometry, "-"], timeout).await
}

/// Capture the full virtual screen (all monitors).
pub async fn capture_all(timeout: Duration) -> ScreenClickResult<ScreenImage> {
    run_grim(&["-"], timeout).await
}

/// Capture a single monitor, selected by index against the live topology.
pub async fn capture_monitor(
    monitor_index: usize,
    timeout: Duration,
) -> ScreenClickResult<(ScreenImage, MonitorRect)> {
    let monitors = topology::list_monitors().await;
    let monitor = topology::select_monitor(&monitors, monitor_index);
    tracing::debug!(
        monitor = %monitor.name,
        x = monitor.x,
        y = monitor.y,
        width = monitor.width,
        height = monitor.height,
        "capturing monitor"
    );
    let image = capture_region(&monitor, timeout).await?;
    Ok((image, monitor))
}

async fn run_grim(args: &[&str], timeout: Duration) -> ScreenClickResult<ScreenImage> {
    let child = Command::new("grim")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScreenClickError::Capture(
                "grim not found. Install with: apt install grim".to_string(),
            ));
        }
        Ok(Err(e)) => return Err(ScreenClickError::Capture(format!("grim failed to start: {e}"))),
        Err(_) => return Err(ScreenClickError::Capture("screenshot timed out".to_string())),
    };

    if !output.status.success() {
        return Err(ScreenClickError::Capture(format!(
            "grim exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let image = ScreenImage::from_png(output.stdout)?;
    tracing::debug!(
        bytes = image.png.len(),
        width = image.width,
        height = image.height,
        "screenshot captured"
    );
    Ok(image)
}
