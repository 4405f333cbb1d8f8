//! Virtual input injection via the `ydotool` daemon CLI. Works on Wayland
//! without elevated permissions as long as ydotoold is running.

use std::time::Duration;

use tokio::process::Command;

use crate::errors::{ScreenClickError, ScreenClickResult};

/// What to do at the resolved coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move,
    ClickLeft,
    ClickRight,
}

// ydotool click codes: 0x40 press | 0x80 release, low nibble selects button.
const CLICK_LEFT: &str = "0xC0";
const CLICK_RIGHT: &str = "0xC1";

/// Perform `action` at a global screen coordinate. Clicks position the
/// cursor first, then press-and-release.
pub async fn inject(action: Action, x: i32, y: i32, timeout: Duration) -> ScreenClickResult<()> {
    let (move_x, move_y) = (x.to_string(), y.to_string());
    run_ydotool(
        &["mousemove", "--absolute", "-x", &move_x, "-y", &move_y],
        timeout,
    )
    .await?;
    tracing::debug!(x, y, ?action, "cursor positioned");

    if let Some(code) = click_code(action) {
        run_ydotool(&["click", code], timeout).await?;
        tracing::debug!(x, y, ?action, "click injected");
    }
    Ok(())
}

/// Type a text string at the current focus.
pub async fn type_text(text: &str, timeout: Duration) -> ScreenClickResult<()> {
    run_ydotool(&["type", "--", text], timeout).await
}

fn click_code(action: Action) -> Option<&'static str> {
    match action {
        Action::Move => None,
        Action::ClickLeft => Some(CLICK_LEFT),
        Action::ClickRight => Some(CLICK_RIGHT),
    }
}

async fn run_ydotool(args: &[&str], timeout: Duration) -> ScreenClickResult<()> {
    let child = Command::new("ydotool").args(args).output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScreenClickError::Injection(
                "ydotool not found. Install with: sudo apt install ydotool".to_string(),
            ));
        }
        Ok(Err(e)) => {
            return Err(ScreenClickError::Injection(format!(
                "ydotool failed to start: {e}"
            )))
        }
        Err(_) => return Err(ScreenClickError::Injection("ydotool timed out".to_string())),
    };

    if !output.status.success() {
        return Err(ScreenClickError::Injection(format!(
            "ydotool exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_has_no_click_stage() {
        assert_eq!(click_code(Action::Move), None);
    }

    #[test]
    fn click_codes_press_and_release() {
        assert_eq!(click_code(Action::ClickLeft), Some("0xC0"));
        assert_eq!(click_code(Action::ClickRight), Some("0xC1"));
    }
}
