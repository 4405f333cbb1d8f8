pub mod config;
pub mod errors;
pub mod input;
pub mod resolver;
pub mod screen;
pub mod vlm;

use std::time::Duration;

use crate::config::AppConfig;
use crate::errors::ScreenClickResult;
use crate::input::Action;
use crate::resolver::{ResolvedTarget, Resolver};
use crate::screen::topology;
use crate::vlm::client::OllamaClient;

/// One-shot "locate and act": capture the target monitor, resolve the
/// instruction to a global coordinate, perform the action there.
///
/// Returns the resolved target so callers can report where the action landed.
pub async fn resolve_and_act(
    config: &AppConfig,
    instruction: &str,
    monitor_index: usize,
    sample_count: usize,
    action: Action,
) -> ScreenClickResult<ResolvedTarget> {
    let monitors = topology::list_monitors().await;
    let monitor = topology::select_monitor(&monitors, monitor_index);

    let image = screen::capture::capture_region(
        &monitor,
        Duration::from_secs(config.capture.timeout_secs),
    )
    .await?;
    tracing::info!(
        monitor = %monitor.name,
        width = image.width,
        height = image.height,
        sample_count,
        "resolving instruction"
    );

    let client = OllamaClient::new(
        config.vlm.url(),
        Duration::from_secs(config.vlm.request_timeout_secs),
    )?;
    let target = Resolver::new(&client, &config.vlm.model)
        .resolve(&image, instruction, sample_count, &monitors, monitor_index)
        .await?;

    tracing::info!(x = target.x, y = target.y, ?action, "acting on resolved target");
    input::inject(
        action,
        target.x,
        target.y,
        Duration::from_secs(config.input.timeout_secs),
    )
    .await?;
    Ok(target)
}

/// Ask the VLM a free-form question about what is currently on a monitor.
pub async fn describe_screen(
    config: &AppConfig,
    prompt: &str,
    monitor_index: usize,
) -> ScreenClickResult<String> {
    use crate::vlm::client::VlmClient as _;

    let (image, monitor) = screen::capture::capture_monitor(
        monitor_index,
        Duration::from_secs(config.capture.timeout_secs),
    )
    .await?;
    tracing::info!(monitor = %monitor.name, bytes = image.png.len(), "asking VLM about screen");

    let client = OllamaClient::new(
        config.vlm.url(),
        Duration::from_secs(config.vlm.request_timeout_secs),
    )?;
    client.complete(&image.png, prompt, &config.vlm.model).await
}
