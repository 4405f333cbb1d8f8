//! The coordinate resolver: turns "click the save button" plus a screenshot
//! into one global pixel coordinate.
//!
//! A single VLM response is noisy for spatial localization, so the resolver
//! asks the model `sample_count` times with the identical image and prompt,
//! parses every answer, and averages the ones that parsed. Sampling is the
//! only "retry" mechanism here — transport failures are not retried, they
//! just cost one sample.

use crate::errors::{ScreenClickError, ScreenClickResult};
use crate::screen::topology;
use crate::screen::types::{MonitorRect, ScreenImage};
use crate::vlm::client::VlmClient;
use crate::vlm::parser;

/// One parsed coordinate guess, relative to the captured image's own pixel
/// space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub x: u32,
    pub y: u32,
}

/// The final aggregated point in global virtual-screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub x: i32,
    pub y: i32,
}

pub struct Resolver<'a> {
    client: &'a dyn VlmClient,
    model: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(client: &'a dyn VlmClient, model: &'a str) -> Self {
        Self { client, model }
    }

    /// Resolve `instruction` against `image`, then map the result into global
    /// coordinates using the monitor at `monitor_index` (clamped to 0 when
    /// out of range; synthetic fallback when `monitors` is empty).
    ///
    /// Fails only when not a single sample produced a parseable coordinate.
    pub async fn resolve(
        &self,
        image: &ScreenImage,
        instruction: &str,
        sample_count: usize,
        monitors: &[MonitorRect],
        monitor_index: usize,
    ) -> ScreenClickResult<ResolvedTarget> {
        let prompt = build_prompt(image.width, image.height, instruction);
        let responses = self.collect_samples(image, &prompt, sample_count).await;
        let predictions = parse_responses(&responses);

        let Some(center) = average(&predictions) else {
            return Err(ScreenClickError::NoValidPredictions {
                attempted: sample_count,
                responses,
            });
        };
        tracing::info!(
            x = center.x,
            y = center.y,
            valid = predictions.len(),
            attempted = sample_count,
            "predictions aggregated"
        );

        let monitor = topology::select_monitor(monitors, monitor_index);
        let (x, y) = monitor.to_global(center.x, center.y);
        Ok(ResolvedTarget { x, y })
    }

    /// Issue the independent queries one after another and return every
    /// response that made it back. A transport failure is logged and dropped,
    /// same as an unparsable answer later on.
    async fn collect_samples(
        &self,
        image: &ScreenImage,
        prompt: &str,
        sample_count: usize,
    ) -> Vec<String> {
        let mut responses = Vec::with_capacity(sample_count);
        for sample in 1..=sample_count {
            match self.client.complete(&image.png, prompt, self.model).await {
                Ok(response) => {
                    tracing::debug!(sample, response = %response.trim(), "sample received");
                    responses.push(response);
                }
                Err(e) => {
                    tracing::warn!(sample, error = %e, "sample failed, continuing");
                }
            }
        }
        responses
    }
}

/// Prompt asking for the center of the target element, pinned to the image's
/// exact dimensions and coordinate convention.
pub fn build_prompt(width: u32, height: u32, instruction: &str) -> String {
    format!(
        "This screenshot is {width}x{height} pixels.\n\
         The top-left corner is (0,0), bottom-right is ({},{}).\n\n\
         Task: {instruction}\n\n\
         Find the CENTER of the target element.\n\
         Respond with ONLY x,y coordinates (e.g., 500,300):",
        width.saturating_sub(1),
        height.saturating_sub(1),
    )
}

/// Run the parser over every raw response, keeping the hits. Pure, so the
/// whole filter/reduce stage is testable without a live model.
pub fn parse_responses(responses: &[String]) -> Vec<Prediction> {
    responses
        .iter()
        .filter_map(|response| match parser::parse_prediction(response) {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparsable sample");
                None
            }
        })
        .collect()
}

/// Per-axis integer mean. No outlier rejection: one bad-but-well-formed
/// sample will pull the mean toward it.
pub fn average(predictions: &[Prediction]) -> Option<Prediction> {
    if predictions.is_empty() {
        return None;
    }
    let n = predictions.len() as u64;
    let sum_x: u64 = predictions.iter().map(|p| p.x as u64).sum();
    let sum_y: u64 = predictions.iter().map(|p| p.y as u64).sum();
    Some(Prediction {
        x: (sum_x / n) as u32,
        y: (sum_y / n) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(pairs: &[(u32, u32)]) -> Vec<Prediction> {
        pairs.iter().map(|&(x, y)| Prediction { x, y }).collect()
    }

    #[test]
    fn average_is_deterministic_integer_mean() {
        let result = average(&preds(&[(10, 10), (20, 20), (30, 30)])).unwrap();
        assert_eq!((result.x, result.y), (20, 20));
    }

    #[test]
    fn average_truncates_toward_zero() {
        let result = average(&preds(&[(0, 0), (1, 1), (1, 1)])).unwrap();
        assert_eq!((result.x, result.y), (0, 0));
    }

    #[test]
    fn average_of_nothing_is_none() {
        assert!(average(&[]).is_none());
    }

    #[test]
    fn unparsable_responses_are_filtered_not_fatal() {
        let responses = vec![
            "10,10".to_string(),
            "I could not find the element.".to_string(),
            "(30, 30)".to_string(),
        ];
        let predictions = parse_responses(&responses);
        assert_eq!(predictions, preds(&[(10, 10), (30, 30)]));
        let result = average(&predictions).unwrap();
        assert_eq!((result.x, result.y), (20, 20));
    }

    #[test]
    fn prompt_states_dimensions_and_convention() {
        let prompt = build_prompt(2256, 1504, "click the save button");
        assert!(prompt.contains("2256x1504 pixels"));
        assert!(prompt.contains("(0,0)"));
        assert!(prompt.contains("(2255,1503)"));
        assert!(prompt.contains("click the save button"));
        assert!(prompt.contains("CENTER"));
        assert!(prompt.contains("ONLY x,y"));
    }

    #[test]
    fn prompt_survives_zero_dimension_image() {
        let prompt = build_prompt(0, 0, "click it");
        assert!(prompt.contains("0x0 pixels"));
        assert!(prompt.contains("bottom-right is (0,0)"));
    }
}
