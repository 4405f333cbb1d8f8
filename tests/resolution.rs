//! End-to-end resolver tests against a scripted VLM client. No network, no
//! subprocesses — the trait seam stands in for the Ollama server.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use screenclick::errors::{ScreenClickError, ScreenClickResult};
use screenclick::resolver::Resolver;
use screenclick::screen::types::{MonitorRect, ScreenImage};
use screenclick::vlm::client::VlmClient;

/// Replays a fixed sequence of responses, one per `complete` call.
struct ScriptedVlm {
    responses: Mutex<VecDeque<ScreenClickResult<String>>>,
    calls: AtomicUsize,
}

impl ScriptedVlm {
    fn new(responses: Vec<ScreenClickResult<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VlmClient for ScriptedVlm {
    async fn complete(
        &self,
        _image_png: &[u8],
        prompt: &str,
        _model: &str,
    ) -> ScreenClickResult<String> {
        assert!(prompt.contains("1920x1080 pixels"), "prompt should pin dimensions");
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted client queried more often than scripted")
    }
}

fn test_image() -> ScreenImage {
    ScreenImage {
        png: Vec::new(),
        width: 1920,
        height: 1080,
    }
}

fn dual_monitors() -> Vec<MonitorRect> {
    vec![
        MonitorRect {
            name: "eDP-1".to_string(),
            x: 0,
            y: 0,
            width: 1920,
            height: 1080,
            primary: true,
        },
        MonitorRect {
            name: "DP-2".to_string(),
            x: 1920,
            y: 0,
            width: 1920,
            height: 1080,
            primary: false,
        },
    ]
}

#[tokio::test]
async fn averages_all_samples_and_offsets_to_global() {
    let client = ScriptedVlm::new(vec![
        Ok("(90, 40)".to_string()),
        Ok("100,50".to_string()),
        Ok("the target is at 110,60".to_string()),
    ]);
    let target = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click the button", 3, &dual_monitors(), 1)
        .await
        .unwrap();

    assert_eq!(client.calls(), 3);
    // mean (100, 50), plus the second monitor's x offset of 1920
    assert_eq!((target.x, target.y), (2020, 50));
}

#[tokio::test]
async fn unparsable_sample_does_not_block_resolution() {
    let client = ScriptedVlm::new(vec![
        Ok("10,10".to_string()),
        Ok("I am not sure which element you mean.".to_string()),
        Ok("30,30".to_string()),
    ]);
    let target = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 3, &dual_monitors(), 0)
        .await
        .unwrap();
    assert_eq!((target.x, target.y), (20, 20));
}

#[tokio::test]
async fn transport_failure_costs_one_sample() {
    let client = ScriptedVlm::new(vec![
        Ok("10,10".to_string()),
        Err(ScreenClickError::Inference("connection refused".to_string())),
        Ok("30,30".to_string()),
    ]);
    let target = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 3, &dual_monitors(), 0)
        .await
        .unwrap();
    assert_eq!(client.calls(), 3);
    assert_eq!((target.x, target.y), (20, 20));
}

#[tokio::test]
async fn all_samples_unparsable_is_no_valid_predictions() {
    let client = ScriptedVlm::new(vec![
        Ok("top left".to_string()),
        Ok("somewhere in the middle".to_string()),
        Ok("cannot say".to_string()),
    ]);
    let err = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 3, &dual_monitors(), 0)
        .await
        .unwrap_err();

    match err {
        ScreenClickError::NoValidPredictions {
            attempted,
            responses,
        } => {
            assert_eq!(attempted, 3);
            assert_eq!(responses.len(), 3);
            assert!(responses[0].contains("top left"));
        }
        other => panic!("expected NoValidPredictions, got {other}"),
    }
}

#[tokio::test]
async fn all_transports_failing_is_no_valid_predictions() {
    let client = ScriptedVlm::new(vec![
        Err(ScreenClickError::Inference("timeout".to_string())),
        Err(ScreenClickError::Inference("timeout".to_string())),
    ]);
    let err = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 2, &dual_monitors(), 0)
        .await
        .unwrap_err();

    match err {
        ScreenClickError::NoValidPredictions {
            attempted,
            responses,
        } => {
            assert_eq!(attempted, 2);
            assert!(responses.is_empty());
        }
        other => panic!("expected NoValidPredictions, got {other}"),
    }
}

#[tokio::test]
async fn out_of_range_monitor_index_clamps_to_first() {
    let client = ScriptedVlm::new(vec![Ok("100,50".to_string())]);
    let target = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 1, &dual_monitors(), 5)
        .await
        .unwrap();
    // monitor 0 sits at the origin, so no offset is applied
    assert_eq!((target.x, target.y), (100, 50));
}

#[tokio::test]
async fn empty_topology_uses_synthetic_fallback() {
    let client = ScriptedVlm::new(vec![Ok("100,50".to_string())]);
    let target = Resolver::new(&client, "test-model")
        .resolve(&test_image(), "click it", 1, &[], 0)
        .await
        .unwrap();
    assert_eq!((target.x, target.y), (100, 50));
}
