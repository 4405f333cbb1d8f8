use serde::{Deserialize, Serialize};

use crate::errors::ScreenClickResult;

/// One active display's placement in the global virtual-screen space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRect {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

impl MonitorRect {
    /// Synthetic rectangle used when the real topology cannot be determined.
    pub fn fallback() -> Self {
        Self {
            name: "fallback".to_string(),
            x: 0,
            y: 0,
            width: 1920,
            height: 1200,
            primary: true,
        }
    }

    /// Translate a monitor-relative point into global virtual-screen
    /// coordinates. Single source of truth for this transform — both the
    /// resolver and direct clicks go through here so they stay consistent.
    pub fn to_global(&self, x: u32, y: u32) -> (i32, i32) {
        (self.x + x as i32, self.y + y as i32)
    }
}

/// One PNG capture of a screen region, with its pixel dimensions decoded up
/// front so prompts can state them exactly.
#[derive(Debug, Clone)]
pub struct ScreenImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ScreenImage {
    pub fn from_png(png: Vec<u8>) -> ScreenClickResult<Self> {
        let (width, height) = image::load_from_memory(&png).map(|img| {
            use image::GenericImageView;
            img.dimensions()
        })?;
        Ok(Self { png, width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_global_applies_monitor_offset() {
        let monitor = MonitorRect {
            name: "DP-2".to_string(),
            x: 1920,
            y: 0,
            width: 1920,
            height: 1080,
            primary: false,
        };
        assert_eq!(monitor.to_global(100, 50), (2020, 50));
    }

    #[test]
    fn to_global_handles_negative_monitor_origin() {
        let monitor = MonitorRect {
            name: "HDMI-A-1".to_string(),
            x: -1920,
            y: -200,
            width: 1920,
            height: 1080,
            primary: false,
        };
        assert_eq!(monitor.to_global(10, 20), (-1910, -180));
    }

    #[test]
    fn fallback_rect_shape() {
        let rect = MonitorRect::fallback();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0, 0, 1920, 1200));
        assert!(rect.primary);
    }
}
