pub mod capture;
pub mod topology;
pub mod types;

pub use capture::{capture_monitor, capture_region};
pub use topology::{list_monitors, select_monitor};
pub use types::{MonitorRect, ScreenImage};
