//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame callbacks (one-shot, re-armed every frame)
//! - The fixed spawn interval
//! - Keyboard listeners
//! - Presenting a rendered frame
//! - Navigating away from the game
//!
//! The controller arms tasks through [`Platform`] and receives their firings
//! back as [`Wake`] values.

pub mod manual;
#[cfg(target_arch = "wasm32")]
pub mod web;

use thiserror::Error;

use crate::input::Key;
use crate::renderer::Frame;

pub use manual::ManualPlatform;
#[cfg(target_arch = "wasm32")]
pub use web::WebPlatform;

/// Identifies one armed task or listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(pub u64);

/// A callback delivered by the platform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wake {
    /// Display refresh; `timestamp_ms` is a monotonic clock
    Frame { generation: u64, timestamp_ms: f64 },
    /// Spawn interval fired
    Spawn { generation: u64 },
    /// Key pressed while a key listener is attached
    Key { key: Key },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("could not schedule {what}: {reason}")]
    Schedule { what: &'static str, reason: String },
    #[error("could not attach key listener: {0}")]
    Listener(String),
    #[error("render failed: {0}")]
    Render(String),
}

/// Scheduling and I/O services used by the round controller.
///
/// Every armed task must stay armed until cancelled (intervals, listeners)
/// or fired once (frames). Cancelling an unknown or already-fired handle is a
/// no-op.
pub trait Platform {
    /// Ask for exactly one frame callback
    fn request_frame(&mut self, generation: u64) -> Result<TaskHandle, PlatformError>;
    fn cancel_frame(&mut self, handle: TaskHandle);

    /// Start a fixed-period repeating callback
    fn start_interval(
        &mut self,
        period_ms: u32,
        generation: u64,
    ) -> Result<TaskHandle, PlatformError>;
    fn cancel_interval(&mut self, handle: TaskHandle);

    /// Attach the keydown listener
    fn listen_keys(&mut self) -> Result<TaskHandle, PlatformError>;
    fn unlisten_keys(&mut self, handle: TaskHandle);

    /// Draw a finished frame
    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError>;

    /// Leave the game for another page of the application
    fn navigate(&mut self, route: &str);
}
