//! Manually clocked platform for tests and headless runs
//!
//! Nothing fires on its own: [`ManualPlatform::advance`] moves a virtual
//! clock forward and hands back the callbacks that became due.

use std::collections::BTreeMap;

use super::{Platform, PlatformError, TaskHandle, Wake};
use crate::input::Key;
use crate::renderer::Frame;

#[derive(Debug, Clone, Copy)]
struct Interval {
    period_ms: f64,
    generation: u64,
    next_due_ms: f64,
}

#[derive(Debug, Default)]
pub struct ManualPlatform {
    clock_ms: f64,
    next_handle: u64,
    frames: BTreeMap<TaskHandle, u64>,
    intervals: BTreeMap<TaskHandle, Interval>,
    key_listeners: Vec<TaskHandle>,
    presented: u64,
    last_frame: Option<Frame>,
    fail_present: bool,
    routes: Vec<String>,
}

impl ManualPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Outstanding frame requests
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Running intervals
    pub fn active_intervals(&self) -> usize {
        self.intervals.len()
    }

    /// Attached key listeners
    pub fn key_listeners(&self) -> usize {
        self.key_listeners.len()
    }

    /// Frames presented so far
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    /// Make every following `present` fail
    pub fn set_fail_present(&mut self, fail: bool) {
        self.fail_present = fail;
    }

    /// Routes passed to `navigate`
    pub fn routes(&self) -> &[String] {
        &self.routes
    }

    /// Advance the clock by one display refresh of `ms`.
    ///
    /// Returns the interval firings that came due (in time order), followed by
    /// the requested frames, which are consumed.
    pub fn advance(&mut self, ms: f64) -> Vec<Wake> {
        self.clock_ms += ms;
        let now = self.clock_ms;

        let mut due: Vec<(f64, u64)> = Vec::new();
        for interval in self.intervals.values_mut() {
            while interval.next_due_ms <= now {
                due.push((interval.next_due_ms, interval.generation));
                interval.next_due_ms += interval.period_ms;
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut wakes: Vec<Wake> = due
            .into_iter()
            .map(|(_, generation)| Wake::Spawn { generation })
            .collect();
        wakes.extend(
            std::mem::take(&mut self.frames)
                .into_values()
                .map(|generation| Wake::Frame {
                    generation,
                    timestamp_ms: now,
                }),
        );
        wakes
    }

    /// A key press, delivered only while a listener is attached
    pub fn press(&self, key: Key) -> Option<Wake> {
        if self.key_listeners.is_empty() {
            None
        } else {
            Some(Wake::Key { key })
        }
    }

    fn handle(&mut self) -> TaskHandle {
        self.next_handle += 1;
        TaskHandle(self.next_handle)
    }
}

impl Platform for ManualPlatform {
    fn request_frame(&mut self, generation: u64) -> Result<TaskHandle, PlatformError> {
        let handle = self.handle();
        self.frames.insert(handle, generation);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: TaskHandle) {
        self.frames.remove(&handle);
    }

    fn start_interval(
        &mut self,
        period_ms: u32,
        generation: u64,
    ) -> Result<TaskHandle, PlatformError> {
        if period_ms == 0 {
            return Err(PlatformError::Schedule {
                what: "interval",
                reason: "zero period".to_string(),
            });
        }
        let handle = self.handle();
        let period_ms = period_ms as f64;
        self.intervals.insert(
            handle,
            Interval {
                period_ms,
                generation,
                next_due_ms: self.clock_ms + period_ms,
            },
        );
        Ok(handle)
    }

    fn cancel_interval(&mut self, handle: TaskHandle) {
        self.intervals.remove(&handle);
    }

    fn listen_keys(&mut self) -> Result<TaskHandle, PlatformError> {
        let handle = self.handle();
        self.key_listeners.push(handle);
        Ok(handle)
    }

    fn unlisten_keys(&mut self, handle: TaskHandle) {
        self.key_listeners.retain(|h| *h != handle);
    }

    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError> {
        if self.fail_present {
            return Err(PlatformError::Render("presentation disabled".to_string()));
        }
        self.presented += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }

    fn navigate(&mut self, route: &str) {
        self.routes.push(route.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_are_one_shot() {
        let mut platform = ManualPlatform::new();
        platform.request_frame(7).unwrap();
        let wakes = platform.advance(16.0);
        assert_eq!(
            wakes,
            vec![Wake::Frame {
                generation: 7,
                timestamp_ms: 16.0
            }]
        );
        assert!(platform.advance(16.0).is_empty());
    }

    #[test]
    fn test_interval_fires_per_period() {
        let mut platform = ManualPlatform::new();
        let handle = platform.start_interval(400, 1).unwrap();
        assert!(platform.advance(399.0).is_empty());
        assert_eq!(platform.advance(1.0), vec![Wake::Spawn { generation: 1 }]);
        assert_eq!(platform.advance(800.0).len(), 2);
        platform.cancel_interval(handle);
        assert!(platform.advance(1000.0).is_empty());
    }

    #[test]
    fn test_keys_need_listener() {
        let mut platform = ManualPlatform::new();
        assert_eq!(platform.press(Key::Left), None);
        let handle = platform.listen_keys().unwrap();
        assert_eq!(platform.press(Key::Left), Some(Wake::Key { key: Key::Left }));
        platform.unlisten_keys(handle);
        assert_eq!(platform.key_listeners(), 0);
    }
}
