//! Browser platform: requestAnimationFrame, setInterval, a window keydown
//! listener and a Canvas 2D backend.

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{KeyboardEvent, Window};

use super::{Platform, PlatformError, TaskHandle, Wake};
use crate::input::Key;
use crate::renderer::{CanvasRenderer, Frame};

/// Receives every callback the browser fires for the game
pub type Dispatch = Rc<dyn Fn(Wake)>;

pub struct WebPlatform {
    window: Window,
    renderer: CanvasRenderer,
    dispatch: Dispatch,
    next_handle: u64,
    /// rAF ids by handle
    frames: HashMap<TaskHandle, i32>,
    /// Interval ids with the closures they keep alive
    intervals: HashMap<TaskHandle, (i32, Closure<dyn FnMut()>)>,
    key_listeners: HashMap<TaskHandle, Closure<dyn FnMut(KeyboardEvent)>>,
}

impl WebPlatform {
    pub fn new(window: Window, renderer: CanvasRenderer, dispatch: Dispatch) -> Self {
        Self {
            window,
            renderer,
            dispatch,
            next_handle: 0,
            frames: HashMap::new(),
            intervals: HashMap::new(),
            key_listeners: HashMap::new(),
        }
    }

    fn handle(&mut self) -> TaskHandle {
        self.next_handle += 1;
        TaskHandle(self.next_handle)
    }
}

fn js_reason(err: wasm_bindgen::JsValue) -> String {
    format!("{:?}", err)
}

impl Platform for WebPlatform {
    fn request_frame(&mut self, generation: u64) -> Result<TaskHandle, PlatformError> {
        let dispatch = self.dispatch.clone();
        let callback = Closure::once_into_js(move |timestamp_ms: f64| {
            dispatch(Wake::Frame {
                generation,
                timestamp_ms,
            });
        });
        let id = self
            .window
            .request_animation_frame(callback.unchecked_ref())
            .map_err(|e| PlatformError::Schedule {
                what: "animation frame",
                reason: js_reason(e),
            })?;
        let handle = self.handle();
        // Fired frames are never cancelled, so only the newest id matters
        self.frames.clear();
        self.frames.insert(handle, id);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: TaskHandle) {
        if let Some(id) = self.frames.remove(&handle) {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {:?}", e);
            }
        }
    }

    fn start_interval(
        &mut self,
        period_ms: u32,
        generation: u64,
    ) -> Result<TaskHandle, PlatformError> {
        let dispatch = self.dispatch.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            dispatch(Wake::Spawn { generation });
        });
        let id = self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                period_ms.min(i32::MAX as u32) as i32,
            )
            .map_err(|e| PlatformError::Schedule {
                what: "spawn interval",
                reason: js_reason(e),
            })?;
        let handle = self.handle();
        self.intervals.insert(handle, (id, callback));
        Ok(handle)
    }

    fn cancel_interval(&mut self, handle: TaskHandle) {
        if let Some((id, _callback)) = self.intervals.remove(&handle) {
            self.window.clear_interval_with_handle(id);
        }
    }

    fn listen_keys(&mut self) -> Result<TaskHandle, PlatformError> {
        let dispatch = self.dispatch.clone();
        let callback = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let Some(key) = Key::from_dom(&event.key()) else {
                return;
            };
            // Keep arrow keys from scrolling the page
            if matches!(key, Key::Left | Key::Right) {
                event.prevent_default();
            }
            dispatch(Wake::Key { key });
        });
        self.window
            .add_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
            .map_err(|e| PlatformError::Listener(js_reason(e)))?;
        let handle = self.handle();
        self.key_listeners.insert(handle, callback);
        Ok(handle)
    }

    fn unlisten_keys(&mut self, handle: TaskHandle) {
        if let Some(callback) = self.key_listeners.remove(&handle) {
            if let Err(e) = self
                .window
                .remove_event_listener_with_callback("keydown", callback.as_ref().unchecked_ref())
            {
                log::warn!("removeEventListener failed: {:?}", e);
            }
        }
    }

    fn present(&mut self, frame: &Frame) -> Result<(), PlatformError> {
        self.renderer
            .draw(frame)
            .map_err(|e| PlatformError::Render(e.to_string()))
    }

    fn navigate(&mut self, route: &str) {
        if let Err(e) = self.window.location().assign(route) {
            log::error!("Navigation to {} failed: {:?}", route, e);
        }
    }
}
