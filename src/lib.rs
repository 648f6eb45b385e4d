pub mod assets;
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::ScenePreset;
pub use controller::{FrameLoop, InputEvent, RenderTarget};
pub use error::{ConfigError, InitError, Result, SceneError};
pub use model::Scene;

#[cfg(target_arch = "wasm32")]
use std::{cell::RefCell, rc::Rc};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue};
#[cfg(target_arch = "wasm32")]
use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

#[cfg(target_arch = "wasm32")]
use controller::{frame_loop::LoopControl, input::wasm as dom_input};
#[cfg(target_arch = "wasm32")]
use view::{GpuContext, Renderer};

#[cfg(target_arch = "wasm32")]
type SharedLoop = Rc<RefCell<FrameLoop<Renderer>>>;

/// Logging and the panic hook only; scenes are created by `create_scene`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    logging::init();
}

/// Builds a scene on `canvas` from a built-in preset name (`"basic"`,
/// `"physics"`) or preset TOML text, and starts its render loop.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn create_scene(canvas: HtmlCanvasElement, preset: String) -> std::result::Result<SceneHandle, JsValue> {
    logging::init();
    let preset = ScenePreset::resolve(&preset).map_err(SceneError::from)?;

    let window = web_sys::window().ok_or_else(|| host_error("no global `window`"))?;
    let document = window.document().ok_or_else(|| host_error("no document on window"))?;

    let dpr = window.device_pixel_ratio();
    let (width, height) = canvas_pixel_size(&canvas, dpr);
    canvas.set_width(width);
    canvas.set_height(height);

    let gpu = GpuContext::new(&canvas, width, height).await.map_err(SceneError::from)?;
    let renderer = Renderer::new(gpu, dpr as f32);
    let frame_loop: SharedLoop = Rc::new(RefCell::new(FrameLoop::from_preset(&preset, renderer)?));

    let listeners = register_listeners(&window, &document, &canvas, &frame_loop)?;
    let animation = AnimationLoop::start(window, {
        let frame_loop = frame_loop.clone();
        move |now| frame_loop.borrow_mut().frame(now)
    })?;

    Ok(SceneHandle { inner: Some(Running { frame_loop, animation, listeners }) })
}

#[cfg(target_arch = "wasm32")]
struct Running {
    frame_loop: SharedLoop,
    animation: AnimationLoop,
    listeners: Vec<EventListener>,
}

/// A live scene. `dispose()` stops the loop and removes every listener;
/// dropping the handle does the same.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct SceneHandle {
    inner: Option<Running>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SceneHandle {
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        let Some(running) = self.inner.take() else { return };
        running.animation.stop();
        let name = running.frame_loop.borrow().scene.name.clone();
        let listener_count = running.listeners.len();
        drop(running);
        tracing::info!("scene '{name}' disposed, {listener_count} listeners removed");
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.inner.as_ref().is_some_and(|r| r.animation.is_running())
    }

    #[wasm_bindgen(getter, js_name = sceneName)]
    pub fn scene_name(&self) -> Option<String> {
        self.inner.as_ref().map(|r| r.frame_loop.borrow().scene.name.clone())
    }

    #[wasm_bindgen(js_name = entityNames)]
    pub fn entity_names(&self) -> Vec<String> {
        self.inner
            .as_ref()
            .map(|r| r.frame_loop.borrow().scene.entities.iter().map(|e| e.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// A DOM event listener that unregisters itself when dropped.
#[cfg(target_arch = "wasm32")]
struct EventListener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl EventListener {
    fn new(target: &EventTarget, event: &'static str, f: impl FnMut(Event) + 'static) -> std::result::Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), event, callback })
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

#[cfg(target_arch = "wasm32")]
fn register_listeners(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    frame_loop: &SharedLoop,
) -> std::result::Result<Vec<EventListener>, JsValue> {
    let mut listeners = Vec::new();

    // Keyboard
    for (event, is_down) in [("keydown", true), ("keyup", false)] {
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(document, event, move |e: Event| {
            let Some(e) = e.dyn_ref::<KeyboardEvent>() else { return };
            if matches!(e.key().as_str(), "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                e.prevent_default();
            }
            frame_loop.borrow_mut().handle_event(dom_input::keyboard_event_to_input(e, is_down));
        })?);
    }

    // Resize: match the canvas backing store to its CSS size
    {
        let frame_loop = frame_loop.clone();
        let window_for_dpr = window.clone();
        let canvas = canvas.clone();
        listeners.push(EventListener::new(window, "resize", move |_e: Event| {
            let dpr = window_for_dpr.device_pixel_ratio();
            let (width, height) = canvas_pixel_size(&canvas, dpr);
            canvas.set_width(width);
            canvas.set_height(height);
            let mut frame_loop = frame_loop.borrow_mut();
            frame_loop.target_mut().set_pixels_per_point(dpr as f32);
            frame_loop.resize(width, height);
        })?);
    }

    // Pointer: press on the canvas, track moves and release anywhere
    {
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(canvas, "mousedown", move |e: Event| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                frame_loop.borrow_mut().handle_event(dom_input::pointer_down_to_input(e));
            }
        })?);
    }
    {
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(document, "mousemove", move |e: Event| {
            if let Some(e) = e.dyn_ref::<MouseEvent>() {
                frame_loop.borrow_mut().handle_event(dom_input::pointer_move_to_input(e));
            }
        })?);
    }
    {
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(document, "mouseup", move |_e: Event| {
            frame_loop.borrow_mut().handle_event(InputEvent::PointerUp);
        })?);
    }

    // Wheel zoom
    {
        let frame_loop = frame_loop.clone();
        listeners.push(EventListener::new(canvas, "wheel", move |e: Event| {
            if let Some(event) = dom_input::wheel_to_input(&e) {
                e.prevent_default();
                frame_loop.borrow_mut().handle_event(event);
            }
        })?);
    }

    tracing::debug!("registered {} listeners", listeners.len());
    Ok(listeners)
}

/// `requestAnimationFrame` loop that can be stopped.
#[cfg(target_arch = "wasm32")]
struct AnimationLoop {
    window: Window,
    control: Rc<RefCell<LoopControl>>,
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

#[cfg(target_arch = "wasm32")]
impl AnimationLoop {
    fn start(window: Window, mut f: impl FnMut(f64) + 'static) -> std::result::Result<Self, JsValue> {
        let control = Rc::new(RefCell::new(LoopControl::new()));
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));

        let weak_callback = Rc::downgrade(&callback);
        let window_for_loop = window.clone();
        let control_for_loop = control.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            if !control_for_loop.borrow_mut().fired() {
                return;
            }
            f(now);

            // Schedule the next frame
            let Some(callback) = weak_callback.upgrade() else { return };
            let callback = callback.borrow();
            let Some(closure) = callback.as_ref() else { return };
            match window_for_loop.request_animation_frame(closure.as_ref().unchecked_ref()) {
                Ok(id) => {
                    if !control_for_loop.borrow_mut().schedule(id) {
                        let _ = window_for_loop.cancel_animation_frame(id);
                    }
                }
                Err(e) => tracing::error!("requestAnimationFrame failed: {e:?}"),
            }
        }) as Box<dyn FnMut(f64)>));

        let id = {
            let first = callback.borrow();
            let closure = first.as_ref().ok_or_else(|| host_error("animation callback missing"))?;
            window.request_animation_frame(closure.as_ref().unchecked_ref())?
        };
        control.borrow_mut().schedule(id);

        Ok(Self { window, control, callback })
    }

    fn is_running(&self) -> bool {
        self.control.borrow().is_running()
    }

    fn stop(&self) {
        if let Some(id) = self.control.borrow_mut().stop() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
        self.callback.borrow_mut().take();
    }
}

#[cfg(target_arch = "wasm32")]
fn canvas_pixel_size(canvas: &HtmlCanvasElement, dpr: f64) -> (u32, u32) {
    let (css_w, css_h) = (canvas.client_width(), canvas.client_height());
    if css_w > 0 && css_h > 0 {
        ((css_w as f64 * dpr).round() as u32, (css_h as f64 * dpr).round() as u32)
    } else {
        (canvas.width().max(1), canvas.height().max(1))
    }
}

#[cfg(target_arch = "wasm32")]
fn host_error(msg: &str) -> JsValue {
    SceneError::from(InitError::Host(msg.to_string())).into()
}
