use std::sync::Arc;
use std::time::Instant;

use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::Window,
};

use scenecraft::{
    logging,
    view::{GpuContext, Renderer},
    FrameLoop, InputEvent, ScenePreset,
};

/// DOM wheel deltas are in pixels, roughly 40 per line.
const PIXELS_PER_LINE: f32 = 40.0;

struct App {
    window: Arc<Window>,
    frame_loop: FrameLoop<Renderer>,
    start: Instant,
    cursor: Option<(f64, f64)>,
}

impl App {
    fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, logical_key, .. }, .. } => {
                if let Some(key) = dom_key(logical_key) {
                    let event = match state {
                        ElementState::Pressed => InputEvent::KeyDown(key),
                        ElementState::Released => InputEvent::KeyUp(key),
                    };
                    self.frame_loop.handle_event(event);
                }
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                let event = match state {
                    ElementState::Pressed => {
                        let (x, y) = self.cursor.unwrap_or_default();
                        InputEvent::PointerDown { x: x as f32, y: y as f32 }
                    }
                    ElementState::Released => InputEvent::PointerUp,
                };
                self.frame_loop.handle_event(event);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some((lx, ly)) = self.cursor {
                    self.frame_loop.handle_event(InputEvent::PointerMove {
                        dx: (position.x - lx) as f32,
                        dy: (position.y - ly) as f32,
                    });
                }
                self.cursor = Some((position.x, position.y));
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports scrolling up as positive, the DOM as negative
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * PIXELS_PER_LINE,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                self.frame_loop.handle_event(InputEvent::Wheel { delta_y });
                true
            }
            _ => false,
        }
    }

    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Maps a winit key onto its DOM `KeyboardEvent.key` name.
fn dom_key(key: &Key) -> Option<String> {
    let name = match key {
        Key::Character(c) => return Some(c.to_string()),
        Key::Named(NamedKey::ArrowUp) => "ArrowUp",
        Key::Named(NamedKey::ArrowDown) => "ArrowDown",
        Key::Named(NamedKey::ArrowLeft) => "ArrowLeft",
        Key::Named(NamedKey::ArrowRight) => "ArrowRight",
        Key::Named(NamedKey::Space) => " ",
        Key::Named(NamedKey::Shift) => "Shift",
        Key::Named(NamedKey::Control) => "Control",
        Key::Named(NamedKey::Enter) => "Enter",
        Key::Named(NamedKey::Escape) => "Escape",
        _ => return None,
    };
    Some(name.to_string())
}

fn run(preset: ScenePreset) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    let window_attributes = Window::default_attributes()
        .with_title(format!("scenecraft - {}", preset.name))
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let size = window.inner_size();
    let gpu = pollster::block_on(GpuContext::new_native(window.clone(), size.width, size.height))?;
    let renderer = Renderer::new(gpu, window.scale_factor() as f32);
    let frame_loop = FrameLoop::from_preset(&preset, renderer)?;

    let mut app = App { window, frame_loop, start: Instant::now(), cursor: None };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == app.window.id() => {
            if !app.input(event) {
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::Resized(physical_size) => {
                        app.frame_loop.resize(physical_size.width, physical_size.height);
                    }
                    WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                        app.frame_loop.target_mut().set_pixels_per_point(*scale_factor as f32);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = app.now_ms();
                        app.frame_loop.frame(now);
                    }
                    _ => {}
                }
            }
        }
        Event::AboutToWait => {
            app.window.request_redraw();
        }
        _ => {}
    })?;

    Ok(())
}

fn main() {
    logging::init();

    let preset_arg = std::env::args().nth(1).unwrap_or_else(|| "basic".to_string());
    let preset = match ScenePreset::load(&preset_arg) {
        Ok(preset) => preset,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(preset) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
