use crate::config::ScenePreset;
use crate::controller::actuator::ImpulseActuator;
use crate::controller::camera_controller::CameraController;
use crate::controller::input::{ActionManager, InputEvent, InputState, SceneAction};
use crate::controller::physics::BodyHandle;
use crate::error::{ConfigError, InitError, Result};
use crate::model::Scene;

/// Longest simulated step; slower frames are slowed down rather than split.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Whatever draws the scene: the wgpu renderer, or a recorder in tests.
pub trait RenderTarget {
    /// Uploads whatever the target needs for `scene`; called once before the first frame.
    fn prepare(&mut self, _scene: &Scene) -> Result<(), InitError> {
        Ok(())
    }
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, scene: &Scene, info: &FrameInfo);
    fn size(&self) -> (u32, u32);
}

/// Per-frame data handed to the render target alongside the scene.
#[derive(Debug, Clone, Default)]
pub struct FrameInfo {
    pub dt: f32,
    pub fps: f32,
    pub frame: u64,
    pub held_keys: Vec<String>,
    pub controlled: Option<BodyHandle>,
}

/// Owns the scene, input map, actuator and timing; turns timestamps and
/// input events into simulation steps and render calls.
pub struct FrameLoop<R: RenderTarget> {
    pub scene: Scene,
    pub input: InputState,
    target: R,
    actuator: Option<(ImpulseActuator, BodyHandle)>,
    actions: ActionManager,
    camera_controller: CameraController,
    last_time_ms: Option<f64>,
    frame: u64,
    fps: f32,
}

impl<R: RenderTarget> FrameLoop<R> {
    pub fn new(
        scene: Scene,
        target: R,
        actuator: Option<(ImpulseActuator, BodyHandle)>,
        actions: ActionManager,
    ) -> Self {
        Self {
            scene,
            input: InputState::new(),
            target,
            actuator,
            actions,
            camera_controller: CameraController::new(),
            last_time_ms: None,
            frame: 0,
            fps: 0.0,
        }
    }

    pub fn from_preset(preset: &ScenePreset, mut target: R) -> Result<Self> {
        let (width, height) = target.size();
        let scene = Scene::from_preset(preset, width, height);

        let actuator = match &preset.actuator {
            Some(spec) => {
                let handle = scene
                    .entity(&spec.body)
                    .and_then(|e| e.body)
                    .ok_or_else(|| ConfigError::ActuatorWithoutBody(spec.body.clone()))?;
                Some((ImpulseActuator::new(spec.config.clone()), handle))
            }
            None => None,
        };

        target.prepare(&scene)?;

        tracing::info!(
            "scene '{}' ready: {} meshes, {} lights, {} camera{}",
            scene.name,
            scene.entities.len(),
            scene.lights.len(),
            scene.camera.kind_name(),
            if actuator.is_some() { ", keyboard actuator" } else { "" }
        );

        Ok(Self::new(scene, target, actuator, ActionManager::new(preset.actions.clone())))
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn controlled_body(&self) -> Option<BodyHandle> {
        self.actuator.as_ref().map(|(_, handle)| *handle)
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        let actions = self.actions.dispatch(&event, &self.input);
        self.input.process_event(&event);
        for action in actions {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: SceneAction) {
        match action {
            SceneAction::ResetBodies => self.scene.reset_bodies(),
            SceneAction::ToggleOverlay => {
                self.scene.show_overlay = !self.scene.show_overlay;
                tracing::debug!("overlay {}", if self.scene.show_overlay { "shown" } else { "hidden" });
            }
        }
    }

    /// Runs one frame at the given timestamp in milliseconds.
    pub fn frame(&mut self, now_ms: f64) {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT as f64) as f32,
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);

        self.step(dt);

        if dt > 0.0 {
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }
        self.frame += 1;

        let info = FrameInfo {
            dt,
            fps: self.fps,
            frame: self.frame,
            held_keys: self.input.held_keys(),
            controlled: self.controlled_body(),
        };
        self.target.render(&self.scene, &info);
    }

    /// Actuator, physics, transform sync and camera, in that order.
    pub fn step(&mut self, dt: f32) {
        if let (Some((actuator, handle)), Some(world)) = (&self.actuator, self.scene.physics.as_mut()) {
            if let Some(body) = world.body_mut(*handle) {
                actuator.update(&self.input, body);
            }
        }

        if let Some(world) = self.scene.physics.as_mut() {
            world.step(dt);
        }
        self.scene.sync_from_physics();

        let follow_target = self.scene.follow_target();
        let grounds = self.scene.grounds();
        self.camera_controller
            .update(&mut self.scene.camera, &mut self.input, follow_target, &grounds, dt);
    }

    /// Forwards one resize to the render target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.scene.camera.set_aspect(width, height);
        self.target.resize(width, height);
    }
}

/// Running flag plus the id of the pending animation frame, so a stopped
/// loop neither reschedules nor leaves a callback queued.
#[derive(Debug, Default)]
pub struct LoopControl {
    running: bool,
    pending: Option<i32>,
}

impl LoopControl {
    pub fn new() -> Self {
        Self { running: true, pending: None }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Records a requested frame. Returns `false` once stopped, in which case
    /// the caller cancels `id` itself.
    pub fn schedule(&mut self, id: i32) -> bool {
        if self.running {
            self.pending = Some(id);
        }
        self.running
    }

    /// Called at the top of the frame callback; `false` means skip the frame.
    pub fn fired(&mut self) -> bool {
        self.pending = None;
        self.running
    }

    /// Stops the loop and hands back the frame to cancel, once.
    pub fn stop(&mut self) -> Option<i32> {
        self.running = false;
        self.pending.take()
    }
}
