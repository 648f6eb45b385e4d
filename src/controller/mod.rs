// CONTROLLER: Input, simulation and the update loop
pub mod actuator;
pub mod camera_controller;
pub mod frame_loop;
pub mod input;
pub mod physics;

pub use actuator::ImpulseActuator;
pub use camera_controller::CameraController;
pub use frame_loop::{FrameInfo, FrameLoop, LoopControl, RenderTarget};
pub use input::{InputEvent, InputState};
pub use physics::PhysicsWorld;
