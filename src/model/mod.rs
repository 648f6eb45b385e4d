// MODEL: Scene description and state
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;

pub use camera::Camera;
pub use light::{Light, LightSource};
pub use material::Material;
pub use mesh::{Mesh, ShapeSpec};
pub use scene::Scene;
