use egui::Context;

use crate::controller::frame_loop::FrameInfo;
use crate::model::Scene;

/// Debug window: frame rate, camera, held keys and the actuated body.
pub fn draw_overlay(ctx: &Context, scene: &Scene, info: &FrameInfo) {
    let eye = scene.camera.eye();
    let body = info.controlled.and_then(|handle| scene.body(handle));

    egui::Window::new("Debug")
        .default_pos([8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(egui::RichText::new(format!("FPS: {:.0}", info.fps)).small());
            ui.label(egui::RichText::new(format!("Scene: {} ({} meshes)", scene.name, scene.entities.len())).small());
            ui.label(
                egui::RichText::new(format!(
                    "Camera ({}): {:.1}, {:.1}, {:.1}",
                    scene.camera.kind_name(),
                    eye.x,
                    eye.y,
                    eye.z
                ))
                .small(),
            );

            let keys = if info.held_keys.is_empty() { "-".to_string() } else { info.held_keys.join(" ") };
            ui.label(egui::RichText::new(format!("Keys: {keys}")).small());

            if let Some(body) = body {
                ui.separator();
                let p = body.position;
                ui.label(egui::RichText::new(format!("Body: {:.2}, {:.2}, {:.2}", p.x, p.y, p.z)).small());
                ui.label(egui::RichText::new(format!("Speed: {:.3}", body.velocity.length())).small());
            }
        });
}
