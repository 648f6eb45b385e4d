use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::controller::frame_loop::{FrameInfo, RenderTarget};
use crate::error::InitError;
use crate::model::light::{LightUniform, MAX_LIGHTS};
use crate::model::mesh::{MeshBuffer, Vertex};
use crate::model::scene::Entity;
use crate::model::Scene;
use crate::ui;
use crate::view::gpu_init::GpuContext;
use crate::view::texture::{self, Texture};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
    pub counts: [u32; 4],
    pub lights: [LightUniform; MAX_LIGHTS],
}

impl FrameUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let mut lights = [LightUniform::zeroed(); MAX_LIGHTS];
        for (slot, light) in lights.iter_mut().zip(&scene.lights) {
            *slot = light.to_uniform();
        }
        let eye = scene.camera.eye();
        Self {
            view_proj: scene.camera.view_proj().to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
            counts: [scene.lights.len().min(MAX_LIGHTS) as u32, 0, 0, 0],
            lights,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emissive: [f32; 4],
    pub params: [f32; 4],
    pub mask: [u32; 4],
}

impl ObjectUniform {
    pub fn from_entity(entity: &Entity) -> Self {
        let model = entity.transform.matrix();
        let normal = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        let m = &entity.material;
        Self {
            model: model.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            diffuse: [m.diffuse_color[0], m.diffuse_color[1], m.diffuse_color[2], m.alpha],
            specular: [m.specular_color[0], m.specular_color[1], m.specular_color[2], m.specular_power],
            emissive: [m.emissive_color[0], m.emissive_color[1], m.emissive_color[2], 0.0],
            params: [m.uv_scale[0], m.uv_scale[1], 0.0, 0.0],
            mask: [entity.layer_mask, 0, 0, 0],
        }
    }
}

struct DrawItem {
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Forward renderer for a [`Scene`], with the egui debug overlay on top.
pub struct Renderer {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    white: Texture,
    textures: HashMap<String, Texture>,
    items: Vec<DrawItem>,
    depth: Texture,
    pixels_per_point: f32,
    egui_ctx: egui::Context,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub fn new(gpu: GpuContext, pixels_per_point: f32) -> Self {
        let device = gpu.device.as_ref();

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        });

        let pipeline = create_scene_pipeline(device, gpu.format, &[&frame_layout, &object_layout]);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let white = Texture::white(device, &gpu.queue);
        let depth = Texture::depth(device, gpu.config.width, gpu.config.height);

        let egui_ctx = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            gpu,
            pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            sampler,
            white,
            textures: HashMap::new(),
            items: Vec::new(),
            depth,
            pixels_per_point,
            egui_ctx,
            egui_renderer,
        }
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point.max(0.25);
    }

    fn texture_for(&mut self, path: Option<&str>) -> Result<&Texture, InitError> {
        let Some(path) = path else { return Ok(&self.white) };
        if !self.textures.contains_key(path) {
            let texture = Texture::from_asset(&self.gpu.device, &self.gpu.queue, path)?;
            self.textures.insert(path.to_string(), texture);
        }
        Ok(&self.textures[path])
    }

    fn create_item(&mut self, entity: &Entity) -> Result<DrawItem, InitError> {
        let uniform_buffer = self.gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_uniform", entity.name)),
            contents: bytemuck::bytes_of(&ObjectUniform::from_entity(entity)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let mesh = entity.mesh.upload(&self.gpu.device);

        let texture_view = self.texture_for(entity.material.diffuse_texture.as_deref())?.view.clone();
        let bind_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}_bind_group", entity.name)),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&texture_view) },
                wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(&self.sampler) },
            ],
        });

        Ok(DrawItem { mesh, uniform_buffer, bind_group })
    }

    fn write_uniforms(&self, scene: &Scene) {
        let queue = &self.gpu.queue;
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&FrameUniform::from_scene(scene)));
        for (item, entity) in self.items.iter().zip(&scene.entities) {
            queue.write_buffer(&item.uniform_buffer, 0, bytemuck::bytes_of(&ObjectUniform::from_entity(entity)));
        }
    }

    fn run_overlay(&mut self, scene: &Scene, info: &FrameInfo) -> (Vec<egui::ClippedPrimitive>, egui::TexturesDelta) {
        let ppp = self.pixels_per_point;
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(self.gpu.config.width as f32 / ppp, self.gpu.config.height as f32 / ppp),
            )),
            ..Default::default()
        };
        self.egui_ctx.set_pixels_per_point(ppp);

        let output = self.egui_ctx.run(raw_input, |ctx| ui::draw_overlay(ctx, scene, info));
        let primitives = self.egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        (primitives, output.textures_delta)
    }

    fn acquire(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(e) => {
                tracing::warn!("skipping frame: {e}");
                None
            }
        }
    }
}

impl RenderTarget for Renderer {
    fn prepare(&mut self, scene: &Scene) -> Result<(), InitError> {
        self.items.clear();
        for entity in &scene.entities {
            let item = self.create_item(entity)?;
            self.items.push(item);
        }
        tracing::debug!("uploaded {} meshes, {} textures", self.items.len(), self.textures.len());
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.depth = Texture::depth(&self.gpu.device, width, height);
        tracing::debug!("resized to {width}x{height}");
    }

    fn render(&mut self, scene: &Scene, info: &FrameInfo) {
        self.write_uniforms(scene);

        let overlay = scene.show_overlay.then(|| self.run_overlay(scene, info));

        let Some(frame) = self.acquire() else { return };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let device = self.gpu.device.as_ref();
        let queue = self.gpu.queue.as_ref();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });

        let [r, g, b, a] = scene.clear_color.map(f64::from);
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.frame_bind_group, &[]);
            for item in self.items.iter().filter(|item| item.mesh.index_count > 0) {
                rp.set_bind_group(1, &item.bind_group, &[]);
                rp.set_vertex_buffer(0, item.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(item.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rp.draw_indexed(0..item.mesh.index_count, 0, 0..1);
            }
        }

        let mut command_buffers = Vec::new();
        if let Some((primitives, textures_delta)) = overlay {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.gpu.config.width, self.gpu.config.height],
                pixels_per_point: self.pixels_per_point,
            };

            for (id, image_delta) in &textures_delta.set {
                self.egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            command_buffers =
                self.egui_renderer.update_buffers(device, queue, &mut encoder, &primitives, &screen_descriptor);

            {
                let egui_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                self.egui_renderer.render(&mut egui_pass.forget_lifetime(), &primitives, &screen_descriptor);
            }

            for id in &textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        command_buffers.push(encoder.finish());
        queue.submit(command_buffers);
        frame.present();
    }

    fn size(&self) -> (u32, u32) {
        (self.gpu.config.width, self.gpu.config.height)
    }
}

fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x2 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenePreset;

    #[test]
    fn uniform_layouts_match_the_shader() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 96);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 64 + 16 + 16 + 96 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 * 2 + 16 * 5);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }

    #[test]
    fn frame_uniform_caps_light_count() {
        let mut scene = Scene::from_preset(&ScenePreset::builtin("physics").unwrap(), 800, 600);
        assert_eq!(FrameUniform::from_scene(&scene).counts[0], 2);
        let extra = scene.lights[0].clone();
        scene.lights.extend(std::iter::repeat(extra).take(4));
        let uniform = FrameUniform::from_scene(&scene);
        assert_eq!(uniform.counts[0], MAX_LIGHTS as u32);
    }

    #[test]
    fn object_uniform_carries_material_and_mask() {
        let scene = Scene::from_preset(&ScenePreset::builtin("physics").unwrap(), 800, 600);
        let ground = ObjectUniform::from_entity(scene.entity("ground").unwrap());
        assert_eq!(&ground.params[..2], &[4.0, 4.0]);
        assert_eq!(ground.mask[0], crate::config::DEFAULT_LAYER_MASK);
        let sphere = ObjectUniform::from_entity(scene.entity("sphere").unwrap());
        assert_eq!(sphere.model[3][1], 2.0);
        assert_eq!(sphere.specular[3], 64.0);
    }
}
