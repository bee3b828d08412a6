use std::collections::HashMap;

use anyhow::Result;

use crate::render::context::gpu::WgpuRenderContext;
use crate::render::context::RenderContext;
use crate::render::mesh::Mesh;
use crate::render::pipeline::RenderPipeline;
use crate::render::primitive::Topology;
use crate::render::shader::{ShaderProgram, POSITION_ATTRIBUTE, TEX_COORD_ATTRIBUTE};
use crate::render::state::RenderSystemState;
use crate::render::texture::Texture2DPackage;

pub mod buffer;
pub mod context;
pub mod mesh;
mod pipeline;
pub mod primitive;
mod shader;
mod state;
mod texture;

const CHECKERBOARD_DIMENSION: u32 = 256;

pub struct RenderSystem {
    state: RenderSystemState,
    context: WgpuRenderContext,
    program: ShaderProgram,
    pipelines: HashMap<Topology, RenderPipeline>,
    #[allow(dead_code)]
    texture: Texture2DPackage,
    texture_bind_group: wgpu::BindGroup,
}

impl RenderSystem {
    pub async fn from_window(
        window: std::sync::Arc<winit::window::Window>,
        checkerboard_tiles: u32,
    ) -> Result<Self> {
        let state = RenderSystemState::from_window(window).await?;

        let program = ShaderProgram::textured("TEXTURED", &state.device);

        let context = WgpuRenderContext::for_program(
            state.device.clone(),
            state.queue.clone(),
            program.vertex_inputs(),
        );

        let pipelines = Topology::ALL
            .iter()
            .map(|topology| {
                let pipeline = RenderPipeline::from_program(
                    *topology,
                    &format!("TEXTURED_{topology:?}"),
                    &state.device,
                    &[&state.texture_bind_group_layout],
                    &program,
                    state.surface_config.format,
                );
                (*topology, pipeline)
            })
            .collect();

        let texture = Texture2DPackage::checkerboard(
            "CHECKERBOARD_TEXTURE",
            CHECKERBOARD_DIMENSION,
            checkerboard_tiles,
            &state.device,
            &state.queue,
        );

        let texture_bind_group = state.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("CHECKERBOARD_TEXTURE_BIND_GROUP"),
            layout: &state.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.gpu_texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.gpu_sampler),
                },
            ],
        });

        Ok(Self {
            state,
            context,
            program,
            pipelines,
            texture,
            texture_bind_group,
        })
    }

    pub fn context_mut(&mut self) -> &mut WgpuRenderContext {
        &mut self.context
    }

    pub fn sync_view_dimensions(&mut self) {
        self.set_view_dimensions(self.state.view_dimensions);
    }

    pub fn set_view_dimensions(&mut self, view_dimensions: winit::dpi::PhysicalSize<u32>) {
        if view_dimensions.width == 0 || view_dimensions.height == 0 {
            return;
        }

        self.state.set_view_dimensions(view_dimensions);
    }

    pub fn render(&mut self, meshes: &[&Mesh]) -> Result<()> {
        self.context.collect_orphaned_buffers();

        let output = self.state.surface.get_current_texture()?;

        let position = self.program.attribute_location(POSITION_ATTRIBUTE)?;
        let tex_coord = self.program.attribute_location(TEX_COORD_ATTRIBUTE)?;
        self.context.record_frame(|context| {
            meshes
                .iter()
                .try_for_each(|mesh| mesh.draw(context, position, tex_coord))
        })?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.state
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("RENDER_SYSTEM_COMMAND_ENCODER"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("RENDER_SYSTEM_RENDER_PASS"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.texture_bind_group, &[]);

            let pipelines = &self.pipelines;
            self.context.replay_draws(&mut render_pass, |topology| {
                pipelines
                    .get(&topology)
                    .map(|pipeline| &pipeline.gpu_pipeline)
            })?;
        }

        self.state.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
