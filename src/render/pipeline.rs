use crate::render::primitive::Topology;
use crate::render::shader::{ProgramAttribute, ShaderProgram};

pub struct RenderPipeline {
    pub gpu_pipeline: wgpu::RenderPipeline,
}

impl RenderPipeline {
    pub fn from_program(
        topology: Topology,
        name: &str,
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        program: &ShaderProgram,
        format: wgpu::TextureFormat,
    ) -> Self {
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name}_RENDER_PIPELINE_LAYOUT")),
                bind_group_layouts,
                push_constant_ranges: &[],
            });

        let vertex_buffer_layout_builder =
            VertexBufferLayoutBuilder::from_attributes(program.attributes());

        let gpu_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{name}_RENDER_PIPELINE")),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &program.shader_module,
                entry_point: "vs_main",
                buffers: &vertex_buffer_layout_builder.build(),
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent::REPLACE,
                        alpha: wgpu::BlendComponent::REPLACE,
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: topology.to_wgpu(),
                strip_index_format: match topology.is_strip() {
                    true => Some(wgpu::IndexFormat::Uint16),
                    false => None,
                },
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        Self { gpu_pipeline }
    }
}

// One packed vertex buffer per attribute, slot N feeding location N.
#[derive(Default)]
struct VertexBufferLayoutBuilder {
    entries: Vec<VertexBufferLayoutBuilderEntry>,
}

impl VertexBufferLayoutBuilder {
    fn from_attributes(attributes: &[ProgramAttribute]) -> Self {
        let mut sorted: Vec<_> = attributes.iter().collect();
        sorted.sort_by_key(|attribute| attribute.location);

        let mut builder: VertexBufferLayoutBuilder = Default::default();
        for attribute in sorted {
            builder.add(VertexBufferLayoutBuilderEntry {
                array_stride: attribute.format.size(),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: vec![wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: attribute.location.0,
                    format: attribute.format,
                }],
            });
        }

        builder
    }

    pub fn add(&mut self, entry: VertexBufferLayoutBuilderEntry) {
        self.entries.push(entry);
    }

    pub fn build(&self) -> Vec<wgpu::VertexBufferLayout> {
        self.entries
            .iter()
            .map(|entry| wgpu::VertexBufferLayout {
                array_stride: entry.array_stride,
                step_mode: entry.step_mode,
                attributes: &entry.attributes,
            })
            .collect()
    }
}

struct VertexBufferLayoutBuilderEntry {
    array_stride: wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode,
    attributes: Vec<wgpu::VertexAttribute>,
}
