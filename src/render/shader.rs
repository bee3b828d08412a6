use crate::error::{Error, Result};
use crate::render::context::{AttributeLocation, VertexAttributeLayout};

pub const POSITION_ATTRIBUTE: &str = "position";
pub const TEX_COORD_ATTRIBUTE: &str = "tex_coord";

#[derive(Clone, Debug, PartialEq)]
pub struct ProgramAttribute {
    pub name: &'static str,
    pub location: AttributeLocation,
    pub format: wgpu::VertexFormat,
}

pub struct ShaderProgram {
    pub shader_module: wgpu::ShaderModule,
    attributes: Vec<ProgramAttribute>,
}

impl ShaderProgram {
    pub fn textured(name: &str, device: &wgpu::Device) -> Self {
        log::debug!("Creating shader program {name}");

        Self {
            shader_module: device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{name}_SHADER_MODULE")),
                source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
            }),
            attributes: textured_attributes(),
        }
    }

    pub fn attributes(&self) -> &[ProgramAttribute] {
        &self.attributes
    }

    pub fn attribute_location(&self, name: &str) -> Result<AttributeLocation> {
        find_attribute(&self.attributes, name)
    }

    pub fn vertex_inputs(&self) -> Vec<(AttributeLocation, VertexAttributeLayout)> {
        vertex_inputs(&self.attributes)
    }
}

fn vertex_inputs(
    attributes: &[ProgramAttribute],
) -> Vec<(AttributeLocation, VertexAttributeLayout)> {
    let float_size = std::mem::size_of::<f32>() as u64;

    attributes
        .iter()
        .map(|attribute| {
            let components = (attribute.format.size() / float_size) as u32;
            (attribute.location, VertexAttributeLayout::packed_floats(components))
        })
        .collect()
}

fn textured_attributes() -> Vec<ProgramAttribute> {
    vec![
        ProgramAttribute {
            name: POSITION_ATTRIBUTE,
            location: AttributeLocation(0),
            format: wgpu::VertexFormat::Float32x3,
        },
        ProgramAttribute {
            name: TEX_COORD_ATTRIBUTE,
            location: AttributeLocation(1),
            format: wgpu::VertexFormat::Float32x2,
        },
    ]
}

fn find_attribute(attributes: &[ProgramAttribute], name: &str) -> Result<AttributeLocation> {
    attributes
        .iter()
        .find(|attribute| attribute.name == name)
        .map(|attribute| attribute.location)
        .ok_or_else(|| Error::context(format!("Shader program has no attribute named {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textured_attribute_locations_are_contiguous() {
        let attributes = textured_attributes();

        for (slot, attribute) in attributes.iter().enumerate() {
            assert_eq!(attribute.location, AttributeLocation(slot as u32));
        }
        assert_eq!(
            find_attribute(&attributes, TEX_COORD_ATTRIBUTE),
            Ok(AttributeLocation(1))
        );
        assert!(find_attribute(&attributes, "normal").is_err());
    }

    #[test]
    fn vertex_inputs_match_the_pipeline_strides() {
        let attributes = textured_attributes();
        let inputs = vertex_inputs(&attributes);

        assert_eq!(
            inputs,
            vec![
                (AttributeLocation(0), VertexAttributeLayout::packed_floats(3)),
                (AttributeLocation(1), VertexAttributeLayout::packed_floats(2)),
            ]
        );
        for (attribute, (_, layout)) in attributes.iter().zip(inputs.iter()) {
            assert_eq!(layout.effective_stride(), attribute.format.size());
        }
    }
}
