#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl Topology {
    pub const ALL: [Topology; 5] = [
        Topology::Points,
        Topology::Lines,
        Topology::LineStrip,
        Topology::Triangles,
        Topology::TriangleStrip,
    ];

    pub fn is_strip(&self) -> bool {
        matches!(self, Topology::LineStrip | Topology::TriangleStrip)
    }

    pub fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Points => wgpu::PrimitiveTopology::PointList,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            Topology::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}
