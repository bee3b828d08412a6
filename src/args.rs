use crate::render::primitive::Topology;

#[derive(Clone, Debug)]
pub struct Args {
    pub topology: Topology,
    pub scroll_velocity: [f32; 2],
    pub checkerboard_tiles: u32,
    pub log_filter: Option<String>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            topology: Topology::Triangles,
            scroll_velocity: [0.1, 0.0],
            checkerboard_tiles: 8,
            log_filter: None,
        }
    }
}
