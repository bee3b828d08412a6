use crate::error::Result;
use crate::render::mesh::Mesh;
use crate::render::primitive::Topology;

//  2 ---- 3
//  |      |
//  0 ---- 1
const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];
const BASE_TEX_COORDS: [f32; 8] = [0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0];

/// Screen-aligned quad covering `[-half_extent, half_extent]` in clip space.
pub fn quad(topology: Topology, half_extent: f32) -> Result<Mesh> {
    let positions: Vec<f32> = CORNERS
        .iter()
        .flat_map(|[x, y]| [x * half_extent, y * half_extent, 0.0])
        .collect();

    let indices = match topology {
        Topology::Points => vec![0, 1, 2, 3],
        Topology::Lines => vec![0, 1, 1, 3, 3, 2, 2, 0, 0, 3],
        Topology::LineStrip => vec![0, 1, 3, 2, 0],
        Topology::Triangles => vec![0, 1, 2, 2, 1, 3],
        Topology::TriangleStrip => vec![0, 1, 2, 3],
    };

    Mesh::new(positions, BASE_TEX_COORDS.to_vec(), indices, topology)
}

pub struct TexCoordScroller {
    velocity: [f32; 2],
    offset: [f32; 2],
}

impl TexCoordScroller {
    pub fn new(velocity: [f32; 2]) -> Self {
        Self {
            velocity,
            offset: [0.0, 0.0],
        }
    }

    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    // Offset stays in [0, 1); the texture repeats.
    pub fn advance(&mut self, delta_time: std::time::Duration) -> Vec<f32> {
        let seconds = delta_time.as_secs_f32();

        for (offset, velocity) in self.offset.iter_mut().zip(self.velocity) {
            *offset = (*offset + velocity * seconds).rem_euclid(1.0);
        }

        BASE_TEX_COORDS
            .chunks_exact(2)
            .flat_map(|uv| [uv[0] + self.offset[0], uv[1] + self.offset[1]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn quad_is_valid_for_every_topology() {
        for topology in Topology::ALL {
            let mesh = quad(topology, 0.5).unwrap();
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.topology(), topology);
            assert_eq!(&mesh.positions()[9..12], &[0.5, 0.5, 0.0]);
        }

        assert_eq!(quad(Topology::Triangles, 1.0).unwrap().index_count(), 6);
    }

    #[test]
    fn scroller_wraps_offset() {
        let mut scroller = TexCoordScroller::new([0.5, -0.25]);

        scroller.advance(Duration::from_secs(1));
        assert_eq!(scroller.offset(), [0.5, 0.75]);

        let tex_coords = scroller.advance(Duration::from_secs(1));
        assert_eq!(scroller.offset(), [0.0, 0.5]);
        assert_eq!(tex_coords.len(), BASE_TEX_COORDS.len());
        assert_eq!(&tex_coords[..2], &[0.0, 1.5]);
    }

    #[test]
    fn stationary_scroller_returns_base_coordinates() {
        let mut scroller = TexCoordScroller::new([0.0, 0.0]);
        assert_eq!(
            scroller.advance(Duration::from_millis(16)),
            BASE_TEX_COORDS.to_vec()
        );
    }
}
