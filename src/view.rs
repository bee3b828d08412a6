use anyhow::Result;

use crate::args::Args;
use crate::quad::{quad, TexCoordScroller};
use crate::render::mesh::Mesh;
use crate::render::RenderSystem;

const QUAD_HALF_EXTENT: f32 = 0.75;

pub struct ViewSystem {
    pub window: std::sync::Arc<winit::window::Window>,
    pub render_system: RenderSystem,
    mesh: Mesh,
    tex_coord_scroller: TexCoordScroller,
}

impl ViewSystem {
    pub async fn from_window(window: winit::window::Window, args: &Args) -> Result<Self> {
        let window = std::sync::Arc::new(window);

        let mut render_system =
            RenderSystem::from_window(window.clone(), args.checkerboard_tiles).await?;

        let mut mesh = quad(args.topology, QUAD_HALF_EXTENT)?;
        mesh.create_gpu_buffers(render_system.context_mut())?;

        log::info!(
            "Drawing quad as {:?}, scrolling at {:?}",
            args.topology,
            args.scroll_velocity
        );

        Ok(Self {
            window,
            render_system,
            mesh,
            tex_coord_scroller: TexCoordScroller::new(args.scroll_velocity),
        })
    }

    pub fn update_view(&mut self, delta_time: std::time::Duration) -> Result<()> {
        let tex_coords = self.tex_coord_scroller.advance(delta_time);
        self.mesh
            .update_tex_coords(self.render_system.context_mut(), &tex_coords)?;

        self.render_system.render(&[&self.mesh])?;

        Ok(())
    }
}
