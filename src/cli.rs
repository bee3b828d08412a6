use clap::{Parser, ValueEnum};

use mesh_viewer::args::Args;
use mesh_viewer::render::primitive::Topology;

/// Draws a textured quad whose texture coordinates are re-uploaded every frame
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Primitive topology the quad is indexed for
    #[arg(short, long, value_enum, default_value_t = TopologyArg::Triangles)]
    pub topology: TopologyArg,

    /// Horizontal texture scroll speed, in texture repeats per second
    #[arg(short = 'u', long, default_value_t = 0.1, allow_hyphen_values = true)]
    pub scroll_u: f32,

    /// Vertical texture scroll speed, in texture repeats per second
    #[arg(short = 'v', long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub scroll_v: f32,

    /// Number of checkerboard tiles along each edge of the texture
    #[arg(long, default_value_t = 8)]
    pub tiles: u32,

    /// Log filter in env_logger syntax (e.g. "mesh_viewer=trace,wgpu=warn"), overrides RUST_LOG
    #[arg(long)]
    pub log_filter: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum TopologyArg {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl From<TopologyArg> for Topology {
    fn from(value: TopologyArg) -> Self {
        match value {
            TopologyArg::Points => Topology::Points,
            TopologyArg::Lines => Topology::Lines,
            TopologyArg::LineStrip => Topology::LineStrip,
            TopologyArg::Triangles => Topology::Triangles,
            TopologyArg::TriangleStrip => Topology::TriangleStrip,
        }
    }
}

impl From<Cli> for Args {
    fn from(value: Cli) -> Self {
        Args {
            topology: value.topology.into(),
            scroll_velocity: [value.scroll_u, value.scroll_v],
            checkerboard_tiles: value.tiles,
            log_filter: value.log_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_topology_and_negative_speeds() {
        let cli = Cli::parse_from([
            "mesh_viewer",
            "-t",
            "triangle-strip",
            "-u",
            "-0.5",
            "--tiles",
            "4",
        ]);
        let args: Args = cli.into();

        assert_eq!(args.topology, Topology::TriangleStrip);
        assert_eq!(args.scroll_velocity, [-0.5, 0.0]);
        assert_eq!(args.checkerboard_tiles, 4);
        assert_eq!(args.log_filter, None);
    }

    #[test]
    fn defaults_match_library_defaults() {
        let args: Args = Cli::parse_from(["mesh_viewer"]).into();
        let defaults = Args::default();

        assert_eq!(args.topology, defaults.topology);
        assert_eq!(args.scroll_velocity, defaults.scroll_velocity);
        assert_eq!(args.checkerboard_tiles, defaults.checkerboard_tiles);
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
