use anyhow::Result;

use crate::app::App;
use crate::args::Args;

mod app;
pub mod args;
pub mod error;
pub mod quad;
pub mod render;
mod view;

pub fn run(args: Args) -> Result<()> {
    init_logging(args.log_filter.as_deref());

    let event_loop = App::create_event_loop()
        .map_err(|error| anyhow::anyhow!("Failed to create event loop: {error}"))?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App::new(&event_loop, args);

    cfg_if::cfg_if! {
        if #[cfg(target_arch="wasm32")] {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        } else {
            event_loop
                .run_app(&mut app)
                .map_err(|error| anyhow::anyhow!("Event loop failed: {error}"))?;
        }
    }

    Ok(())
}

fn init_logging(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
