mod app;
mod catalog;
mod cli;
mod config;
mod level;
mod modes;
mod tileset;
mod vfs;

use anyhow::Result;
use maniac_engine::device::GpuInit;
use maniac_engine::logging::init_logging;
use maniac_engine::window::Runtime;

use crate::app::ManiacLab;
use crate::cli::Invocation;
use crate::config::AppConfig;

fn main() -> Result<()> {
    let opts = match cli::parse(std::env::args().skip(1))? {
        Invocation::Run(opts) => opts,
        Invocation::Help => {
            print!("{}", cli::USAGE);
            return Ok(());
        }
    };

    let config = AppConfig::from_cli(&opts);
    init_logging(config.logging.clone());
    log::info!(
        "starting {} (data: {}, threaded simulation: {})",
        config.title,
        config.data_root.display(),
        config.threaded_simulation
    );

    let runtime = config.runtime();
    let app = ManiacLab::new(config)?;
    Runtime::run(runtime, GpuInit::default(), app)
}
