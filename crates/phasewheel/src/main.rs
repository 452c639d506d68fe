use anyhow::Context;
use clap::Parser;
use phasering::config;
use phasewheel::gui::app::AppModel;
use phasewheel::sys::runtime;
use relm4::prelude::*;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file to show and watch instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => config::get_config_path().context("No config location")?,
    };
    let config = config::load_or_default(Some(&config_path));

    let (tx, rx) = async_channel::bounded(32);

    let handle = runtime::start_background_services(config_path.clone(), tx)?;

    // GTK would otherwise parse our flags as its own
    let app = RelmApp::new("org.phasering.phasewheel").with_args(Vec::new());

    app.run::<AppModel>((config, config_path, handle, rx));
    Ok(())
}
