use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use phasering::config::{self, Config};
use phasering::connector::ConnectorMode;
use phasering::geometry::rad_to_deg;
use phasering::highlight::{Interaction, Key};
use phasering::{Diagram, Size, SvgSurface};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "phasering", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct LayoutArgs {
    /// Config file to read instead of the default location
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Container width in pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Container height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f64,

    /// Connector shape, overriding the config ("arc" or "bezier")
    #[arg(short = 'm', long)]
    mode: Option<ConnectorMode>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Render the diagram as a standalone SVG document
    Render {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Draw this step (zero-based) in its highlighted state
        #[arg(long)]
        highlight: Option<usize>,

        /// Output file; stdout when omitted
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Print where each step lands
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Write the default config file and print its path
    Init,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            layout,
            highlight,
            output,
        } => render(&layout, highlight, output),
        Commands::Layout { layout } => print_layout(&layout),
        Commands::Init => {
            let path = config::write_default_config().context("Failed to write default config")?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn build(args: &LayoutArgs) -> anyhow::Result<Diagram<SvgSurface>> {
    let mut config: Config = config::load_or_default(args.config.as_deref());
    if let Some(mode) = args.mode {
        config.connectors.mode = mode;
    }

    let mut diagram = Diagram::init(Some(SvgSurface::new()), config.items(), config.options())?;
    diagram.relayout(Size::new(args.width, args.height));
    Ok(diagram)
}

fn render(args: &LayoutArgs, highlight: Option<usize>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut diagram = build(args)?;

    if let Some(index) = highlight {
        if index >= diagram.items().len() {
            anyhow::bail!(
                "Cannot highlight step {}: the diagram has {} steps",
                index,
                diagram.items().len()
            );
        }
        diagram.handle(Interaction::KeyPress {
            index,
            key: Key::Enter,
        });
    }

    let document = diagram.surface().to_document();
    match output {
        Some(path) => fs_err::write(&path, document)?,
        None => print!("{}", document),
    }
    Ok(())
}

fn print_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let diagram = build(args)?;
    let pass = diagram.pass();

    if let Some(circle) = pass.circle {
        println!(
            "circle: center ({:.1}, {:.1}) radius {:.1}",
            circle.center.x, circle.center.y, circle.radius
        );
    }
    for (item, placement) in diagram.items().iter().zip(&pass.placements) {
        println!(
            "{:>2}  {:<16} {:>7.1}°  ({:.1}, {:.1})",
            item.index,
            item.label.as_str(),
            rad_to_deg(placement.angle),
            placement.center.x,
            placement.center.y
        );
    }
    println!("connectors: {}", pass.connectors.len());
    Ok(())
}
