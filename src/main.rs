//! Hardware-free front end: renders content through the layout pipeline and
//! writes the frame to a PNG for template iteration on a workstation.
//!
//! Driving a physical panel needs a platform bus (see `epdview::HalBus`)
//! and lives in target-specific binaries.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use epdview::render::DEFAULT_FONT_FILE;
use epdview::{Content, Display, FileDisplay, Orientation, RenderEngine};

#[derive(Debug, Parser)]
#[command(name = "epdview")]
#[command(about = "Layout renderer for tri-color e-paper frames")]
struct Cli {
    /// Log filter, e.g. "debug" or "epdview=trace".
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render content to a PNG frame.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Panel width in pixels.
    #[arg(long, default_value_t = 400)]
    width: u32,
    /// Panel height in pixels.
    #[arg(long, default_value_t = 300)]
    height: u32,
    /// "landscape" or "portrait".
    #[arg(long, default_value = "landscape")]
    orientation: String,
    /// Font file to render text with.
    #[arg(long, default_value = DEFAULT_FONT_FILE)]
    font: PathBuf,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    body: Option<String>,
    #[arg(long)]
    footer: Option<String>,
    /// Image file bound to the "img" slot.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Template file; the built-in pair is used when omitted.
    #[arg(long)]
    template: Option<PathBuf>,
    /// Output PNG path.
    #[arg(long, default_value = "frame.png")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    match cli.command {
        Commands::Render(args) => render(args),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let engine = RenderEngine::from_file(&args.font)
        .with_context(|| format!("loading font {}", args.font.display()))?;

    let mut content = Content::new();
    if let Some(title) = args.title {
        content = content.text("title", title);
    }
    if let Some(body) = args.body {
        content = content.text("body", body);
    }
    if let Some(footer) = args.footer {
        content = content.text("footer", footer);
    }
    if let Some(path) = &args.image {
        let decoded =
            image::open(path).with_context(|| format!("decoding image {}", path.display()))?;
        content = content.image("img", decoded);
    }

    let mut display = FileDisplay::new(
        engine,
        args.width,
        args.height,
        Orientation::parse(&args.orientation),
        &args.out,
    );
    if let Some(path) = &args.template {
        let template = fs::read_to_string(path)
            .with_context(|| format!("reading template {}", path.display()))?;
        display = display.with_template(template);
    }

    display.show(content)?;
    log::info!("wrote {}", args.out.display());
    Ok(())
}
