//! Headless driver: open a page from a page service, print its statistics
//! and optionally export the overlay as SVG.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use pagegt::config::LogLevel;
use pagegt::editor::NoticeLevel;
use pagegt::{Editor, EditorConfig, Effect, HttpPageService, PageRef, PageStats};
use pagegt_view::{Bounds, RetainedOverlay};

/// Size of the virtual viewer used to lay out the overlay
const VIEW_WIDTH: f64 = 1600.0;
const VIEW_HEIGHT: f64 = 1200.0;

#[derive(Parser, Debug)]
#[command(name = "pagegt", version, about = "Inspect a PAGE document served by a page service")]
struct Args {
    /// Workspace id on the server
    #[arg(long)]
    workspace: String,

    /// Page path inside the workspace
    #[arg(long)]
    page: String,

    /// Server base URL (overrides the configuration file)
    #[arg(long)]
    server: Option<String>,

    /// Configuration file [default: platform config directory]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the region/line overlay to this SVG file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// error, warn, info, debug or trace (RUST_LOG still applies)
    #[arg(long)]
    log_level: Option<String>,

    /// Seconds to wait for the page service
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective configuration back to the configuration file
    #[arg(long)]
    save_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pagegt: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<EditorConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => EditorConfig::load_from(path)?,
        None => EditorConfig::load_from_default_path().unwrap_or_default(),
    };
    if let Some(url) = &args.server {
        config.server.base_url = url.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level =
            LogLevel::parse(level).ok_or_else(|| format!("unknown log level '{level}'"))?;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(args)?;
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!(
        "Server {}, log level {}",
        config.server.base_url,
        config.log_level.name()
    );

    if args.save_config {
        match &args.config {
            Some(path) => config.save_to(path)?,
            None => config.save_to_default_path()?,
        }
    }

    let service = HttpPageService::new(&config.server);
    let mut editor = Editor::new(&config, service, RetainedOverlay::new())?;
    editor.set_view_bounds(Bounds::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT));
    editor.open_page(PageRef::new(&args.workspace, &args.page));

    let mut stats = None;
    for effect in editor.wait_for_saves(Duration::from_secs(args.timeout)) {
        match effect {
            Effect::PageLoaded(loaded) => stats = Some(loaded),
            Effect::Notify(notice) if notice.level == NoticeLevel::Error => {
                return Err(notice.message.into());
            }
            Effect::Notify(notice) => log::info!("{}", notice.message),
            _ => {}
        }
    }
    let stats = stats.ok_or("page did not load in time")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_stats(&editor, &stats);
    }

    if let Some(path) = &args.svg {
        let svg = editor
            .overlay()
            .to_svg()
            .ok_or("nothing to export: no image loaded")?;
        std::fs::write(path, svg)?;
        log::info!("Wrote overlay to {:?}", path);
    }

    Ok(())
}

fn print_stats(editor: &Editor, stats: &PageStats) {
    if let Some(page) = editor.page() {
        println!("{}", page);
    }
    if let Some(image) = editor.image() {
        println!("  image    {}x{}  {}", image.width, image.height, image.url);
    }
    println!("  regions  {}", stats.regions_total);
    for (kind, count) in &stats.regions_by_type {
        println!("    {:<18} {}", kind, count);
    }
    println!("  lines    {}", stats.lines_total);
}
