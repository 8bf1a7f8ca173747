use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use zonecast::{
    Fetcher, HttpFetcher, Layout, MediaFile, Millis, MemoryStore, PlacementMode, PlayerConfig,
    Presentation, PresentationOpts, Program, RecordStoreExt as _, ScreenPlayer, ScriptedFetcher,
    place, rasterize, write_png,
};

#[derive(Parser, Debug)]
#[command(name = "zonecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print where a new zone of the given size would be placed.
    Place(PlaceArgs),
    /// Evaluate a layout at one instant, optionally writing a PNG.
    Frame(FrameArgs),
    /// Simulate layout playback on a virtual clock.
    Play(PlayArgs),
    /// Run a paired screen against the wall clock.
    Player(PlayerArgs),
}

#[derive(Parser, Debug)]
struct PlaceArgs {
    /// Zone width in percent.
    #[arg(long)]
    width: f64,

    /// Zone height in percent.
    #[arg(long)]
    height: f64,

    /// Layout JSON whose zones are already placed.
    #[arg(long)]
    layout: PathBuf,

    /// Skip the free-slot search and place at the origin.
    #[arg(long)]
    allow_overlap: bool,
}

/// Options shared by the layout-only commands.
#[derive(Parser, Debug)]
struct LayoutSource {
    /// Layout JSON (`layout_data` shape).
    #[arg(long)]
    layout: PathBuf,

    /// JSON store used to resolve file references.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Never touch the network; widgets and apps show their error state.
    #[arg(long)]
    offline: bool,

    /// Relay for feed requests.
    #[arg(long)]
    proxy_base: Option<String>,

    /// Seed for random picks.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: LayoutSource,

    /// Session time to evaluate, in milliseconds.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Raster width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Raster height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    #[command(flatten)]
    source: LayoutSource,

    /// How long to simulate.
    #[arg(long)]
    seconds: u64,

    /// Virtual clock step.
    #[arg(long, default_value_t = 1000)]
    step_ms: u64,
}

#[derive(Parser, Debug)]
struct PlayerArgs {
    /// JSON store holding screens, playlists, files and layouts.
    #[arg(long)]
    store: Option<PathBuf>,

    /// Pairing code of the screen to play.
    #[arg(long)]
    code: String,

    /// Player config (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many seconds (runs until killed otherwise).
    #[arg(long)]
    seconds: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Place(args) => {
            init_tracing("warn");
            cmd_place(args)
        }
        Command::Frame(args) => {
            init_tracing("warn");
            cmd_frame(args)
        }
        Command::Play(args) => {
            init_tracing("warn");
            cmd_play(args)
        }
        Command::Player(args) => cmd_player(args),
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_layout(path: &Path) -> anyhow::Result<Layout> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read layout '{}'", path.display()))?;
    let layout =
        Layout::from_json(&s).with_context(|| format!("parse layout '{}'", path.display()))?;
    for warning in layout.bounds_warnings() {
        tracing::warn!(%warning, "layout out of bounds");
    }
    Ok(layout)
}

fn cmd_place(args: PlaceArgs) -> anyhow::Result<()> {
    let layout = read_layout(&args.layout)?;
    let mode = if args.allow_overlap {
        PlacementMode::AllowOverlap
    } else {
        PlacementMode::AvoidOverlap
    };
    let (x, y) = place(mode, args.width, args.height, &layout.zone_rects());
    println!("{}", json!({ "x": x, "y": y }));
    Ok(())
}

fn load_presentation(source: &LayoutSource) -> anyhow::Result<Presentation> {
    let layout = read_layout(&source.layout)?;

    let mut files: HashMap<String, MediaFile> = HashMap::new();
    if let Some(path) = &source.store {
        let store = MemoryStore::load(path)
            .with_context(|| format!("load store '{}'", path.display()))?;
        for id in layout.file_refs() {
            if let Some(file) = store.find::<MediaFile>(id)? {
                files.insert(id.to_string(), file);
            }
        }
    }

    let proxy_base = source
        .proxy_base
        .as_deref()
        .map(url::Url::parse)
        .transpose()
        .context("parse --proxy-base")?;
    let fetcher: Rc<dyn Fetcher> = if source.offline {
        Rc::new(ScriptedFetcher::new())
    } else {
        Rc::new(HttpFetcher::new(
            Duration::from_secs(10),
            zonecast::DEFAULT_USER_AGENT,
        )?)
    };

    Ok(Presentation::new(
        Program::single_layout(layout, files),
        fetcher,
        PresentationOpts {
            proxy_base,
            seed: source.seed,
            ..PresentationOpts::default()
        },
    ))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut presentation = load_presentation(&args.source)?;
    let at = Millis(args.at_ms);
    presentation.start(Millis::ZERO);
    presentation.advance_to(at);
    let frame = presentation.frame(at);

    println!("{}", serde_json::to_string_pretty(&frame)?);

    if let Some(out) = &args.out {
        let img = rasterize(&frame, args.width, args.height);
        write_png(&img, out).with_context(|| format!("write '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.step_ms > 0, "--step-ms must be > 0");
    let mut presentation = load_presentation(&args.source)?;
    let end = Millis::from_secs(args.seconds);

    let events = presentation.start(Millis::ZERO);
    let mut last = presentation.frame(Millis::ZERO);
    println!("{}", json!({ "at_ms": 0, "events": events, "frame": last }));

    let mut now = Millis::ZERO;
    while now < end {
        now = now.after(args.step_ms).min(end);
        let events = presentation.advance_to(now);
        let frame = presentation.frame(now);
        if !events.is_empty() || frame.screen != last.screen {
            println!(
                "{}",
                json!({ "at_ms": now.0, "events": events, "frame": frame })
            );
        }
        last = frame;
    }
    Ok(())
}

fn cmd_player(args: PlayerArgs) -> anyhow::Result<()> {
    let config = PlayerConfig::load(args.config.as_deref()).context("load player config")?;
    init_tracing(&config.log_level);

    let store_path = args
        .store
        .or_else(|| config.store_path.clone())
        .context("no store: pass --store or set store_path in the config")?;
    let store = MemoryStore::load(&store_path)
        .with_context(|| format!("load store '{}'", store_path.display()))?;

    let fetcher = HttpFetcher::new(config.http_timeout(), &config.user_agent)?;
    let opts = PresentationOpts {
        proxy_base: config.proxy_url()?,
        ..PresentationOpts::default()
    };
    let mut player = ScreenPlayer::connect(
        store,
        &args.code,
        Rc::new(fetcher),
        opts,
        config.timing(),
    )
    .with_context(|| format!("connect screen '{}'", args.code))?;
    eprintln!("playing screen '{}'", player.screen().name);

    player.run_realtime(
        config.tick(),
        args.seconds.map(Duration::from_secs),
        |frame, events| {
            println!("{}", json!({ "events": events, "frame": frame }));
        },
    )?;

    let store = player.disconnect()?;
    store
        .save(&store_path)
        .with_context(|| format!("save store '{}'", store_path.display()))?;
    Ok(())
}
