use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kurbo::Rect;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lottie-pool", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decompress and parse an animation, then print its timing header.
    Probe(ProbeArgs),
    /// Play animations headlessly and report how many frames each presented.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Compressed animation (gzip or zlib framed JSON).
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Compressed animations, one element each.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Decode worker count.
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Wall-clock playback time.
    #[arg(long, default_value_t = 2.0)]
    seconds: f64,

    /// Element size in CSS pixels.
    #[arg(long, default_value_t = 128)]
    size: u32,

    /// Player option bag, e.g. '{"playOnce":true,"cachingModule":3}'.
    #[arg(long)]
    options: Option<String>,

    /// Write the last frame of the first element as PNG.
    #[arg(long)]
    png: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Probe(args) => cmd_probe(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_animation(path: &Path) -> anyhow::Result<lottie_pool::AnimationData> {
    let bytes =
        std::fs::read(path).with_context(|| format!("open animation '{}'", path.display()))?;
    let data = lottie_pool::decode_asset(&bytes)
        .with_context(|| format!("decode animation '{}'", path.display()))?;
    Ok(data)
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let data = read_animation(&args.in_path)?;
    let h = &data.header;

    println!("file:        {}", args.in_path.display());
    println!("fr:          {}", h.frame_rate);
    println!("fps:         {}", h.fps().as_f64());
    println!(
        "range:       {} .. {}",
        h.ip.map_or_else(|| "?".to_string(), |v| v.to_string()),
        h.op.map_or_else(|| "?".to_string(), |v| v.to_string()),
    );
    if let Some(n) = h.frame_span() {
        println!("frames:      {n}");
        println!("queue:       {}", h.fps().queue_capacity());
    }
    if let (Some(w), Some(hh)) = (h.w, h.h) {
        println!("size:        {w}x{hh}");
    }
    println!("json bytes:  {}", data.json.len());
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    if !(args.seconds.is_finite() && args.seconds > 0.0) {
        anyhow::bail!("--seconds must be a positive number");
    }
    let options = match &args.options {
        Some(json) => lottie_pool::PlayerOptions::from_json(json)?,
        None => lottie_pool::PlayerOptions::default(),
    };

    let mut host = lottie_pool::HeadlessHost::new();
    let side = f64::from(args.size);
    let mut elements = Vec::with_capacity(args.files.len());
    for (i, file) in args.files.iter().enumerate() {
        let x = (i as f64) * side;
        let url = file.to_string_lossy();
        let el = host.add_element(Rect::new(x, 0.0, x + side, side), Some(url.as_ref()));
        elements.push((el, file.clone()));
    }

    let opts = lottie_pool::OrchestratorOpts {
        workers: args.workers,
        ..lottie_pool::OrchestratorOpts::default()
    };
    let factory = lottie_pool::module_factory(lottie_pool::SolidModule::new);
    let source = Arc::new(lottie_pool::FileSource::new("."));
    let mut orch = lottie_pool::Orchestrator::new(host, opts, factory, source);

    for (el, file) in &elements {
        let status = orch.init(*el, options.clone());
        tracing::debug!(file = %file.display(), ?status, "init");
    }

    let stats = lottie_pool::driver::run_for(&mut orch, Duration::from_secs_f64(args.seconds));
    eprintln!(
        "ticks: {} (paint {}, timer {}), replies: {}",
        stats.ticks, stats.paint_wakes, stats.timer_wakes, stats.replies
    );

    for (el, file) in &elements {
        let presented = orch.host().element(*el).map_or(0, |e| e.presented());
        let phase = orch
            .phase(*el)
            .map_or_else(|| "gone".to_string(), |p| format!("{p:?}"));
        println!("{}: {presented} frames ({phase})", file.display());
    }

    if let Some(out) = &args.png {
        let (el, file) = elements
            .first()
            .context("no elements to snapshot")?;
        let e = orch
            .host()
            .element(*el)
            .context("element vanished from host")?;
        let (Some(size), Some(pixels)) = (e.surface, e.last_frame.as_ref()) else {
            anyhow::bail!("'{}' presented no frame", file.display());
        };
        write_png(out, size, pixels)?;
        eprintln!("wrote {}", out.display());
    }

    orch.destroy_all();
    Ok(())
}

fn write_png(out: &Path, size: lottie_pool::PixelSize, pixels: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let img = image::RgbaImage::from_raw(size.width, size.height, pixels.to_vec())
        .context("frame length does not match surface size")?;
    img.save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
