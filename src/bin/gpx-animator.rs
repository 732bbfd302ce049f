use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use gpx_animator::{
    BoundsOverride, Configuration, FfmpegSink, FfmpegSinkOpts, FrameSink, ImageSequenceSink,
    MapConfiguration, OutputKind, RenderOutcome, RenderPipeline, RenderProgress, Rgba8,
    TextRenderer, TrackConfiguration, ViewportConfiguration,
};

#[derive(Parser, Debug)]
#[command(name = "gpx-animator", version, about = "Render GPX tracks into an animated video")]
struct Cli {
    /// GPX input file; repeat for multiple tracks.
    #[arg(long = "input", short = 'i')]
    inputs: Vec<PathBuf>,

    /// Output video (`.mp4`, `.mkv`, ...) or PNG pattern containing `%d` / `%08d`.
    #[arg(long, short = 'o', default_value = "video.mp4")]
    output: PathBuf,

    /// Base configuration JSON; command line options override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track color per input, `#rrggbb` or `#rrggbbaa`.
    #[arg(long = "color")]
    colors: Vec<Rgba8>,

    /// Marker label per input.
    #[arg(long = "label")]
    labels: Vec<String>,

    /// Line width per input.
    #[arg(long = "line-width")]
    line_widths: Vec<f32>,

    /// Milliseconds added to every timestamp, per input.
    #[arg(long = "time-offset", allow_negative_numbers = true)]
    time_offsets: Vec<i64>,

    /// Synthetic point interval for logs without timestamps, per input.
    #[arg(long = "forced-point-interval")]
    forced_point_intervals: Vec<u64>,

    /// Milliseconds dropped from the start of each input.
    #[arg(long = "trim-start")]
    trim_starts: Vec<u64>,

    /// Milliseconds dropped from the end of each input.
    #[arg(long = "trim-end")]
    trim_ends: Vec<u64>,

    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Map zoom level (0..=19).
    #[arg(long)]
    zoom: Option<u32>,
    #[arg(long)]
    margin: Option<u32>,

    #[arg(long, allow_negative_numbers = true)]
    min_lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    max_lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    min_lon: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    max_lon: Option<f64>,

    /// Frames per second, `30` or `30000/1001`.
    #[arg(long)]
    fps: Option<gpx_animator::Fps>,
    /// Real milliseconds per video millisecond.
    #[arg(long)]
    speedup: Option<f64>,
    /// Total video length in milliseconds; overrides the speedup.
    #[arg(long)]
    total_time: Option<u64>,
    #[arg(long)]
    keep_first_frame: Option<u64>,
    #[arg(long)]
    keep_last_frame: Option<u64>,

    /// Tail length in milliseconds of track time.
    #[arg(long)]
    tail_duration: Option<u64>,
    #[arg(long)]
    tail_color: Option<Rgba8>,
    /// Keep rendering after the last point until the tail is gone.
    #[arg(long)]
    tail_fadeout: bool,

    #[arg(long)]
    marker_size: Option<f32>,
    #[arg(long)]
    waypoint_size: Option<f32>,
    #[arg(long)]
    font_size: Option<f32>,
    #[arg(long)]
    background_color: Option<Rgba8>,
    /// Draw the complete tracks faintly before the animation starts.
    #[arg(long)]
    pre_draw_track: bool,
    #[arg(long)]
    pre_draw_track_color: Option<Rgba8>,

    /// Skip frames where no track moves.
    #[arg(long)]
    skip_idle: bool,
    #[arg(long)]
    idle_gap: Option<u64>,
    #[arg(long)]
    flashback_color: Option<Rgba8>,
    /// Flashback length in milliseconds; 0 disables it.
    #[arg(long)]
    flashback_duration: Option<u64>,

    #[arg(long)]
    viewport_width: Option<u32>,
    #[arg(long)]
    viewport_height: Option<u32>,
    #[arg(long, default_value_t = 50)]
    viewport_inertia: u32,

    /// Tile server URL template with `{zoom}`, `{x}`, `{y}` and optional `{switch:a,b}`.
    #[arg(long)]
    tms_url_template: Option<String>,
    #[arg(long)]
    tile_cache_dir: Option<PathBuf>,
    /// Maximum age of cached tiles in milliseconds.
    #[arg(long)]
    tile_cache_ttl: Option<u64>,
    #[arg(long)]
    background_map_visibility: Option<f64>,
    #[arg(long)]
    user_agent: Option<String>,

    #[arg(long)]
    attribution: Option<String>,
    #[arg(long)]
    comment: Option<String>,
    /// Show date, time and speed.
    #[arg(long)]
    information: bool,

    /// Print the resolved render metadata as JSON and exit.
    #[arg(long)]
    print_metadata: bool,

    /// Debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = build_config(&cli)?;
    let inputs = gpx_animator::read_inputs(&cfg)?;
    let text = TextRenderer::with_system_fonts(cfg.font_size);
    let overlays = gpx_animator::default_overlays(&cfg, &text)?;
    let pipeline = RenderPipeline::prepare(&cfg, &inputs, text, overlays)?;

    if cli.print_metadata {
        let json = serde_json::to_string_pretty(pipeline.metadata())
            .context("serialize render metadata")?;
        println!("{json}");
        return Ok(());
    }

    let mut sink: Box<dyn FrameSink> = match cfg.output_kind {
        OutputKind::ImageSequence => Box::new(ImageSequenceSink::new(&cli.output)),
        OutputKind::Video => Box::new(FfmpegSink::new(FfmpegSinkOpts {
            out_path: cli.output.clone(),
            overwrite: true,
            background: cfg.background_color,
        })),
    };

    let mut progress = LogProgress::default();
    match pipeline.run(sink.as_mut(), &mut progress)? {
        RenderOutcome::Finished(stats) => {
            eprintln!(
                "wrote {} ({} frames)",
                cli.output.display(),
                stats.frames_emitted
            );
        }
        RenderOutcome::Cancelled => eprintln!("render cancelled"),
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn read_config_json(path: &Path) -> anyhow::Result<Configuration> {
    let f = File::open(path).with_context(|| format!("open configuration '{}'", path.display()))?;
    let cfg: Configuration = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse configuration '{}'", path.display()))?;
    Ok(cfg)
}

fn build_config(cli: &Cli) -> anyhow::Result<Configuration> {
    let mut cfg = match &cli.config {
        Some(path) => read_config_json(path)?,
        None => Configuration::default(),
    };

    for (i, input) in cli.inputs.iter().enumerate() {
        let mut track = TrackConfiguration::new(input);
        if let Some(color) = cli.colors.get(i) {
            track.color = *color;
        }
        track.label = cli.labels.get(i).cloned();
        if let Some(w) = cli.line_widths.get(i) {
            track.line_width = *w;
        }
        if let Some(offset) = cli.time_offsets.get(i) {
            track.time_offset_ms = *offset;
        }
        track.forced_point_interval_ms = cli.forced_point_intervals.get(i).copied();
        if let Some(ms) = cli.trim_starts.get(i) {
            track.trim_start_ms = *ms;
        }
        if let Some(ms) = cli.trim_ends.get(i) {
            track.trim_end_ms = *ms;
        }
        cfg.tracks.push(track);
    }

    override_opt(&mut cfg.width, cli.width);
    override_opt(&mut cfg.height, cli.height);
    override_opt(&mut cfg.zoom, cli.zoom);
    override_val(&mut cfg.margin, cli.margin);
    cfg.bounds = BoundsOverride {
        min_lat: cli.min_lat.or(cfg.bounds.min_lat),
        max_lat: cli.max_lat.or(cfg.bounds.max_lat),
        min_lon: cli.min_lon.or(cfg.bounds.min_lon),
        max_lon: cli.max_lon.or(cfg.bounds.max_lon),
    };

    override_val(&mut cfg.fps, cli.fps);
    override_val(&mut cfg.speedup, cli.speedup);
    override_opt(&mut cfg.total_time_ms, cli.total_time);
    override_val(&mut cfg.keep_first_frame_ms, cli.keep_first_frame);
    override_val(&mut cfg.keep_last_frame_ms, cli.keep_last_frame);

    override_val(&mut cfg.tail_duration_ms, cli.tail_duration);
    override_val(&mut cfg.tail_color, cli.tail_color);
    cfg.tail_fadeout |= cli.tail_fadeout;

    override_val(&mut cfg.marker_size, cli.marker_size);
    override_val(&mut cfg.waypoint_size, cli.waypoint_size);
    override_val(&mut cfg.font_size, cli.font_size);
    override_val(&mut cfg.background_color, cli.background_color);
    cfg.pre_draw_track |= cli.pre_draw_track;
    override_val(&mut cfg.pre_draw_track_color, cli.pre_draw_track_color);

    cfg.skip_idle |= cli.skip_idle;
    override_val(&mut cfg.idle_gap_ms, cli.idle_gap);
    override_val(&mut cfg.flashback_color, cli.flashback_color);
    if let Some(ms) = cli.flashback_duration {
        cfg.flashback_duration_ms = (ms > 0).then_some(ms);
    }

    if let (Some(width), Some(height)) = (cli.viewport_width, cli.viewport_height) {
        cfg.viewport = Some(ViewportConfiguration {
            width,
            height,
            inertia: cli.viewport_inertia,
        });
    } else if cli.viewport_width.is_some() || cli.viewport_height.is_some() {
        anyhow::bail!("--viewport-width and --viewport-height must be given together");
    }

    if let Some(template) = &cli.tms_url_template {
        cfg.map = Some(MapConfiguration::new(template.clone()));
    }
    if let Some(map) = cfg.map.as_mut() {
        override_opt(&mut map.cache_dir, cli.tile_cache_dir.clone());
        override_opt(&mut map.cache_ttl_ms, cli.tile_cache_ttl);
        override_val(&mut map.visibility, cli.background_map_visibility);
        override_val(&mut map.user_agent, cli.user_agent.clone());
    }

    override_opt(&mut cfg.attribution, cli.attribution.clone());
    override_opt(&mut cfg.comment, cli.comment.clone());
    cfg.information |= cli.information;
    cfg.output_kind = OutputKind::from_path(&cli.output);

    cfg.validate()?;
    Ok(cfg)
}

fn override_val<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn override_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Logs progress every ten percent.
#[derive(Default)]
struct LogProgress {
    last_decile: Option<u8>,
}

impl RenderProgress for LogProgress {
    fn set_progress(&mut self, percent: u8, message: &str) {
        let decile = percent / 10;
        if self.last_decile != Some(decile) {
            self.last_decile = Some(decile);
            tracing::info!(percent, message, "progress");
        }
    }
}
