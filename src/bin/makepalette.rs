use std::{
    io::{self, BufRead, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use makepalette::{
    DEFAULT_SAMPLING_RATE, DecoderLogLevel, FrameSource, ImageSequence, NoOverwrite, OutputSize,
    Overwrite, OverwritePolicy, PaletteJob, PaletteOptions, ProgressCallback, ProgressInfo,
    RESOLUTION_PRESETS, RenderSummary, Resolution, RunContext, SourceMetadata, SwatchDirectory,
    TimingOptions, open_source, parse_aspect_ratio,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  makepalette render film.mkv -r 4K --progress\n  makepalette render film.mkv -d palettes -o film.png -c 80\n  makepalette render film.mkv -s 00:10:00 -e 00:40:00 -a 20\n  makepalette render stills/ --image-fps 24 -r 2000x400\n  makepalette probe film.mkv --json\n  makepalette completions zsh > _makepalette";

#[derive(Debug, Parser)]
#[command(
    name = "makepalette",
    version,
    about = "Turn a video or an image folder into a color barcode",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show informational log output (RUST_LOG overrides).
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<DecoderLogLevel>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a palette image.
    #[command(
        about = "Render a palette image",
        after_help = "Examples:\n  makepalette render film.mkv\n  makepalette render film.mkv -r HD -a 5 --overwrite\n  makepalette render film.mkv --aspect-ratio 2.39 -r 4096x1"
    )]
    Render(RenderArgs),

    /// Print source metadata.
    #[command(
        about = "Print source metadata",
        visible_alias = "info",
        after_help = "Examples:\n  makepalette probe film.mkv\n  makepalette probe stills/ --json"
    )]
    Probe {
        /// Input video file or image directory.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the named resolution presets.
    Presets,

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

#[derive(Debug, Parser, Clone)]
struct RenderArgs {
    /// Input video file or image directory.
    input: PathBuf,

    /// Output file name; only the name is kept, the directory comes from --directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output directory (created if missing).
    #[arg(short = 'd', long = "directory")]
    directory: Option<PathBuf>,

    /// Output resolution: a preset (HD, 2K, 4K, 8K, u, phone, 2.39, 1.85, 16:9, A4, ...) or WxH.
    #[arg(short, long)]
    resolution: Option<Resolution>,

    /// Derive the height from the width with this aspect ratio (2.39 or 16:9).
    #[arg(long, value_parser = parse_aspect_ratio)]
    aspect_ratio: Option<f64>,

    /// Sampling rate; higher values sample fewer frames.
    #[arg(short = 'a', long = "sampling", default_value_t = DEFAULT_SAMPLING_RATE)]
    sampling: u32,

    /// Start timestamp (hh:mm:ss).
    #[arg(short, long)]
    start: Option<String>,

    /// End timestamp (hh:mm:ss).
    #[arg(short, long)]
    end: Option<String>,

    /// Keep only the middle N percent of the source (1-100).
    #[arg(short, long)]
    center: Option<u32>,

    /// Frame rate assumed for an image directory.
    #[arg(long)]
    image_fps: Option<f64>,

    /// Replace an existing output without asking.
    #[arg(long)]
    overwrite: bool,

    /// Fail on the first undecodable frame instead of writing a partial palette.
    #[arg(long)]
    strict: bool,

    /// Write one swatch image per sampled frame into this directory.
    #[arg(long)]
    swatches: Option<PathBuf>,

    /// Keep the swatch directory after the run.
    #[arg(long, requires = "swatches")]
    keep_swatches: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Print the run summary as JSON.
    #[arg(long)]
    json: bool,
}

fn output_size(args: &RenderArgs) -> OutputSize {
    match (args.resolution, args.aspect_ratio) {
        (resolution, Some(aspect_ratio)) => OutputSize::AspectRatio {
            width: resolution.map_or(0, |resolution| resolution.width),
            aspect_ratio,
        },
        (Some(resolution), None) => OutputSize::Exact(resolution),
        (None, None) => OutputSize::Source,
    }
}

fn timing_options(args: &RenderArgs) -> TimingOptions {
    let mut timing = TimingOptions::new();
    if let Some(start) = &args.start {
        timing = timing.with_start(start.clone());
    }
    if let Some(end) = &args.end {
        timing = timing.with_end(end.clone());
    }
    if let Some(center) = args.center {
        timing = timing.with_center_percentage(center);
    }
    timing
}

fn open_input(
    input: &Path,
    image_fps: Option<f64>,
) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    match image_fps {
        Some(frames_per_second) if input.is_dir() => Ok(Box::new(
            ImageSequence::open(input)?.with_frame_rate(frames_per_second)?,
        )),
        Some(_) => {
            warn("--image-fps only applies to image directories");
            Ok(open_source(input)?)
        }
        None => Ok(open_source(input)?),
    }
}

fn warn(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Asks on the terminal before replacing a file. Refuses when stdin is not
/// interactive.
struct PromptOverwrite;

impl OverwritePolicy for PromptOverwrite {
    fn allow_overwrite(&self, path: &Path) -> bool {
        if !io::stdin().is_terminal() {
            log::warn!(
                "{} exists and stdin is not a terminal; not overwriting",
                path.display()
            );
            return false;
        }

        eprint!(
            "{} {} already exists. Overwrite? [y/N] ",
            "warning:".yellow().bold(),
            path.display()
        );
        if io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {percent:>3}% {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        self.bar.set_message(progress_message(info));
    }
}

fn progress_message(info: &ProgressInfo) -> String {
    let frame = match (info.current_frame, info.end_frame) {
        (Some(frame), Some(end_frame)) => format!(" | frame {frame}/{end_frame}"),
        (Some(frame), None) => format!(" | frame {frame}"),
        (None, _) => String::new(),
    };
    format!("1 frame every {}{frame} | ETA {}", info.stride, info.eta())
}

fn print_summary(summary: &RenderSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "output": summary.output_path.display().to_string(),
            "input_kind": summary.input_kind.as_str(),
            "width": summary.resolution.width,
            "height": summary.resolution.height,
            "stride": summary.stride,
            "start_frame": summary.range.start_frame,
            "end_frame": summary.range.end_frame,
            "planned_samples": summary.planned,
            "sampled": summary.sampled,
            "truncated_at": summary.truncated_at,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if let Some(frame) = summary.truncated_at {
        warn(&format!(
            "frame {frame} could not be decoded; palette holds {} of {} samples",
            summary.sampled, summary.planned
        ));
    }
    println!(
        "{} {} ({}, {} stripes)",
        "success:".green().bold(),
        summary.output_path.display(),
        summary.resolution,
        summary.sampled
    );
    Ok(())
}

fn print_metadata(metadata: &SourceMetadata, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let payload = json!({
            "kind": metadata.kind.as_str(),
            "width": metadata.width,
            "height": metadata.height,
            "fps": metadata.frames_per_second,
            "frame_count": metadata.frame_count,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "length": metadata.length_timecode(),
            "codec": metadata.codec,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("Kind: {}", metadata.kind.as_str());
        println!("Size: {}x{}", metadata.width, metadata.height);
        println!("Frame rate: {:.3} fps", metadata.frames_per_second);
        println!("Frames: {}", metadata.frame_count);
        println!("Length: {}", metadata.length_timecode());
        println!("Codec: {}", metadata.codec);
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut source = open_input(&args.input, args.image_fps)?;

    let mut context = RunContext::new(&args.input);
    if let Some(output) = &args.output {
        context = context.with_output_file(output);
    }
    if let Some(directory) = &args.directory {
        context = context.with_output_dir(directory);
    }

    let mut options = PaletteOptions::new()
        .with_output_size(output_size(&args))
        .with_sampling_rate(args.sampling)
        .with_timing(timing_options(&args))
        .with_strict_decoding(args.strict);

    let progress = if args.progress && !args.json {
        let progress = Arc::new(TerminalProgress::new()?);
        options = options.with_progress(progress.clone());
        Some(progress)
    } else {
        None
    };

    if !args.json {
        let metadata = source.metadata();
        eprintln!(
            "{} {} ({}x{}, {} frames, {})",
            "palette".cyan().bold(),
            args.input.display(),
            metadata.width,
            metadata.height,
            metadata.frame_count,
            metadata.length_timecode()
        );
    }

    let mut job = PaletteJob::new(context, options);
    if let Some(directory) = &args.swatches {
        job = job.with_workspace(Box::new(
            SwatchDirectory::new(directory).keep(args.keep_swatches),
        ));
    }

    let policy: &dyn OverwritePolicy = if args.overwrite {
        &Overwrite
    } else if args.json {
        &NoOverwrite
    } else {
        &PromptOverwrite
    };

    let result = job.run_with_source(source.as_mut(), policy);
    if let Some(progress) = &progress {
        progress.finish();
    }
    print_summary(&result?, args.json)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    if let Some(level) = cli.global.log_level {
        makepalette::set_decoder_log_level(level);
    }

    match cli.command {
        Commands::Render(args) => render(args)?,
        Commands::Probe { input, json } => {
            let source = open_source(&input)?;
            print_metadata(source.metadata(), json)?;
        }
        Commands::Presets => {
            for (name, width, height) in RESOLUTION_PRESETS {
                println!("{name:<10} {width}x{height}");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "makepalette", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
