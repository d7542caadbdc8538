//! CLI binary for tag2svg.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tag2svg::{
    convert, convert_batch, convert_to_file, inspect, ConversionConfig,
    ConversionProgressCallback, IdRange, ProgressCallback,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal reporter for batch mode. Prints one `Output SVG file:` line per
/// written tag as soon as it lands, and optionally drives a progress bar.
/// Tags may complete out of order when converted concurrently, so the bar
/// only counts.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
    size: String,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(show_bar: bool, size: &str) -> Arc<Self> {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_prefix("Selecting");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });

        Arc::new(Self {
            bar,
            size: size.to_string(),
            errors: AtomicUsize::new(0),
        })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        let Some(ref bar) = self.bar else { return };
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} tags  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        bar.set_length(total as u64);
        bar.set_style(style);
        bar.set_prefix("Converting");
    }

    fn on_tag_start(&self, _index: usize, _total: usize, source: &Path) {
        if let Some(ref bar) = self.bar {
            bar.set_message(source.display().to_string());
        }
    }

    fn on_tag_written(&self, _index: usize, _total: usize, destination: &Path) {
        let line = format!(
            "Output SVG file: {} with size: {}",
            destination.display(),
            self.size
        );
        match self.bar {
            Some(ref bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }

    fn on_tag_complete(&self, index: usize, total: usize, primitives: usize) {
        let Some(ref bar) = self.bar else { return };
        bar.println(format!(
            "  {} Tag {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{primitives:>5} rects")),
        ));
        bar.inc(1);
    }

    fn on_tag_error(&self, index: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let line = format!(
            "  {} Tag {:>3}/{:<3}  {}",
            red("✗"),
            index + 1,
            total,
            red(error),
        );
        match self.bar {
            Some(ref bar) => {
                bar.println(line);
                bar.inc(1);
            }
            None => eprintln!("{line}"),
        }
    }

    fn on_batch_complete(&self, total: usize, success_count: usize) {
        let Some(ref bar) = self.bar else { return };
        bar.finish_and_clear();
        let failed = self.errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} tags converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} tags converted  ({} failed)",
                if success_count == 0 { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert one tag (stdout)
  tag2svg file tagStandard52h13/tag52_13_00007.png

  # Convert one tag to a file at 20 mm
  tag2svg file tagStandard52h13/tag52_13_00007.png tag52_13_00007.svg --size 20mm

  # Convert tags 3..=10 of a family into out/, named <stem>_gen.svg
  tag2svg batch --tag-family tag36h11 --tag-ids 3-10 --out-dir out --size 20mm

  # Inspect an image without converting
  tag2svg inspect tag36h11/tag36_11_00000.png

SIZE:
  The size token is written verbatim into the SVG width/height attributes.
  Any CSS length works: 20mm, 2in, 20px, or a bare number.

ENVIRONMENT VARIABLES:
  TAG2SVG_SIZE            Default --size
  TAG2SVG_OUT_DIR         Default batch --out-dir
  TAG2SVG_TAG_FAMILY      Default batch --tag-family
  TAG2SVG_TAG_IDS         Default batch --tag-ids
  RUST_LOG                Override the log filter (e.g. tag2svg=debug)
"#;

/// Convert AprilTag PNGs into pixel-exact SVG documents.
#[derive(Parser, Debug)]
#[command(
    name = "tag2svg",
    version,
    about = "Convert fiducial marker images into pixel-exact SVG",
    long_about = "Convert pre-generated fiducial marker images (AprilTag PNGs) into SVG. \
Every pixel becomes a unit square with its exact colour, the viewBox equals the pixel grid, \
and the declared width/height equal the requested physical size.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "TAG2SVG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "TAG2SVG_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a single tag image.
    File(FileArgs),
    /// Convert a range of tags from a family directory.
    Batch(BatchArgs),
    /// Print image metadata only, no conversion.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct FileArgs {
    /// Path to the tag image to convert.
    #[arg(value_parser = existing_file)]
    tag_file: PathBuf,

    /// Path to the SVG output file. Writes to stdout when omitted.
    out_file: Option<PathBuf>,

    /// Edge length of the SVG, e.g. "20mm", "2in", "20px".
    #[arg(long, env = "TAG2SVG_SIZE", default_value = "20mm")]
    size: String,

    /// Create missing parent directories of OUT_FILE.
    #[arg(long)]
    mkdir: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Directory the SVG files are written to (created if missing).
    #[arg(long, env = "TAG2SVG_OUT_DIR")]
    out_dir: PathBuf,

    /// Edge length of each SVG, e.g. "20mm", "2in", "20px".
    #[arg(long, env = "TAG2SVG_SIZE", default_value = "20mm")]
    size: String,

    /// Tag family, i.e. the directory name holding the tag images.
    #[arg(long, env = "TAG2SVG_TAG_FAMILY", default_value = "tag36h11")]
    tag_family: String,

    /// Directory containing the tag family directories.
    #[arg(long, env = "TAG2SVG_TAGS_ROOT", default_value = ".")]
    tags_root: PathBuf,

    /// Inclusive range into the sorted tag files: "0-10", or "0-0" for the first only.
    #[arg(long, env = "TAG2SVG_TAG_IDS", default_value = "0-10")]
    tag_ids: String,

    /// Suffix of the output files: <stem>_<suffix>.svg.
    #[arg(long, env = "TAG2SVG_SUFFIX", default_value = "gen")]
    suffix: String,

    /// Only files whose name starts with this prefix are selected.
    #[arg(long, env = "TAG2SVG_PREFIX", default_value = "tag")]
    prefix: String,

    /// Number of tags converted concurrently. Default: CPU count.
    #[arg(short, long, env = "TAG2SVG_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Keep converting after a failed tag and exit successfully if any converted.
    /// Without it the batch stops at the first failure.
    #[arg(long, env = "TAG2SVG_KEEP_GOING")]
    keep_going: bool,

    /// Output a structured JSON report instead of per-file lines.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TAG2SVG_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to the image to inspect.
    #[arg(value_parser = existing_file)]
    tag_file: PathBuf,

    /// Output JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// Reject paths that are not regular files at parse time.
fn existing_file(s: &str) -> Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if p.is_file() {
        Ok(p)
    } else {
        Err(format!("Supplied argument \"{s}\" is not a valid file path."))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs in batch mode.
    let show_progress = match &cli.command {
        Command::Batch(b) => !cli.quiet && !b.no_progress && !b.json,
        _ => false,
    };
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::File(ref args) => run_file(args, cli.quiet).await,
        Command::Batch(ref args) => run_batch(args, cli.quiet, show_progress).await,
        Command::Inspect(ref args) => run_inspect(args).await,
    }
}

async fn run_file(args: &FileArgs, quiet: bool) -> Result<()> {
    let config = ConversionConfig::builder()
        .size(&args.size)
        .create_dirs(args.mkdir)
        .build()
        .context("Invalid configuration")?;

    match args.out_file {
        Some(ref out_file) => {
            convert_to_file(&args.tag_file, out_file, &config)
                .await
                .context("Error: Failed to create SVG.")?;
            if !quiet {
                println!(
                    "Output SVG file: {} with size: {}",
                    out_file.display(),
                    config.size
                );
            }
        }
        None => {
            let output = convert(&args.tag_file, &config)
                .await
                .context("Error: Failed to create SVG.")?;
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.document.as_str().as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

async fn run_batch(args: &BatchArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let tag_ids: IdRange = args.tag_ids.parse().context("Invalid --tag-ids")?;

    let mut builder = ConversionConfig::builder()
        .size(&args.size)
        .suffix(&args.suffix)
        .file_prefix(&args.prefix)
        .tag_ids(tag_ids)
        .keep_going(args.keep_going);
    if let Some(n) = args.concurrency {
        builder = builder.concurrency(n);
    }
    if !quiet && !args.json {
        let cb: ProgressCallback = CliProgressCallback::new(show_progress, &args.size);
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    let family_dir = args.tags_root.join(&args.tag_family);
    let output = convert_batch(&family_dir, &args.out_dir, &config)
        .await
        .with_context(|| format!("Batch conversion of '{}' failed", family_dir.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !quiet && !show_progress {
        eprintln!(
            "Converted {}/{} tags in {}ms",
            output.stats.converted_tags,
            output.stats.selected_tags,
            output.stats.total_duration_ms
        );
    }
    Ok(())
}

async fn run_inspect(args: &InspectArgs) -> Result<()> {
    let meta = inspect(&args.tag_file)
        .await
        .context("Failed to inspect image")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
        );
    } else {
        println!("File:         {}", meta.path.display());
        println!("Format:       {}", meta.format);
        println!("Color type:   {}", meta.color_type);
        println!("Size:         {}x{} px", meta.width, meta.height);
        println!("Rects:        {}", meta.primitive_count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn batch_defaults_are_stable() {
        let cli = Cli::try_parse_from(["tag2svg", "batch", "--out-dir", "out"]).unwrap();
        match cli.command {
            Command::Batch(b) => {
                assert_eq!(b.size, "20mm");
                assert_eq!(b.tag_family, "tag36h11");
                assert_eq!(b.tag_ids, "0-10");
                assert_eq!(b.suffix, "gen");
                assert_eq!(b.out_dir, PathBuf::from("out"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn file_requires_existing_input() {
        let err = Cli::try_parse_from(["tag2svg", "file", "/no/such/tag.png", "out.svg"])
            .unwrap_err();
        assert!(err.to_string().contains("is not a valid file path"));
    }

    #[test]
    fn reporter_without_bar_counts_errors() {
        let cb = CliProgressCallback::new(false, "20mm");
        cb.on_batch_start(2);
        cb.on_tag_error(0, 2, "decode failed");
        cb.on_batch_complete(2, 1);
        assert_eq!(cb.errors.load(Ordering::SeqCst), 1);
        assert!(cb.bar.is_none());
    }
}
