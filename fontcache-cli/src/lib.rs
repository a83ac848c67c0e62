//! fontcache CLI (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use regex::Regex;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use fontcache_core::output::{write_json_pretty, write_ndjson, FontSummary};
use fontcache_core::{
    CacheConfig, FontCache, FontDecoder, FontFace, FontQuery, FontSource, FontStretch, FontStyle,
    FontWeight, SkrifaDecoder,
};

/// CLI entrypoint for fontcache.
#[derive(Debug, Parser)]
#[command(
    name = "fontcache",
    about = "Persistent font discovery and matching cache (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    #[command(flatten)]
    cache: CacheArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct CacheArgs {
    /// Application name; selects the cache file `<cache dir>/<name>.dat`
    #[arg(long = "app-name", default_value = "fontcache", global = true)]
    app_name: String,

    /// Use this cache file instead of the per-application default
    #[arg(long = "cache-file", value_hint = ValueHint::FilePath, global = true)]
    cache_file: Option<PathBuf>,

    /// Scan these directories instead of the platform font roots
    #[arg(long = "font-dir", value_hint = ValueHint::DirPath, global = true)]
    font_dirs: Vec<PathBuf>,

    /// Never read or write the cache file
    #[arg(long = "no-cache", action = ArgAction::SetTrue, global = true)]
    no_cache: bool,

    /// Log scan and cache decisions to stderr
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every cached font in lookup order
    List(ListArgs),
    /// Pick the closest font for a family and attributes
    Find(FindArgs),
    /// Decode font files and print their attributes
    Info(InfoArgs),
    /// Discard the cache file and rescan the font directories
    Rebuild,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Regex patterns; a font is listed when its family matches any of them
    #[arg(short = 'n', long = "name", value_hint = ValueHint::Other)]
    name_patterns: Vec<String>,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,
}

#[derive(Debug, Args)]
struct FindArgs {
    /// Family name, compared case-insensitively
    family: String,

    /// normal, italic or oblique
    #[arg(short = 's', long = "style")]
    style: Option<FontStyle>,

    /// 100..900 or a keyword such as bold
    #[arg(short = 'w', long = "weight")]
    weight: Option<FontWeight>,

    /// ultra-condensed .. ultra-expanded
    #[arg(short = 'S', long = "stretch")]
    stretch: Option<FontStretch>,

    /// Emit the match as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct InfoArgs {
    /// Font files to decode
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    files: Vec<PathBuf>,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.cache.verbose);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match cli.command {
        Command::List(args) => {
            let cache = FontCache::open(build_config(&cli.cache)?, SkrifaDecoder);
            run_list(&cache, &args, &mut handle)
        }
        Command::Find(args) => {
            let cache = FontCache::open(build_config(&cli.cache)?, SkrifaDecoder);
            run_find(&cache, &args, &mut handle)
        }
        Command::Info(args) => run_info(&SkrifaDecoder, &args.files, &mut handle),
        Command::Rebuild => run_rebuild(build_config(&cli.cache)?, &mut handle),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    // a second init (tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

fn build_config(args: &CacheArgs) -> Result<CacheConfig> {
    let mut config = CacheConfig::new(&args.app_name)?;

    if let Some(path) = &args.cache_file {
        config = config.with_cache_file(path);
    }
    if !args.font_dirs.is_empty() {
        config = config.with_font_dirs(&args.font_dirs);
    }
    if args.no_cache {
        config = config.without_persistence();
    }

    debug!(?config, "resolved cache configuration");
    Ok(config)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).with_context(|| format!("invalid regex: {p}")))
        .collect()
}

/// Entries whose family matches any pattern; every entry without patterns.
fn list_entries<D: FontDecoder>(cache: &FontCache<D>, patterns: &[Regex]) -> Vec<FontSummary> {
    cache
        .entries()
        .filter(|e| patterns.is_empty() || patterns.iter().any(|p| p.is_match(e.family())))
        .map(FontSummary::from)
        .collect()
}

fn run_list<D: FontDecoder>(
    cache: &FontCache<D>,
    args: &ListArgs,
    mut w: impl Write,
) -> Result<()> {
    let patterns = compile_patterns(&args.name_patterns)?;
    let summaries = list_entries(cache, &patterns);

    if args.ndjson {
        write_ndjson(&summaries, &mut w)
    } else if args.json {
        write_json_pretty(&summaries, &mut w)
    } else {
        write_plain(&summaries, &mut w)
    }
}

fn build_query(args: &FindArgs) -> FontQuery {
    FontQuery::new(args.family.as_str())
        .with_style(args.style)
        .with_weight(args.weight)
        .with_stretch(args.stretch)
}

fn run_find<D: FontDecoder>(
    cache: &FontCache<D>,
    args: &FindArgs,
    mut w: impl Write,
) -> Result<()> {
    let query = build_query(args);
    let entry = cache
        .best_match(&query)
        .and_then(|position| cache.entry(position))
        .ok_or_else(|| anyhow!("no font matches family {:?}", args.family))?;
    let summary = FontSummary::from(entry);

    if args.json {
        serde_json::to_writer_pretty(&mut w, &summary)?;
        writeln!(w)?;
        Ok(())
    } else {
        write_plain(std::slice::from_ref(&summary), &mut w)
    }
}

fn run_info<D: FontDecoder>(decoder: &D, files: &[PathBuf], mut w: impl Write) -> Result<()> {
    for file in files {
        let first = decoder
            .open(FontSource::Path(file), 0)
            .with_context(|| format!("decoding {}", file.display()))?;
        let count = first.num_fonts();
        writeln!(w, "{}  fonts: {count}", file.display())?;
        write_plain(&[summarize(&first, file, 0)], &mut w)?;

        for index in 1..count {
            let face = decoder
                .open(FontSource::Path(file), index)
                .with_context(|| format!("decoding {}#{index}", file.display()))?;
            write_plain(&[summarize(&face, file, index)], &mut w)?;
        }
    }
    Ok(())
}

fn summarize<F: FontFace>(face: &F, path: &Path, index: u32) -> FontSummary {
    FontSummary {
        family: face.family().unwrap_or_default().to_string(),
        path: Some(path.to_path_buf()),
        sub_index: index,
        weight: face.weight().value(),
        style: face.style(),
        stretch: face.stretch(),
    }
}

fn run_rebuild(config: CacheConfig, mut w: impl Write) -> Result<()> {
    let cache_file = config
        .cache_file()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("no cache file location; caching is disabled"))?;

    if cache_file.exists() {
        fs::remove_file(&cache_file)
            .with_context(|| format!("removing {}", cache_file.display()))?;
    }

    let cache = FontCache::open(config, SkrifaDecoder);
    writeln!(w, "{} fonts cached in {}", cache.len(), cache_file.display())?;
    Ok(())
}

fn write_plain(summaries: &[FontSummary], mut w: impl Write) -> Result<()> {
    for item in summaries {
        writeln!(
            w,
            "{}  {}  {} {} {}",
            path_with_index(item),
            item.family,
            item.stretch,
            item.style,
            item.weight
        )?;
    }
    Ok(())
}

fn path_with_index(item: &FontSummary) -> String {
    match &item.path {
        Some(path) if item.sub_index > 0 => format!("{}#{}", path.display(), item.sub_index),
        Some(path) => path.display().to_string(),
        None => "(memory)".to_string(),
    }
}
