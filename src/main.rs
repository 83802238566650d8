use clap::{Parser, Subcommand};
use picture_bg::debounce::DebouncedTrigger;
use picture_bg::surface::RecordingSurface;
use picture_bg::viewport::Viewport;
use picture_bg::{CandidateList, Selector, config, output, select, source};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Shared flag for commands that read a source file.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Source file (TOML, or JSON by extension) listing the picture's <source> elements
    sources: PathBuf,
}

#[derive(Parser)]
#[command(name = "picture-bg")]
#[command(about = "Pick the background image of a responsive picture per viewport")]
#[command(long_about = "\
Pick the background image of a responsive picture per viewport

Each <source> of a picture becomes a background layer. For a given viewport
the layer whose media query matches with the highest breakpoint is shown.

Source file (TOML):

  [[source]]
  media = \"(min-width: 0px)\"
  srcset = \"hero-640.jpg 640w, hero-1280.jpg 1280w\"

  [[source]]
  media = \"(min-width: 768px)\"
  type = \"image/avif\"
  data-srcset = \"hero-wide.avif\"

Only the first srcset URL of each source is used. JSON files use the same
shape: {\"source\": [{\"media\": ..., \"srcset\": ...}]}.

Run 'picture-bg gen-config' to generate a documented picture-bg.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing picture-bg.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which source is displayed for one viewport
    Select {
        #[command(flatten)]
        source: SourceArgs,
        /// Viewport width in CSS pixels
        #[arg(long)]
        width: u32,
        /// Viewport height in CSS pixels
        #[arg(long, default_value_t = 800)]
        height: u32,
    },
    /// Show where the displayed source changes across a width range
    Sweep {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = 0)]
        from: u32,
        #[arg(long, default_value_t = 2560)]
        to: u32,
        #[arg(long, default_value_t = 1)]
        step: u32,
        #[arg(long, default_value_t = 800)]
        height: u32,
    },
    /// Validate a source file and list its candidates
    Check(SourceArgs),
    /// Read viewport sizes from stdin (WIDTH or WIDTHxHEIGHT per line), re-select after each settles
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        /// Height used for lines that give only a width
        #[arg(long, default_value_t = 800)]
        height: u32,
    },
    /// Print the stylesheet that positions and styles the background layers
    Css,
    /// Print a stock picture-bg.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Select {
            source: args,
            width,
            height,
        } => {
            let candidates = load_candidates(&args.sources)?;
            let viewport = Viewport::new(width, height);
            let selection = select(&candidates, &viewport);
            output::print_selection(&candidates, &selection, &viewport);
        }
        Command::Sweep {
            source: args,
            from,
            to,
            step,
            height,
        } => {
            if step == 0 {
                return Err("--step must be greater than 0".into());
            }
            let candidates = load_candidates(&args.sources)?;
            let rows: Vec<_> = (from..=to)
                .step_by(step as usize)
                .map(|width| (width, select(&candidates, &Viewport::new(width, height))))
                .collect();
            output::print_sweep(&candidates, &rows);
        }
        Command::Check(args) => {
            let file = source::load_sources(&args.sources)?;
            let candidates = CandidateList::try_from_sources(&file.sources)?;
            output::print_candidates(&candidates);
            println!("==> {} sources are valid", candidates.len());
        }
        Command::Watch {
            source: args,
            height,
        } => {
            let config = config::load_config(&cli.config)?;
            let candidates = load_candidates(&args.sources)?;
            watch(candidates, height, &config)?;
        }
        Command::Css => {
            let config = config::load_config(&cli.config)?;
            print!("{}", config::generate_layer_css(&config.background));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_candidates(path: &Path) -> Result<CandidateList, source::SourceError> {
    let file = source::load_sources(path)?;
    Ok(CandidateList::from_sources(&file.sources))
}

/// Feed stdin viewport sizes through the debouncer into a selector.
///
/// The first selection runs immediately, as on page load, at the first
/// size read. Every later size is a resize signal.
fn watch(
    candidates: CandidateList,
    default_height: u32,
    config: &config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut selector = Selector::new(candidates);
    let mut surface = RecordingSurface::new();
    let mut lines = std::io::stdin().lock().lines();

    let Some(first) = next_viewport(&mut lines, default_height)? else {
        return Ok(());
    };
    let selection = selector.refresh(&first, &mut surface);
    output::print_selection(selector.candidates(), &selection, &first);

    let trigger = DebouncedTrigger::spawn(config.resize.quiescence(), move |viewport: Viewport| {
        let selection = selector.refresh(&viewport, &mut surface);
        output::print_selection(selector.candidates(), &selection, &viewport);
    });
    while let Some(viewport) = next_viewport(&mut lines, default_height)? {
        trigger.signal(viewport);
    }
    // Let the last burst settle before exiting
    std::thread::sleep(config.resize.quiescence() * 2);
    trigger.shutdown();
    Ok(())
}

fn next_viewport<I>(lines: &mut I, default_height: u32) -> std::io::Result<Option<Viewport>>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_viewport(line, default_height) {
            Some(viewport) => return Ok(Some(viewport)),
            None => warn!(line, "ignoring line, expected WIDTH or WIDTHxHEIGHT"),
        }
    }
    Ok(None)
}

fn parse_viewport(line: &str, default_height: u32) -> Option<Viewport> {
    match line.split_once(['x', 'X']) {
        Some((w, h)) => Some(Viewport::new(w.trim().parse().ok()?, h.trim().parse().ok()?)),
        None => Some(Viewport::new(line.parse().ok()?, default_height)),
    }
}
