use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use icon_manager::{
    AnimationSettings, AutoVariantKind, BuildFormat, Configurable, IconEntry, IconSession,
    build_icons_module, build_sprite, render_preview_png,
};

/// Animate, clean, and recolor SVG icons
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Workspace root holding `icon-manager.json`
    #[arg(short, long, global = true, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    workspace: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the animation an icon carries as JSON
    Detect { input: PathBuf },

    /// Remove embedded animation artifacts
    Clean {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Embed an animation
    Embed {
        input: PathBuf,
        /// Animation name, e.g. `spin` or `draw`
        animation: String,
        #[command(flatten)]
        settings: SettingsArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the editable colors of an icon as JSON
    Colors {
        input: PathBuf,
        /// Keep near-black SMIL keyframe colors
        #[arg(long)]
        all: bool,
    },

    /// Replace one color
    ReplaceColor {
        input: PathBuf,
        old: String,
        new: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a CSS filter to the root style
    Filter {
        input: PathBuf,
        /// Filter value, e.g. `hue-rotate(90deg)`
        filter: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a generated palette for an icon
    AutoVariant {
        input: PathBuf,
        /// invert, darken, lighten, muted, or grayscale
        kind: AutoVariantKind,
    },

    /// Print the stored variants of an icon as JSON
    Variants {
        icon: String,
        /// Include internal variants such as `_original`
        #[arg(long)]
        all: bool,
    },

    /// Print the stored profile of an icon as JSON
    Profile {
        /// Icon name as stored in the variants file
        icon: String,
        input: PathBuf,
    },

    /// Build every `.svg` of a directory into the configured artifact
    Build {
        #[arg(value_hint = clap::ValueHint::DirPath)]
        icons: PathBuf,
        /// Override the configured artifact
        #[arg(long, value_parser = parse_format)]
        format: Option<BuildFormat>,
    },

    /// Render a PNG preview
    Preview {
        input: PathBuf,
        output: PathBuf,
        #[arg(short, long, default_value_t = 64)]
        size: u32,
    },
}

/// Overrides of the configured default animation settings
#[derive(clap::Args, Debug)]
struct SettingsArgs {
    /// Duration in seconds
    #[arg(long)]
    duration: Option<f64>,
    /// CSS timing function
    #[arg(long)]
    timing: Option<String>,
    /// `infinite` or an iteration count
    #[arg(long)]
    iteration: Option<String>,
    /// Delay in seconds
    #[arg(long)]
    delay: Option<f64>,
    /// CSS animation-direction
    #[arg(long)]
    direction: Option<String>,
}

impl SettingsArgs {
    fn resolve(&self, defaults: &AnimationSettings) -> AnimationSettings {
        let mut settings = defaults.clone();
        if let Some(duration) = self.duration {
            settings.duration = duration;
        }
        if let Some(timing) = &self.timing {
            settings.timing = timing.clone();
        }
        if let Some(iteration) = &self.iteration {
            settings.iteration = iteration.clone();
        }
        if let Some(delay) = self.delay {
            settings.delay = delay;
        }
        if let Some(direction) = &self.direction {
            settings.direction = direction.clone();
        }
        settings
    }
}

fn parse_format(value: &str) -> Result<BuildFormat, String> {
    match value {
        "icons-js" | "js" => Ok(BuildFormat::IconsJs),
        "sprite" => Ok(BuildFormat::Sprite),
        _ => Err(format!("unknown build format '{value}'")),
    }
}

fn main() {
    let cli = Cli::parse();

    log::set_logger(&LOGGER).ok();
    log::set_max_level(if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Off
    } else {
        log::LevelFilter::Warn
    });

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}.");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut session = IconSession::open(&cli.workspace).map_err(|e| e.to_string())?;

    match cli.command {
        Commands::Detect { input } => {
            let svg = read(&input)?;
            let detected = session.manipulator().detect_animation_from_svg(&svg);
            print_json(&detected)?;
        }
        Commands::Clean { input, output } => {
            let svg = read(&input)?;
            let cleaned = session.manipulator().clean_animation_from_svg(&svg);
            write(output.as_deref(), cleaned.as_bytes())?;
        }
        Commands::Embed {
            input,
            animation,
            settings,
            output,
        } => {
            let svg = read(&input)?;
            let settings = settings.resolve(&session.config().default_animation);
            let embedded = session
                .manipulator()
                .embed_animation_in_svg(&svg, &animation, &settings);
            write(output.as_deref(), embedded.as_bytes())?;
        }
        Commands::Colors { input, all } => {
            let svg = read(&input)?;
            let colors = if all {
                session.colors().extract_all_colors_from_svg(&svg)
            } else {
                session.colors().extract_colors_from_svg(&svg)
            };
            print_json(&colors)?;
        }
        Commands::ReplaceColor {
            input,
            old,
            new,
            output,
        } => {
            let svg = read(&input)?;
            let replaced = session.colors().replace_color_in_svg(&svg, &old, &new);
            write(output.as_deref(), replaced.as_bytes())?;
        }
        Commands::Filter {
            input,
            filter,
            output,
        } => {
            let svg = read(&input)?;
            let filtered = session.manipulator().apply_css_filter(&svg, &filter);
            write(output.as_deref(), filtered.as_bytes())?;
        }
        Commands::AutoVariant { input, kind } => {
            let svg = read(&input)?;
            let colors = session.colors().extract_colors_from_svg(&svg).colors;
            let variant = session.colors().generate_auto_variant_colors(&colors, kind);
            print_json(&variant)?;
        }
        Commands::Variants { icon, all } => {
            let variants = if all {
                session.variants().get_all_variants(&icon)
            } else {
                session.variants().get_saved_variants(&icon)
            };
            print_json(&variants)?;
        }
        Commands::Profile { icon, input } => {
            let svg = read(&input)?;
            let profile = session.export_profile(&icon, &svg);
            print_json(&profile)?;
        }
        Commands::Build { icons, format } => {
            let entries = collect_icons(&mut session, &icons)?;
            let mut config = session.config().clone();
            if let Some(format) = format {
                config.build_format = format;
            }
            let rendered = match config.build_format {
                BuildFormat::IconsJs => {
                    build_icons_module(session.manipulator(), &entries).map_err(|e| e.to_string())?
                }
                BuildFormat::Sprite => build_sprite(session.manipulator(), &entries),
            };
            let path = config.output_path(&cli.workspace);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create '{}' cause {}", parent.display(), e))?;
            }
            write(Some(&path), rendered.as_bytes())?;
            log::info!("built {} icons into '{}'", entries.len(), path.display());
        }
        Commands::Preview {
            input,
            output,
            size,
        } => {
            let svg = read(&input)?;
            let png = render_preview_png(&svg, size).map_err(|e| e.to_string())?;
            write(Some(&output), &png)?;
        }
    }

    session.dispose().map_err(|e| e.to_string())
}

/// Reads every `.svg` of `dir`, sorted by name, with its stored default
/// variant and animation preset applied.
fn collect_icons(session: &mut IconSession, dir: &Path) -> Result<Vec<IconEntry>, String> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| format!("cannot read '{}' cause {}", dir.display(), e))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")))
        .collect();
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            log::warn!("skipping '{}': file name is not UTF-8", path.display());
            continue;
        };
        let mut svg = read(&path)?;

        if let Some(variant) = session.variants().get_default_variant(name) {
            match session.apply_variant(name, &svg, &variant) {
                Some(applied) => svg = applied,
                None => log::warn!("'{name}': default variant '{variant}' does not exist"),
            }
        }

        let mut entry = IconEntry::new(name, svg);
        if let Some(animation) = session.variants().get_animation(name) {
            entry = entry.with_animation(animation);
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read '{}' cause {}", path.display(), e))
}

fn write(path: Option<&Path>, data: &[u8]) -> Result<(), String> {
    match path {
        Some(path) => fs::write(path, data)
            .map_err(|e| format!("cannot write '{}' cause {}", path.display(), e)),
        None => {
            use std::io::Write;
            std::io::stdout()
                .write_all(data)
                .map_err(|e| format!("cannot write to stdout cause {e}"))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                log::Level::Info => eprintln!("Info (in {}:{}): {}", target, line, args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
