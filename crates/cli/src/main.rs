#![deny(unsafe_code)]
//! CLI binary for the palkit palette engine.
//!
//! Subcommands:
//! - `convert <in> <out>`: re-encode a palette in another format
//! - `info <in>`: list colours and statistics
//! - `nearest <in> <colour>`: find the closest palette entry
//! - `apply <in> <op>`: run a transform and write the result

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use palkit_core::{Colour, ColourConfig, Metric, Palette, PaletteFormat, Translation};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "palkit", about = "Indexed palette toolkit")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Colour configuration file (JSON). Missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a palette file to another format.
    Convert {
        input: PathBuf,
        output: PathBuf,

        /// Input format (raw, image, csv, jasc, gimp). Guessed from the extension if omitted.
        #[arg(long)]
        from: Option<PaletteFormat>,

        /// Output format. Guessed from the extension if omitted.
        #[arg(long)]
        to: Option<PaletteFormat>,
    },
    /// Print the colours of a palette and how many are distinct.
    Info {
        input: PathBuf,

        #[arg(long)]
        from: Option<PaletteFormat>,
    },
    /// Find the palette entry closest to a colour.
    Nearest {
        input: PathBuf,

        /// Colour to match, as hex ("#rrggbb").
        #[arg(value_parser = parse_colour)]
        colour: Colour,

        /// Match metric (old, rgb, hsl, cie76, cie94, ciede2000). Defaults to the configured one.
        #[arg(short, long)]
        metric: Option<Metric>,

        #[arg(long)]
        from: Option<PaletteFormat>,
    },
    /// Apply a transform to a palette and write the result.
    Apply {
        input: PathBuf,

        /// Output file path. Defaults to overwriting the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        from: Option<PaletteFormat>,

        #[arg(long)]
        to: Option<PaletteFormat>,

        #[command(subcommand)]
        op: Operation,
    },
}

#[derive(Subcommand)]
enum Operation {
    /// Blend toward a colour.
    Tint {
        #[arg(value_parser = parse_colour)]
        colour: Colour,
        /// Blend amount in [0, 1].
        amount: f64,
        /// Index range "start:end" (inclusive). Defaults to the whole palette.
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Recolour by grey level.
    Colourise {
        #[arg(value_parser = parse_colour)]
        colour: Colour,
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Scale saturation by a factor in [0, 2].
    Saturate {
        amount: f64,
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Scale lightness by a factor in [0, 2].
    Illuminate {
        amount: f64,
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Rotate hue by a fraction of a turn in [0, 1].
    Shift {
        amount: f64,
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Invert RGB channels.
    Invert {
        #[arg(short, long, value_parser = parse_range)]
        range: Option<(usize, usize)>,
    },
    /// Fill an index range with a gradient.
    Gradient {
        #[arg(value_parser = parse_range)]
        range: (usize, usize),
        #[arg(value_parser = parse_colour)]
        start: Colour,
        #[arg(value_parser = parse_colour)]
        end: Colour,
    },
    /// Integer tint of the whole palette by shift/steps.
    Idtint {
        #[arg(value_parser = parse_colour)]
        colour: Colour,
        shift: i32,
        steps: i32,
    },
    /// Apply a translation table such as "0:15=16:31, 32:47=#[255,0,0]".
    Translate { translation: Translation },
}

fn parse_colour(s: &str) -> Result<Colour, String> {
    Colour::from_hex(s).map_err(|e| e.to_string())
}

fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (a, b) = s
        .split_once(':')
        .ok_or_else(|| format!("expected 'start:end', got '{s}'"))?;
    let index = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|_| format!("invalid index '{v}'"))
    };
    Ok((index(a)?, index(b)?))
}

fn to_bounds(range: Option<(usize, usize)>) -> RangeInclusive<usize> {
    range.map_or(0..=usize::MAX, |(start, end)| start..=end)
}

fn resolve_format(explicit: Option<PaletteFormat>, path: &Path) -> Result<PaletteFormat, CliError> {
    explicit
        .or_else(|| PaletteFormat::from_extension(path))
        .ok_or_else(|| {
            CliError::Input(format!(
                "cannot guess palette format of '{}', pass one of: {}",
                path.display(),
                PaletteFormat::list_names().join(", ")
            ))
        })
}

fn load_config(path: Option<&Path>) -> Result<ColourConfig, CliError> {
    let Some(path) = path else {
        return Ok(ColourConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    Ok(ColourConfig::from_json(&text)?)
}

fn load_palette(
    path: &Path,
    format: Option<PaletteFormat>,
    config: ColourConfig,
) -> Result<(Palette, PaletteFormat), CliError> {
    let format = resolve_format(format, path)?;
    tracing::debug!(path = %path.display(), %format, "loading palette");
    let mut palette = Palette::with_config(palkit_core::format::MAX_COLOURS, config);
    palette.load_file(path, format)?;
    Ok((palette, format))
}

fn apply(palette: &mut Palette, op: Operation) -> &'static str {
    match op {
        Operation::Tint {
            colour,
            amount,
            range,
        } => {
            palette.tint(colour, amount, to_bounds(range));
            "tint"
        }
        Operation::Colourise { colour, range } => {
            palette.colourise(colour, to_bounds(range));
            "colourise"
        }
        Operation::Saturate { amount, range } => {
            palette.saturate(amount, to_bounds(range));
            "saturate"
        }
        Operation::Illuminate { amount, range } => {
            palette.illuminate(amount, to_bounds(range));
            "illuminate"
        }
        Operation::Shift { amount, range } => {
            palette.shift(amount, to_bounds(range));
            "shift"
        }
        Operation::Invert { range } => {
            palette.invert(to_bounds(range));
            "invert"
        }
        Operation::Gradient {
            range: (first, last),
            start,
            end,
        } => {
            palette.set_gradient(first, last, start, end);
            "gradient"
        }
        Operation::Idtint {
            colour,
            shift,
            steps,
        } => {
            palette.idtint(colour.r, colour.g, colour.b, shift, steps);
            "idtint"
        }
        Operation::Translate { translation } => {
            palette.apply_translation(&translation);
            "translate"
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert {
            input,
            output,
            from,
            to,
        } => {
            let (palette, from) = load_palette(&input, from, config)?;
            let to = resolve_format(to, &output)?;
            palette.save_file(&output, to)?;

            if cli.json {
                let info = serde_json::json!({
                    "input": input.display().to_string(),
                    "output": output.display().to_string(),
                    "from": from.to_string(),
                    "to": to.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "converted {} ({from}) -> {} ({to})",
                    input.display(),
                    output.display()
                );
            }
        }
        Command::Info { input, from } => {
            let (palette, format) = load_palette(&input, from, config)?;
            let colours: Vec<Colour> = palette.colours().collect();
            let unique = palette.count_colours();

            if cli.json {
                let info = serde_json::json!({
                    "input": input.display().to_string(),
                    "format": format.to_string(),
                    "unique": unique,
                    "transparent_index": palette.transparent_index(),
                    "colours": colours,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{} ({format}), {unique} unique colours", input.display());
                for (i, c) in colours.iter().enumerate() {
                    println!("  {i:3}  {}", c.to_hex());
                }
            }
        }
        Command::Nearest {
            input,
            colour,
            metric,
            from,
        } => {
            let (palette, _) = load_palette(&input, from, config)?;
            let metric = metric.unwrap_or(palette.config().match_metric);
            let index = palette.nearest_colour(colour, metric);
            let distance = palette.colour_diff(colour, index, metric);

            if cli.json {
                let info = serde_json::json!({
                    "colour": colour,
                    "metric": metric.to_string(),
                    "index": index,
                    "match": palette.colour(index),
                    "distance": distance,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!(
                    "{index} {} ({metric} distance {distance:.4})",
                    palette.colour(index).to_hex()
                );
            }
        }
        Command::Apply {
            input,
            output,
            from,
            to,
            op,
        } => {
            let (mut palette, from) = load_palette(&input, from, config)?;
            let output = output.unwrap_or_else(|| input.clone());
            let to = match to {
                Some(to) => to,
                None if output == input => from,
                None => resolve_format(None, &output)?,
            };
            let name = apply(&mut palette, op);
            palette.save_file(&output, to)?;

            if cli.json {
                let info = serde_json::json!({
                    "operation": name,
                    "output": output.display().to_string(),
                    "format": to.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!("applied {name} -> {} ({to})", output.display());
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palkit=warn,palkit_core=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("palkit: {e}");
        }
        process::exit(e.exit_code());
    }
}
