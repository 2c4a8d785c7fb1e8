//! sixel-view - Show images in the terminal
//!
//! Decodes a PNG or JPEG file and prints it as SIXEL graphics.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use sixel_view::{Config, Converter, IcySixelEncoder, SniffingDecoder};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

/// Long flags that are also accepted with a single dash (`-width 20`,
/// `-scale=2`), the way Go's `flag` package spells them.
const SINGLE_DASH_LONG_FLAGS: [&str; 4] = ["width", "height", "scale", "colors"];

#[derive(Parser, Debug)]
#[command(name = "sixel-view")]
#[command(version)]
#[command(about = "Display an image as SIXEL graphics in the terminal", long_about = None)]
struct Cli {
    /// Input image file (PNG, JPEG, GIF, WebP)
    input: PathBuf,

    /// Output width in pixels (0 for auto)
    #[arg(short, long, default_value_t = 0)]
    width: u32,

    /// Output height in pixels (0 for auto)
    #[arg(short = 'H', long, default_value_t = 0)]
    height: u32,

    /// Scale factor applied to the native size; overrides width and height
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    scale: f64,

    /// Maximum number of colors (2-256)
    #[arg(short, long, default_value = "256")]
    colors: u16,

    /// Dithering strength (0.0 = none, 1.0 = full error diffusion)
    #[arg(short, long)]
    diffusion: Option<f32>,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            width: self.width,
            height: self.height,
            scale: self.scale,
        }
    }
}

/// Rewrite `-width`, `-height`, `-scale` and `-colors` (with or without
/// `=value`) to their double-dash form. Everything after `--` is left alone.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(|arg| {
            if positional_only {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                positional_only = true;
                return arg;
            }
            let Some(flag) = text.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if SINGLE_DASH_LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            // Usage errors share the exit code of conversion failures
            err.print().ok();
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
            return ExitCode::FAILURE;
        }
    };
    log::debug!("arguments: {:?}", cli);

    let mut encoder = IcySixelEncoder::with_palette(cli.colors);
    if let Some(diffusion) = cli.diffusion {
        encoder = encoder.with_diffusion(diffusion);
    }
    let converter = Converter::with_parts(SniffingDecoder, encoder);

    match converter.convert_to_stdout(&cli.input, &cli.config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
