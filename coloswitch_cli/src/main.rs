use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use coloswitch::workflow::{self, PaletteChoices, RecolorOutcome, RecolorRequest};
use coloswitch::SamplingSettings;

#[derive(Parser, Debug)]
#[command(name = "coloswitch")]
#[command(about = "List the dominant colors of an image and swap one of them for another")]
struct Cli {
    /// JSON file with sampling settings, missing fields fall back to defaults
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the most frequent visible colors
    Palette {
        input: PathBuf,

        /// Print the choices as JSON
        #[arg(long)]
        json: bool,
    },
    /// Repaint every pixel close to one color with another one
    Replace {
        input: PathBuf,

        /// Color to replace, defaults to the most frequent one
        #[arg(long)]
        from: Option<String>,

        /// `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`
        #[arg(long, default_value = "#000000")]
        to: String,

        /// Maximal RGB distance to `from`, between 0 and 100
        #[arg(long, default_value_t = 30.)]
        tolerance: f64,

        /// Where to write the PNG
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug)]
enum Error {
    Coloswitch(coloswitch::Error),
    Settings(serde_json::Error),
    NoColors,
    Recolor(String),
}
impl From<coloswitch::Error> for Error {
    fn from(value: coloswitch::Error) -> Self {
        Self::Coloswitch(value)
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Coloswitch(value.into())
    }
}
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Settings(value)
    }
}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Coloswitch(e) => write!(f, "Error: {e}"),
            Error::Settings(e) => write!(f, "Error: invalid settings: {e}"),
            Error::NoColors => f.write_str(workflow::NO_COLORS_FOUND),
            Error::Recolor(message) => f.write_str(message),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let settings = load_settings(cli.settings.as_deref())?;
    match cli.command {
        Command::Palette { input, json } => {
            let image = load_image(&input)?;
            let choices = workflow::extract_choices(&image, &settings);
            if json {
                println!("{}", serde_json::to_string_pretty(&choices)?);
            } else {
                print_choices(&choices);
            }
        }
        Command::Replace {
            input,
            from,
            to,
            tolerance,
            output,
        } => {
            let image = load_image(&input)?;
            let selected_color = match from {
                Some(from) => from,
                None => workflow::extract_choices(&image, &settings)
                    .selected
                    .ok_or(Error::NoColors)?
                    .to_string(),
            };
            let request = RecolorRequest {
                selected_color,
                target_color: to,
                tolerance,
            };
            match workflow::process(&image, &request) {
                RecolorOutcome::Recolored { image, matched } => {
                    std::fs::write(&output, workflow::encode_png(&image)?)?;
                    log::info!("Wrote {}", output.display());
                    println!("{matched} pixels recolored");
                }
                RecolorOutcome::Failed { message } => return Err(Error::Recolor(message)),
            }
        }
    }
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<SamplingSettings, Error> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            parse_settings(&text)
        }
        None => Ok(SamplingSettings::default()),
    }
}

fn parse_settings(text: &str) -> Result<SamplingSettings, Error> {
    let settings: SamplingSettings = serde_json::from_str(text)?;
    settings.validate()?;
    Ok(settings)
}

fn load_image(path: &Path) -> Result<coloswitch::ImageBuf, Error> {
    let bytes = std::fs::read(path)?;
    let image = workflow::decode_image(&bytes)?;
    log::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

fn print_choices(choices: &PaletteChoices) {
    if choices.is_empty() {
        println!("{}", choices.message);
        return;
    }
    for entry in choices.palette.entries() {
        println!("{}  {}", entry.color, entry.count);
    }
}
