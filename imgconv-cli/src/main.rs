use anyhow::{Context, Result};
use clap::Parser;

use std::io::Read;
use std::path::{Path, PathBuf};

use imgconv::{ConvertConfig, Converted, OutputFormat, SourceImageBytes};

#[derive(Parser)]
#[command(name = "imgconv")]
#[command(about = "Convert one image (HEIC included) to JPEG, PNG, BMP, TIFF or GIF", long_about = None)]
#[command(version)]
struct Args {
    /// Input image file, or `-` to read stdin
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output format: jpeg (jpg), png, bmp, tiff or gif
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Input is base64 text or a `data:image/...;base64,` URL
    #[arg(long, default_value_t)]
    base64: bool,

    /// Original file name, used to name the output
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Replace an existing output file
    #[arg(long, default_value_t)]
    overwrite: bool,

    /// Remember format, output directory and overwrite for next time
    #[arg(long, default_value_t)]
    save_config: bool,

    /// Verbose output
    #[arg(short, long, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, default_value_t)]
    quiet: bool,
}

/// Effective settings after layering flags over the saved config.
#[derive(Debug, PartialEq)]
struct Settings {
    format: String,
    output_dir: PathBuf,
    overwrite: bool,
}

impl Settings {
    fn resolve(args: &Args, config: &ConvertConfig) -> Result<Self> {
        let format = match (&args.format, config.output_format) {
            (Some(format), _) => format.clone(),
            (None, Some(format)) => format.as_str().to_string(),
            (None, None) => {
                anyhow::bail!("Please select an output format before converting.")
            }
        };

        let output_dir = args
            .output_dir
            .clone()
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Settings {
            format,
            output_dir,
            overwrite: args.overwrite || config.overwrite,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose, args.quiet);

    // HEIC/HEIF must be registered before the first decode
    imgconv::initialize_codecs();

    let config = ConvertConfig::load().unwrap_or_default();
    let settings = Settings::resolve(&args, &config)?;

    let source = read_source(&args.input, args.base64, args.name.as_deref())?;

    if !args.quiet {
        log::info!(
            "Converting: `{}` to {}",
            source.filename().unwrap_or("stdin"),
            settings.format
        );
    }

    let converted = imgconv::convert(&source, &settings.format).context("Conversion failed")?;

    // Create output directory if it doesn't exist
    if !settings.output_dir.exists() {
        std::fs::create_dir_all(&settings.output_dir)
            .context("Failed to create output directory")?;
    }
    let output_path = write_output(&settings.output_dir, &converted, settings.overwrite)?;

    if args.save_config {
        save_config(config, &settings, converted.format);
    }

    if !args.quiet {
        log::info!(
            "Converted image file written: {} ({})",
            output_path.display(),
            converted.mime_type()
        );
    }

    Ok(())
}

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn read_source(input: &Path, base64: bool, name: Option<&str>) -> Result<SourceImageBytes> {
    let from_stdin = input == Path::new("-");

    let raw = if from_stdin {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        if !input.exists() {
            anyhow::bail!("Input file does not exist: {}", input.display());
        }
        std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?
    };

    if raw.is_empty() {
        anyhow::bail!("No file to convert!");
    }

    if base64 {
        let text = String::from_utf8(raw).context("Base64 input is not valid UTF-8")?;
        return SourceImageBytes::from_base64(&text, name).context("Failed to read base64 upload");
    }

    // stdin has no file name to keep
    let filename = name.map(str::to_string).or_else(|| {
        (!from_stdin)
            .then(|| input.file_name())
            .flatten()
            .map(|n| n.to_string_lossy().into_owned())
    });

    let source = SourceImageBytes::new(raw);
    Ok(match filename {
        Some(filename) => source.with_filename(filename),
        None => source,
    })
}

fn write_output(dir: &Path, converted: &Converted, overwrite: bool) -> Result<PathBuf> {
    let path = dir.join(&converted.file_name);

    if path.exists() && !overwrite {
        anyhow::bail!(
            "Output file already exists: {} (use --overwrite to replace it)",
            path.display()
        );
    }

    std::fs::write(&path, &converted.bytes).context("Failed to write output file")?;
    Ok(path)
}

fn save_config(mut config: ConvertConfig, settings: &Settings, format: OutputFormat) {
    config.output_format = Some(format);
    config.output_dir = Some(settings.output_dir.clone());
    config.overwrite = settings.overwrite;

    if config.save().is_none() {
        log::warn!("Failed to save config");
    }
}
