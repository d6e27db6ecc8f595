//! The single-file encode/decode CLI (§6): `stego METHOD {encode|decode}
//! -s SOURCE [-o OUTPUT] [-y] [-p key=value]...`.
//!
//! Method-specific options travel as repeated `-p key=value` pairs rather
//! than per-method generated flags: each method already declares its
//! options as a runtime `ParamDescriptor` list (for documentation/`--help`
//! text), and `clap` cannot derive per-subcommand flag sets from a list
//! that varies by the `METHOD` positional at compile time. `SideParams` is
//! the out-of-band transport spec.md assumes (§3); this CLI logs the
//! encoded side-params to stderr so the caller can copy them into the
//! matching `-p` flags on decode.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use audiosteg::bits::BitBuffer;
use audiosteg::error::StegoError;
use audiosteg::facade::MethodFacade;
use audiosteg::method::{MethodTag, ParamValue, SideParams};
use audiosteg::wav::{read_wav, write_wav};

#[derive(Parser)]
#[command(name = "stego", about = "Hide or recover a payload in a WAV cover signal")]
struct Cli {
    /// Steganography method to use.
    method: String,

    #[command(subcommand)]
    mode: ModeCmd,
}

#[derive(Subcommand)]
enum ModeCmd {
    Encode(EncodeArgs),
    Decode(DecodeArgs),
}

#[derive(Args)]
struct EncodeArgs {
    #[arg(short = 's', long)]
    source: String,
    #[arg(short = 'o', long)]
    output: Option<String>,
    #[arg(short = 'y', long, default_value_t = false)]
    overwrite: bool,
    /// File to encode in SOURCE.
    #[arg(short = 'f', long, conflicts_with = "text")]
    file: Option<String>,
    /// Text to encode in SOURCE.
    #[arg(short = 't', long, conflicts_with = "file")]
    text: Option<String>,
    /// Method-specific option, `key=value`; may be repeated.
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,
}

#[derive(Args)]
struct DecodeArgs {
    #[arg(short = 's', long)]
    source: String,
    #[arg(short = 'o', long)]
    output: Option<String>,
    #[arg(short = 'y', long, default_value_t = false)]
    overwrite: bool,
    /// Method-specific option, `key=value`; may be repeated. Must include
    /// every side-param the matching encode call reported (at minimum `l`).
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,
}

fn parse_param(s: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got {s}"))?;
    let parsed = if let Ok(i) = value.parse::<i64>() {
        ParamValue::Int(i)
    } else if let Ok(f) = value.parse::<f64>() {
        ParamValue::Float(f)
    } else if value == "true" || value == "false" {
        ParamValue::Bool(value == "true")
    } else {
        ParamValue::Str(value.to_string())
    };
    Ok((key.to_string(), parsed))
}

fn side_params_from(pairs: &[(String, ParamValue)]) -> SideParams {
    let mut opts = SideParams::new();
    for (key, value) in pairs {
        opts.insert(key.clone(), value.clone());
    }
    opts
}

fn default_output_path(source: &str, method: &str, mode_suffix: &str) -> String {
    let path = Path::new(source);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("wav");
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let name = if mode_suffix.is_empty() { format!("{stem}_{method}.{ext}") } else { format!("{stem}_{method}.{mode_suffix}") };
    parent.join(name).to_string_lossy().into_owned()
}

fn resolve_output(requested: Option<&str>, source: &str, method: &str, mode_suffix: &str, overwrite: bool) -> Result<Option<PathBuf>, StegoError> {
    let target = match requested {
        Some("-") => return Ok(None),
        Some(p) => p.to_string(),
        None => default_output_path(source, method, mode_suffix),
    };
    if !overwrite && Path::new(&target).exists() {
        return Err(StegoError::OutputFileExists(target));
    }
    Ok(Some(PathBuf::from(target)))
}

fn run() -> Result<(), StegoError> {
    let cli = Cli::parse();
    let tag: MethodTag = cli.method.parse()?;
    let facade = MethodFacade::new(tag);

    match cli.mode {
        ModeCmd::Encode(args) => {
            let cover = read_wav(&args.source)?;
            let payload = if let Some(text) = &args.text {
                BitBuffer::from_str_utf8(text)
            } else if let Some(path) = &args.file {
                let bytes = std::fs::read(path)?;
                BitBuffer::from_bytes(&bytes)
            } else {
                return Err(StegoError::InvalidParameter("encode requires -f or -t".into()));
            };

            let opts = side_params_from(&args.params);
            let (stego, side) = facade.encode(&cover, &payload, &opts)?;

            log::info!("side-params for decode: {}", side.to_json()?);

            let output = resolve_output(args.output.as_deref(), &args.source, tag.as_str(), "", args.overwrite)?;
            match output {
                Some(path) => write_wav(path.to_str().ok_or_else(|| StegoError::Io("non-UTF8 output path".into()))?, &stego)?,
                None => return Err(StegoError::InvalidParameter("-o - is only valid in decode mode".into())),
            }
        }
        ModeCmd::Decode(args) => {
            let stego = read_wav(&args.source)?;
            let side = side_params_from(&args.params);
            let decoded = facade.decode(&stego, &side)?;

            let output = resolve_output(args.output.as_deref(), &args.source, tag.as_str(), "out", args.overwrite)?;
            match output {
                Some(path) => std::fs::write(path, decoded.to_bytes())?,
                None => std::io::stdout().write_all(&decoded.to_bytes())?,
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("stego: error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
