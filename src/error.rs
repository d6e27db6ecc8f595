//! Crate-wide error type.

use std::fmt;

/// Everything that can go wrong encoding, decoding or evaluating a signal.
///
/// Exit codes for the five kinds the CLI's external interface names
/// (§6/§7) follow that table exactly; `InvalidParameter` and `Io` are
/// ambient additions the distilled interface table didn't enumerate (see
/// DESIGN.md).
#[derive(Debug)]
pub enum StegoError {
    /// Unknown `MethodTag` passed on the command line.
    InvalidMethod(String),
    /// Unknown encode/decode mode.
    InvalidMode(String),
    /// Output path exists and `-y`/overwrite was not given.
    OutputFileExists(String),
    /// Input file could not be found.
    FileNotFound(String),
    /// WAV container was malformed or used an unsupported dtype.
    WavReadError(String),
    /// Payload (scaled by the method's per-bit storage cost) does not fit
    /// in the cover signal; raised before any stego buffer is allocated.
    SecretTooLarge { secret_bits: usize, capacity_bits: usize },
    /// A method-specific parameter was out of range (`depth`, `d0 >= d1`,
    /// a non-positive delay, ...).
    InvalidParameter(String),
    /// Generic I/O failure outside the CLI's file-not-found path: dataset
    /// traversal, CSV writing, side-param files.
    Io(String),
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StegoError::InvalidMethod(m) => write!(f, "unknown method: {m}"),
            StegoError::InvalidMode(m) => write!(f, "unknown mode: {m}"),
            StegoError::OutputFileExists(p) => write!(f, "output file already exists: {p}"),
            StegoError::FileNotFound(p) => write!(f, "file not found: {p}"),
            StegoError::WavReadError(msg) => write!(f, "WAV error: {msg}"),
            StegoError::SecretTooLarge { secret_bits, capacity_bits } => write!(
                f,
                "secret is too large: {secret_bits} bits requested, {capacity_bits} bits available"
            ),
            StegoError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            StegoError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for StegoError {}

impl From<std::io::Error> for StegoError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            StegoError::FileNotFound(e.to_string())
        } else {
            StegoError::Io(e.to_string())
        }
    }
}

impl From<hound::Error> for StegoError {
    fn from(e: hound::Error) -> Self {
        StegoError::WavReadError(e.to_string())
    }
}

impl From<serde_json::Error> for StegoError {
    fn from(e: serde_json::Error) -> Self {
        StegoError::InvalidParameter(e.to_string())
    }
}

impl From<csv::Error> for StegoError {
    fn from(e: csv::Error) -> Self {
        StegoError::Io(e.to_string())
    }
}

impl StegoError {
    /// Process exit code, per the EXTERNAL INTERFACES §6 table.
    pub fn exit_code(&self) -> i32 {
        match self {
            StegoError::InvalidMethod(_) => 1,
            StegoError::InvalidMode(_) => 2,
            StegoError::OutputFileExists(_) => 3,
            StegoError::FileNotFound(_) => 4,
            StegoError::WavReadError(_) => 5,
            StegoError::SecretTooLarge { .. } => 6,
            StegoError::InvalidParameter(_) => 7,
            StegoError::Io(_) => 8,
        }
    }
}

pub type Result<T> = std::result::Result<T, StegoError>;
