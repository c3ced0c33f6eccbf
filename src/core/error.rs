use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("unknown crackme: {0} (try `re-lab list`)")]
    UnknownCrackme(String),

    #[error("invalid hex candidate: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("charset can not be empty")]
    EmptyCharset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Clipboard access failed (no display, unsupported platform...).
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
}
