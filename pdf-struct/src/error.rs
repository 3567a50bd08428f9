use std::fmt::{Display, Formatter};

/// Errors produced while decoding a PDF's structural skeleton.
///
/// `Reference` is reserved for future use: nothing in this crate raises
/// it yet, but it distinguishes "an indirect reference could not be
/// resolved" from a plain syntax error should that distinction become
/// load-bearing later.
#[derive(Debug)]
pub enum Error {
    /// Malformed PDF syntax: missing header, missing `%%EOF`, missing
    /// `xref`, unknown token, wrong dictionary key type, unsupported
    /// non-zero generation, unresolved `/Length`, unterminated stream,
    /// duplicated `/Root` or `/Info`.
    Parse(&'static str),
    /// An `Object` was used as a kind it is not (e.g. keyed lookup on a
    /// non-`Dictionary`).
    Type(&'static str),
    /// Reserved; not currently raised.
    Reference(&'static str),
    Io(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
            Error::Type(msg) => write!(f, "type error: {msg}"),
            Error::Reference(msg) => write!(f, "reference error: {msg}"),
            Error::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
