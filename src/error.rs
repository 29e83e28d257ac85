use std::fmt;
use std::io;

/// Errors surfaced by the globe engine and its terminal front-end
#[derive(Debug)]
pub enum GlobeError {
    /// The output device cannot host the animation (not a tty, too small)
    UnsupportedBackend(String),
    Data(String),
    UnknownCountry(String),
    Config(String),
    /// Curve bulge undefined: endpoints average out at the globe center
    DegenerateCurve { from: String, to: String },
    Io(io::Error),
}

impl fmt::Display for GlobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlobeError::UnsupportedBackend(msg) => write!(f, "unsupported rendering backend: {msg}"),
            GlobeError::Data(msg) => write!(f, "invalid globe data: {msg}"),
            GlobeError::UnknownCountry(key) => write!(f, "unknown country: {key}"),
            GlobeError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            GlobeError::DegenerateCurve { from, to } => {
                write!(f, "degenerate connector curve between {from} and {to}")
            }
            GlobeError::Io(err) => write!(f, "terminal error: {err}"),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlobeError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GlobeError {
    fn from(err: io::Error) -> Self {
        GlobeError::Io(err)
    }
}
