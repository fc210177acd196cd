use std::fmt;

#[derive(Debug)]
pub enum LinkError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, duplicate symbol, etc.).
    ConfigValidation(String),
    /// A publisher symbol referenced by the caller is not configured.
    UnknownPublisher(String),
    /// An input document could not be read as a whole.
    InputParse { source: String, detail: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownPublisher(symbol) => write!(f, "unknown publisher: {symbol}"),
            Self::InputParse { source, detail } => {
                write!(f, "input '{source}': {detail}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LinkError {}
