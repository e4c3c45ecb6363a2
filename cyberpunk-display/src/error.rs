use cyberpunk_data::DataError;
use thiserror::Error;

/// All errors generated in `cyberpunk-display`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisplayError {
    #[error("sliding window has no prices to snapshot")]
    EmptyWindow,

    #[error("feed: {0}")]
    Data(#[from] DataError),

    #[error("http request failed: {0}")]
    Http(String),

    #[error("device io failed: {0}")]
    Io(String),

    #[error("display line {line:?} is {width} bytes wide, expected 16")]
    LineWidth { line: String, width: usize },

    #[error("brightness {0} is outside 0..=8")]
    Brightness(u8),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("price feed task ended")]
    FeedEnded,
}

impl From<reqwest::Error> for DisplayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}

impl From<std::io::Error> for DisplayError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}
