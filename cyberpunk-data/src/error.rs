use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// All errors generated in `cyberpunk-data`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("failed to parse feed url: {0}")]
    Url(String),

    #[error("SocketError: {0}")]
    Socket(String),

    #[error("failed to decompress frame: {0}")]
    Decompress(String),

    #[error("failed to deserialise payload: {error}, payload: {payload}")]
    Deserialise { error: String, payload: String },

    #[error("subscription rejected with status: {status}")]
    SubscriptionRejected { status: String },

    #[error("frame is missing expected field: {0}")]
    MissingField(&'static str),

    #[error("price received for unconfigured market: {0}")]
    UnknownMarket(String),

    #[error("non-finite price received: {0}")]
    InvalidPrice(f64),

    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
}

impl DataError {
    /// Determine if an error requires the [`StreamClient`](crate::client::StreamClient) to
    /// re-establish its connection.
    ///
    /// Every other variant signals an incompatible protocol and is surfaced to the caller.
    #[allow(clippy::match_like_matches_macro)]
    pub fn is_terminal(&self) -> bool {
        match self {
            DataError::Socket(_) => true,
            _ => false,
        }
    }

    pub(crate) fn deserialise(error: serde_json::Error, payload: &str) -> Self {
        Self::Deserialise {
            error: error.to_string(),
            payload: payload.to_string(),
        }
    }
}

impl From<tungstenite::Error> for DataError {
    fn from(value: tungstenite::Error) -> Self {
        Self::Socket(value.to_string())
    }
}

impl From<url::ParseError> for DataError {
    fn from(value: url::ParseError) -> Self {
        Self::Url(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_error_is_terminal() {
        struct TestCase {
            input: DataError,
            expected: bool,
        }

        let tests = vec![
            TestCase {
                // TC0: is terminal w/ DataError::Socket
                input: DataError::from(tungstenite::Error::ConnectionClosed),
                expected: true,
            },
            TestCase {
                // TC1: is not terminal w/ rejected subscription
                input: DataError::SubscriptionRejected {
                    status: "error".to_string(),
                },
                expected: false,
            },
            TestCase {
                // TC2: is not terminal w/ missing field
                input: DataError::MissingField("ch"),
                expected: false,
            },
            TestCase {
                // TC3: is not terminal w/ undecodable frame
                input: DataError::Decompress("invalid gzip header".to_string()),
                expected: false,
            },
            TestCase {
                // TC4: is not terminal w/ non-finite price
                input: DataError::InvalidPrice(f64::NAN),
                expected: false,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = test.input.is_terminal();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }
}
