use thiserror::Error;

#[derive(Error, Debug)]
pub enum GbotError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Tunnel error: {0}")]
    Tunnel(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unexpected answer from the REST API. Both variants carry the expected and the actual code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unexpected status: expected {expected}, got {actual}")]
    Status { expected: u16, actual: u16 },

    #[error("unexpected meta code: expected {expected}, got {actual}")]
    MetaCode { expected: i64, actual: i64 },
}

/// A JSON shape the parsers cannot map onto a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` is not {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, GbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_mentions_both_codes() {
        let err = GbotError::from(ProtocolError::Status {
            expected: 202,
            actual: 500,
        });
        let text = err.to_string();
        assert!(text.contains("202"));
        assert!(text.contains("500"));
    }

    #[test]
    fn test_meta_code_error_message() {
        let err = ProtocolError::MetaCode {
            expected: 200,
            actual: 401,
        };
        assert_eq!(err.to_string(), "unexpected meta code: expected 200, got 401");
    }

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::MissingField {
            field: "attachments",
        };
        assert_eq!(err.to_string(), "missing field `attachments`");
    }
}
