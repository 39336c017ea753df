//! Structured errors raised by the server itself, as opposed to the cache.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the umc-offline server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Tool output could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::Serialize(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_error_code() {
        let err: McpError = ToolError::Serialize("bad float".into()).into();
        assert_eq!(err.code.0, -32603);
        assert_eq!(err.message, "bad float");
    }
}
