//! Centralized Error Handling Module
//!
//! Every failure that leaves the engine or the store flows through
//! [`AppError`] with a unique code, so logs and API responses agree.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CIDR_xxx: input validation errors
//! - STORAGE_xxx: asset store errors
//! - API_xxx: API errors
//! - CFG_xxx: Configuration errors

use std::fmt;

use thiserror::Error;

/// Normalizer failure. The only negative result the engine produces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CidrError {
    #[error("invalid IP or CIDR format: {input:?}")]
    InvalidFormat { input: String },
}

/// Asset store failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Input Errors (1xx)
    // ============================================
    /// Not a parseable IPv4/IPv6 address or address/prefix pair
    CidrInvalidFormat,

    // ============================================
    // Storage Errors (2xx)
    // ============================================
    /// Store cannot be read or written
    StorageUnavailable,

    // ============================================
    // API Errors (3xx)
    // ============================================
    ApiBadRequest,
    ApiRateLimited,
    ApiInternalError,
    ApiNotFound,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    ConfigInvalidValue,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CidrInvalidFormat => "CIDR_INVALID_FORMAT",

            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",
            Self::ApiNotFound => "API_NOT_FOUND",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::CidrInvalidFormat | Self::ApiBadRequest | Self::ConfigInvalidValue => 400,
            Self::ApiNotFound => 404,
            Self::ApiRateLimited => 429,
            Self::StorageUnavailable => 503,
            Self::ApiInternalError => 500,
        }
    }

    /// Only infrastructure failures are worth retrying; bad input never is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiNotFound, msg)
    }

    pub fn invalid_config(key: &str, value: &str) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid value for {}: {:?}", key, value),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<CidrError> for AppError {
    fn from(err: CidrError) -> Self {
        let message = match &err {
            CidrError::InvalidFormat { input } => format!("Invalid IP or CIDR format: {:?}", input),
        };
        Self::with_source(ErrorCode::CidrInvalidFormat, message, err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::with_source(ErrorCode::StorageUnavailable, "Asset store unavailable", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: AppError = CidrError::InvalidFormat {
            input: "not-an-ip".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::CidrInvalidFormat);
        assert_eq!(err.code_str(), "CIDR_INVALID_FORMAT");
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::StorageUnavailable.is_retryable());
        assert!(!ErrorCode::CidrInvalidFormat.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::CidrInvalidFormat.http_status(), 400);
        assert_eq!(ErrorCode::ApiNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::StorageUnavailable.http_status(), 503);
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::ApiInternalError.http_status(), 500);
    }

    #[test]
    fn test_store_error_keeps_source() {
        let err: AppError = StoreError::Poisoned.into();
        assert_eq!(err.code, ErrorCode::StorageUnavailable);
        assert!(std::error::Error::source(&err).is_some());
    }
}
