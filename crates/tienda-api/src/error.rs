//! # API Error Types
//!
//! Failure taxonomy for backend requests.
//!
//! ## Failure Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Request Failures                                │
//! │                                                                         │
//! │  Transport failed (DNS, refused, timeout) ──► ApiError::Http           │
//! │  Body was not the expected JSON           ──► ApiError::Json           │
//! │  Backend said 404                         ──► ApiError::NoEncontrado   │
//! │  Backend said 409                         ──► ApiError::Conflicto      │
//! │  Backend said anything else non-2xx       ──► ApiError::Estado         │
//! │                                                                         │
//! │  409 gets its own variant because the terminal messages it             │
//! │  specifically: a duplicate product code, or a stock decrement that     │
//! │  lost the race to a concurrent sale. Everything else is "it failed",   │
//! │  shown to the cashier and never retried automatically.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Errors produced by the backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("Error de red: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("Respuesta inválida del servidor: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP 404 from the backend.
    #[error("No encontrado: {recurso}")]
    NoEncontrado { recurso: String },

    /// HTTP 409: the backend rejected the write for consistency reasons
    /// (duplicate codigo, stock already consumed by a concurrent sale).
    #[error("Conflicto: {mensaje}")]
    Conflicto { mensaje: String },

    /// Any other non-success status.
    #[error("El servidor respondió {status}: {mensaje}")]
    Estado { status: u16, mensaje: String },
}

impl ApiError {
    /// Whether this failure is a consistency conflict (over-sell race or
    /// duplicate code) that the terminal messages specifically.
    pub fn es_conflicto(&self) -> bool {
        matches!(self, ApiError::Conflicto { .. })
    }
}

/// Convenience type alias for Results with ApiError.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mensajes() {
        let err = ApiError::Conflicto {
            mensaje: "codigo duplicado".to_string(),
        };
        assert_eq!(err.to_string(), "Conflicto: codigo duplicado");
        assert!(err.es_conflicto());

        let err = ApiError::Estado {
            status: 500,
            mensaje: "Internal Server Error".to_string(),
        };
        assert!(!err.es_conflicto());
        assert!(err.to_string().contains("500"));
    }
}
