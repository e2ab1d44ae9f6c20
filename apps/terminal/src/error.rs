//! # App Error Type
//!
//! Unified error type for the terminal's command layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  tienda-core ── CoreError ──┐                                           │
//! │                             ├──► AppError ──► alert line, logged,       │
//! │  tienda-api ─── ApiError ───┘               cashier re-attempts         │
//! │                                                                         │
//! │  Every failure is local and user-facing: caught at the command layer,   │
//! │  logged via tracing, shown as one blocking alert line. Nothing is       │
//! │  retried automatically and there is no recovery path beyond trying      │
//! │  again.                                                                 │
//! │                                                                         │
//! │  One case is messaged specifically: a backend 409. For a product save   │
//! │  that is a duplicate codigo (the local snapshot was stale); for a       │
//! │  checkout it is stock lost to a concurrent sale.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tienda_api::ApiError;
use tienda_core::CoreError;

/// Error shown to the cashier.
#[derive(Debug, Clone)]
pub struct AppError {
    /// Machine-readable code for tests and logs.
    pub codigo: CodigoError,

    /// Human-readable message for the alert line.
    pub mensaje: String,
}

/// Coarse classification of terminal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodigoError {
    /// Resource not found on the backend.
    NoEncontrado,

    /// Pre-submission validation failed.
    Validacion,

    /// Cart rule violated (ceiling, missing line, empty cart).
    Carrito,

    /// Backend consistency rejection (duplicate codigo, over-sell race).
    Conflicto,

    /// Request failed (network or server error).
    Red,

    /// Anything else.
    Interno,
}

impl AppError {
    pub fn new(codigo: CodigoError, mensaje: impl Into<String>) -> Self {
        AppError {
            codigo,
            mensaje: mensaje.into(),
        }
    }

    pub fn validacion(mensaje: impl Into<String>) -> Self {
        AppError::new(CodigoError::Validacion, mensaje)
    }

    pub fn interno(mensaje: impl Into<String>) -> Self {
        AppError::new(CodigoError::Interno, mensaje)
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let codigo = match &err {
            CoreError::ProductoNoEncontrado(_) => CodigoError::NoEncontrado,
            CoreError::StockInsuficiente { .. }
            | CoreError::ProductoInactivo(_)
            | CoreError::LineaNoEncontrada(_)
            | CoreError::CarritoVacio => CodigoError::Carrito,
            CoreError::Validacion(_) | CoreError::MontoInvalido(_) => CodigoError::Validacion,
            CoreError::CodigoAgotado { .. } => CodigoError::Interno,
        };
        AppError::new(codigo, err.to_string())
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NoEncontrado { recurso } => AppError::new(
                CodigoError::NoEncontrado,
                format!("No encontrado: {}", recurso),
            ),
            ApiError::Conflicto { mensaje } => AppError::new(CodigoError::Conflicto, mensaje),
            ApiError::Http(e) => {
                tracing::error!("fallo de red: {}", e);
                AppError::new(CodigoError::Red, "No se pudo contactar al servidor")
            }
            ApiError::Json(e) => {
                tracing::error!("respuesta inválida: {}", e);
                AppError::new(CodigoError::Red, "Respuesta inválida del servidor")
            }
            ApiError::Estado { status, mensaje } => {
                tracing::error!(status, %mensaje, "el servidor rechazó la petición");
                AppError::new(
                    CodigoError::Red,
                    format!("El servidor respondió {}: {}", status, mensaje),
                )
            }
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::interno(format!("Error de E/S: {}", err))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mensaje)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicto_preserves_backend_message() {
        let err: AppError = ApiError::Conflicto {
            mensaje: "El código 750 ya existe".to_string(),
        }
        .into();
        assert_eq!(err.codigo, CodigoError::Conflicto);
        assert_eq!(err.mensaje, "El código 750 ya existe");
    }

    #[test]
    fn test_core_stock_error_is_cart_code() {
        let err: AppError = CoreError::StockInsuficiente {
            codigo: "750".to_string(),
            disponible: 1,
            solicitado: 2,
        }
        .into();
        assert_eq!(err.codigo, CodigoError::Carrito);
    }
}
