//! # Error Types
//!
//! Domain-specific error types for tienda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tienda-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tienda-api errors (separate crate)                                    │
//! │  └── ApiError         - Backend request failures                       │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── AppError         - What the cashier sees (alert line)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → alert                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (codigo, id, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product in the catalog snapshot matches the given code.
    #[error("Producto no encontrado: {0}")]
    ProductoNoEncontrado(String),

    /// Requested quantity exceeds the stock ceiling cached when the line
    /// was added to the cart.
    ///
    /// ## Note
    /// This check is advisory only. The backend performs the authoritative
    /// stock decrement and may still reject the sale; that rejection is
    /// surfaced separately by the terminal.
    #[error("Stock insuficiente para {codigo}: disponible {disponible}, solicitado {solicitado}")]
    StockInsuficiente {
        codigo: String,
        disponible: i64,
        solicitado: i64,
    },

    /// The product is soft-deleted and cannot be sold or written off.
    #[error("El producto {0} está inactivo")]
    ProductoInactivo(String),

    /// The cart line for the given product code does not exist.
    #[error("El producto {0} no está en el carrito")]
    LineaNoEncontrada(String),

    /// Checkout attempted with an empty cart.
    #[error("El carrito está vacío")]
    CarritoVacio,

    /// Barcode generation exhausted its retry budget without finding a code
    /// absent from the catalog snapshot.
    #[error("No se pudo generar un código único después de {intentos} intentos")]
    CodigoAgotado { intentos: u32 },

    /// A money string could not be parsed as a decimal amount.
    #[error("Monto inválido: '{0}'")]
    MontoInvalido(String),

    /// Validation error (wraps ValidationError).
    #[error("Error de validación: {0}")]
    Validacion(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Validation is shallow (non-empty, non-negative, numeric) and runs before
/// anything leaves the terminal. Anything deeper is the backend's job.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} es obligatorio")]
    Requerido { field: String },

    /// Value must not be negative.
    #[error("{field} no puede ser negativo")]
    Negativo { field: String },

    /// Value must be strictly positive (abono amounts, quantities).
    #[error("{field} debe ser mayor que cero")]
    NoPositivo { field: String },

    /// Field value is too long for the backend contract.
    #[error("{field} no puede exceder {max} caracteres")]
    DemasiadoLargo { field: String, max: usize },

    /// A product code must be numeric.
    #[error("{field} debe contener solo dígitos")]
    NoNumerico { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::StockInsuficiente {
            codigo: "750".to_string(),
            disponible: 3,
            solicitado: 5,
        };
        assert_eq!(
            err.to_string(),
            "Stock insuficiente para 750: disponible 3, solicitado 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Requerido {
            field: "descripcion".to_string(),
        };
        assert_eq!(err.to_string(), "descripcion es obligatorio");

        let err = ValidationError::NoPositivo {
            field: "monto".to_string(),
        };
        assert_eq!(err.to_string(), "monto debe ser mayor que cero");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Requerido {
            field: "codigo".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validacion(_)));
    }
}
