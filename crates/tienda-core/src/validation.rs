//! # Validation Module
//!
//! Pre-submission validation for the terminal's forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal forms (this module)                                 │
//! │  ├── Shallow checks only: non-empty, non-negative, numeric code        │
//! │  └── Immediate cashier feedback before any request leaves              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Backend REST API (not this repo)                             │
//! │  ├── Authoritative stock, uniqueness and consistency checks            │
//! │  └── Rejections surfaced back to the cashier, never retried            │
//! │                                                                         │
//! │  Validation here is deliberately shallow; anything deeper belongs      │
//! │  to the backend and stays there.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{NuevaCuenta, NuevaMerma, NuevoProducto};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product code: non-empty, digits only, at most 20 characters
/// (the longest burst a hardware scanner produces).
///
/// ## Example
/// ```rust
/// use tienda_core::validation::validar_codigo;
///
/// assert!(validar_codigo("7501055300105").is_ok());
/// assert!(validar_codigo("").is_err());
/// assert!(validar_codigo("ABC-1").is_err());
/// ```
pub fn validar_codigo(codigo: &str) -> ValidationResult<()> {
    let codigo = codigo.trim();

    if codigo.is_empty() {
        return Err(ValidationError::Requerido {
            field: "codigo".to_string(),
        });
    }
    if codigo.len() > 20 {
        return Err(ValidationError::DemasiadoLargo {
            field: "codigo".to_string(),
            max: 20,
        });
    }
    if !codigo.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NoNumerico {
            field: "codigo".to_string(),
        });
    }
    Ok(())
}

/// Validates a required free-text field.
pub fn validar_texto_requerido(field: &str, valor: &str) -> ValidationResult<()> {
    if valor.trim().is_empty() {
        return Err(ValidationError::Requerido {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a money amount that may be zero but not negative (prices,
/// purchase costs).
pub fn validar_monto_no_negativo(field: &str, monto: Money) -> ValidationResult<()> {
    if monto.is_negative() {
        return Err(ValidationError::Negativo {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a strictly positive amount (abonos).
pub fn validar_monto_positivo(field: &str, monto: Money) -> ValidationResult<()> {
    if monto.is_negative() || monto.is_zero() {
        return Err(ValidationError::NoPositivo {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a strictly positive quantity (cart lines, stock additions,
/// merma lines).
pub fn validar_cantidad(field: &str, cantidad: i64) -> ValidationResult<()> {
    if cantidad <= 0 {
        return Err(ValidationError::NoPositivo {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Form Validators
// =============================================================================

/// Validates a new-product form before `POST /api/productos`.
pub fn validar_nuevo_producto(producto: &NuevoProducto) -> ValidationResult<()> {
    validar_codigo(&producto.codigo)?;
    validar_texto_requerido("descripcion", &producto.descripcion)?;
    validar_monto_no_negativo("precio", producto.precio)?;
    validar_monto_no_negativo("precioCompra", producto.precio_compra)?;
    if producto.cantidad < 0 {
        return Err(ValidationError::Negativo {
            field: "cantidad".to_string(),
        });
    }
    Ok(())
}

/// Validates a new-account form.
pub fn validar_nueva_cuenta(cuenta: &NuevaCuenta) -> ValidationResult<()> {
    validar_texto_requerido("nombre", &cuenta.nombre)
}

/// Validates a merma draft before submission: a tipo is always present (it
/// is an enum), the motivo is required and every line quantity is positive.
pub fn validar_nueva_merma(merma: &NuevaMerma) -> ValidationResult<()> {
    validar_texto_requerido("motivo", &merma.motivo)?;
    if merma.lineas.is_empty() {
        return Err(ValidationError::Requerido {
            field: "lineas".to_string(),
        });
    }
    for linea in &merma.lineas {
        validar_cantidad("cantidad", linea.cantidad)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
