//! # Barcode Generation
//!
//! Client-side generation of numeric product codes for items that arrive
//! without a printed barcode (bulk goods, house products).
//!
//! The generator draws a random 12-digit code and retries on collision
//! against the catalog snapshot it was given, up to [`MAX_INTENTOS`] times.
//!
//! ## Known Caveat
//! The snapshot is whatever the caller last fetched; it is not guaranteed
//! fresh at submission time. A code that is unique here can still collide on
//! the backend, which rejects the save with a uniqueness violation. The
//! terminal recognizes that rejection (HTTP 409) and messages it as a
//! duplicate code rather than a generic save failure.

use std::collections::HashSet;

use rand::Rng;

use crate::error::{CoreError, CoreResult};

/// Retry budget before giving up.
pub const MAX_INTENTOS: u32 = 100;

/// Digits in a generated code. Long enough that collisions against a
/// small-shop catalog are vanishingly rare, short enough to key in by hand.
pub const LONGITUD_CODIGO: usize = 12;

/// Generates a numeric code absent from `existentes`.
///
/// The Rng is injected so tests can drive collisions deterministically.
///
/// ## Example
/// ```rust
/// use std::collections::HashSet;
/// use tienda_core::barcode::generar_codigo_unico;
///
/// let existentes: HashSet<String> = ["750".to_string()].into_iter().collect();
/// let codigo = generar_codigo_unico(&existentes, &mut rand::thread_rng()).unwrap();
/// assert_eq!(codigo.len(), 12);
/// assert!(codigo.chars().all(|c| c.is_ascii_digit()));
/// ```
pub fn generar_codigo_unico<R: Rng>(
    existentes: &HashSet<String>,
    rng: &mut R,
) -> CoreResult<String> {
    for _ in 0..MAX_INTENTOS {
        let codigo = codigo_aleatorio(rng);
        if !existentes.contains(&codigo) {
            return Ok(codigo);
        }
    }
    Err(CoreError::CodigoAgotado {
        intentos: MAX_INTENTOS,
    })
}

/// One random candidate. First digit is never zero so the code survives
/// round trips through systems that treat it as a number.
fn codigo_aleatorio<R: Rng>(rng: &mut R) -> String {
    let mut codigo = String::with_capacity(LONGITUD_CODIGO);
    codigo.push(char::from(b'1' + rng.gen_range(0..9u8)));
    for _ in 1..LONGITUD_CODIGO {
        codigo.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    codigo
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_twelve_digits() {
        let mut rng = StdRng::seed_from_u64(1);
        let codigo = generar_codigo_unico(&HashSet::new(), &mut rng).unwrap();
        assert_eq!(codigo.len(), LONGITUD_CODIGO);
        assert!(codigo.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(codigo.chars().next(), Some('0'));
    }

    #[test]
    fn test_retries_past_collisions() {
        let mut rng = StdRng::seed_from_u64(42);
        // Pre-poison the snapshot with the first two draws of this seed.
        let mut existentes = HashSet::new();
        {
            let mut espejo = StdRng::seed_from_u64(42);
            existentes.insert(codigo_aleatorio(&mut espejo));
            existentes.insert(codigo_aleatorio(&mut espejo));
        }

        let codigo = generar_codigo_unico(&existentes, &mut rng).unwrap();
        assert!(!existentes.contains(&codigo));
    }

    #[test]
    fn test_exhausted_budget_is_a_typed_error() {
        // An rng whose every draw lands in the snapshot: mirror the exact
        // sequence of MAX_INTENTOS draws.
        let mut existentes = HashSet::new();
        {
            let mut espejo = StdRng::seed_from_u64(7);
            for _ in 0..MAX_INTENTOS {
                existentes.insert(codigo_aleatorio(&mut espejo));
            }
        }

        let mut rng = StdRng::seed_from_u64(7);
        let err = generar_codigo_unico(&existentes, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            CoreError::CodigoAgotado {
                intentos: MAX_INTENTOS
            }
        ));
    }
}
