//! # Cart State
//!
//! Thread-safe wrapper around the sale in progress.
//!
//! The cart itself (line math, stock ceilings, checkout conversion) lives in
//! `tienda-core`. This wrapper only adds the locking discipline: commands
//! borrow the cart through a closure so the mutex is never held across an
//! await point.

use std::sync::{Arc, Mutex};

use tienda_core::Carrito;

/// Shared handle to the cart of the sale in progress.
#[derive(Debug, Clone, Default)]
pub struct CarritoState {
    carrito: Arc<Mutex<Carrito>>,
}

impl CarritoState {
    pub fn new() -> Self {
        CarritoState::default()
    }

    /// Runs `f` with shared access to the cart.
    pub fn con_carrito<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Carrito) -> R,
    {
        let carrito = self.carrito.lock().expect("carrito mutex poisoned");
        f(&carrito)
    }

    /// Runs `f` with exclusive access to the cart.
    pub fn con_carrito_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Carrito) -> R,
    {
        let mut carrito = self.carrito.lock().expect("carrito mutex poisoned");
        f(&mut carrito)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::{Money, Producto};

    fn producto() -> Producto {
        Producto {
            id: 1,
            codigo: "750".to_string(),
            descripcion: "Refresco 600ml".to_string(),
            precio: Money::from_centavos(1800),
            precio_compra: Money::from_centavos(1200),
            proveedor: None,
            cantidad: 10,
            activo: true,
        }
    }

    #[test]
    fn test_closure_access() {
        let estado = CarritoState::new();
        estado
            .con_carrito_mut(|c| c.agregar(&producto(), 2))
            .unwrap();
        let total = estado.con_carrito(|c| c.total());
        assert_eq!(total.centavos(), 3600);
    }

    #[test]
    fn test_clone_shares_cart() {
        let estado = CarritoState::new();
        let otra = estado.clone();
        estado
            .con_carrito_mut(|c| c.agregar(&producto(), 1))
            .unwrap();
        assert_eq!(otra.con_carrito(|c| c.num_lineas()), 1);
    }
}
