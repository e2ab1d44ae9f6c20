//! # Catalog State
//!
//! The in-memory product and account caches shared by every screen.
//!
//! These are the lists the scanner lookup runs against. They are
//! non-authoritative: fetched on startup and replaced wholesale after every
//! write (checkout, stock addition, product save, abono), never mutated in
//! place. That wholesale-replacement discipline is what makes a plain mutex
//! with short critical sections sufficient here.

use std::sync::{Arc, Mutex};

use tienda_core::{Cuenta, Producto};

/// Shared catalog caches.
#[derive(Debug, Default)]
pub struct CatalogoState {
    productos: Arc<Mutex<Vec<Producto>>>,
    cuentas: Arc<Mutex<Vec<Cuenta>>>,
}

impl CatalogoState {
    pub fn new() -> Self {
        CatalogoState::default()
    }

    /// Replaces the product cache with a fresh backend snapshot.
    pub fn reemplazar_productos(&self, productos: Vec<Producto>) {
        *self.productos.lock().expect("catalogo mutex poisoned") = productos;
    }

    /// Replaces the account cache.
    pub fn reemplazar_cuentas(&self, cuentas: Vec<Cuenta>) {
        *self.cuentas.lock().expect("cuentas mutex poisoned") = cuentas;
    }

    /// Runs `f` over the current product snapshot.
    pub fn con_productos<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Producto]) -> R,
    {
        let productos = self.productos.lock().expect("catalogo mutex poisoned");
        f(&productos)
    }

    /// Runs `f` over the current account snapshot.
    pub fn con_cuentas<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Cuenta]) -> R,
    {
        let cuentas = self.cuentas.lock().expect("cuentas mutex poisoned");
        f(&cuentas)
    }

    /// Exact-code lookup, cloned out of the snapshot.
    pub fn buscar_codigo(&self, codigo: &str) -> Option<Producto> {
        self.con_productos(|ps| tienda_core::scanner::buscar_por_codigo(ps, codigo).cloned())
    }

    /// Lookup by backend id.
    pub fn buscar_id(&self, id: i64) -> Option<Producto> {
        self.con_productos(|ps| ps.iter().find(|p| p.id == id).cloned())
    }

    /// All codes currently known, for the barcode generator's snapshot.
    pub fn codigos(&self) -> std::collections::HashSet<String> {
        self.con_productos(|ps| ps.iter().map(|p| p.codigo.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::Money;

    fn producto(id: i64, codigo: &str) -> Producto {
        Producto {
            id,
            codigo: codigo.to_string(),
            descripcion: format!("Producto {}", codigo),
            precio: Money::from_centavos(1000),
            precio_compra: Money::from_centavos(600),
            proveedor: None,
            cantidad: 5,
            activo: true,
        }
    }

    #[test]
    fn test_wholesale_replacement() {
        let estado = CatalogoState::new();
        estado.reemplazar_productos(vec![producto(1, "750")]);
        assert!(estado.buscar_codigo("750").is_some());

        // The refetch replaced the snapshot; the old entry is gone.
        estado.reemplazar_productos(vec![producto(2, "8410")]);
        assert!(estado.buscar_codigo("750").is_none());
        assert!(estado.buscar_id(2).is_some());
    }

    #[test]
    fn test_codigos_snapshot() {
        let estado = CatalogoState::new();
        estado.reemplazar_productos(vec![producto(1, "750"), producto(2, "8410")]);
        let codigos = estado.codigos();
        assert!(codigos.contains("750"));
        assert!(codigos.contains("8410"));
        assert_eq!(codigos.len(), 2);
    }
}
