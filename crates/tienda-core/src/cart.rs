//! # Cart
//!
//! The ephemeral, client-only sale draft.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Line Lifecycle                                  │
//! │                                                                         │
//! │  Scan / click product ──► agregar() ──► line created with a frozen      │
//! │                                         price and a stock ceiling       │
//! │                                         snapshotted at add time         │
//! │                                                                         │
//! │  Scan same product ─────► agregar() ──► existing line quantity +1       │
//! │                                         (never a duplicate line)        │
//! │                                                                         │
//! │  Checkout ──────────────► a_nueva_venta() ──► POST payload, then clear  │
//! │                                                                         │
//! │  The ceiling check is ADVISORY: it races concurrent sales on other      │
//! │  terminals, and the backend's stock decrement is the only authority.    │
//! │  A backend rejection is surfaced by the terminal, not retried.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{NuevaLineaVenta, NuevaVenta, Producto};

// =============================================================================
// Cart Line
// =============================================================================

/// One line of the cart: a product reference, a quantity and the stock
/// ceiling cached when the product was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaCarrito {
    pub producto_id: i64,

    /// Scanned/typed code, kept for display and for matching repeat scans.
    pub codigo: String,

    /// Description frozen at add time.
    pub descripcion: String,

    /// Unit price frozen at add time. Catalog edits after this point do not
    /// reprice the draft.
    pub precio_unitario: Money,

    pub cantidad: i64,

    /// Stock snapshot taken at add time. Not re-fetched; see module docs.
    pub stock_disponible: i64,
}

impl LineaCarrito {
    fn desde_producto(producto: &Producto, cantidad: i64) -> Self {
        LineaCarrito {
            producto_id: producto.id,
            codigo: producto.codigo.clone(),
            descripcion: producto.descripcion.clone(),
            precio_unitario: producto.precio,
            cantidad,
            stock_disponible: producto.cantidad,
        }
    }

    /// Line total (precio × cantidad).
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.precio_unitario * self.cantidad
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The sale draft.
///
/// ## Invariants
/// - Lines are unique by `producto_id`; adding an already-present product
///   increments its line instead of appending
/// - `cantidad` on every line is >= 1 and <= the cached ceiling
/// - Destroyed (cleared) on sale submission or manual removal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrito {
    pub lineas: Vec<LineaCarrito>,
}

impl Carrito {
    pub fn new() -> Self {
        Carrito { lineas: Vec::new() }
    }

    /// Adds a product or increments its existing line.
    ///
    /// Rejects inactive products outright, and rejects with
    /// [`CoreError::StockInsuficiente`] when the resulting quantity would
    /// exceed the ceiling cached at add time. Either way the cart is left
    /// unchanged.
    pub fn agregar(&mut self, producto: &Producto, cantidad: i64) -> CoreResult<()> {
        if !producto.activo {
            return Err(CoreError::ProductoInactivo(producto.codigo.clone()));
        }
        if let Some(linea) = self
            .lineas
            .iter_mut()
            .find(|l| l.producto_id == producto.id)
        {
            let nueva = linea.cantidad + cantidad;
            if nueva > linea.stock_disponible {
                return Err(CoreError::StockInsuficiente {
                    codigo: linea.codigo.clone(),
                    disponible: linea.stock_disponible,
                    solicitado: nueva,
                });
            }
            linea.cantidad = nueva;
            return Ok(());
        }

        if cantidad > producto.cantidad {
            return Err(CoreError::StockInsuficiente {
                codigo: producto.codigo.clone(),
                disponible: producto.cantidad,
                solicitado: cantidad,
            });
        }

        self.lineas.push(LineaCarrito::desde_producto(producto, cantidad));
        Ok(())
    }

    /// Sets the quantity of a line. Zero removes it.
    pub fn cambiar_cantidad(&mut self, producto_id: i64, cantidad: i64) -> CoreResult<()> {
        if cantidad == 0 {
            return self.quitar(producto_id);
        }

        let linea = self
            .lineas
            .iter_mut()
            .find(|l| l.producto_id == producto_id)
            .ok_or_else(|| CoreError::LineaNoEncontrada(producto_id.to_string()))?;

        if cantidad > linea.stock_disponible {
            return Err(CoreError::StockInsuficiente {
                codigo: linea.codigo.clone(),
                disponible: linea.stock_disponible,
                solicitado: cantidad,
            });
        }
        linea.cantidad = cantidad;
        Ok(())
    }

    /// Removes a line by product id.
    pub fn quitar(&mut self, producto_id: i64) -> CoreResult<()> {
        let antes = self.lineas.len();
        self.lineas.retain(|l| l.producto_id != producto_id);
        if self.lineas.len() == antes {
            Err(CoreError::LineaNoEncontrada(producto_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn limpiar(&mut self) {
        self.lineas.clear();
    }

    #[inline]
    pub fn esta_vacio(&self) -> bool {
        self.lineas.is_empty()
    }

    /// Number of distinct lines.
    pub fn num_lineas(&self) -> usize {
        self.lineas.len()
    }

    /// Total quantity across all lines.
    pub fn unidades(&self) -> i64 {
        self.lineas.iter().map(|l| l.cantidad).sum()
    }

    /// Grand total of the draft.
    pub fn total(&self) -> Money {
        self.lineas.iter().map(|l| l.subtotal()).sum()
    }

    /// Re-validates every line against its cached ceiling before submission.
    ///
    /// Not atomic with the backend decrement; a concurrent sale elsewhere
    /// can still win the race, and the backend rejection is what settles it.
    pub fn validar(&self) -> CoreResult<()> {
        if self.esta_vacio() {
            return Err(CoreError::CarritoVacio);
        }
        for linea in &self.lineas {
            if linea.cantidad > linea.stock_disponible {
                return Err(CoreError::StockInsuficiente {
                    codigo: linea.codigo.clone(),
                    disponible: linea.stock_disponible,
                    solicitado: linea.cantidad,
                });
            }
        }
        Ok(())
    }

    /// Builds the `POST /api/ventas` payload. Validates first.
    pub fn a_nueva_venta(&self, cuenta_id: Option<i64>) -> CoreResult<NuevaVenta> {
        self.validar()?;
        Ok(NuevaVenta {
            cuenta_id,
            productos: self
                .lineas
                .iter()
                .map(|l| NuevaLineaVenta {
                    producto_id: l.producto_id,
                    cantidad: l.cantidad,
                    precio_unitario: l.precio_unitario,
                })
                .collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn producto(id: i64, codigo: &str, precio: i64, stock: i64) -> Producto {
        Producto {
            id,
            codigo: codigo.to_string(),
            descripcion: format!("Producto {}", codigo),
            precio: Money::from_centavos(precio),
            precio_compra: Money::from_centavos(precio / 2),
            proveedor: None,
            cantidad: stock,
            activo: true,
        }
    }

    #[test]
    fn test_agregar_linea() {
        let mut carrito = Carrito::new();
        carrito.agregar(&producto(1, "750", 999, 10), 2).unwrap();

        assert_eq!(carrito.num_lineas(), 1);
        assert_eq!(carrito.unidades(), 2);
        assert_eq!(carrito.total().centavos(), 1998);
    }

    #[test]
    fn test_scan_same_product_twice_increments_line() {
        let mut carrito = Carrito::new();
        let p = producto(1, "750", 999, 10);

        // Two scans of the same barcode, one unit each.
        carrito.agregar(&p, 1).unwrap();
        carrito.agregar(&p, 1).unwrap();

        assert_eq!(carrito.num_lineas(), 1);
        assert_eq!(carrito.lineas[0].cantidad, 2);
    }

    #[test]
    fn test_exceeding_cached_ceiling_is_rejected_without_state_change() {
        let mut carrito = Carrito::new();
        let p = producto(1, "750", 999, 2);

        carrito.agregar(&p, 2).unwrap();
        let err = carrito.agregar(&p, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StockInsuficiente {
                disponible: 2,
                solicitado: 3,
                ..
            }
        ));
        // No state change.
        assert_eq!(carrito.lineas[0].cantidad, 2);
    }

    #[test]
    fn test_producto_inactivo_no_se_vende() {
        let mut carrito = Carrito::new();
        let inactivo = Producto {
            activo: false,
            ..producto(1, "750", 999, 5)
        };
        let err = carrito.agregar(&inactivo, 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductoInactivo(_)));
        assert!(carrito.esta_vacio());
    }

    #[test]
    fn test_initial_add_over_stock_rejected() {
        let mut carrito = Carrito::new();
        let err = carrito.agregar(&producto(1, "750", 999, 1), 3).unwrap_err();
        assert!(matches!(err, CoreError::StockInsuficiente { .. }));
        assert!(carrito.esta_vacio());
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut carrito = Carrito::new();
        let mut p = producto(1, "750", 1000, 10);
        carrito.agregar(&p, 1).unwrap();

        // Catalog refetch brings a new price; the draft keeps the old one.
        p.precio = Money::from_centavos(2000);
        assert_eq!(carrito.lineas[0].precio_unitario.centavos(), 1000);
    }

    #[test]
    fn test_cambiar_cantidad_y_quitar() {
        let mut carrito = Carrito::new();
        carrito.agregar(&producto(1, "750", 999, 10), 1).unwrap();

        carrito.cambiar_cantidad(1, 5).unwrap();
        assert_eq!(carrito.lineas[0].cantidad, 5);

        assert!(carrito.cambiar_cantidad(1, 11).is_err());

        carrito.cambiar_cantidad(1, 0).unwrap();
        assert!(carrito.esta_vacio());

        assert!(matches!(
            carrito.quitar(1),
            Err(CoreError::LineaNoEncontrada(_))
        ));
    }

    #[test]
    fn test_nueva_venta_payload() {
        let mut carrito = Carrito::new();
        carrito.agregar(&producto(1, "750", 1800, 10), 2).unwrap();
        carrito.agregar(&producto(2, "8410", 500, 4), 1).unwrap();

        let venta = carrito.a_nueva_venta(Some(7)).unwrap();
        assert_eq!(venta.cuenta_id, Some(7));
        assert_eq!(venta.productos.len(), 2);
        assert_eq!(venta.productos[0].precio_unitario.centavos(), 1800);
    }

    #[test]
    fn test_empty_cart_cannot_checkout() {
        let carrito = Carrito::new();
        assert!(matches!(
            carrito.a_nueva_venta(None),
            Err(CoreError::CarritoVacio)
        ));
    }
}
