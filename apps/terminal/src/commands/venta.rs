//! # Sale Commands
//!
//! The checkout screen: scans land in the cart, the cashier adjusts lines
//! and finally charges either as a completed cash sale or against a credit
//! account.
//!
//! ## Checkout Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scan ──► catalog lookup ──► Carrito::agregar (ceiling check)           │
//! │                                                                         │
//! │  cobrar:                                                                │
//! │    1. Carrito::a_nueva_venta  (rejects empty cart, freezes prices)      │
//! │    2. POST /api/ventas        (backend decrements stock atomically)     │
//! │    3. clear cart + refetch catalog                                      │
//! │                                                                         │
//! │  The local ceiling check is advisory. If a concurrent sale took the     │
//! │  stock first, the backend answers 409 and the cart stays intact so      │
//! │  the cashier can drop the line and retry.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tienda_api::ApiClient;
use tienda_core::scanner::{despachar, ScanSink};
use tienda_core::{CoreError, CostoLote, LineaVenta, Producto, Venta};

use crate::error::{AppError, CodigoError};
use crate::state::{CarritoState, CatalogoState};

/// Outcome of feeding a completed scan to the sale screen.
#[derive(Debug)]
pub enum ResultadoEscaneo {
    /// Product found and one unit added to the cart.
    Agregado(Producto),

    /// Unknown codigo. The caller offers to register it.
    NoEncontrado(String),
}

/// This screen's scan sink: a hit lands one unit in the cart, a miss is
/// reported back so the caller can offer registration.
struct SinkCarrito<'a> {
    carrito: &'a CarritoState,
    resultado: Result<ResultadoEscaneo, CoreError>,
}

impl ScanSink for SinkCarrito<'_> {
    fn producto_encontrado(&mut self, producto: &Producto) {
        self.resultado = self
            .carrito
            .con_carrito_mut(|c| c.agregar(producto, 1))
            .map(|_| ResultadoEscaneo::Agregado(producto.clone()));
    }

    fn codigo_no_encontrado(&mut self, _codigo: &str) {
        // The sink starts out carrying the miss.
    }
}

/// Resolves a scanned codigo through the shared dispatcher and adds one
/// unit to the cart. An unknown codigo is not an error here; it starts the
/// register-product flow instead.
pub fn escanear_al_carrito(
    catalogo: &CatalogoState,
    carrito: &CarritoState,
    codigo: &str,
) -> Result<ResultadoEscaneo, AppError> {
    let mut sink = SinkCarrito {
        carrito,
        resultado: Ok(ResultadoEscaneo::NoEncontrado(codigo.to_string())),
    };
    catalogo.con_productos(|ps| despachar(ps, codigo, &mut sink));
    Ok(sink.resultado?)
}

/// Sets a line to an explicit quantity; zero removes it. The cashier works
/// in codigos, the cart in product ids.
pub fn cambiar_cantidad(
    carrito: &CarritoState,
    codigo: &str,
    cantidad: i64,
) -> Result<(), AppError> {
    carrito.con_carrito_mut(|c| {
        let id = linea_por_codigo(c, codigo)?;
        c.cambiar_cantidad(id, cantidad)
    })?;
    Ok(())
}

/// Drops a line from the cart.
pub fn quitar_linea(carrito: &CarritoState, codigo: &str) -> Result<(), AppError> {
    carrito.con_carrito_mut(|c| {
        let id = linea_por_codigo(c, codigo)?;
        c.quitar(id)
    })?;
    Ok(())
}

fn linea_por_codigo(
    carrito: &tienda_core::Carrito,
    codigo: &str,
) -> Result<i64, tienda_core::CoreError> {
    carrito
        .lineas
        .iter()
        .find(|l| l.codigo == codigo)
        .map(|l| l.producto_id)
        .ok_or_else(|| tienda_core::CoreError::LineaNoEncontrada(codigo.to_string()))
}

/// Empties the cart without charging.
pub fn cancelar_venta(carrito: &CarritoState) {
    carrito.con_carrito_mut(|c| c.limpiar());
}

/// Charges the cart. `cuenta_id` of `None` is a cash sale (COMPLETADA);
/// `Some` books the total against that credit account (PRESTAMO).
///
/// On success the cart is cleared and the catalog refetched so the new
/// stock counts are visible immediately. On any failure the cart is left
/// untouched.
pub async fn cobrar(
    api: &ApiClient,
    catalogo: &CatalogoState,
    carrito: &CarritoState,
    cuenta_id: Option<i64>,
) -> Result<Venta, AppError> {
    let nueva = carrito.con_carrito(|c| c.a_nueva_venta(cuenta_id))?;
    let venta = api.ventas().crear(&nueva).await.map_err(|err| {
        if err.es_conflicto() {
            AppError::new(
                CodigoError::Conflicto,
                "Stock insuficiente en el servidor; otro cobro se adelantó",
            )
        } else {
            err.into()
        }
    })?;

    carrito.con_carrito_mut(|c| c.limpiar());
    let productos = api.productos().listar().await?;
    catalogo.reemplazar_productos(productos);

    tracing::info!(venta_id = venta.id, total = venta.total.centavos(), "venta cobrada");
    Ok(venta)
}

/// Sale history, newest first.
pub async fn historial(api: &ApiClient) -> Result<Vec<Venta>, AppError> {
    let mut ventas = api.ventas().listar().await?;
    ventas.sort_by(|a, b| b.fecha.cmp(&a.fecha));
    Ok(ventas)
}

/// Lines of a past sale, for the history detail view.
pub async fn lineas_de(api: &ApiClient, venta_id: i64) -> Result<Vec<LineaVenta>, AppError> {
    Ok(api.ventas().productos_de(venta_id).await?)
}

/// Lot costs consumed by a past sale, for the margin column.
pub async fn costos_de(api: &ApiClient, venta_id: i64) -> Result<Vec<CostoLote>, AppError> {
    Ok(api.ventas().costos_lotes(venta_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::Money;

    fn producto(codigo: &str, cantidad: i64) -> Producto {
        Producto {
            id: 1,
            codigo: codigo.to_string(),
            descripcion: "Refresco 600ml".to_string(),
            precio: Money::from_centavos(1800),
            precio_compra: Money::from_centavos(1200),
            proveedor: None,
            cantidad,
            activo: true,
        }
    }

    #[test]
    fn test_escaneo_agrega_al_carrito() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_productos(vec![producto("750", 5)]);
        let carrito = CarritoState::new();

        let resultado = escanear_al_carrito(&catalogo, &carrito, "750").unwrap();
        assert!(matches!(resultado, ResultadoEscaneo::Agregado(_)));
        assert_eq!(carrito.con_carrito(|c| c.unidades()), 1);
    }

    #[test]
    fn test_escaneo_desconocido_no_es_error() {
        let catalogo = CatalogoState::new();
        let carrito = CarritoState::new();

        let resultado = escanear_al_carrito(&catalogo, &carrito, "999").unwrap();
        match resultado {
            ResultadoEscaneo::NoEncontrado(codigo) => assert_eq!(codigo, "999"),
            otro => panic!("esperaba NoEncontrado, fue {:?}", otro),
        }
        assert!(carrito.con_carrito(|c| c.esta_vacio()));
    }

    #[test]
    fn test_escaneo_respeta_techo_de_stock() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_productos(vec![producto("750", 1)]);
        let carrito = CarritoState::new();

        escanear_al_carrito(&catalogo, &carrito, "750").unwrap();
        let err = escanear_al_carrito(&catalogo, &carrito, "750").unwrap_err();
        assert_eq!(err.codigo, CodigoError::Carrito);
        // The failed scan changed nothing.
        assert_eq!(carrito.con_carrito(|c| c.unidades()), 1);
    }

    #[test]
    fn test_escaneo_de_producto_inactivo_es_rechazado() {
        let catalogo = CatalogoState::new();
        let inactivo = Producto {
            activo: false,
            ..producto("750", 5)
        };
        catalogo.reemplazar_productos(vec![inactivo]);
        let carrito = CarritoState::new();

        let err = escanear_al_carrito(&catalogo, &carrito, "750").unwrap_err();
        assert_eq!(err.codigo, CodigoError::Carrito);
        assert!(err.mensaje.contains("inactivo"));
        assert!(carrito.con_carrito(|c| c.esta_vacio()));
    }

    #[test]
    fn test_cantidad_cero_quita_la_linea() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_productos(vec![producto("750", 5)]);
        let carrito = CarritoState::new();

        escanear_al_carrito(&catalogo, &carrito, "750").unwrap();
        cambiar_cantidad(&carrito, "750", 0).unwrap();
        assert!(carrito.con_carrito(|c| c.esta_vacio()));
    }
}
