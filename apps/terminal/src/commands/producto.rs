//! # Product Commands
//!
//! Inventory screen operations: catalog listing with filter and sort,
//! product creation and editing, stock additions and barcode generation.
//!
//! Creation and editing validate locally first, but the backend has the
//! last word: a 409 means the codigo existed on the server even though the
//! local snapshot did not show it, and the command surfaces that as the
//! duplicate it is instead of a generic failure.

use tienda_api::ApiClient;
use tienda_core::{barcode, validation, NuevoProducto, Producto};

use crate::error::{AppError, CodigoError};
use crate::state::CatalogoState;

/// Sort orders for the inventory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdenProductos {
    Descripcion,
    PrecioAscendente,
    PrecioDescendente,
    StockAscendente,
}

/// Refetches the product catalog and replaces the local cache.
pub async fn refrescar_catalogo(
    api: &ApiClient,
    catalogo: &CatalogoState,
) -> Result<(), AppError> {
    let productos = api.productos().listar().await?;
    catalogo.reemplazar_productos(productos);
    Ok(())
}

/// Filtered, sorted view over the cached catalog.
///
/// The filter matches codigo exactly or descripcion as a case-insensitive
/// substring. An empty query returns everything.
pub fn listar_productos(
    catalogo: &CatalogoState,
    consulta: &str,
    orden: OrdenProductos,
    solo_activos: bool,
) -> Vec<Producto> {
    let consulta = consulta.trim().to_lowercase();
    let mut productos = catalogo.con_productos(|ps| {
        ps.iter()
            .filter(|p| !solo_activos || p.activo)
            .filter(|p| {
                consulta.is_empty()
                    || p.codigo == consulta
                    || p.descripcion.to_lowercase().contains(&consulta)
            })
            .cloned()
            .collect::<Vec<_>>()
    });
    match orden {
        OrdenProductos::Descripcion => {
            productos.sort_by(|a, b| a.descripcion.cmp(&b.descripcion))
        }
        OrdenProductos::PrecioAscendente => productos.sort_by_key(|p| p.precio),
        OrdenProductos::PrecioDescendente => {
            productos.sort_by_key(|p| std::cmp::Reverse(p.precio))
        }
        OrdenProductos::StockAscendente => productos.sort_by_key(|p| p.cantidad),
    }
    productos
}

/// Creates a product and refreshes the catalog.
pub async fn crear_producto(
    api: &ApiClient,
    catalogo: &CatalogoState,
    nuevo: &NuevoProducto,
) -> Result<Producto, AppError> {
    validation::validar_nuevo_producto(nuevo).map_err(tienda_core::CoreError::from)?;
    let creado = api.productos().crear(nuevo).await.map_err(conflicto_codigo)?;
    refrescar_catalogo(api, catalogo).await?;
    Ok(creado)
}

/// Saves edits to an existing product and refreshes the catalog.
pub async fn editar_producto(
    api: &ApiClient,
    catalogo: &CatalogoState,
    id: i64,
    cambios: &NuevoProducto,
) -> Result<Producto, AppError> {
    validation::validar_nuevo_producto(cambios).map_err(tienda_core::CoreError::from)?;
    let actualizado = api
        .productos()
        .actualizar(id, cambios)
        .await
        .map_err(conflicto_codigo)?;
    refrescar_catalogo(api, catalogo).await?;
    Ok(actualizado)
}

/// Registers a restock: adds units and records the lot's purchase price.
pub async fn agregar_stock(
    api: &ApiClient,
    catalogo: &CatalogoState,
    id: i64,
    cantidad: i64,
    precio_compra: tienda_core::Money,
) -> Result<Producto, AppError> {
    validation::validar_cantidad("cantidad", cantidad)
        .map_err(tienda_core::CoreError::from)?;
    validation::validar_monto_no_negativo("precioCompra", precio_compra)
        .map_err(tienda_core::CoreError::from)?;
    let actualizado = api.productos().agregar_stock(id, cantidad, precio_compra).await?;
    refrescar_catalogo(api, catalogo).await?;
    Ok(actualizado)
}

/// Generates a fresh 12-digit codigo that collides with nothing in the
/// current snapshot.
pub fn generar_codigo(catalogo: &CatalogoState) -> Result<String, AppError> {
    let existentes = catalogo.codigos();
    let codigo = barcode::generar_codigo_unico(&existentes, &mut rand::thread_rng())?;
    Ok(codigo)
}

/// Prefilled draft for the scan-miss flow: the cashier scanned a code the
/// catalog does not know, so the registration form opens with that codigo
/// already in place.
pub fn borrador_desde_codigo(codigo: &str) -> NuevoProducto {
    NuevoProducto {
        codigo: codigo.to_string(),
        descripcion: String::new(),
        precio: tienda_core::Money::zero(),
        precio_compra: tienda_core::Money::zero(),
        proveedor: None,
        cantidad: 0,
    }
}

/// Re-labels a backend 409 on a product save as the stale-snapshot
/// duplicate it actually is.
fn conflicto_codigo(err: tienda_api::ApiError) -> AppError {
    if err.es_conflicto() {
        return AppError::new(
            CodigoError::Conflicto,
            "El código ya existe en el servidor; actualiza el catálogo",
        );
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::Money;

    fn producto(id: i64, codigo: &str, descripcion: &str, precio: i64, cantidad: i64) -> Producto {
        Producto {
            id,
            codigo: codigo.to_string(),
            descripcion: descripcion.to_string(),
            precio: Money::from_centavos(precio),
            precio_compra: Money::from_centavos(precio / 2),
            proveedor: None,
            cantidad,
            activo: true,
        }
    }

    fn catalogo_de_prueba() -> CatalogoState {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_productos(vec![
            producto(1, "750", "Refresco 600ml", 1800, 12),
            producto(2, "8410", "Galletas surtidas", 2500, 3),
            producto(3, "123456789012", "Jabón de barra", 900, 40),
        ]);
        catalogo
    }

    #[test]
    fn test_filtro_por_descripcion() {
        let catalogo = catalogo_de_prueba();
        let resultado =
            listar_productos(&catalogo, "galletas", OrdenProductos::Descripcion, true);
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].codigo, "8410");
    }

    #[test]
    fn test_filtro_codigo_exacto() {
        let catalogo = catalogo_de_prueba();
        // "750" matches only the exact codigo, not "123456789012"'s digits.
        let resultado = listar_productos(&catalogo, "750", OrdenProductos::Descripcion, true);
        assert_eq!(resultado.len(), 1);
        assert_eq!(resultado[0].id, 1);
    }

    #[test]
    fn test_orden_por_precio() {
        let catalogo = catalogo_de_prueba();
        let resultado = listar_productos(&catalogo, "", OrdenProductos::PrecioAscendente, true);
        let precios: Vec<i64> = resultado.iter().map(|p| p.precio.centavos()).collect();
        assert_eq!(precios, vec![900, 1800, 2500]);
    }

    #[test]
    fn test_generar_codigo_evita_existentes() {
        let catalogo = catalogo_de_prueba();
        let codigo = generar_codigo(&catalogo).unwrap();
        assert_eq!(codigo.len(), 12);
        assert!(catalogo.buscar_codigo(&codigo).is_none());
    }

    #[test]
    fn test_borrador_desde_codigo() {
        let borrador = borrador_desde_codigo("7501234567890");
        assert_eq!(borrador.codigo, "7501234567890");
        assert!(borrador.descripcion.is_empty());
        assert!(borrador.precio.is_zero());
    }
}
