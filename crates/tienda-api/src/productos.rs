//! # Product Endpoints
//!
//! Catalog reads and writes. The catalog is the list every screen's scanner
//! lookup runs against, so the terminal refetches it wholesale after any
//! write here.

use tienda_core::{NuevoProducto, Producto};

use crate::{ApiClient, ApiResult};

/// Borrowing wrapper over the product endpoints.
pub struct ProductosApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProductosApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        ProductosApi { client }
    }

    /// `GET /api/productos` - the full catalog, active or not.
    pub async fn listar(&self) -> ApiResult<Vec<Producto>> {
        self.client.get("/api/productos").await
    }

    /// `GET /api/productos/activos` - only sellable products. The terminal
    /// loads the full catalog instead and gates inactive products at the
    /// cart; this endpoint stays for callers that never want them.
    pub async fn listar_activos(&self) -> ApiResult<Vec<Producto>> {
        self.client.get("/api/productos/activos").await
    }

    /// `POST /api/productos` - create a product.
    ///
    /// A 409 here means the codigo already exists on the backend even though
    /// it was absent from the local snapshot (stale-snapshot race); the
    /// terminal messages that case as a duplicate.
    pub async fn crear(&self, producto: &NuevoProducto) -> ApiResult<Producto> {
        self.client.post("/api/productos", producto).await
    }

    /// `PUT /api/productos/{id}` - edit a product, including toggling the
    /// activo flag.
    pub async fn actualizar(&self, id: i64, producto: &NuevoProducto) -> ApiResult<Producto> {
        self.client
            .put(&format!("/api/productos/{}", id), producto)
            .await
    }

    /// `POST /api/productos/{id}/agregar-stock?cantidad&precioCompra` -
    /// receive inventory. Inputs travel as query parameters, matching the
    /// backend contract.
    pub async fn agregar_stock(
        &self,
        id: i64,
        cantidad: i64,
        precio_compra: tienda_core::Money,
    ) -> ApiResult<Producto> {
        self.client
            .post_con_query(
                &format!("/api/productos/{}/agregar-stock", id),
                &[
                    ("cantidad", cantidad.to_string()),
                    ("precioCompra", precio_compra.centavos().to_string()),
                ],
            )
            .await
    }
}
