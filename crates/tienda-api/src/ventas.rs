//! # Sale Endpoints
//!
//! Checkout and sale history. Sales are immutable once created; there is no
//! update or delete on this surface.

use tienda_core::{CostoLote, LineaVenta, NuevaVenta, Venta};

use crate::{ApiClient, ApiResult};

/// Borrowing wrapper over the sale endpoints.
pub struct VentasApi<'a> {
    client: &'a ApiClient,
}

impl<'a> VentasApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        VentasApi { client }
    }

    /// `GET /api/ventas` - sale history, newest first per the backend.
    pub async fn listar(&self) -> ApiResult<Vec<Venta>> {
        self.client.get("/api/ventas").await
    }

    /// `POST /api/ventas` - checkout. The backend decrements stock
    /// atomically and, for credit sales, increases the cuenta's saldo.
    /// A 409 means the stock check lost the race to a concurrent sale.
    pub async fn crear(&self, venta: &NuevaVenta) -> ApiResult<Venta> {
        self.client.post("/api/ventas", venta).await
    }

    /// `GET /api/ventas/{id}/productos` - the frozen lines of a sale.
    pub async fn productos_de(&self, id: i64) -> ApiResult<Vec<LineaVenta>> {
        self.client
            .get(&format!("/api/ventas/{}/productos", id))
            .await
    }

    /// `GET /api/ventas/{id}/costos-lotes` - per-lot cost breakdown, used
    /// by the profit column of the sales report.
    pub async fn costos_lotes(&self, id: i64) -> ApiResult<Vec<CostoLote>> {
        self.client
            .get(&format!("/api/ventas/{}/costos-lotes", id))
            .await
    }
}
