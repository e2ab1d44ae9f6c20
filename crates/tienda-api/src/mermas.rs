//! # Shrinkage Endpoints
//!
//! Merma records and their costing. Costs come from purchase lots the
//! backend tracks; the client never computes them, it only asks for an
//! estimate while the draft is being built and reads the final figure back.

use chrono::{DateTime, Utc};
use tienda_core::{CostosBatchRequest, CostosBatchResponse, LineaMerma, Merma, NuevaMerma, ReporteMermas};

use crate::{ApiClient, ApiResult};

/// Borrowing wrapper over the shrinkage endpoints.
pub struct MermasApi<'a> {
    client: &'a ApiClient,
}

impl<'a> MermasApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        MermasApi { client }
    }

    /// `GET /api/mermas` - all shrinkage records.
    pub async fn listar(&self) -> ApiResult<Vec<Merma>> {
        self.client.get("/api/mermas").await
    }

    /// `POST /api/mermas` - submit a draft. The backend computes the
    /// authoritative costo_total and decrements stock.
    pub async fn crear(&self, merma: &NuevaMerma) -> ApiResult<Merma> {
        self.client.post("/api/mermas", merma).await
    }

    /// `GET /api/mermas/reporte?desde&hasta` - per-type totals over a date
    /// range.
    pub async fn reporte(
        &self,
        desde: DateTime<Utc>,
        hasta: DateTime<Utc>,
    ) -> ApiResult<ReporteMermas> {
        self.client
            .get_con_query(
                "/api/mermas/reporte",
                &[
                    ("desde", desde.to_rfc3339()),
                    ("hasta", hasta.to_rfc3339()),
                ],
            )
            .await
    }

    /// `POST /api/mermas/costos-batch` - cost estimate for an in-progress
    /// draft. The terminal debounces calls to this while lines are edited.
    pub async fn costos_batch(&self, lineas: &[LineaMerma]) -> ApiResult<CostosBatchResponse> {
        self.client
            .post(
                "/api/mermas/costos-batch",
                &CostosBatchRequest {
                    lineas: lineas.to_vec(),
                },
            )
            .await
    }
}
