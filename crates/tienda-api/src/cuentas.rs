//! # Credit Account Endpoints
//!
//! Cuentas (fiado) and their payments. The saldo is mutated exclusively
//! server-side: credit sales increase it, abonos decrease it. The terminal
//! only ever reads it back.

use tienda_core::{Abono, Cuenta, Money, NuevaCuenta, ResumenCuentas};

use crate::{ApiClient, ApiResult};

/// Borrowing wrapper over the account endpoints.
pub struct CuentasApi<'a> {
    client: &'a ApiClient,
}

impl<'a> CuentasApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        CuentasApi { client }
    }

    /// `GET /api/cuentas` - all accounts with current saldo.
    pub async fn listar(&self) -> ApiResult<Vec<Cuenta>> {
        self.client.get("/api/cuentas").await
    }

    /// `GET /api/cuentas/optimizadas-pos` - the slim list the checkout
    /// screen's account picker uses.
    pub async fn optimizadas_pos(&self) -> ApiResult<Vec<Cuenta>> {
        self.client.get("/api/cuentas/optimizadas-pos").await
    }

    /// `GET /api/cuentas/resumen` - dashboard aggregate.
    pub async fn resumen(&self) -> ApiResult<ResumenCuentas> {
        self.client.get("/api/cuentas/resumen").await
    }

    /// `POST /api/cuentas` - create an account.
    pub async fn crear(&self, cuenta: &NuevaCuenta) -> ApiResult<Cuenta> {
        self.client.post("/api/cuentas", cuenta).await
    }

    /// `POST /api/cuentas/{id}/abonar?monto` - record a payment. Returns
    /// the Abono with old and new saldo as computed server-side.
    pub async fn abonar(&self, id: i64, monto: Money) -> ApiResult<Abono> {
        self.client
            .post_con_query(
                &format!("/api/cuentas/{}/abonar", id),
                &[("monto", monto.centavos().to_string())],
            )
            .await
    }

    /// `GET /api/abonos?cuentaId` - payment history for one account.
    pub async fn abonos(&self, cuenta_id: i64) -> ApiResult<Vec<Abono>> {
        self.client
            .get_con_query("/api/abonos", &[("cuentaId", cuenta_id.to_string())])
            .await
    }
}
