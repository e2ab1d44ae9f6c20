//! # tienda-api: REST Client for the Tienda Backend
//!
//! Async client for the backend REST API that owns all POS data. Every
//! screen of the terminal goes through this crate; nothing else in the
//! workspace performs I/O against the backend.
//!
//! ## Endpoint Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backend REST Surface                               │
//! │                                                                         │
//! │  productos()  GET  /api/productos            full catalog              │
//! │               GET  /api/productos/activos    sellable subset           │
//! │               POST /api/productos            create                    │
//! │               PUT  /api/productos/{id}       edit / toggle activo      │
//! │               POST /api/productos/{id}/agregar-stock?cantidad&...      │
//! │                                                                         │
//! │  ventas()     GET  /api/ventas               sale history              │
//! │               POST /api/ventas               checkout                  │
//! │               GET  /api/ventas/{id}/productos      lines               │
//! │               GET  /api/ventas/{id}/costos-lotes   lot costs           │
//! │                                                                         │
//! │  cuentas()    GET  /api/cuentas              credit accounts           │
//! │               GET  /api/cuentas/optimizadas-pos    checkout picker     │
//! │               GET  /api/cuentas/resumen      dashboard aggregate       │
//! │               POST /api/cuentas              create                    │
//! │               POST /api/cuentas/{id}/abonar?monto  payment             │
//! │               GET  /api/abonos?cuentaId      payment history           │
//! │                                                                         │
//! │  mermas()     GET  /api/mermas               shrinkage records         │
//! │               POST /api/mermas               submit draft              │
//! │               GET  /api/mermas/reporte?desde&hasta                     │
//! │               POST /api/mermas/costos-batch  client-side estimate      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use tienda_api::ApiClient;
//!
//! # async fn demo() -> Result<(), tienda_api::ApiError> {
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! let catalogo = client.productos().listar().await?;
//! println!("{} productos", catalogo.len());
//! # Ok(())
//! # }
//! ```

pub mod cuentas;
pub mod error;
pub mod mermas;
pub mod productos;
pub mod ventas;

pub use error::{ApiError, ApiResult};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Default backend location for development.
pub const BASE_URL_PREDETERMINADA: &str = "http://localhost:8080";

/// Default per-request timeout.
pub const TIMEOUT_PREDETERMINADO: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// ApiClientBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: BASE_URL_PREDETERMINADA.to_string(),
            timeout: TIMEOUT_PREDETERMINADO,
        }
    }
}

impl ApiClientBuilder {
    /// Sets the backend base URL (scheme + host + port, no trailing slash
    /// needed).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the per-request timeout. There is no retry on top of it; a
    /// timed-out request surfaces to the cashier like any other failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> ApiResult<ApiClient> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(ApiClient {
            http,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// The backend client.
///
/// Cheap to clone is not needed here: one instance lives for the whole
/// terminal session and hands out borrowing resource wrappers
/// ([`productos`](ApiClient::productos), [`ventas`](ApiClient::ventas), ...).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a builder with development defaults.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Builds a client from environment variables.
    ///
    /// ## Environment Variables
    /// - `TIENDA_API_URL`: backend base URL (default `http://localhost:8080`)
    /// - `TIENDA_HTTP_TIMEOUT_SECS`: request timeout (default 30)
    pub fn from_env() -> ApiResult<Self> {
        let mut builder = ApiClient::builder();
        if let Ok(url) = std::env::var("TIENDA_API_URL") {
            builder = builder.base_url(url);
        }
        if let Ok(secs) = std::env::var("TIENDA_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(secs));
            }
        }
        builder.build()
    }

    /// The configured base URL (for logging and diagnostics).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- Resource accessors ------------------------------------------------

    /// Product catalog endpoints.
    pub fn productos(&self) -> productos::ProductosApi<'_> {
        productos::ProductosApi::new(self)
    }

    /// Sales endpoints.
    pub fn ventas(&self) -> ventas::VentasApi<'_> {
        ventas::VentasApi::new(self)
    }

    /// Credit account endpoints.
    pub fn cuentas(&self) -> cuentas::CuentasApi<'_> {
        cuentas::CuentasApi::new(self)
    }

    /// Shrinkage endpoints.
    pub fn mermas(&self) -> mermas::MermasApi<'_> {
        mermas::MermasApi::new(self)
    }

    // -- Request plumbing --------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get_con_query(path, &[]).await
    }

    pub(crate) async fn get_con_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        debug!(path, "GET");
        let resp = self.http.get(self.url(path)).query(query).send().await?;
        Self::deserializar(resp).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(path, "POST");
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        Self::deserializar(resp).await
    }

    /// POST whose inputs travel as query parameters with an empty body
    /// (agregar-stock, abonar).
    pub(crate) async fn post_con_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        debug!(path, "POST");
        let resp = self.http.post(self.url(path)).query(query).send().await?;
        Self::deserializar(resp).await
    }

    pub(crate) async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!(path, "PUT");
        let resp = self.http.put(self.url(path)).json(body).send().await?;
        Self::deserializar(resp).await
    }

    /// Maps the response to a typed value or a typed failure.
    async fn deserializar<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
        let status = resp.status();
        let ruta = resp.url().path().to_string();
        let texto = resp.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&texto)?);
        }

        let mensaje = if texto.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("error desconocido")
                .to_string()
        } else {
            texto
        };

        Err(match status.as_u16() {
            404 => ApiError::NoEncontrado { recurso: ruta },
            409 => ApiError::Conflicto { mensaje },
            otro => ApiError::Estado {
                status: otro,
                mensaje,
            },
        })
    }
}
