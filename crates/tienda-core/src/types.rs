//! # Domain Types
//!
//! Client-side copies of the entities owned by the tienda backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Producto     │   │      Venta      │   │     Cuenta      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  codigo (scan)  │   │  estado         │   │  nombre         │       │
//! │  │  precio         │   │  total          │   │  saldo (deuda)  │       │
//! │  │  cantidad       │   │  cuenta_id?     │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Abono       │   │     Merma       │   │   TipoMerma     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  monto          │   │  tipo           │   │  CADUCADO       │       │
//! │  │  saldo_anterior │   │  motivo         │   │  USO_PERSONAL   │       │
//! │  │  saldo_nuevo    │   │  costo_total    │   │  MAL_ESTADO     │       │
//! │  └─────────────────┘   └─────────────────┘   │  ROBO / OTRO    │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Authority
//! Every entity here is a transient, non-authoritative copy: it is created by
//! deserializing a backend response and is only ever replaced wholesale on
//! refetch, never mutated in place. Persistence and consistency live entirely
//! on the backend side of the REST boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Producto
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Producto {
    /// Backend identifier.
    pub id: i64,

    /// Scanned/typed business identifier (all digits, what the barcode
    /// scanner produces).
    pub codigo: String,

    /// Display name shown to the cashier and on receipts.
    pub descripcion: String,

    /// Unit sale price in centavos.
    pub precio: Money,

    /// Purchase cost in centavos (for margin and merma costing).
    pub precio_compra: Money,

    /// Supplier name, free text.
    pub proveedor: Option<String>,

    /// On-hand quantity as last reported by the backend. Advisory only;
    /// the authoritative decrement happens server-side on sale/merma.
    pub cantidad: i64,

    /// Whether the product is active (soft delete).
    pub activo: bool,
}

impl Producto {
    /// Profit margin per unit (precio - precio_compra).
    #[inline]
    pub fn margen(&self) -> Money {
        self.precio - self.precio_compra
    }
}

/// Payload for `POST /api/productos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevoProducto {
    pub codigo: String,
    pub descripcion: String,
    pub precio: Money,
    pub precio_compra: Money,
    pub proveedor: Option<String>,
    pub cantidad: i64,
}

// =============================================================================
// Venta
// =============================================================================

/// The status of a recorded sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoVenta {
    /// Paid in full at checkout.
    #[serde(rename = "COMPLETADA")]
    Completada,
    /// Charged against a customer credit account (fiado).
    #[serde(rename = "PRESTAMO")]
    Prestamo,
}

/// A sale as returned by the backend. Immutable from this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venta {
    pub id: i64,
    pub fecha: DateTime<Utc>,
    /// Set when the sale was charged to a cuenta.
    pub cuenta_id: Option<i64>,
    pub total: Money,
    pub estado: EstadoVenta,
}

/// A line of a sale (`GET /api/ventas/{id}/productos`).
///
/// Uses the snapshot pattern: descripcion and precio_unitario are frozen at
/// sale time, so later catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaVenta {
    pub producto_id: i64,
    pub descripcion: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
}

impl LineaVenta {
    /// Line total (precio_unitario × cantidad).
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.precio_unitario * self.cantidad
    }
}

/// Payload for `POST /api/ventas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaVenta {
    /// Present for credit sales; the backend increases the cuenta's saldo.
    pub cuenta_id: Option<i64>,
    pub productos: Vec<NuevaLineaVenta>,
}

/// One line of a sale submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaLineaVenta {
    pub producto_id: i64,
    pub cantidad: i64,
    /// Price frozen client-side when the line was added to the cart.
    pub precio_unitario: Money,
}

/// Per-lot cost breakdown of a sale (`GET /api/ventas/{id}/costos-lotes`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostoLote {
    pub producto_id: i64,
    pub cantidad: i64,
    pub costo_unitario: Money,
}

// =============================================================================
// Cuenta / Abono
// =============================================================================

/// A customer credit account ("cuenta"/fiado).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cuenta {
    pub id: i64,
    pub nombre: String,
    pub descripcion: Option<String>,
    /// Running debt. Increased by credit sales (server-side), decreased by
    /// abonos.
    pub saldo: Money,
}

/// Payload for `POST /api/cuentas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaCuenta {
    pub nombre: String,
    pub descripcion: Option<String>,
}

/// Aggregate view for the accounts dashboard (`GET /api/cuentas/resumen`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumenCuentas {
    pub total_cuentas: i64,
    pub cuentas_con_deuda: i64,
    pub deuda_total: Money,
}

/// A payment against a cuenta's balance. Append-only from this side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Abono {
    pub id: i64,
    pub cuenta_id: i64,
    pub monto: Money,
    pub saldo_anterior: Money,
    pub saldo_nuevo: Money,
    pub fecha: DateTime<Utc>,
}

// =============================================================================
// Merma
// =============================================================================

/// Why inventory was written off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoMerma {
    #[serde(rename = "CADUCADO")]
    Caducado,
    #[serde(rename = "USO_PERSONAL")]
    UsoPersonal,
    #[serde(rename = "MAL_ESTADO")]
    MalEstado,
    #[serde(rename = "ROBO")]
    Robo,
    #[serde(rename = "OTRO")]
    Otro,
}

impl TipoMerma {
    /// All variants, in pick-list order.
    pub const TODOS: [TipoMerma; 5] = [
        TipoMerma::Caducado,
        TipoMerma::UsoPersonal,
        TipoMerma::MalEstado,
        TipoMerma::Robo,
        TipoMerma::Otro,
    ];

    /// Human label for the terminal.
    pub fn etiqueta(&self) -> &'static str {
        match self {
            TipoMerma::Caducado => "Caducado",
            TipoMerma::UsoPersonal => "Uso personal",
            TipoMerma::MalEstado => "Mal estado",
            TipoMerma::Robo => "Robo",
            TipoMerma::Otro => "Otro",
        }
    }
}

/// One (producto, cantidad) line of a shrinkage record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineaMerma {
    pub producto_id: i64,
    pub cantidad: i64,
}

/// A shrinkage/write-off record as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merma {
    pub id: i64,
    pub tipo: TipoMerma,
    pub motivo: String,
    pub fecha: DateTime<Utc>,
    /// Computed server-side from purchase-lot costs. The client only ever
    /// estimates it via the costos-batch endpoint.
    pub costo_total: Money,
    pub lineas: Vec<LineaMerma>,
}

/// Payload for `POST /api/mermas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NuevaMerma {
    pub tipo: TipoMerma,
    pub motivo: String,
    pub lineas: Vec<LineaMerma>,
}

/// Request body for `POST /api/mermas/costos-batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostosBatchRequest {
    pub lineas: Vec<LineaMerma>,
}

/// Response of the batch cost estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostosBatchResponse {
    pub costo_total: Money,
}

/// Shrinkage report over a date range (`GET /api/mermas/reporte`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporteMermas {
    pub desde: DateTime<Utc>,
    pub hasta: DateTime<Utc>,
    pub costo_total: Money,
    pub por_tipo: Vec<TotalPorTipo>,
}

/// One row of the per-type breakdown in the merma report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPorTipo {
    pub tipo: TipoMerma,
    pub registros: i64,
    pub costo: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estado_venta_wire_format() {
        assert_eq!(
            serde_json::to_string(&EstadoVenta::Completada).unwrap(),
            "\"COMPLETADA\""
        );
        assert_eq!(
            serde_json::to_string(&EstadoVenta::Prestamo).unwrap(),
            "\"PRESTAMO\""
        );
        let estado: EstadoVenta = serde_json::from_str("\"PRESTAMO\"").unwrap();
        assert_eq!(estado, EstadoVenta::Prestamo);
    }

    #[test]
    fn test_tipo_merma_wire_format() {
        assert_eq!(
            serde_json::to_string(&TipoMerma::UsoPersonal).unwrap(),
            "\"USO_PERSONAL\""
        );
        let tipo: TipoMerma = serde_json::from_str("\"MAL_ESTADO\"").unwrap();
        assert_eq!(tipo, TipoMerma::MalEstado);
    }

    #[test]
    fn test_producto_camel_case_fields() {
        let json = r#"{
            "id": 1,
            "codigo": "750",
            "descripcion": "Refresco 600ml",
            "precio": 1800,
            "precioCompra": 1200,
            "proveedor": null,
            "cantidad": 12,
            "activo": true
        }"#;
        let p: Producto = serde_json::from_str(json).unwrap();
        assert_eq!(p.codigo, "750");
        assert_eq!(p.precio_compra.centavos(), 1200);
        assert_eq!(p.margen().centavos(), 600);
    }

    #[test]
    fn test_linea_venta_subtotal() {
        let linea = LineaVenta {
            producto_id: 1,
            descripcion: "Refresco".into(),
            cantidad: 3,
            precio_unitario: Money::from_centavos(1800),
        };
        assert_eq!(linea.subtotal().centavos(), 5400);
    }
}
