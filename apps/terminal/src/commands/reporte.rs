//! # Report Commands
//!
//! Read-only aggregates for the reports screen. Sales figures are computed
//! client-side over the fetched history; the merma report comes
//! pre-aggregated from the backend because lot costs live there.

use chrono::{DateTime, Utc};
use tienda_api::ApiClient;
use tienda_core::{EstadoVenta, Money, ReporteMermas, Venta};

use crate::error::AppError;

/// Sales totals over a set of ventas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResumenVentas {
    pub num_ventas: usize,
    pub total: Money,
    pub num_prestamos: usize,
    pub total_prestamos: Money,
}

/// Aggregates a slice of sales into screen-header figures.
pub fn resumen_ventas(ventas: &[Venta]) -> ResumenVentas {
    ventas.iter().fold(ResumenVentas::default(), |mut acc, v| {
        acc.num_ventas += 1;
        acc.total += v.total;
        if v.estado == EstadoVenta::Prestamo {
            acc.num_prestamos += 1;
            acc.total_prestamos += v.total;
        }
        acc
    })
}

/// Sales within a date range, for the range picker.
pub fn ventas_en_rango(
    ventas: &[Venta],
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Vec<Venta> {
    ventas
        .iter()
        .filter(|v| v.fecha >= desde && v.fecha <= hasta)
        .cloned()
        .collect()
}

/// Backend-aggregated merma costs for a date range, broken down by tipo.
pub async fn reporte_mermas(
    api: &ApiClient,
    desde: DateTime<Utc>,
    hasta: DateTime<Utc>,
) -> Result<ReporteMermas, AppError> {
    Ok(api.mermas().reporte(desde, hasta).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venta(id: i64, fecha: &str, total: i64, estado: EstadoVenta) -> Venta {
        Venta {
            id,
            fecha: fecha.parse().unwrap(),
            cuenta_id: match estado {
                EstadoVenta::Prestamo => Some(7),
                EstadoVenta::Completada => None,
            },
            total: Money::from_centavos(total),
            estado,
        }
    }

    #[test]
    fn test_resumen_separa_prestamos() {
        let ventas = vec![
            venta(1, "2026-08-20T10:00:00Z", 1800, EstadoVenta::Completada),
            venta(2, "2026-08-21T11:00:00Z", 5000, EstadoVenta::Prestamo),
            venta(3, "2026-08-22T12:00:00Z", 700, EstadoVenta::Completada),
        ];

        let resumen = resumen_ventas(&ventas);
        assert_eq!(resumen.num_ventas, 3);
        assert_eq!(resumen.total.centavos(), 7500);
        assert_eq!(resumen.num_prestamos, 1);
        assert_eq!(resumen.total_prestamos.centavos(), 5000);
    }

    #[test]
    fn test_rango_es_inclusivo() {
        let ventas = vec![
            venta(1, "2026-08-01T00:00:00Z", 100, EstadoVenta::Completada),
            venta(2, "2026-08-15T12:00:00Z", 200, EstadoVenta::Completada),
            venta(3, "2026-08-31T23:59:59Z", 300, EstadoVenta::Completada),
        ];

        let desde = "2026-08-01T00:00:00Z".parse().unwrap();
        let hasta = "2026-08-15T12:00:00Z".parse().unwrap();
        let en_rango = ventas_en_rango(&ventas, desde, hasta);
        let ids: Vec<i64> = en_rango.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
