//! # Account Commands
//!
//! Customer credit accounts (fiado): listing with balances, registration,
//! abonos and payment history. Balances are backend-owned; every write
//! refetches the account cache so the list never shows a stale saldo.

use tienda_api::ApiClient;
use tienda_core::{validation, Abono, Cuenta, Money, NuevaCuenta, ResumenCuentas};

use crate::error::AppError;
use crate::state::CatalogoState;

/// Refetches the account list and replaces the local cache.
pub async fn refrescar_cuentas(
    api: &ApiClient,
    catalogo: &CatalogoState,
) -> Result<(), AppError> {
    let cuentas = api.cuentas().listar().await?;
    catalogo.reemplazar_cuentas(cuentas);
    Ok(())
}

/// Cached account list filtered by name, debtors first.
pub fn listar_cuentas(catalogo: &CatalogoState, consulta: &str) -> Vec<Cuenta> {
    let consulta = consulta.trim().to_lowercase();
    let mut cuentas = catalogo.con_cuentas(|cs| {
        cs.iter()
            .filter(|c| consulta.is_empty() || c.nombre.to_lowercase().contains(&consulta))
            .cloned()
            .collect::<Vec<_>>()
    });
    cuentas.sort_by(|a, b| b.saldo.cmp(&a.saldo).then_with(|| a.nombre.cmp(&b.nombre)));
    cuentas
}

/// Registers a new account with zero balance.
pub async fn crear_cuenta(
    api: &ApiClient,
    catalogo: &CatalogoState,
    nueva: &NuevaCuenta,
) -> Result<Cuenta, AppError> {
    validation::validar_nueva_cuenta(nueva).map_err(tienda_core::CoreError::from)?;
    let creada = api.cuentas().crear(nueva).await?;
    refrescar_cuentas(api, catalogo).await?;
    Ok(creada)
}

/// Applies a payment against an account's balance. The monto must be
/// strictly positive; the backend computes and returns the new saldo.
pub async fn abonar(
    api: &ApiClient,
    catalogo: &CatalogoState,
    cuenta_id: i64,
    monto: Money,
) -> Result<Abono, AppError> {
    validation::validar_monto_positivo("monto", monto)
        .map_err(tienda_core::CoreError::from)?;
    let abono = api.cuentas().abonar(cuenta_id, monto).await?;
    refrescar_cuentas(api, catalogo).await?;

    tracing::info!(
        cuenta_id,
        monto = monto.centavos(),
        saldo_nuevo = abono.saldo_nuevo.centavos(),
        "abono registrado"
    );
    Ok(abono)
}

/// Payment history for one account, newest first.
pub async fn abonos_de(api: &ApiClient, cuenta_id: i64) -> Result<Vec<Abono>, AppError> {
    let mut abonos = api.cuentas().abonos(cuenta_id).await?;
    abonos.sort_by(|a, b| b.fecha.cmp(&a.fecha));
    Ok(abonos)
}

/// Aggregate debt figures for the accounts screen header.
pub async fn resumen(api: &ApiClient) -> Result<ResumenCuentas, AppError> {
    Ok(api.cuentas().resumen().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cuenta(id: i64, nombre: &str, saldo: i64) -> Cuenta {
        Cuenta {
            id,
            nombre: nombre.to_string(),
            descripcion: None,
            saldo: Money::from_centavos(saldo),
        }
    }

    #[test]
    fn test_deudores_primero() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_cuentas(vec![
            cuenta(1, "Ana", 0),
            cuenta(2, "Beto", 12000),
            cuenta(3, "Carla", 4500),
        ]);

        let lista = listar_cuentas(&catalogo, "");
        let nombres: Vec<&str> = lista.iter().map(|c| c.nombre.as_str()).collect();
        assert_eq!(nombres, vec!["Beto", "Carla", "Ana"]);
    }

    #[test]
    fn test_filtro_por_nombre() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_cuentas(vec![cuenta(1, "Ana López", 0), cuenta(2, "Beto", 100)]);

        let lista = listar_cuentas(&catalogo, "lópez");
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].id, 1);
    }
}
