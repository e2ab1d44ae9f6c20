//! # Shrinkage Commands
//!
//! Merma registration: the cashier builds a draft (tipo, motivo, product
//! lines), watches a live cost estimate, and submits. The estimate prices
//! each line at real lot cost, which only the backend knows, so it goes
//! through `POST /api/mermas/costos-batch`; a debounce keeps a cashier
//! typing quantities from firing a request per keystroke.

use std::time::{Duration, Instant};

use tienda_api::ApiClient;
use tienda_core::scanner::{despachar, ScanSink};
use tienda_core::{validation, LineaMerma, Merma, Money, NuevaMerma, Producto, TipoMerma};

use crate::error::{AppError, CodigoError};
use crate::state::CatalogoState;

/// Quiet period before the draft's cost estimate is refreshed.
pub const RETRASO_ESTIMACION: Duration = Duration::from_millis(500);

// =============================================================================
// Draft
// =============================================================================

/// Merma under construction. Lines key on producto_id; adding an existing
/// product accumulates its quantity.
#[derive(Debug, Clone)]
pub struct BorradorMerma {
    pub tipo: TipoMerma,
    pub motivo: String,
    pub lineas: Vec<LineaMerma>,
}

impl BorradorMerma {
    pub fn new(tipo: TipoMerma) -> Self {
        BorradorMerma {
            tipo,
            motivo: String::new(),
            lineas: Vec::new(),
        }
    }

    pub fn agregar_linea(&mut self, producto_id: i64, cantidad: i64) {
        if let Some(linea) = self.lineas.iter_mut().find(|l| l.producto_id == producto_id) {
            linea.cantidad += cantidad;
        } else {
            self.lineas.push(LineaMerma {
                producto_id,
                cantidad,
            });
        }
    }

    pub fn quitar_linea(&mut self, producto_id: i64) {
        self.lineas.retain(|l| l.producto_id != producto_id);
    }

    fn a_nueva_merma(&self) -> NuevaMerma {
        NuevaMerma {
            tipo: self.tipo,
            motivo: self.motivo.trim().to_string(),
            lineas: self.lineas.clone(),
        }
    }
}

// =============================================================================
// Debounce
// =============================================================================

/// Deadline-based debounce. Callers stamp activity with [`tocar`] and ask
/// [`vencido`] whether the quiet period has elapsed; the caller owns the
/// clock, so tests drive it with plain `Instant` arithmetic.
///
/// [`tocar`]: Debounce::tocar
/// [`vencido`]: Debounce::vencido
#[derive(Debug)]
pub struct Debounce {
    retraso: Duration,
    vence: Option<Instant>,
}

impl Debounce {
    pub fn new(retraso: Duration) -> Self {
        Debounce {
            retraso,
            vence: None,
        }
    }

    /// Records activity, pushing the deadline out by the full quiet period.
    pub fn tocar(&mut self, ahora: Instant) {
        self.vence = Some(ahora + self.retraso);
    }

    /// True once the quiet period has passed since the last touch. Firing
    /// disarms the debounce until the next touch.
    pub fn vencido(&mut self, ahora: Instant) -> bool {
        match self.vence {
            Some(vence) if ahora >= vence => {
                self.vence = None;
                true
            }
            _ => false,
        }
    }

    pub fn pendiente(&self) -> bool {
        self.vence.is_some()
    }

    /// Time left until the deadline, `Duration::ZERO` if already past,
    /// `None` when disarmed. Lets the caller bound a blocking wait so the
    /// estimate fires on time instead of after the next input.
    pub fn restante(&self, ahora: Instant) -> Option<Duration> {
        self.vence.map(|v| v.saturating_duration_since(ahora))
    }
}

// =============================================================================
// Commands
// =============================================================================

/// This screen's scan sink: a hit lands a line in the draft, a miss stays
/// `None` and becomes an error in the caller.
struct SinkBorrador<'a> {
    borrador: &'a mut BorradorMerma,
    encontrado: Option<Producto>,
}

impl ScanSink for SinkBorrador<'_> {
    fn producto_encontrado(&mut self, producto: &Producto) {
        self.borrador.agregar_linea(producto.id, 1);
        self.encontrado = Some(producto.clone());
    }

    fn codigo_no_encontrado(&mut self, _codigo: &str) {}
}

/// Resolves a scanned codigo through the shared dispatcher and adds one
/// unit to the draft. Unlike the sale screen, an unknown codigo is an
/// error here; you cannot write off a product the catalog never had.
pub fn escanear_al_borrador(
    catalogo: &CatalogoState,
    borrador: &mut BorradorMerma,
    codigo: &str,
) -> Result<Producto, AppError> {
    let mut sink = SinkBorrador {
        borrador,
        encontrado: None,
    };
    catalogo.con_productos(|ps| despachar(ps, codigo, &mut sink));
    sink.encontrado
        .ok_or_else(|| AppError::validacion(format!("Producto desconocido: {}", codigo)))
}

/// Prices the draft's lines at real lot cost.
pub async fn estimar_costo(api: &ApiClient, borrador: &BorradorMerma) -> Result<Money, AppError> {
    if borrador.lineas.is_empty() {
        return Ok(Money::zero());
    }
    let respuesta = api.mermas().costos_batch(&borrador.lineas).await?;
    Ok(respuesta.costo_total)
}

/// Submits the draft. The backend decrements stock and fixes the cost; a
/// 409 means a line asked for more units than remain on hand.
pub async fn registrar_merma(
    api: &ApiClient,
    catalogo: &CatalogoState,
    borrador: &BorradorMerma,
) -> Result<Merma, AppError> {
    let nueva = borrador.a_nueva_merma();
    validation::validar_nueva_merma(&nueva).map_err(tienda_core::CoreError::from)?;

    let merma = api.mermas().crear(&nueva).await.map_err(|err| {
        if err.es_conflicto() {
            AppError::new(
                CodigoError::Conflicto,
                "Stock insuficiente para una de las líneas de merma",
            )
        } else {
            err.into()
        }
    })?;

    let productos = api.productos().listar().await?;
    catalogo.reemplazar_productos(productos);

    tracing::info!(
        merma_id = merma.id,
        tipo = merma.tipo.etiqueta(),
        costo = merma.costo_total.centavos(),
        "merma registrada"
    );
    Ok(merma)
}

/// Past merma records, newest first.
pub async fn historial(api: &ApiClient) -> Result<Vec<Merma>, AppError> {
    let mut mermas = api.mermas().listar().await?;
    mermas.sort_by(|a, b| b.fecha.cmp(&a.fecha));
    Ok(mermas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrador_acumula_lineas() {
        let mut borrador = BorradorMerma::new(TipoMerma::Caducado);
        borrador.agregar_linea(1, 2);
        borrador.agregar_linea(2, 1);
        borrador.agregar_linea(1, 3);

        assert_eq!(borrador.lineas.len(), 2);
        assert_eq!(borrador.lineas[0].cantidad, 5);

        borrador.quitar_linea(1);
        assert_eq!(borrador.lineas.len(), 1);
        assert_eq!(borrador.lineas[0].producto_id, 2);
    }

    #[test]
    fn test_debounce_espera_el_silencio() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(500));

        debounce.tocar(t0);
        assert!(!debounce.vencido(t0 + Duration::from_millis(300)));

        // More activity pushes the deadline out.
        debounce.tocar(t0 + Duration::from_millis(300));
        assert!(!debounce.vencido(t0 + Duration::from_millis(600)));
        assert!(debounce.vencido(t0 + Duration::from_millis(900)));

        // Fired once; stays quiet until touched again.
        assert!(!debounce.vencido(t0 + Duration::from_secs(10)));
        assert!(!debounce.pendiente());
    }

    #[test]
    fn test_debounce_restante() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(500));
        assert!(debounce.restante(t0).is_none());

        debounce.tocar(t0);
        assert_eq!(
            debounce.restante(t0 + Duration::from_millis(200)),
            Some(Duration::from_millis(300))
        );
        assert_eq!(
            debounce.restante(t0 + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_escaneo_llena_el_borrador() {
        let catalogo = CatalogoState::new();
        catalogo.reemplazar_productos(vec![Producto {
            id: 1,
            codigo: "750".to_string(),
            descripcion: "Leche 1L".to_string(),
            precio: Money::from_centavos(2400),
            precio_compra: Money::from_centavos(1900),
            proveedor: None,
            cantidad: 6,
            activo: true,
        }]);
        let mut borrador = BorradorMerma::new(TipoMerma::Caducado);

        escanear_al_borrador(&catalogo, &mut borrador, "750").unwrap();
        escanear_al_borrador(&catalogo, &mut borrador, "750").unwrap();
        assert_eq!(borrador.lineas.len(), 1);
        assert_eq!(borrador.lineas[0].cantidad, 2);

        let err = escanear_al_borrador(&catalogo, &mut borrador, "999").unwrap_err();
        assert_eq!(err.codigo, CodigoError::Validacion);
        assert_eq!(borrador.lineas.len(), 1);
    }
}
