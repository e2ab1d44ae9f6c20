//! # REPL Module
//!
//! Line-oriented interaction layer: screens, the command grammar and the
//! multi-step capture flows (product form, abono amount, merma motivo).
//!
//! ## Scanner Integration
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Input Line Classification                             │
//! │                                                                         │
//! │  stdin line ──┬── all digits (1..=20)? ──► feed through ScannerDecoder │
//! │               │         │                  with the current Contexto    │
//! │               │         ├── completes ───► Orden::Escaneo(codigo)       │
//! │               │         └── excluded ────► plain text (flow input)      │
//! │               │                                                         │
//! │               └── anything else ─────────► decoder reset, then either   │
//! │                                            the active flow consumes it  │
//! │                                            or the grammar parses it     │
//! │                                                                         │
//! │  A hardware scanner emits digits plus Enter and nothing else, so a      │
//! │  digit-only line is the line-oriented equivalent of a burst. Mixed      │
//! │  lines are keyboard typing and abort any accumulation.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The decoder still owns the decision: the same digit line fed while a
//! numeric or multi-line capture is active does NOT complete, because the
//! active flow maps to an excluded [`Contexto`].

use std::time::Instant;

use tienda_core::scanner::Key;
use tienda_core::{
    Contexto, Money, NuevaCuenta, NuevoProducto, ScannerConfig, ScannerDecoder, TipoMerma,
};

use crate::error::AppError;

// =============================================================================
// Screens
// =============================================================================

/// The five screens of the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pantalla {
    #[default]
    Venta,
    Inventario,
    Cuentas,
    Mermas,
    Reportes,
}

impl Pantalla {
    pub fn titulo(&self) -> &'static str {
        match self {
            Pantalla::Venta => "VENTA",
            Pantalla::Inventario => "INVENTARIO",
            Pantalla::Cuentas => "CUENTAS",
            Pantalla::Mermas => "MERMAS",
            Pantalla::Reportes => "REPORTES",
        }
    }

    fn parsear(palabra: &str) -> Option<Pantalla> {
        match palabra {
            "venta" => Some(Pantalla::Venta),
            "inventario" => Some(Pantalla::Inventario),
            "cuentas" => Some(Pantalla::Cuentas),
            "mermas" => Some(Pantalla::Mermas),
            "reportes" => Some(Pantalla::Reportes),
            _ => None,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A fully parsed instruction for the run loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Orden {
    // Global
    Ayuda,
    Salir,
    Tema,
    Ir(Pantalla),

    /// A completed scan, interpreted per screen by the run loop.
    Escaneo(String),

    // Venta
    VerCarrito,
    Cantidad(String, i64),
    Quitar(String),
    Cancelar,
    Cobrar(Option<i64>),
    /// The slim account picker shown before charging to credit.
    CuentasParaCobro,
    Historial,
    Detalle(i64),

    // Inventario
    Listar(String),
    IniciarAlta(Option<String>),
    IniciarEdicion(i64),
    CrearProducto(NuevoProducto),
    EditarProducto(i64, NuevoProducto),
    GenerarCodigo,
    AgregarStock {
        id: i64,
        cantidad: i64,
        precio_compra: Money,
    },
    Etiqueta(i64),

    // Cuentas
    ListarCuentas(String),
    CrearCuenta(NuevaCuenta),
    IniciarAbono(i64),
    Abonar(i64, Money),
    Abonos(i64),
    ResumenCuentas,

    // Mermas
    IniciarMerma(TipoMerma),
    IniciarMotivo,
    MotivoMerma(String),
    VerBorrador,
    RegistrarMerma,
    HistorialMermas,

    // Reportes
    ResumenVentas(Option<(chrono::NaiveDate, chrono::NaiveDate)>),
    ReporteMermas(chrono::NaiveDate, chrono::NaiveDate),
}

// =============================================================================
// Capture Flows
// =============================================================================

/// Field-by-field product form. Used both for registration and editing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PasoProducto {
    Codigo,
    Descripcion,
    Precio,
    PrecioCompra,
    Cantidad,
    Proveedor,
}

#[derive(Debug, Clone)]
enum Flujo {
    Producto {
        id: Option<i64>,
        borrador: NuevoProducto,
        paso: PasoProducto,
    },
    Abono {
        cuenta_id: i64,
    },
    Motivo {
        lineas: Vec<String>,
    },
}

// =============================================================================
// Repl
// =============================================================================

/// Interaction state: current screen, active capture flow and the scanner
/// decoder. Owns no backend or cache handles; it turns lines into
/// [`Orden`] values and the run loop executes them.
pub struct Repl {
    pantalla: Pantalla,
    flujo: Option<Flujo>,
    decoder: ScannerDecoder,
}

impl Repl {
    pub fn new(config: ScannerConfig) -> Self {
        Repl {
            pantalla: Pantalla::default(),
            flujo: None,
            decoder: ScannerDecoder::new(config),
        }
    }

    pub fn pantalla(&self) -> Pantalla {
        self.pantalla
    }

    pub fn ir(&mut self, pantalla: Pantalla) {
        self.pantalla = pantalla;
        self.flujo = None;
        self.decoder.reset();
    }

    /// Prompt text for the line about to be read.
    pub fn prompt(&self) -> String {
        match &self.flujo {
            Some(Flujo::Producto { paso, borrador, .. }) => match paso {
                PasoProducto::Codigo => "codigo (escanea o teclea)> ".to_string(),
                PasoProducto::Descripcion => format!("[{}] descripcion> ", borrador.codigo),
                PasoProducto::Precio => "precio> ".to_string(),
                PasoProducto::PrecioCompra => "precio de compra> ".to_string(),
                PasoProducto::Cantidad => "cantidad inicial> ".to_string(),
                PasoProducto::Proveedor => "proveedor (vacío para omitir)> ".to_string(),
            },
            Some(Flujo::Abono { cuenta_id }) => format!("monto del abono a cuenta {}> ", cuenta_id),
            Some(Flujo::Motivo { .. }) => "motivo ('.' para terminar)> ".to_string(),
            None => format!("{}> ", self.pantalla.titulo().to_lowercase()),
        }
    }

    /// The scanner context the current focus maps to.
    fn contexto(&self) -> Contexto {
        match &self.flujo {
            Some(Flujo::Producto { paso, .. }) => match paso {
                // A scan is the normal way to fill the codigo field.
                PasoProducto::Codigo => Contexto::Texto,
                // Free text: a digit-only line must stay literal here.
                PasoProducto::Descripcion | PasoProducto::Proveedor => Contexto::Multilinea,
                PasoProducto::Precio | PasoProducto::PrecioCompra | PasoProducto::Cantidad => {
                    Contexto::Numerico
                }
            },
            Some(Flujo::Abono { .. }) => Contexto::Numerico,
            Some(Flujo::Motivo { .. }) => Contexto::Multilinea,
            None => match self.pantalla {
                Pantalla::Inventario => Contexto::Busqueda,
                _ => Contexto::Ninguno,
            },
        }
    }

    /// Starts the product form, optionally prefilled (scan-miss flow hands
    /// in the unknown codigo; editing hands in the current values).
    pub fn iniciar_producto(&mut self, id: Option<i64>, borrador: NuevoProducto) {
        let paso = if borrador.codigo.is_empty() {
            PasoProducto::Codigo
        } else {
            PasoProducto::Descripcion
        };
        self.flujo = Some(Flujo::Producto { id, borrador, paso });
    }

    pub fn iniciar_abono(&mut self, cuenta_id: i64) {
        self.flujo = Some(Flujo::Abono { cuenta_id });
    }

    pub fn iniciar_motivo(&mut self) {
        self.flujo = Some(Flujo::Motivo { lineas: Vec::new() });
    }

    pub fn cancelar_flujo(&mut self) {
        self.flujo = None;
    }

    /// True while a capture flow is waiting for input.
    pub fn en_flujo(&self) -> bool {
        self.flujo.is_some()
    }

    /// Routes a completed scan into the product form's codigo field. Any
    /// other pending state ignores the scan.
    pub fn entregar_codigo(&mut self, codigo: &str) -> Result<(), AppError> {
        if matches!(
            self.flujo,
            Some(Flujo::Producto {
                paso: PasoProducto::Codigo,
                ..
            })
        ) {
            self.avanzar_flujo(codigo)?;
        }
        Ok(())
    }

    /// Turns one input line into zero or more orders.
    pub fn procesar_linea(
        &mut self,
        linea: &str,
        ahora: Instant,
    ) -> Result<Vec<Orden>, AppError> {
        let texto = linea.trim();

        if es_burst(texto) {
            let contexto = self.contexto();
            for c in texto.chars() {
                self.decoder.on_key(Key::from_char(c), contexto, ahora);
            }
            let fin = self.decoder.on_key(Key::Enter, contexto, ahora);
            if let Some(codigo) = fin.completado {
                return Ok(vec![Orden::Escaneo(codigo)]);
            }
            // Excluded context: the digits are ordinary field input.
        } else {
            // Keyboard typing. Whatever the decoder had accumulated was not
            // a scan.
            self.decoder.reset();
        }

        if texto.is_empty() && !matches!(self.flujo, Some(Flujo::Motivo { .. })) {
            return Ok(Vec::new());
        }

        if self.flujo.is_some() {
            // The one escape hatch out of a half-filled form.
            if texto.eq_ignore_ascii_case("cancelar") {
                self.cancelar_flujo();
                return Ok(Vec::new());
            }
            return Ok(self.avanzar_flujo(texto)?.into_iter().collect());
        }
        Ok(vec![parsear_orden(self.pantalla, texto)?])
    }

    /// Feeds one line to the active flow; returns the finished order once
    /// the last field is captured.
    fn avanzar_flujo(&mut self, texto: &str) -> Result<Option<Orden>, AppError> {
        let Some(flujo) = self.flujo.as_mut() else {
            return Ok(None);
        };
        match flujo {
            Flujo::Producto { id, borrador, paso } => {
                match paso {
                    PasoProducto::Codigo => {
                        tienda_core::validation::validar_codigo(texto)
                            .map_err(tienda_core::CoreError::from)?;
                        borrador.codigo = texto.to_string();
                        *paso = PasoProducto::Descripcion;
                    }
                    PasoProducto::Descripcion => {
                        tienda_core::validation::validar_texto_requerido("descripcion", texto)
                            .map_err(tienda_core::CoreError::from)?;
                        borrador.descripcion = texto.to_string();
                        *paso = PasoProducto::Precio;
                    }
                    PasoProducto::Precio => {
                        borrador.precio = Money::parse(texto)?;
                        *paso = PasoProducto::PrecioCompra;
                    }
                    PasoProducto::PrecioCompra => {
                        borrador.precio_compra = Money::parse(texto)?;
                        *paso = PasoProducto::Cantidad;
                    }
                    PasoProducto::Cantidad => {
                        borrador.cantidad = parsear_entero("cantidad", texto)?;
                        *paso = PasoProducto::Proveedor;
                    }
                    PasoProducto::Proveedor => {
                        borrador.proveedor = if texto.is_empty() {
                            None
                        } else {
                            Some(texto.to_string())
                        };
                        let borrador = borrador.clone();
                        let id = *id;
                        self.flujo = None;
                        return Ok(Some(match id {
                            Some(id) => Orden::EditarProducto(id, borrador),
                            None => Orden::CrearProducto(borrador),
                        }));
                    }
                }
                Ok(None)
            }
            Flujo::Abono { cuenta_id } => {
                let cuenta_id = *cuenta_id;
                let monto = Money::parse(texto)?;
                self.flujo = None;
                Ok(Some(Orden::Abonar(cuenta_id, monto)))
            }
            Flujo::Motivo { lineas } => {
                if texto == "." {
                    let motivo = lineas.join("\n");
                    self.flujo = None;
                    Ok(Some(Orden::MotivoMerma(motivo)))
                } else {
                    lineas.push(texto.to_string());
                    Ok(None)
                }
            }
        }
    }
}

/// A digit-only line of scanner length. The decoder makes the final call;
/// this only decides whether the line is worth feeding to it.
fn es_burst(texto: &str) -> bool {
    !texto.is_empty() && texto.len() <= 20 && texto.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// Grammar
// =============================================================================

/// Parses a command line against the current screen's grammar.
fn parsear_orden(pantalla: Pantalla, texto: &str) -> Result<Orden, AppError> {
    let mut partes = texto.split_whitespace();
    let palabra = partes.next().unwrap_or_default().to_lowercase();
    let resto: Vec<&str> = partes.collect();

    // Global commands work on every screen.
    match palabra.as_str() {
        "ayuda" | "?" => return Ok(Orden::Ayuda),
        "salir" => return Ok(Orden::Salir),
        "tema" => return Ok(Orden::Tema),
        _ => {}
    }
    if let Some(destino) = Pantalla::parsear(&palabra) {
        return Ok(Orden::Ir(destino));
    }

    match (pantalla, palabra.as_str()) {
        (Pantalla::Venta, "carrito") => Ok(Orden::VerCarrito),
        (Pantalla::Venta, "cantidad") | (Pantalla::Mermas, "cantidad") => {
            let codigo = arg(&resto, 0, "codigo")?;
            let cantidad = parsear_entero("cantidad", arg(&resto, 1, "cantidad")?)?;
            Ok(Orden::Cantidad(codigo.to_string(), cantidad))
        }
        (Pantalla::Venta, "quitar") | (Pantalla::Mermas, "quitar") => {
            Ok(Orden::Quitar(arg(&resto, 0, "codigo")?.to_string()))
        }
        (Pantalla::Venta, "cancelar") | (Pantalla::Mermas, "cancelar") => Ok(Orden::Cancelar),
        (Pantalla::Venta, "cobrar") => {
            let cuenta = match resto.first() {
                Some(id) => Some(parsear_entero("cuenta", id)?),
                None => None,
            };
            Ok(Orden::Cobrar(cuenta))
        }
        (Pantalla::Venta, "fiado") => Ok(Orden::CuentasParaCobro),
        (Pantalla::Venta, "historial") => Ok(Orden::Historial),
        (Pantalla::Venta, "detalle") => {
            Ok(Orden::Detalle(parsear_entero("venta", arg(&resto, 0, "venta")?)?))
        }

        (Pantalla::Inventario, "listar" | "buscar") => {
            Ok(Orden::Listar(resto.join(" ")))
        }
        (Pantalla::Inventario, "nuevo") => {
            Ok(Orden::IniciarAlta(resto.first().map(|s| s.to_string())))
        }
        (Pantalla::Inventario, "editar") => Ok(Orden::IniciarEdicion(parsear_entero(
            "producto",
            arg(&resto, 0, "producto")?,
        )?)),
        (Pantalla::Inventario, "codigo") => Ok(Orden::GenerarCodigo),
        (Pantalla::Inventario, "stock") => Ok(Orden::AgregarStock {
            id: parsear_entero("producto", arg(&resto, 0, "producto")?)?,
            cantidad: parsear_entero("cantidad", arg(&resto, 1, "cantidad")?)?,
            precio_compra: Money::parse(arg(&resto, 2, "precioCompra")?)
                .map_err(AppError::from)?,
        }),
        (Pantalla::Inventario, "etiqueta") => Ok(Orden::Etiqueta(parsear_entero(
            "producto",
            arg(&resto, 0, "producto")?,
        )?)),

        (Pantalla::Cuentas, "listar" | "buscar") => Ok(Orden::ListarCuentas(resto.join(" "))),
        (Pantalla::Cuentas, "nueva") => {
            let nombre = resto.join(" ");
            if nombre.is_empty() {
                return Err(AppError::validacion("Falta el nombre de la cuenta"));
            }
            Ok(Orden::CrearCuenta(NuevaCuenta {
                nombre,
                descripcion: None,
            }))
        }
        (Pantalla::Cuentas, "abonar") => Ok(Orden::IniciarAbono(parsear_entero(
            "cuenta",
            arg(&resto, 0, "cuenta")?,
        )?)),
        (Pantalla::Cuentas, "abonos") => Ok(Orden::Abonos(parsear_entero(
            "cuenta",
            arg(&resto, 0, "cuenta")?,
        )?)),
        (Pantalla::Cuentas, "resumen") => Ok(Orden::ResumenCuentas),

        (Pantalla::Mermas, "merma") => {
            Ok(Orden::IniciarMerma(parsear_tipo(arg(&resto, 0, "tipo")?)?))
        }
        (Pantalla::Mermas, "motivo") => Ok(Orden::IniciarMotivo),
        (Pantalla::Mermas, "borrador") => Ok(Orden::VerBorrador),
        (Pantalla::Mermas, "registrar") => Ok(Orden::RegistrarMerma),
        (Pantalla::Mermas, "historial") => Ok(Orden::HistorialMermas),

        (Pantalla::Reportes, "ventas") => match resto.as_slice() {
            [] => Ok(Orden::ResumenVentas(None)),
            [desde, hasta] => Ok(Orden::ResumenVentas(Some((
                parsear_fecha(desde)?,
                parsear_fecha(hasta)?,
            )))),
            _ => Err(AppError::validacion(
                "Usa 'ventas' o 'ventas <desde> <hasta>'",
            )),
        },
        (Pantalla::Reportes, "mermas") => {
            let desde = parsear_fecha(arg(&resto, 0, "desde")?)?;
            let hasta = parsear_fecha(arg(&resto, 1, "hasta")?)?;
            Ok(Orden::ReporteMermas(desde, hasta))
        }

        _ => Err(AppError::validacion(format!(
            "Comando desconocido: '{}'. Escribe 'ayuda'.",
            palabra
        ))),
    }
}

fn arg<'a>(resto: &[&'a str], idx: usize, nombre: &str) -> Result<&'a str, AppError> {
    resto
        .get(idx)
        .copied()
        .ok_or_else(|| AppError::validacion(format!("Falta el argumento '{}'", nombre)))
}

fn parsear_entero(nombre: &str, texto: &str) -> Result<i64, AppError> {
    texto
        .parse()
        .map_err(|_| AppError::validacion(format!("'{}' no es un número válido para {}", texto, nombre)))
}

fn parsear_fecha(texto: &str) -> Result<chrono::NaiveDate, AppError> {
    chrono::NaiveDate::parse_from_str(texto, "%Y-%m-%d")
        .map_err(|_| AppError::validacion(format!("Fecha inválida '{}' (usa AAAA-MM-DD)", texto)))
}

fn parsear_tipo(texto: &str) -> Result<TipoMerma, AppError> {
    match texto.to_lowercase().as_str() {
        "caducado" => Ok(TipoMerma::Caducado),
        "uso" | "uso-personal" => Ok(TipoMerma::UsoPersonal),
        "mal-estado" | "dañado" => Ok(TipoMerma::MalEstado),
        "robo" => Ok(TipoMerma::Robo),
        "otro" => Ok(TipoMerma::Otro),
        _ => Err(AppError::validacion(format!(
            "Tipo de merma desconocido: '{}'",
            texto
        ))),
    }
}
