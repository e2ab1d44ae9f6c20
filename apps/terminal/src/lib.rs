//! # Tienda Terminal Library
//!
//! Core library for the cashier terminal. This is the entry point that
//! wires state, the backend client and the REPL together.
//!
//! ## Module Organization
//! ```text
//! tienda_terminal_lib/
//! ├── lib.rs          ◄─── You are here (startup & run loop)
//! ├── repl.rs         ◄─── Screens, command grammar, capture flows
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── catalogo.rs ◄─── Product/account caches
//! │   ├── carrito.rs  ◄─── Cart state wrapper
//! │   └── preferencias.rs ◄ Persisted theme
//! ├── commands/
//! │   ├── producto.rs ◄─── Inventory screen operations
//! │   ├── venta.rs    ◄─── Checkout operations
//! │   ├── cuenta.rs   ◄─── Credit account operations
//! │   ├── merma.rs    ◄─── Shrinkage draft & submission
//! │   └── reporte.rs  ◄─── Read-only aggregates
//! ├── printing.rs     ◄─── Tickets and barcode labels
//! └── error.rs        ◄─── AppError for the command layer
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load persisted preferences (theme)
//! 3. Build the backend client from the environment
//! 4. Prefetch the product and account caches
//! 5. Enter the read-decode-execute loop

pub mod commands;
pub mod error;
pub mod printing;
pub mod repl;
pub mod state;

use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tienda_api::ApiClient;
use tienda_core::{LineaVenta, ScannerConfig};

use commands::merma::{BorradorMerma, Debounce, RETRASO_ESTIMACION};
use commands::producto::OrdenProductos;
use commands::venta::ResultadoEscaneo;
use error::AppError;
use repl::{Orden, Pantalla, Repl};
use state::{CarritoState, CatalogoState, PreferenciasState};

/// Everything one cashier session holds.
struct Sesion {
    api: ApiClient,
    catalogo: CatalogoState,
    carrito: CarritoState,
    preferencias: PreferenciasState,
    repl: Repl,
    borrador_merma: Option<BorradorMerma>,
    estimacion: Debounce,
}

/// Runs the terminal until the cashier exits.
pub async fn run() -> Result<(), AppError> {
    init_tracing();
    info!("Iniciando terminal de punto de venta");

    let preferencias = PreferenciasState::cargar();
    info!(tema = ?preferencias.tema(), "Preferencias cargadas");

    let api = ApiClient::from_env().map_err(AppError::from)?;
    info!(base_url = api.base_url(), "Cliente del backend listo");

    let mut sesion = Sesion {
        api,
        catalogo: CatalogoState::new(),
        carrito: CarritoState::new(),
        preferencias,
        repl: Repl::new(ScannerConfig::default()),
        borrador_merma: None,
        estimacion: Debounce::new(RETRASO_ESTIMACION),
    };

    // Startup prefetch. A dead backend is reported but not fatal: the
    // cashier sees the error and every later command retries the network.
    if let Err(e) = commands::producto::refrescar_catalogo(&sesion.api, &sesion.catalogo).await {
        warn!("no se pudo precargar el catálogo: {}", e);
        println!("AVISO: {}", e);
    }
    if let Err(e) = commands::cuenta::refrescar_cuentas(&sesion.api, &sesion.catalogo).await {
        warn!("no se pudieron precargar las cuentas: {}", e);
    }

    println!("Terminal lista. Escanea un código o escribe 'ayuda'.");

    let mut stdout = tokio::io::stdout();
    let mut lineas = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(sesion.repl.prompt().as_bytes()).await?;
        stdout.flush().await?;

        // With an estimate pending, bound the read so the debounce fires
        // on schedule instead of after the next keystroke. next_line is
        // cancel-safe, so a timeout loses no input.
        let linea = loop {
            match sesion.estimacion.restante(Instant::now()) {
                Some(restante) => {
                    match tokio::time::timeout(restante, lineas.next_line()).await {
                        Ok(linea) => break linea?,
                        Err(_) => imprimir_estimacion(&mut sesion).await,
                    }
                }
                None => break lineas.next_line().await?,
            }
        };
        let Some(linea) = linea else {
            break;
        };

        let ordenes = match sesion.repl.procesar_linea(&linea, Instant::now()) {
            Ok(ordenes) => ordenes,
            Err(e) => {
                println!("ERROR: {}", e);
                continue;
            }
        };

        let mut salir = false;
        for orden in ordenes {
            if matches!(orden, Orden::Salir) {
                salir = true;
                break;
            }
            if let Err(e) = ejecutar(&mut sesion, orden).await {
                println!("ERROR: {}", e);
            }
        }
        if salir {
            break;
        }

        imprimir_estimacion(&mut sesion).await;
    }

    info!("Terminal cerrada");
    Ok(())
}

/// Refreshes the merma cost estimate once the draft has been quiet long
/// enough. A failed estimate is logged, not surfaced; the next touch
/// retries it.
async fn imprimir_estimacion(sesion: &mut Sesion) {
    if !sesion.estimacion.vencido(Instant::now()) {
        return;
    }
    if let Some(borrador) = &sesion.borrador_merma {
        match commands::merma::estimar_costo(&sesion.api, borrador).await {
            Ok(costo) => println!("Costo estimado de la merma: {}", costo),
            Err(e) => warn!("no se pudo estimar el costo: {}", e),
        }
    }
}

/// Executes one parsed order against the session.
async fn ejecutar(sesion: &mut Sesion, orden: Orden) -> Result<(), AppError> {
    match orden {
        Orden::Salir => {}
        Orden::Ayuda => imprimir_ayuda(sesion.repl.pantalla()),
        Orden::Tema => {
            let tema = sesion.preferencias.alternar_tema();
            println!("Tema: {:?}", tema);
        }
        Orden::Ir(pantalla) => {
            sesion.repl.ir(pantalla);
            println!("── {} ──", pantalla.titulo());
        }

        Orden::Escaneo(codigo) => ejecutar_escaneo(sesion, &codigo).await?,

        // Venta ---------------------------------------------------------
        Orden::VerCarrito => imprimir_carrito(&sesion.carrito),
        Orden::Cantidad(codigo, cantidad) => match sesion.repl.pantalla() {
            Pantalla::Mermas => cambiar_cantidad_merma(sesion, &codigo, cantidad)?,
            _ => {
                commands::venta::cambiar_cantidad(&sesion.carrito, &codigo, cantidad)?;
                imprimir_carrito(&sesion.carrito);
            }
        },
        Orden::Quitar(codigo) => match sesion.repl.pantalla() {
            Pantalla::Mermas => {
                let producto = sesion
                    .catalogo
                    .buscar_codigo(&codigo)
                    .ok_or_else(|| AppError::validacion("Producto desconocido"))?;
                if let Some(borrador) = sesion.borrador_merma.as_mut() {
                    borrador.quitar_linea(producto.id);
                    sesion.estimacion.tocar(Instant::now());
                }
            }
            _ => {
                commands::venta::quitar_linea(&sesion.carrito, &codigo)?;
                imprimir_carrito(&sesion.carrito);
            }
        },
        Orden::Cancelar => match sesion.repl.pantalla() {
            Pantalla::Mermas => {
                sesion.borrador_merma = None;
                println!("Borrador de merma descartado.");
            }
            _ => {
                commands::venta::cancelar_venta(&sesion.carrito);
                println!("Venta cancelada.");
            }
        },
        Orden::Cobrar(cuenta_id) => {
            // Snapshot the lines before checkout clears them; the ticket
            // needs them.
            let lineas: Vec<LineaVenta> = sesion.carrito.con_carrito(|c| {
                c.lineas
                    .iter()
                    .map(|l| LineaVenta {
                        producto_id: l.producto_id,
                        descripcion: l.descripcion.clone(),
                        cantidad: l.cantidad,
                        precio_unitario: l.precio_unitario,
                    })
                    .collect()
            });
            let venta =
                commands::venta::cobrar(&sesion.api, &sesion.catalogo, &sesion.carrito, cuenta_id)
                    .await?;
            let ticket = printing::generar_ticket(&venta, &lineas);
            print!("{}", ticket);
            let ruta = printing::escribir_documento(&format!("ticket-{}.txt", venta.id), &ticket)?;
            println!("Ticket guardado en {}", ruta.display());
        }
        Orden::CuentasParaCobro => {
            // The slim listing the backend keeps for the checkout picker.
            for cuenta in sesion.api.cuentas().optimizadas_pos().await? {
                println!("#{:<5} {:<30} saldo {:>10}", cuenta.id, cuenta.nombre, cuenta.saldo.to_string());
            }
            println!("Usa 'cobrar <cuenta>' para cargar la venta.");
        }
        Orden::Historial => {
            for venta in commands::venta::historial(&sesion.api).await? {
                println!(
                    "#{:<6} {}  {:>10}  {:?}",
                    venta.id,
                    venta.fecha.format("%d/%m/%Y %H:%M"),
                    venta.total.to_string(),
                    venta.estado
                );
            }
        }
        Orden::Detalle(id) => {
            let lineas = commands::venta::lineas_de(&sesion.api, id).await?;
            for linea in &lineas {
                println!(
                    "{:<30} x{:<4} {:>10}",
                    linea.descripcion,
                    linea.cantidad,
                    linea.subtotal().to_string()
                );
            }
            for costo in commands::venta::costos_de(&sesion.api, id).await? {
                println!(
                    "  lote producto {}: {} x {}",
                    costo.producto_id, costo.cantidad, costo.costo_unitario
                );
            }
        }

        // Inventario ----------------------------------------------------
        Orden::Listar(consulta) => {
            let productos = commands::producto::listar_productos(
                &sesion.catalogo,
                &consulta,
                OrdenProductos::Descripcion,
                true,
            );
            for p in &productos {
                println!(
                    "#{:<5} {:<14} {:<30} {:>9}  stock {:>4}",
                    p.id,
                    p.codigo,
                    p.descripcion,
                    p.precio.to_string(),
                    p.cantidad
                );
            }
            println!("{} productos", productos.len());
        }
        Orden::IniciarAlta(codigo) => {
            let borrador =
                commands::producto::borrador_desde_codigo(codigo.as_deref().unwrap_or(""));
            sesion.repl.iniciar_producto(None, borrador);
        }
        Orden::IniciarEdicion(id) => {
            let producto = sesion
                .catalogo
                .buscar_id(id)
                .ok_or_else(|| AppError::validacion("Producto desconocido"))?;
            let borrador = tienda_core::NuevoProducto {
                codigo: producto.codigo,
                descripcion: String::new(),
                precio: producto.precio,
                precio_compra: producto.precio_compra,
                proveedor: producto.proveedor,
                cantidad: producto.cantidad,
            };
            sesion.repl.iniciar_producto(Some(id), borrador);
        }
        Orden::CrearProducto(nuevo) => {
            let creado =
                commands::producto::crear_producto(&sesion.api, &sesion.catalogo, &nuevo).await?;
            println!("Producto #{} '{}' registrado.", creado.id, creado.descripcion);
        }
        Orden::EditarProducto(id, cambios) => {
            let actualizado =
                commands::producto::editar_producto(&sesion.api, &sesion.catalogo, id, &cambios)
                    .await?;
            println!("Producto #{} actualizado.", actualizado.id);
        }
        Orden::GenerarCodigo => {
            println!("Código generado: {}", commands::producto::generar_codigo(&sesion.catalogo)?);
        }
        Orden::AgregarStock {
            id,
            cantidad,
            precio_compra,
        } => {
            let actualizado = commands::producto::agregar_stock(
                &sesion.api,
                &sesion.catalogo,
                id,
                cantidad,
                precio_compra,
            )
            .await?;
            println!(
                "Stock de '{}' ahora {}.",
                actualizado.descripcion, actualizado.cantidad
            );
        }
        Orden::Etiqueta(id) => {
            let producto = sesion
                .catalogo
                .buscar_id(id)
                .ok_or_else(|| AppError::validacion("Producto desconocido"))?;
            let html = printing::generar_etiqueta(&producto);
            let ruta =
                printing::escribir_documento(&format!("etiqueta-{}.html", producto.codigo), &html)?;
            println!("Etiqueta escrita en {}", ruta.display());
        }

        // Cuentas -------------------------------------------------------
        Orden::ListarCuentas(consulta) => {
            for cuenta in commands::cuenta::listar_cuentas(&sesion.catalogo, &consulta) {
                println!("#{:<5} {:<30} saldo {:>10}", cuenta.id, cuenta.nombre, cuenta.saldo.to_string());
            }
        }
        Orden::CrearCuenta(nueva) => {
            let creada = commands::cuenta::crear_cuenta(&sesion.api, &sesion.catalogo, &nueva).await?;
            println!("Cuenta #{} '{}' creada.", creada.id, creada.nombre);
        }
        Orden::IniciarAbono(cuenta_id) => sesion.repl.iniciar_abono(cuenta_id),
        Orden::Abonar(cuenta_id, monto) => {
            let abono =
                commands::cuenta::abonar(&sesion.api, &sesion.catalogo, cuenta_id, monto).await?;
            println!(
                "Abono de {} aplicado. Saldo: {} → {}",
                abono.monto, abono.saldo_anterior, abono.saldo_nuevo
            );
        }
        Orden::Abonos(cuenta_id) => {
            for abono in commands::cuenta::abonos_de(&sesion.api, cuenta_id).await? {
                println!(
                    "{}  {:>10}  saldo {:>10}",
                    abono.fecha.format("%d/%m/%Y"),
                    abono.monto.to_string(),
                    abono.saldo_nuevo.to_string()
                );
            }
        }
        Orden::ResumenCuentas => {
            let resumen = commands::cuenta::resumen(&sesion.api).await?;
            println!(
                "{} cuentas, {} con deuda, deuda total {}",
                resumen.total_cuentas, resumen.cuentas_con_deuda, resumen.deuda_total
            );
        }

        // Mermas --------------------------------------------------------
        Orden::IniciarMerma(tipo) => {
            sesion.borrador_merma = Some(BorradorMerma::new(tipo));
            println!(
                "Merma '{}' iniciada. Escanea productos, luego 'motivo' y 'registrar'.",
                tipo.etiqueta()
            );
        }
        Orden::IniciarMotivo => {
            if sesion.borrador_merma.is_none() {
                return Err(AppError::validacion("Inicia una merma primero"));
            }
            sesion.repl.iniciar_motivo();
        }
        Orden::MotivoMerma(motivo) => {
            let borrador = sesion
                .borrador_merma
                .as_mut()
                .ok_or_else(|| AppError::validacion("Inicia una merma primero"))?;
            borrador.motivo = motivo;
            println!("Motivo capturado.");
        }
        Orden::VerBorrador => {
            let Some(borrador) = &sesion.borrador_merma else {
                println!("Sin borrador de merma.");
                return Ok(());
            };
            println!("Merma '{}', motivo: {}", borrador.tipo.etiqueta(), borrador.motivo);
            for linea in &borrador.lineas {
                let descripcion = sesion
                    .catalogo
                    .buscar_id(linea.producto_id)
                    .map(|p| p.descripcion)
                    .unwrap_or_else(|| format!("producto {}", linea.producto_id));
                println!("  {:<30} x{}", descripcion, linea.cantidad);
            }
        }
        Orden::RegistrarMerma => {
            let borrador = sesion
                .borrador_merma
                .take()
                .ok_or_else(|| AppError::validacion("Inicia una merma primero"))?;
            match commands::merma::registrar_merma(&sesion.api, &sesion.catalogo, &borrador).await {
                Ok(merma) => {
                    println!("Merma #{} registrada, costo {}.", merma.id, merma.costo_total);
                }
                Err(e) => {
                    // Validation or backend rejection: keep the draft so
                    // the cashier can fix it instead of recapturing.
                    sesion.borrador_merma = Some(borrador);
                    return Err(e);
                }
            }
        }

        Orden::HistorialMermas => {
            for merma in commands::merma::historial(&sesion.api).await? {
                println!(
                    "#{:<5} {}  {:<15} {:>10}",
                    merma.id,
                    merma.fecha.format("%d/%m/%Y"),
                    merma.tipo.etiqueta(),
                    merma.costo_total.to_string()
                );
            }
        }

        // Reportes ------------------------------------------------------
        Orden::ResumenVentas(rango) => {
            let mut ventas = commands::venta::historial(&sesion.api).await?;
            if let Some((desde, hasta)) = rango {
                let desde = inicio_del_dia(desde)?;
                let hasta = fin_del_dia(hasta)?;
                ventas = commands::reporte::ventas_en_rango(&ventas, desde, hasta);
            }
            let resumen = commands::reporte::resumen_ventas(&ventas);
            println!(
                "{} ventas por {}; {} a crédito por {}",
                resumen.num_ventas, resumen.total, resumen.num_prestamos, resumen.total_prestamos
            );
        }
        Orden::ReporteMermas(desde, hasta) => {
            let desde = inicio_del_dia(desde)?;
            let hasta = fin_del_dia(hasta)?;
            let reporte = commands::reporte::reporte_mermas(&sesion.api, desde, hasta).await?;
            println!("Costo total de mermas: {}", reporte.costo_total);
            for total in &reporte.por_tipo {
                println!(
                    "  {:<15} {:>3} registros  {:>10}",
                    total.tipo.etiqueta(),
                    total.registros,
                    total.costo.to_string()
                );
            }
        }
    }
    Ok(())
}

/// Routes a completed scan according to the current screen.
async fn ejecutar_escaneo(sesion: &mut Sesion, codigo: &str) -> Result<(), AppError> {
    // A scan while the product form waits for its codigo fills that field.
    if sesion.repl.en_flujo() {
        sesion.repl.entregar_codigo(codigo)?;
        return Ok(());
    }

    match sesion.repl.pantalla() {
        Pantalla::Venta => {
            match commands::venta::escanear_al_carrito(&sesion.catalogo, &sesion.carrito, codigo)? {
                ResultadoEscaneo::Agregado(producto) => {
                    let total = sesion.carrito.con_carrito(|c| c.total());
                    println!("+ {} ({})  total {}", producto.descripcion, producto.precio, total);
                }
                ResultadoEscaneo::NoEncontrado(codigo) => {
                    println!("Código {} no registrado; alta de producto:", codigo);
                    sesion
                        .repl
                        .iniciar_producto(None, commands::producto::borrador_desde_codigo(&codigo));
                }
            }
        }
        Pantalla::Inventario => match sesion.catalogo.buscar_codigo(codigo) {
            Some(p) => println!(
                "#{:<5} {:<14} {:<30} {:>9}  stock {:>4}",
                p.id,
                p.codigo,
                p.descripcion,
                p.precio.to_string(),
                p.cantidad
            ),
            None => {
                println!("Código {} no registrado; alta de producto:", codigo);
                sesion
                    .repl
                    .iniciar_producto(None, commands::producto::borrador_desde_codigo(codigo));
            }
        },
        Pantalla::Mermas => {
            let borrador = sesion
                .borrador_merma
                .as_mut()
                .ok_or_else(|| AppError::validacion("Inicia una merma primero"))?;
            let producto = commands::merma::escanear_al_borrador(&sesion.catalogo, borrador, codigo)?;
            sesion.estimacion.tocar(Instant::now());
            println!("+ {} a la merma", producto.descripcion);
        }
        Pantalla::Cuentas | Pantalla::Reportes => {
            println!("Esta pantalla no acepta escaneos.");
        }
    }
    Ok(())
}

fn cambiar_cantidad_merma(sesion: &mut Sesion, codigo: &str, cantidad: i64) -> Result<(), AppError> {
    let producto = sesion
        .catalogo
        .buscar_codigo(codigo)
        .ok_or_else(|| AppError::validacion("Producto desconocido"))?;
    let borrador = sesion
        .borrador_merma
        .as_mut()
        .ok_or_else(|| AppError::validacion("Inicia una merma primero"))?;
    borrador.quitar_linea(producto.id);
    if cantidad > 0 {
        borrador.agregar_linea(producto.id, cantidad);
    }
    sesion.estimacion.tocar(Instant::now());
    Ok(())
}

fn imprimir_carrito(carrito: &CarritoState) {
    carrito.con_carrito(|c| {
        for linea in &c.lineas {
            println!(
                "{:<14} {:<26} x{:<4} {:>10}",
                linea.codigo,
                linea.descripcion,
                linea.cantidad,
                linea.subtotal().to_string()
            );
        }
        println!("TOTAL: {}", c.total());
    });
}

fn imprimir_ayuda(pantalla: Pantalla) {
    println!("Pantallas: venta, inventario, cuentas, mermas, reportes. Global: tema, salir.");
    match pantalla {
        Pantalla::Venta => println!(
            "venta: <escaneo> | carrito | cantidad <codigo> <n> | quitar <codigo> | cancelar | fiado | cobrar [cuenta] | historial | detalle <id>"
        ),
        Pantalla::Inventario => println!(
            "inventario: <escaneo o búsqueda> | listar [texto] | nuevo [codigo] | editar <id> | codigo | stock <id> <n> <precio> | etiqueta <id>"
        ),
        Pantalla::Cuentas => println!(
            "cuentas: listar [texto] | nueva <nombre> | abonar <id> | abonos <id> | resumen"
        ),
        Pantalla::Mermas => println!(
            "mermas: merma <tipo> | <escaneo> | cantidad <codigo> <n> | quitar <codigo> | motivo | borrador | registrar | historial | cancelar"
        ),
        Pantalla::Reportes => {
            println!("reportes: ventas [desde hasta] | mermas <desde> <hasta>")
        }
    }
}

fn inicio_del_dia(fecha: chrono::NaiveDate) -> Result<chrono::DateTime<chrono::Utc>, AppError> {
    fecha
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::interno("fecha fuera de rango"))
}

fn fin_del_dia(fecha: chrono::NaiveDate) -> Result<chrono::DateTime<chrono::Utc>, AppError> {
    fecha
        .and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::interno("fecha fuera de rango"))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=tienda=trace` - Trace for the tienda crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tienda=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
