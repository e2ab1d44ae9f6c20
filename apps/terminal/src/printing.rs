//! # Printing Module
//!
//! Receipt tickets and barcode labels. Tickets are plain text laid out for
//! a 58mm thermal printer (42 columns); labels are a self-contained HTML
//! page that renders the barcode and triggers the print dialog on open.
//! Both are written under the system temp directory and the path handed
//! back to the caller, which decides whether and where to send them.

use std::path::PathBuf;

use tienda_core::{LineaVenta, Money, Producto, Venta};

/// Characters per ticket line on a 58mm printer.
const ANCHO_TICKET: usize = 42;

const NOMBRE_NEGOCIO: &str = "TIENDA POS";

// =============================================================================
// Ticket
// =============================================================================

/// Renders a sale as a ticket.
pub fn generar_ticket(venta: &Venta, lineas: &[LineaVenta]) -> String {
    let mut ticket = String::new();

    ticket.push_str(&centrar(NOMBRE_NEGOCIO));
    ticket.push_str(&centrar(&format!("Venta No. {}", venta.id)));
    ticket.push_str(&separador('-'));

    ticket.push_str(&format!(
        "Fecha: {}\n",
        venta.fecha.format("%d/%m/%Y %H:%M")
    ));
    ticket.push_str(&separador('-'));

    ticket.push_str(&format!(
        "{:<20} {:>4} {:>7} {:>8}\n",
        "PRODUCTO", "CANT", "P.UNIT", "SUBTOT"
    ));
    ticket.push_str(&separador('-'));

    for linea in lineas {
        ticket.push_str(&format!(
            "{:<20} {:>4} {:>7} {:>8}\n",
            truncar(&linea.descripcion, 20),
            linea.cantidad,
            linea.precio_unitario,
            linea.subtotal()
        ));
    }

    ticket.push_str(&separador('='));
    ticket.push_str(&linea_monto("TOTAL:", venta.total));

    if venta.cuenta_id.is_some() {
        ticket.push_str(&separador('-'));
        ticket.push_str(&centrar("CARGADO A CUENTA"));
    }

    ticket.push('\n');
    ticket.push_str(&centrar("Gracias por su compra!"));
    ticket
}

fn centrar(texto: &str) -> String {
    let relleno = ANCHO_TICKET.saturating_sub(texto.len()) / 2;
    format!("{}{}\n", " ".repeat(relleno), texto)
}

fn separador(ch: char) -> String {
    format!("{}\n", ch.to_string().repeat(ANCHO_TICKET))
}

fn linea_monto(label: &str, monto: Money) -> String {
    let valor = monto.to_string();
    let espacios = ANCHO_TICKET.saturating_sub(label.len() + valor.len());
    format!("{}{}{}\n", label, " ".repeat(espacios), valor)
}

fn truncar(texto: &str, max: usize) -> String {
    texto.chars().take(max).collect()
}

// =============================================================================
// Barcode Label
// =============================================================================

/// Renders a printable label page for one product. The page draws the
/// barcode client-side with JsBarcode and opens the print dialog on load,
/// matching how label printers are driven from a browser.
pub fn generar_etiqueta(producto: &Producto) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Etiqueta {codigo}</title>
<script src="https://cdn.jsdelivr.net/npm/jsbarcode@3.11.6/dist/JsBarcode.all.min.js"></script>
<style>
  body {{ margin: 0; font-family: monospace; text-align: center; }}
  .etiqueta {{ width: 5cm; padding: 2mm; }}
  .descripcion {{ font-size: 9pt; overflow: hidden; white-space: nowrap; }}
  .precio {{ font-size: 12pt; font-weight: bold; }}
</style>
</head>
<body>
<div class="etiqueta">
  <div class="descripcion">{descripcion}</div>
  <svg id="barcode"></svg>
  <div class="precio">{precio}</div>
</div>
<script>
  JsBarcode("#barcode", "{codigo}", {{ format: "CODE128", height: 40, fontSize: 12 }});
  window.onload = function () {{ window.print(); }};
</script>
</body>
</html>
"##,
        codigo = producto.codigo,
        descripcion = escapar_html(&producto.descripcion),
        precio = producto.precio,
    )
}

fn escapar_html(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// =============================================================================
// Output
// =============================================================================

/// Writes a document under the system temp directory and returns its path.
pub fn escribir_documento(nombre: &str, contenido: &str) -> std::io::Result<PathBuf> {
    let ruta = std::env::temp_dir().join(nombre);
    std::fs::write(&ruta, contenido)?;
    Ok(ruta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venta_de_prueba() -> (Venta, Vec<LineaVenta>) {
        let venta = Venta {
            id: 501,
            fecha: "2026-08-25T15:04:05Z".parse().unwrap(),
            cuenta_id: None,
            total: Money::from_centavos(4300),
            estado: tienda_core::EstadoVenta::Completada,
        };
        let lineas = vec![
            LineaVenta {
                producto_id: 1,
                descripcion: "Refresco 600ml".to_string(),
                cantidad: 2,
                precio_unitario: Money::from_centavos(1800),
            },
            LineaVenta {
                producto_id: 2,
                descripcion: "Una descripción exageradamente larga de producto".to_string(),
                cantidad: 1,
                precio_unitario: Money::from_centavos(700),
            },
        ];
        (venta, lineas)
    }

    #[test]
    fn test_ticket_contiene_total_y_lineas() {
        let (venta, lineas) = venta_de_prueba();
        let ticket = generar_ticket(&venta, &lineas);

        assert!(ticket.contains("Venta No. 501"));
        assert!(ticket.contains("$36.00"));
        assert!(ticket.contains("$43.00"));
        assert!(!ticket.contains("CARGADO A CUENTA"));
        // Long descriptions are truncated to the column width.
        assert!(ticket.contains("Una descripción exag"));
    }

    #[test]
    fn test_ticket_prestamo_se_marca() {
        let (mut venta, lineas) = venta_de_prueba();
        venta.cuenta_id = Some(7);
        venta.estado = tienda_core::EstadoVenta::Prestamo;
        let ticket = generar_ticket(&venta, &lineas);
        assert!(ticket.contains("CARGADO A CUENTA"));
    }

    #[test]
    fn test_etiqueta_incluye_codigo_y_precio() {
        let producto = Producto {
            id: 1,
            codigo: "750123456789".to_string(),
            descripcion: "Jabón <neutro>".to_string(),
            precio: Money::from_centavos(900),
            precio_compra: Money::from_centavos(500),
            proveedor: None,
            cantidad: 10,
            activo: true,
        };
        let html = generar_etiqueta(&producto);
        assert!(html.contains(r##"JsBarcode("#barcode", "750123456789""##));
        assert!(html.contains("$9.00"));
        assert!(html.contains("Jabón &lt;neutro&gt;"));
    }
}
