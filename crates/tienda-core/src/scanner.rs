//! # Scanner Decoder
//!
//! Converts a burst of rapid digit keystrokes, as produced by a USB
//! keyboard-wedge barcode scanner, into a single barcode string, while
//! leaving ordinary typing unaffected.
//!
//! ## The Problem
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A keyboard-wedge scanner emits keystrokes indistinguishable from       │
//! │  manual typing except for two things:                                   │
//! │                                                                         │
//! │    1. Speed      - a full barcode arrives in well under 100ms           │
//! │    2. Terminator - the burst ends with an Enter keystroke               │
//! │                                                                         │
//! │  Scanner:  [7][5][0][1][0][5][5][3][0][0][1][0][8]⏎   < 100ms          │
//! │  Human:    [7]........[5]..........[0]               seconds           │
//! │                                                                         │
//! │  The decoder accumulates digits and arms an inter-keystroke timer.      │
//! │  Enter completes the scan; timer expiry abandons it. This is a          │
//! │  pragmatic heuristic, not a guaranteed-correct decoder: a very fast     │
//! │  human typist can trigger it, and a suppressed terminator can stall it. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │              digit (arm timer)          digit (re-arm timer)            │
//! │   ┌────────┐ ──────────────────► ┌───────────┐ ──┐                     │
//! │   │ Idle   │                     │ Escaneando │ ◄─┘                     │
//! │   │ buffer │ ◄────────────────── │ buffer=D.. │                         │
//! │   │ empty  │   Enter → complete  └───────────┘                         │
//! │   └────────┘   timer  → abandon                                         │
//! │                excluded context → abort                                 │
//! │                                                                         │
//! │  Priority order on every key:                                           │
//! │    1. excluded context (numeric input, textarea)  abort + pass through  │
//! │    2. Enter, buffer non-empty                     complete + suppress   │
//! │    3. digit 0-9                                   accumulate + suppress │
//! │       (search field: accumulate + pass through)                         │
//! │    4. anything else                               ignore + pass through │
//! │    5. timer expiry                                abandon, no lookup    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! The decoder never arms a real timer. It records a deadline and the host
//! either polls it ([`ScannerDecoder::poll`]) or lets the next keystroke
//! expire it lazily. This keeps the state machine deterministic and fully
//! testable with synthetic clocks; the terminal drives the real timing.
//!
//! There is exactly one decoder for the whole terminal, parameterized by an
//! injected input context (the exclusion predicate) and a [`ScanSink`] (the
//! found/not-found behavior), so every screen shares the same transitions.

use std::time::{Duration, Instant};

use crate::types::Producto;

// =============================================================================
// Configuration
// =============================================================================

/// Inter-keystroke timeout default. Hardware scanners emit digits a few
/// milliseconds apart, human typing hundreds; 400ms sits well between.
pub const TIMEOUT_PREDETERMINADO: Duration = Duration::from_millis(400);

/// Decoder configuration.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// How long to wait for the next digit before abandoning the burst.
    pub timeout: Duration,

    /// Accept Tab as an alternate scan terminator. Some hardware scanners
    /// are configured to send Tab instead of Enter; the deployed hardware
    /// sends Enter, so this defaults to off.
    pub tab_termina: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            timeout: TIMEOUT_PREDETERMINADO,
            tab_termina: false,
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// A keystroke as seen by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A single digit key, `'0'..='9'`.
    Digito(char),
    Enter,
    Tab,
    /// Any other key. Ignored by the decoder (rule 4).
    Otra,
}

impl Key {
    /// Classifies a raw input character.
    pub fn from_char(c: char) -> Key {
        match c {
            '0'..='9' => Key::Digito(c),
            '\n' | '\r' => Key::Enter,
            '\t' => Key::Tab,
            _ => Key::Otra,
        }
    }
}

/// Where keyboard focus currently is.
///
/// This is the injected exclusion predicate: the decoder never inspects the
/// focused control itself, the host classifies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Contexto {
    /// No control that needs the keystrokes (general screen focus).
    #[default]
    Ninguno,

    /// The designated manual-search field. Digits pass through so the user
    /// can filter by typing, but the decoder still accumulates them.
    Busqueda,

    /// An ordinary single-line text field.
    Texto,

    /// A numeric-typed input (quantities, prices). Excluded: these controls
    /// need normal numeric entry.
    Numerico,

    /// A multi-line text field (merma motivo). Excluded.
    Multilinea,
}

impl Contexto {
    /// Contexts in which the decoder must stand down entirely (rule 1).
    #[inline]
    pub fn excluye_escaneo(&self) -> bool {
        matches!(self, Contexto::Numerico | Contexto::Multilinea)
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// What the host should do with the keystroke's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposicion {
    /// Let the keystroke reach the focused control.
    PasaLibre,
    /// Swallow it (suppress default action and propagation).
    Suprimir,
}

/// Result of feeding one keystroke to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tecleo {
    pub disposicion: Disposicion,
    /// Set when this keystroke completed a scan: the accumulated barcode.
    pub completado: Option<String>,
}

impl Tecleo {
    fn pasa() -> Self {
        Tecleo {
            disposicion: Disposicion::PasaLibre,
            completado: None,
        }
    }

    fn suprime() -> Self {
        Tecleo {
            disposicion: Disposicion::Suprimir,
            completado: None,
        }
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// The scanner keystroke decoder.
///
/// State is minimal: an accumulator buffer, an "is scanning" flag and one
/// pending deadline. Everything runs on the caller's thread; the only timing
/// concern is the deadline racing the next keystroke, resolved by re-arming
/// it on every accepted digit (standard debounce).
#[derive(Debug)]
pub struct ScannerDecoder {
    config: ScannerConfig,
    buffer: String,
    escaneando: bool,
    vence: Option<Instant>,
}

impl ScannerDecoder {
    pub fn new(config: ScannerConfig) -> Self {
        ScannerDecoder {
            config,
            buffer: String::new(),
            escaneando: false,
            vence: None,
        }
    }

    /// The in-progress buffer, shown to the user as scanning feedback.
    #[inline]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Whether a burst is currently in progress.
    #[inline]
    pub fn escaneando(&self) -> bool {
        self.escaneando
    }

    /// Deadline of the pending completion timer, if a burst is in progress.
    /// Hosts that drive a real timer sleep until this instant and then call
    /// [`poll`](Self::poll).
    #[inline]
    pub fn vence(&self) -> Option<Instant> {
        self.vence
    }

    /// Clears buffer, flag and timer.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.escaneando = false;
        self.vence = None;
    }

    /// Rule 5: if the deadline has passed, the partial buffer is abandoned.
    /// No lookup fires. Returns whether an abandonment happened.
    pub fn poll(&mut self, ahora: Instant) -> bool {
        match self.vence {
            Some(v) if ahora >= v => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Feeds one keystroke through the transition rules, in priority order.
    pub fn on_key(&mut self, key: Key, contexto: Contexto, ahora: Instant) -> Tecleo {
        // A deadline that expired before this keystroke arrived counts as
        // rule 5 having fired first.
        self.poll(ahora);

        // Rule 1: excluded contexts abort an in-flight scan and keep their
        // keystrokes.
        if contexto.excluye_escaneo() {
            if self.escaneando {
                self.reset();
            }
            return Tecleo::pasa();
        }

        match key {
            // Rule 2: end-of-scan. Reset unconditionally, match or no match
            // is the dispatcher's business.
            Key::Enter => self.terminar(),
            Key::Tab if self.config.tab_termina => self.terminar(),

            // Rule 3: accumulate. Digits are swallowed so they do not leak
            // into whatever control happens to be focused, except in the
            // search field where they double as manual filter input.
            Key::Digito(d) => {
                self.buffer.push(d);
                self.escaneando = true;
                self.vence = Some(ahora + self.config.timeout);
                if contexto == Contexto::Busqueda {
                    Tecleo::pasa()
                } else {
                    Tecleo::suprime()
                }
            }

            // Rule 4: ignored, buffer untouched. A stray letter does not
            // abort the burst.
            _ => Tecleo::pasa(),
        }
    }

    fn terminar(&mut self) -> Tecleo {
        if self.buffer.is_empty() {
            return Tecleo::pasa();
        }
        let codigo = std::mem::take(&mut self.buffer);
        self.reset();
        Tecleo {
            disposicion: Disposicion::Suprimir,
            completado: Some(codigo),
        }
    }
}

impl Default for ScannerDecoder {
    fn default() -> Self {
        ScannerDecoder::new(ScannerConfig::default())
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Exact-code lookup against the in-memory catalog snapshot.
pub fn buscar_por_codigo<'a>(catalogo: &'a [Producto], codigo: &str) -> Option<&'a Producto> {
    catalogo.iter().find(|p| p.codigo == codigo)
}

/// Per-screen behavior for a completed scan.
///
/// The sales screen adds a unit to the cart and a miss offers to register
/// the product; the merma screen adds a draft line and treats a miss as an
/// error. Both share the decoder and differ only in their sink.
pub trait ScanSink {
    fn producto_encontrado(&mut self, producto: &Producto);
    fn codigo_no_encontrado(&mut self, codigo: &str);
}

/// Routes a completed scan to the sink. The dispatch itself never fails;
/// what a miss means is the sink's call.
pub fn despachar<S: ScanSink>(catalogo: &[Producto], codigo: &str, sink: &mut S) {
    match buscar_por_codigo(catalogo, codigo) {
        Some(producto) => sink.producto_encontrado(producto),
        None => sink.codigo_no_encontrado(codigo),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn producto(id: i64, codigo: &str) -> Producto {
        Producto {
            id,
            codigo: codigo.to_string(),
            descripcion: format!("Producto {}", codigo),
            precio: Money::from_centavos(1000),
            precio_compra: Money::from_centavos(600),
            proveedor: None,
            cantidad: 10,
            activo: true,
        }
    }

    /// Feeds a digit string as a rapid burst (1ms between keys).
    fn rafaga(
        decoder: &mut ScannerDecoder,
        digitos: &str,
        contexto: Contexto,
        inicio: Instant,
    ) -> Instant {
        let mut t = inicio;
        for c in digitos.chars() {
            decoder.on_key(Key::from_char(c), contexto, t);
            t += Duration::from_millis(1);
        }
        t
    }

    #[test]
    fn test_burst_plus_enter_reports_exact_digits() {
        // Lengths 1 through 20, the full range a hardware scanner produces.
        for len in 1..=20 {
            let digitos: String = (0..len).map(|i| char::from(b'0' + (i % 10) as u8)).collect();
            let mut decoder = ScannerDecoder::default();
            let t0 = Instant::now();
            let t = rafaga(&mut decoder, &digitos, Contexto::Ninguno, t0);
            let fin = decoder.on_key(Key::Enter, Contexto::Ninguno, t);
            assert_eq!(fin.completado.as_deref(), Some(digitos.as_str()));
            assert_eq!(fin.disposicion, Disposicion::Suprimir);
            assert_eq!(decoder.buffer(), "");
            assert!(!decoder.escaneando());
        }
    }

    #[test]
    fn test_digits_are_suppressed_during_burst() {
        let mut decoder = ScannerDecoder::default();
        let salida = decoder.on_key(Key::Digito('7'), Contexto::Texto, Instant::now());
        assert_eq!(salida.disposicion, Disposicion::Suprimir);
        assert!(decoder.escaneando());
        assert_eq!(decoder.buffer(), "7");
    }

    #[test]
    fn test_search_field_digits_pass_through_but_accumulate() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        let salida = decoder.on_key(Key::Digito('7'), Contexto::Busqueda, t0);
        assert_eq!(salida.disposicion, Disposicion::PasaLibre);
        assert_eq!(decoder.buffer(), "7");
    }

    #[test]
    fn test_timeout_abandons_without_lookup() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        rafaga(&mut decoder, "123", Contexto::Ninguno, t0);
        assert!(decoder.escaneando());

        // No completing Enter within the window.
        let expiro = decoder.poll(t0 + Duration::from_millis(500));
        assert!(expiro);
        assert_eq!(decoder.buffer(), "");
        assert!(!decoder.escaneando());
        assert!(decoder.vence().is_none());
    }

    #[test]
    fn test_late_enter_after_expiry_completes_nothing() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        let t = rafaga(&mut decoder, "123", Contexto::Ninguno, t0);

        // Enter arrives past the deadline; lazy expiry fires first.
        let fin = decoder.on_key(Key::Enter, Contexto::Ninguno, t + Duration::from_secs(1));
        assert_eq!(fin.completado, None);
        assert_eq!(fin.disposicion, Disposicion::PasaLibre);
    }

    #[test]
    fn test_each_digit_rearms_the_timer() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        decoder.on_key(Key::Digito('1'), Contexto::Ninguno, t0);
        let paso = Duration::from_millis(300);
        decoder.on_key(Key::Digito('2'), Contexto::Ninguno, t0 + paso);

        // 300ms after the *second* digit is still inside its window.
        assert!(!decoder.poll(t0 + paso + Duration::from_millis(300)));
        assert_eq!(decoder.buffer(), "12");
    }

    #[test]
    fn test_numeric_context_passes_digit_and_aborts_scan() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        rafaga(&mut decoder, "75", Contexto::Ninguno, t0);
        assert!(decoder.escaneando());

        // Focus moved to a quantity spinner mid-burst.
        let salida = decoder.on_key(Key::Digito('3'), Contexto::Numerico, t0);
        assert_eq!(salida.disposicion, Disposicion::PasaLibre);
        assert_eq!(salida.completado, None);
        assert_eq!(decoder.buffer(), "");
        assert!(!decoder.escaneando());
    }

    #[test]
    fn test_multiline_context_excluded_too() {
        let mut decoder = ScannerDecoder::default();
        let salida = decoder.on_key(Key::Digito('5'), Contexto::Multilinea, Instant::now());
        assert_eq!(salida.disposicion, Disposicion::PasaLibre);
        assert_eq!(decoder.buffer(), "");
    }

    #[test]
    fn test_stray_letter_does_not_abort_burst() {
        let mut decoder = ScannerDecoder::default();
        let t0 = Instant::now();
        let t = rafaga(&mut decoder, "75", Contexto::Ninguno, t0);
        decoder.on_key(Key::Otra, Contexto::Ninguno, t);
        assert_eq!(decoder.buffer(), "75");

        // Still requires the terminating Enter.
        let t = t + Duration::from_millis(1);
        decoder.on_key(Key::Digito('0'), Contexto::Ninguno, t);
        let fin = decoder.on_key(Key::Enter, Contexto::Ninguno, t + Duration::from_millis(1));
        assert_eq!(fin.completado.as_deref(), Some("750"));
    }

    #[test]
    fn test_enter_with_empty_buffer_passes_through() {
        let mut decoder = ScannerDecoder::default();
        let salida = decoder.on_key(Key::Enter, Contexto::Texto, Instant::now());
        assert_eq!(salida.disposicion, Disposicion::PasaLibre);
        assert_eq!(salida.completado, None);
    }

    #[test]
    fn test_tab_terminator_behind_config_flag() {
        let t0 = Instant::now();

        // Default: Tab is just another ignored key.
        let mut decoder = ScannerDecoder::default();
        let t = rafaga(&mut decoder, "750", Contexto::Ninguno, t0);
        let fin = decoder.on_key(Key::Tab, Contexto::Ninguno, t);
        assert_eq!(fin.completado, None);
        assert_eq!(decoder.buffer(), "750");

        // Opt-in: Tab completes like Enter.
        let mut decoder = ScannerDecoder::new(ScannerConfig {
            tab_termina: true,
            ..ScannerConfig::default()
        });
        let t = rafaga(&mut decoder, "750", Contexto::Ninguno, t0);
        let fin = decoder.on_key(Key::Tab, Contexto::Ninguno, t);
        assert_eq!(fin.completado.as_deref(), Some("750"));
    }

    // -- Dispatch ----------------------------------------------------------

    struct SinkRegistro {
        encontrados: Vec<i64>,
        perdidos: Vec<String>,
    }

    impl ScanSink for SinkRegistro {
        fn producto_encontrado(&mut self, producto: &Producto) {
            self.encontrados.push(producto.id);
        }
        fn codigo_no_encontrado(&mut self, codigo: &str) {
            self.perdidos.push(codigo.to_string());
        }
    }

    #[test]
    fn test_dispatch_match_invokes_found_once() {
        let catalogo = vec![producto(1, "750"), producto(2, "8410")];
        let mut sink = SinkRegistro {
            encontrados: vec![],
            perdidos: vec![],
        };
        despachar(&catalogo, "750", &mut sink);
        assert_eq!(sink.encontrados, vec![1]);
        assert!(sink.perdidos.is_empty());
    }

    #[test]
    fn test_dispatch_miss_invokes_not_found() {
        let catalogo = vec![producto(1, "750")];
        let mut sink = SinkRegistro {
            encontrados: vec![],
            perdidos: vec![],
        };
        despachar(&catalogo, "999999", &mut sink);
        assert!(sink.encontrados.is_empty());
        assert_eq!(sink.perdidos, vec!["999999".to_string()]);
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let catalogo = vec![producto(1, "7501")];
        assert!(buscar_por_codigo(&catalogo, "750").is_none());
        assert!(buscar_por_codigo(&catalogo, "7501").is_some());
    }
}
