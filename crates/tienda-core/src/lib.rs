//! # tienda-core: Pure Business Logic for Tienda POS
//!
//! This crate is the **heart** of Tienda POS. It contains all client-side
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tienda POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/terminal (cashier UI)                     │   │
//! │  │   Sales screen ──► Inventory ──► Mermas ──► Cuentas ──► Reports │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  scanner  │  │   cart    │  │ validation│  │   │
//! │  │   │ Producto  │  │  Decoder  │  │  Carrito  │  │   rules   │  │   │
//! │  │   │  Venta..  │  │  (burst)  │  │ (draft)   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tienda-api (REST client)                        │   │
//! │  │        GET/POST /api/productos /ventas /cuentas /mermas         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Producto, Venta, Cuenta, Merma, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`scanner`] - The barcode-scanner keystroke decoder state machine
//! - [`cart`] - The ephemeral sale draft
//! - [`barcode`] - Collision-retried client-side code generation
//! - [`validation`] - Shallow pre-submission checks
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic; the scanner
//!    decoder takes its clock as an argument instead of reading one
//! 2. **No I/O**: Network and file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are centavos (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Instant;
//! use tienda_core::scanner::{Contexto, Key, ScannerDecoder};
//!
//! let mut decoder = ScannerDecoder::default();
//! let mut ahora = Instant::now();
//!
//! // A scanner burst: digits, then Enter.
//! for c in "750".chars() {
//!     decoder.on_key(Key::from_char(c), Contexto::Ninguno, ahora);
//!     ahora += std::time::Duration::from_millis(1);
//! }
//! let fin = decoder.on_key(Key::Enter, Contexto::Ninguno, ahora);
//! assert_eq!(fin.completado.as_deref(), Some("750"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod cart;
pub mod error;
pub mod money;
pub mod scanner;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use tienda_core::Money` instead of
// `use tienda_core::money::Money`

pub use cart::{Carrito, LineaCarrito};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use scanner::{Contexto, ScannerConfig, ScannerDecoder};
pub use types::*;
