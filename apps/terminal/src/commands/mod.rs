//! # Command Modules
//!
//! One module per screen. Commands are the only layer that talks to both
//! the backend client and the shared state; they hold no state of their
//! own and every one of them follows the same shape:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Command Flow                                       │
//! │                                                                         │
//! │  input ──► validate (tienda-core) ──► backend call (tienda-api)         │
//! │                                             │                           │
//! │                              refetch affected cache wholesale           │
//! │                                             │                           │
//! │                                     result or AppError                  │
//! │                                                                         │
//! │  Reads hit the local caches; writes go to the backend and then          │
//! │  refetch, so the caches never drift from what the server accepted.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cuenta;
pub mod merma;
pub mod producto;
pub mod reporte;
pub mod venta;
