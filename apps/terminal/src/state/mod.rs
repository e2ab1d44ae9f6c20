//! # State Module
//!
//! Shared state for the terminal session.
//!
//! ## Why Multiple State Types?
//! Instead of a single `AppState` struct containing everything, we use
//! separate state types. Each screen's commands declare exactly what they
//! touch, and independent states do not contend:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  CatalogoState   │  │  CarritoState    │  │  PreferenciasState   │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  productos +     │  │  Arc<Mutex<      │  │  tema claro/oscuro   │  │
//! │  │  cuentas caches  │  │    Carrito>>     │  │  (persisted JSON)    │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                         │
//! │  • CatalogoState: caches replaced wholesale on refetch, never mutated   │
//! │    in place, so readers only ever see a complete snapshot               │
//! │  • CarritoState: protected by Arc<Mutex<T>> for exclusive access        │
//! │  • PreferenciasState: mutated only by the theme toggle                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod carrito;
mod catalogo;
mod preferencias;

pub use carrito::CarritoState;
pub use catalogo::CatalogoState;
pub use preferencias::{Preferencias, PreferenciasState, Tema};
