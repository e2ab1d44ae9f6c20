//! # Terminal Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Tienda Terminal                                   │
//! │                                                                         │
//! │  stdin (scanner or keyboard)                                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  repl.rs ────► ScannerDecoder + command grammar ──► Orden               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  commands/ ──► validation (tienda-core) + REST calls (tienda-api)       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  backend REST API (authoritative stock, balances, costs)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() {
    if let Err(e) = tienda_terminal_lib::run().await {
        eprintln!("Error fatal: {}", e);
        std::process::exit(1);
    }
}
