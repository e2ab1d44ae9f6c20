//! End-to-end tests of the command layer against an in-process mock
//! backend: scan to cart, checkout, catalog refresh and the merma draft.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use tienda_api::ApiClient;
use tienda_core::TipoMerma;
use tienda_terminal_lib::commands::{merma, producto, venta};
use tienda_terminal_lib::error::CodigoError;
use tienda_terminal_lib::state::{CarritoState, CatalogoState};

#[derive(Clone)]
struct Backend {
    // Stock of the single product the mock serves.
    stock: Arc<AtomicI64>,
}

fn producto_json(stock: i64) -> serde_json::Value {
    json!({
        "id": 1,
        "codigo": "750",
        "descripcion": "Refresco 600ml",
        "precio": 1800,
        "precioCompra": 1200,
        "proveedor": null,
        "cantidad": stock,
        "activo": true,
    })
}

async fn listar(State(b): State<Backend>) -> Json<serde_json::Value> {
    Json(json!([producto_json(b.stock.load(Ordering::SeqCst))]))
}

async fn crear_venta(
    State(b): State<Backend>,
    Json(body): Json<serde_json::Value>,
) -> axum::response::Response {
    let pedido: i64 = body["productos"][0]["cantidad"].as_i64().unwrap();
    let restante = b.stock.load(Ordering::SeqCst);
    if pedido > restante {
        return (StatusCode::CONFLICT, "stock insuficiente").into_response();
    }
    b.stock.fetch_sub(pedido, Ordering::SeqCst);
    Json(json!({
        "id": 77,
        "fecha": "2026-08-25T12:00:00Z",
        "cuentaId": null,
        "total": pedido * 1800,
        "estado": "COMPLETADA",
    }))
    .into_response()
}

async fn crear_merma(
    State(b): State<Backend>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    let cantidad: i64 = body["lineas"][0]["cantidad"].as_i64().unwrap();
    b.stock.fetch_sub(cantidad, Ordering::SeqCst);
    Json(json!({
        "id": 9,
        "tipo": body["tipo"],
        "motivo": body["motivo"],
        "fecha": "2026-08-25T12:00:00Z",
        "costoTotal": cantidad * 1200,
        "lineas": body["lineas"],
    }))
}

async fn montar(stock: i64) -> (ApiClient, Backend) {
    let backend = Backend {
        stock: Arc::new(AtomicI64::new(stock)),
    };
    let app = Router::new()
        .route("/api/productos", get(listar))
        .route("/api/ventas", post(crear_venta))
        .route("/api/mermas", post(crear_merma))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::builder()
        .base_url(format!("http://{}", addr))
        .build()
        .unwrap();
    (client, backend)
}

#[tokio::test]
async fn cobro_limpia_carrito_y_refresca_stock() {
    let (api, _backend) = montar(10).await;
    let catalogo = CatalogoState::new();
    let carrito = CarritoState::new();
    producto::refrescar_catalogo(&api, &catalogo).await.unwrap();

    venta::escanear_al_carrito(&catalogo, &carrito, "750").unwrap();
    venta::escanear_al_carrito(&catalogo, &carrito, "750").unwrap();

    let cobrada = venta::cobrar(&api, &catalogo, &carrito, None).await.unwrap();
    assert_eq!(cobrada.total.centavos(), 3600);
    assert!(carrito.con_carrito(|c| c.esta_vacio()));

    // The refetched snapshot reflects the decrement.
    assert_eq!(catalogo.buscar_codigo("750").unwrap().cantidad, 8);
}

#[tokio::test]
async fn conflicto_del_backend_conserva_el_carrito() {
    let (api, backend) = montar(3).await;
    let catalogo = CatalogoState::new();
    let carrito = CarritoState::new();
    producto::refrescar_catalogo(&api, &catalogo).await.unwrap();

    venta::escanear_al_carrito(&catalogo, &carrito, "750").unwrap();
    venta::escanear_al_carrito(&catalogo, &carrito, "750").unwrap();

    // A concurrent sale drains the stock after our snapshot.
    backend.stock.store(1, Ordering::SeqCst);

    let err = venta::cobrar(&api, &catalogo, &carrito, None).await.unwrap_err();
    assert_eq!(err.codigo, CodigoError::Conflicto);
    assert_eq!(carrito.con_carrito(|c| c.unidades()), 2);
}

#[tokio::test]
async fn merma_registrada_refresca_catalogo() {
    let (api, _backend) = montar(10).await;
    let catalogo = CatalogoState::new();
    producto::refrescar_catalogo(&api, &catalogo).await.unwrap();

    let mut borrador = merma::BorradorMerma::new(TipoMerma::Caducado);
    borrador.motivo = "Caja vencida".to_string();
    borrador.agregar_linea(1, 4);

    let registrada = merma::registrar_merma(&api, &catalogo, &borrador).await.unwrap();
    assert_eq!(registrada.costo_total.centavos(), 4800);
    assert_eq!(catalogo.buscar_codigo("750").unwrap().cantidad, 6);
}

#[tokio::test]
async fn merma_sin_motivo_no_llega_al_backend() {
    let (api, backend) = montar(10).await;
    let catalogo = CatalogoState::new();

    let mut borrador = merma::BorradorMerma::new(TipoMerma::Robo);
    borrador.agregar_linea(1, 1);

    let err = merma::registrar_merma(&api, &catalogo, &borrador).await.unwrap_err();
    assert_eq!(err.codigo, CodigoError::Validacion);
    assert_eq!(backend.stock.load(Ordering::SeqCst), 10);
}
