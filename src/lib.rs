// ============================================================================
// INVENTORY PWA - FRONTEND DE INVENTARIO/REQUISICIONES (RUST PURO + WASM)
// ============================================================================
// Arquitectura:
// - Views: funciones que renderizan DOM (sin lógica de negocio)
// - Services: gateway HTTP, sesión, caché local, cargas de dominio
// - Models: normalización de los payloads dinámicos del backend
// - Router: hash routing con guards de auth y RBAC
// ============================================================================

mod app;
mod config;
mod dom;
mod models;
mod rbac;
mod router;
mod services;
mod utils;
mod views;

use wasm_bindgen::prelude::*;
use wasm_logger::Config;

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Panic hook para stack traces legibles en la consola del navegador
    console_error_panic_hook::set_once();
    wasm_logger::init(Config::default());
    log::info!("🚀 Inventory PWA - Rust puro + WASM");

    app::bootstrap()?;
    Ok(())
}
