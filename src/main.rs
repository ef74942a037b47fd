//! Admin Console Frontend Entry Point

mod app;
mod components;
mod context;
mod pages;
mod store;

use std::sync::Arc;

use app::App;
use leptos::prelude::*;
use tracing::Level;

fn console_sink() -> rolling_logger::LineSink {
    Arc::new(|level: Level, line: &str| {
        let line: wasm_bindgen::JsValue = line.into();
        match level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    })
}

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_memory_logger(500, Some(console_sink())) {
        web_sys::console::error_1(&format!("[APP] Logger init failed: {}", e).into());
    }
    mount_to_body(App);
}
