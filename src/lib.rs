pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod parser;
pub mod storage;
pub mod store;
pub mod types;

use wasm_bindgen::prelude::*;

use crate::app::{App, AppProps};
use crate::config::ScanConfig;

#[wasm_bindgen(start)]
pub fn run_app() {
    let config = ScanConfig::from_env();
    logging::init(&config.log_level);
    tracing::info!(endpoint = %config.endpoint, max_saved_chats = config.max_saved_chats, "Starting scanner UI");

    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id("root"));
    let Some(root) = root else {
        tracing::error!("No #root element to mount on");
        return;
    };
    yew::Renderer::<App>::with_root_and_props(root, AppProps { config }).render();
}
