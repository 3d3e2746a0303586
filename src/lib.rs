//! Star Catcher - collect the stars, dodge the bombs.
//!
//! ┌──────────────────────────────────────────────────────────────────────────┐
//! │ src/                                                                     │
//! │ ├── lib.rs        wasm entry point                                       │
//! │ ├── browser.rs    web-sys wrappers returning anyhow::Result              │
//! │ ├── engine/       game loop, renderer, physics, input, DOM overlays      │
//! │ ├── sprite/       spritesheet grid, animation clips, the dude            │
//! │ ├── session/      score, stars, bombs, status machine, movement          │
//! │ ├── config.rs     tunables with defaults, optional config.json           │
//! │ └── game.rs       the scene wiring everything to the browser             │
//! └──────────────────────────────────────────────────────────────────────────┘
use wasm_bindgen::prelude::*;

pub mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod session;
pub mod sprite;

use crate::engine::GameLoop;
use crate::game::StarCatcher;

#[cfg(debug_assertions)]
const LOG_LEVEL: log::Level = log::Level::Debug;
#[cfg(not(debug_assertions))]
const LOG_LEVEL: log::Level = log::Level::Info;

/// Main entry for the WebAssembly module
/// - installs panic hook and console logger
/// - loads assets and starts the game loop
#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    // better panic messages in the browser console
    console_error_panic_hook::set_once();
    console_log::init_with_level(LOG_LEVEL)
        .map_err(|err| JsValue::from_str(&format!("Could not init logger : {}", err)))?;

    log::info!("Star Catcher starting");

    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(StarCatcher::new()).await {
            log::error!("Could not start game loop : {:#}", err);
        }
    });

    Ok(())
}
