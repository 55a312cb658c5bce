// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod player;
pub mod track;

use engine::GameLoop;
use game::ZigZag;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - sets up panic messages
/// - loads the config and builds the track
/// - starts the animation frame loop, which stops itself on game over
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(ZigZag::new()).await {
            error!("Could not start game loop : {:#?}", err);
        }
    });

    Ok(())
}
