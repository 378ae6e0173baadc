use wasm_bindgen::prelude::*;

mod api;
mod auth;
mod config;
mod play;
mod push;
mod ranking;
mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{TOKEN_KEY, TokenStore};
pub use config::{Args, Config};
pub use play::{PlayController, PlayHandle};
pub use push::{PushChannel, reconnect_delay_ms};
pub use ranking::{LeaderboardController, LeaderboardHandle};
pub use utils::NoticeKind;

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::window;

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let config = match Config::from_hash(&location_hash) {
        Ok(config) => config,
        Err(err) => {
            gloo::console::error!("Ignoring invalid hash arguments:", err.to_string());
            Config::default()
        }
    };
    if let Some(log_level) = config.log_level {
        if console_log::init_with_level(log_level).is_err() {
            gloo::console::warn!("Logger was already initialized");
        }
    }
    log::debug!("config: {:?}", config);

    config::install(config);
    log::debug!("App started");
}
