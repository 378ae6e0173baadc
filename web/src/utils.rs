use js_sys::Function;
use wasm_bindgen::JsValue;

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes(core::array::from_fn(|_| (256. * random()) as u8))
}

/// Calls a presentation-layer callback, logging if it throws.
pub(crate) fn call_js(callback: Option<Function>, args: &[JsValue]) {
    let Some(callback) = callback else {
        return;
    };
    let result = match args {
        [] => callback.call0(&JsValue::NULL),
        [a] => callback.call1(&JsValue::NULL, a),
        [a, b, ..] => callback.call2(&JsValue::NULL, a, b),
    };
    if let Err(err) = result {
        log::warn!("Callback threw: {:?}", err);
    }
}

/// Severity of a notice shown to the player.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

impl NoticeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

pub(crate) fn notify(callback: Option<Function>, kind: NoticeKind, message: &str) {
    call_js(
        callback,
        &[JsValue::from_str(message), JsValue::from_str(kind.as_str())],
    );
}
