//! WebAssembly bindings for Neat URL

use std::sync::{Arc, OnceLock};

use log::{LevelFilter, Log, Metadata, Record};
use nu_core::{
    decompose, ChangeKind, CleanOutcome, CleanRequest, Cleaner, RequestType, RetargetToken,
    SuffixTable, RETARGET_DELAY,
};
use nu_rules::{bundled_default_params, bundled_suffix_table, build_snapshot, load_default_params, Settings};
use wasm_bindgen::prelude::*;

struct EngineState {
    defaults: Vec<String>,
    suffixes: Arc<SuffixTable>,
    cleaner: Cleaner,
}

static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

// =============================================================================
// Console logging
// =============================================================================

struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[Neat URL] {}", record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

fn apply_logging(enabled: bool) {
    // set_logger fails after the first call; the level switch below is what matters
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if enabled { LevelFilter::Info } else { LevelFilter::Off });
}

// =============================================================================
// Setup
// =============================================================================

/// Load default rules and the suffix table. Both fall back to bundled data.
#[wasm_bindgen]
pub fn init(defaults_json: Option<String>, suffix_text: Option<String>) -> Result<(), JsValue> {
    if ENGINE_STATE.get().is_some() {
        return Err(JsValue::from_str("Already initialized. Reload the extension to reinitialize."));
    }

    let defaults = match defaults_json.as_deref() {
        Some(json) => load_default_params(json),
        None => bundled_default_params(),
    }
    .map_err(|e| JsValue::from_str(&format!("Failed to load default parameters: {}", e)))?;

    let suffixes = Arc::new(match suffix_text.as_deref() {
        Some(text) => SuffixTable::from_text(text),
        None => bundled_suffix_table(),
    });

    apply_logging(false);
    let (snapshot, _) = build_snapshot(&defaults, &Settings::default(), suffixes.clone());

    ENGINE_STATE
        .set(EngineState {
            defaults,
            suffixes,
            cleaner: Cleaner::new(snapshot),
        })
        .map_err(|_| JsValue::from_str("Failed to set engine state"))?;

    Ok(())
}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    ENGINE_STATE.get().is_some()
}

/// Rebuild the rule snapshot from persisted settings.
///
/// Returns `{rulesTotal, rulesOverridden, rulesUser}`.
#[wasm_bindgen]
pub fn configure(settings_json: &str) -> Result<JsValue, JsValue> {
    let state = ENGINE_STATE
        .get()
        .ok_or_else(|| JsValue::from_str("Not initialized"))?;
    let settings = Settings::from_json(settings_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse settings: {}", e)))?;

    apply_logging(settings.logging());
    let (snapshot, stats) = build_snapshot(&state.defaults, &settings, state.suffixes.clone());
    state.cleaner.reload(snapshot);

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"rulesTotal".into(), &JsValue::from(stats.total as u32));
    let _ = js_sys::Reflect::set(&js_result, &"rulesOverridden".into(), &JsValue::from(stats.overridden as u32));
    let _ = js_sys::Reflect::set(&js_result, &"rulesUser".into(), &JsValue::from(stats.user as u32));
    Ok(js_result.into())
}

#[wasm_bindgen]
pub fn set_enabled(enabled: bool) {
    if let Some(state) = ENGINE_STATE.get() {
        state.cleaner.set_enabled(enabled);
    }
}

/// Flip the on/off switch. Returns the new state.
#[wasm_bindgen]
pub fn toggle_enabled() -> bool {
    ENGINE_STATE
        .get()
        .map(|state| state.cleaner.toggle_enabled())
        .unwrap_or(false)
}

#[wasm_bindgen]
pub fn is_enabled() -> bool {
    ENGINE_STATE
        .get()
        .is_some_and(|state| state.cleaner.is_enabled())
}

// =============================================================================
// Requests
// =============================================================================

/// Whether requests of `request_type` should be handed to [`clean_url`].
#[wasm_bindgen]
pub fn should_intercept(request_type: &str) -> bool {
    ENGINE_STATE.get().is_some_and(|state| {
        nu_core::types::should_intercept(state.cleaner.snapshot().request_types(), request_type)
    })
}

/// Clean one request.
///
/// Returns `{changed, redirectUrl?, deferredToken?, reason?}`. A deferred
/// rewrite carries no `redirectUrl`: the host calls [`fire_retarget`] after
/// [`retarget_delay_ms`] instead of redirecting.
#[wasm_bindgen]
pub fn clean_url(url: &str, request_type: &str, tab_id: i32) -> JsValue {
    let js_result = js_sys::Object::new();

    let Some(state) = ENGINE_STATE.get() else {
        let _ = js_sys::Reflect::set(&js_result, &"changed".into(), &JsValue::from(false));
        let _ = js_sys::Reflect::set(&js_result, &"reason".into(), &JsValue::from_str("uninitialized"));
        return js_result.into();
    };

    let request = CleanRequest {
        url,
        request_type: RequestType::from_type_name(request_type),
        tab_id,
    };

    match state.cleaner.clean(&request) {
        CleanOutcome::Skipped(reason) => {
            let _ = js_sys::Reflect::set(&js_result, &"changed".into(), &JsValue::from(false));
            let _ = js_sys::Reflect::set(&js_result, &"reason".into(), &JsValue::from_str(reason.as_str()));
        }
        CleanOutcome::Rewritten { url, change: ChangeKind::Normal } => {
            let _ = js_sys::Reflect::set(&js_result, &"changed".into(), &JsValue::from(true));
            let _ = js_sys::Reflect::set(&js_result, &"redirectUrl".into(), &JsValue::from_str(&url));
        }
        CleanOutcome::Rewritten { change: ChangeKind::Deferred(token), .. } => {
            let _ = js_sys::Reflect::set(&js_result, &"changed".into(), &JsValue::from(true));
            let _ = js_sys::Reflect::set(&js_result, &"deferredToken".into(), &JsValue::from(token_to_js(token)));
        }
    }

    js_result.into()
}

/// Take a deferred retarget. Returns `{target, origin, tabId}` or `null` if
/// the token is stale or already fired.
#[wasm_bindgen]
pub fn fire_retarget(token: f64) -> JsValue {
    let Some(pending) = ENGINE_STATE
        .get()
        .and_then(|state| state.cleaner.retarget().fire(token_from_js(token)))
    else {
        return JsValue::NULL;
    };

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"target".into(), &JsValue::from_str(&pending.target));
    let _ = js_sys::Reflect::set(&js_result, &"origin".into(), &JsValue::from_str(&pending.origin));
    let _ = js_sys::Reflect::set(&js_result, &"tabId".into(), &JsValue::from(pending.tab_id));
    js_result.into()
}

/// Clear a deferred retarget. Returns true if `token` was still current.
#[wasm_bindgen]
pub fn expire_retarget(token: f64) -> bool {
    ENGINE_STATE
        .get()
        .is_some_and(|state| state.cleaner.retarget().expire(token_from_js(token)))
}

#[wasm_bindgen]
pub fn retarget_delay_ms() -> u32 {
    RETARGET_DELAY.as_millis() as u32
}

/// `{domain, rootDomain, domainMinusSuffix}` for `host`, or `null`.
#[wasm_bindgen]
pub fn decompose_host(host: &str) -> JsValue {
    let Some(state) = ENGINE_STATE.get() else {
        return JsValue::NULL;
    };
    let Some(parts) = decompose(host, &state.suffixes) else {
        return JsValue::NULL;
    };

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"domain".into(), &JsValue::from_str(&parts.domain));
    let _ = js_sys::Reflect::set(&js_result, &"rootDomain".into(), &JsValue::from_str(&parts.root_domain));
    let _ = js_sys::Reflect::set(&js_result, &"domainMinusSuffix".into(), &JsValue::from_str(&parts.minus_suffix));
    js_result.into()
}

// JS numbers hold integers exactly up to 2^53; tokens never get near that.
fn token_to_js(token: RetargetToken) -> f64 {
    token.0 as f64
}

fn token_from_js(value: f64) -> RetargetToken {
    if value.is_finite() && value >= 0.0 {
        RetargetToken(value as u64)
    } else {
        RetargetToken(0)
    }
}
