#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn ensure_init() {
    if !nu_wasm::is_initialized() {
        nu_wasm::init(None, None).unwrap();
    }
}

fn get(obj: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn configure_then_clean() {
    ensure_init();

    let stats = nu_wasm::configure(r#"{"neat_url_blocked_params": "q@example.com"}"#).unwrap();
    assert_eq!(get(&stats, "rulesUser").as_f64(), Some(1.0));

    let result = nu_wasm::clean_url("https://example.com/?utm_source=a&q=1&id=2", "main_frame", 3);
    assert_eq!(get(&result, "changed").as_bool(), Some(true));
    assert_eq!(
        get(&result, "redirectUrl").as_string().as_deref(),
        Some("https://example.com/?id=2")
    );

    let result = nu_wasm::clean_url("https://example.com/?id=2", "main_frame", 3);
    assert_eq!(get(&result, "changed").as_bool(), Some(false));
    assert_eq!(get(&result, "reason").as_string().as_deref(), Some("unchanged"));
}

#[wasm_bindgen_test]
fn deferred_retarget_round_trip() {
    ensure_init();

    let origin = "https://addons.mozilla.org/addon/x/?utm_source=a";
    let result = nu_wasm::clean_url(origin, "main_frame", 9);
    assert_eq!(get(&result, "changed").as_bool(), Some(true));
    assert!(get(&result, "redirectUrl").is_undefined());
    let token = get(&result, "deferredToken").as_f64().unwrap();

    let fired = nu_wasm::fire_retarget(token);
    assert_eq!(
        get(&fired, "target").as_string().as_deref(),
        Some("https://addons.mozilla.org/addon/x/")
    );
    assert_eq!(get(&fired, "tabId").as_f64(), Some(9.0));
    assert!(nu_wasm::fire_retarget(token).is_null());
    assert!(nu_wasm::expire_retarget(token));
}

#[wasm_bindgen_test]
fn decompose_host_parts() {
    ensure_init();

    let parts = nu_wasm::decompose_host("www.news.example.co.uk");
    assert_eq!(get(&parts, "rootDomain").as_string().as_deref(), Some("example.co.uk"));
    assert!(nu_wasm::decompose_host("").is_null());
}
