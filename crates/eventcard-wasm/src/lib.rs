use wasm_bindgen::prelude::*;

use eventcard_core::{CardDocument, CardOptions, RegistrantInput, render_card_document, render_document};

/// Initialize the WASM module (sets up panic hook for better error messages).
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Render a self-contained card document JSON to SVG.
///
/// Input: `{ "meta": { "event": "through-her-lens", "viewportWidth": 390 }, "registrant": { ... } }`
/// Returns: `{ "svg": "...", "width": 540, "height": 540, "warnings": [] }`
#[wasm_bindgen(js_name = "renderDocument")]
pub fn render_document_wasm(doc_json: &str) -> Result<JsValue, JsValue> {
    let result = render_document(doc_json).map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Render a live preview from separate options and registrant JSON.
///
/// `options_json`: `{ "event": "through-her-lens", "theme": "light", "viewportWidth": 1280 }`
/// `registrant_json`: `{ "name": "Ada", "role": "attendee" }`
#[wasm_bindgen(js_name = "renderPreview")]
pub fn render_preview_wasm(options_json: &str, registrant_json: &str) -> Result<JsValue, JsValue> {
    let meta: CardOptions = serde_json::from_str(options_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;
    let registrant: RegistrantInput = serde_json::from_str(registrant_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid registrant: {}", e)))?;

    let doc = CardDocument { meta, registrant };
    let result = render_card_document(&doc, &mut eventcard_core::ApproxMeasure)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    serde_wasm_bindgen::to_value(&result)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Get version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn test_render_document_returns_svg() {
        let doc = r#"{
            "meta": { "event": "through-her-lens", "viewportWidth": 390 },
            "registrant": { "name": "Ada", "role": "attendee" }
        }"#;
        let value = render_document_wasm(doc).unwrap();
        let result: serde_json::Value = serde_wasm_bindgen::from_value(value).unwrap();
        assert_eq!(result["width"], 540.0);
        assert!(result["svg"].as_str().unwrap().starts_with("<svg") || result["svg"].as_str().unwrap().starts_with("<?xml"));
    }

    #[wasm_bindgen_test]
    fn test_render_preview_rejects_bad_registrant() {
        let err = render_preview_wasm(r#"{ "event": "through-her-lens" }"#, "{}").unwrap_err();
        assert!(err.as_string().unwrap().starts_with("Invalid registrant"));
    }
}
