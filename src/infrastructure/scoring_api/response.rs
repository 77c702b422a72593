// ============================================================
// SCORING API RESPONSES
// ============================================================
// Turn raw proxy response bodies into JSON values or user-facing messages

use serde_json::{json, Value};

/// Message for a non-2xx response, built from its raw body text.
///
/// Validation failures (422) carry a list of `{loc, msg}` items which are
/// flattened to `Lỗi dữ liệu: body.age - must be >= 18; ...`.
pub fn error_message(status: u16, body: &str) -> String {
    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => {
            let text = body.trim();
            return if text.is_empty() {
                format!("HTTP error: {}", status)
            } else {
                text.to_string()
            };
        }
    };

    match parsed.get("detail") {
        Some(Value::Array(items)) if status == 422 => {
            let details = items
                .iter()
                .map(detail_item)
                .collect::<Vec<_>>()
                .join("; ");
            format!("Lỗi dữ liệu: {}", details)
        }
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Null) | None => format!("HTTP error: {}", status),
        Some(other) => other.to_string(),
    }
}

fn detail_item(item: &Value) -> String {
    let loc = item
        .get("loc")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|part| match part {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".")
        })
        .unwrap_or_default();

    let msg = match item.get("msg") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    format!("{} - {}", loc, msg)
}

/// Body of a 2xx response. Empty bodies become `{}` and non-JSON text is
/// wrapped as `{"raw_response": text}`.
pub fn parse_success_body(body: &str) -> Value {
    if body.is_empty() {
        return json!({});
    }
    serde_json::from_str(body).unwrap_or_else(|_| json!({ "raw_response": body }))
}
