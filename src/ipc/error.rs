//! Response envelopes written back on stdout, one JSON object per line.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

pub fn ok(id: &str, result: Value) -> Value {
    json!({ "id": id, "ok": true, "result": result })
}

pub fn err(id: &str, code: &str, message: impl Into<String>, details: Option<Value>) -> Value {
    let error = ErrorBody {
        code: code.to_string(),
        message: message.into(),
        details,
    };
    json!({ "id": id, "ok": false, "error": error })
}

/// Reply to a line that did not parse as a request; there is no id to echo.
pub fn bad_json(message: impl Into<String>) -> Value {
    let error = ErrorBody {
        code: "bad_json".to_string(),
        message: message.into(),
        details: None,
    };
    json!({ "ok": false, "error": error })
}
