use std::fmt::Display;

use domain::{excerpt, HealthResult};

const BODY_EXCERPT_CHARS: usize = 500;

/// Healthy only for a 200 whose JSON body has `"status": "ok"`.
pub fn classify(status_code: u16, body: &str) -> HealthResult {
    if status_code != 200 {
        return HealthResult::unhealthy(
            None,
            format!(
                "health endpoint returned HTTP {status_code}: {}",
                excerpt(body.trim(), BODY_EXCERPT_CHARS)
            ),
        );
    }

    let parsed: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            return HealthResult::unhealthy(None, format!("response is not valid JSON: {err}"));
        }
    };

    match parsed.get("status").and_then(|value| value.as_str()) {
        Some("ok") => HealthResult::healthy("ok"),
        Some(other) => HealthResult::unhealthy(
            Some(other.to_string()),
            format!("status is {other:?}, expected \"ok\""),
        ),
        None => HealthResult::unhealthy(None, "response has no string status field"),
    }
}

/// Result for a request that never produced a response.
pub fn unreachable(err: impl Display) -> HealthResult {
    HealthResult::unhealthy(None, format!("health request failed: {err}"))
}
