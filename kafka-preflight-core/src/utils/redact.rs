//! Log sanitization utilities
//!
//! Keeps credentials and unbounded payloads (stack traces, raw broker errors)
//! out of emitted diagnostic records.

use serde_json::Value;

/// Mask shown for secrets too short to reveal any characters.
const SHORT_SECRET_MASK: &str = "****";
/// Replacement for the hidden middle of a secret.
const MIDDLE_MASK: &str = "***";
/// Leading lines kept from a stack trace.
pub const STACK_TRACE_LINES: usize = 6;
/// Maximum number of bytes kept from a free-form string field.
const TRUNCATE_LIMIT: usize = 1024;

/// Context keys whose values are always masked.
const CREDENTIAL_KEYS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "username",
    "sasl.password",
    "sasl.username",
    "sasl_password",
    "sasl_username",
    "credentials",
];

/// Context keys that carry stack traces.
const STACK_KEYS: &[&str] = &["stack", "stack_trace", "stacktrace", "backtrace"];

/// Mask a secret, keeping the first 2 and last 2 characters.
///
/// Values of 4 characters or fewer become a fixed mask. Masking an already
/// masked value returns it unchanged.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return SHORT_SECRET_MASK.to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{MIDDLE_MASK}{tail}")
}

/// MSRV-compatible replacement for `str::floor_char_boundary` (stable since 1.91.0).
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a string for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Keep the first `max_lines` lines of a multi-line string.
pub fn truncate_lines(s: &str, max_lines: usize) -> String {
    let total = s.lines().count();
    if total <= max_lines {
        return s.to_string();
    }
    let marker = format!("... [{} more lines]", total - max_lines);
    let mut kept: Vec<&str> = s.lines().take(max_lines).collect();
    kept.push(marker.as_str());
    kept.join("\n")
}

/// Replace every occurrence of every known secret inside `text`.
pub fn scrub_secrets(text: &str, secrets: &[String]) -> String {
    let mut out = text.to_string();
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        if out.contains(secret.as_str()) {
            out = out.replace(secret.as_str(), &mask_secret(secret));
        }
    }
    out
}

fn is_credential_key(key: &str) -> bool {
    let key = key.to_lowercase();
    CREDENTIAL_KEYS.contains(&key.as_str())
}

fn is_stack_key(key: &str) -> bool {
    let key = key.to_lowercase();
    STACK_KEYS.contains(&key.as_str())
}

/// Mask every credential-bearing leaf below `value`.
fn mask_all(value: &mut Value) {
    match value {
        Value::String(s) => *s = mask_secret(s),
        Value::Array(items) => items.iter_mut().for_each(mask_all),
        Value::Object(map) => map.values_mut().for_each(mask_all),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Redact a context payload in place, at any nesting depth.
///
/// - values under credential keys are masked
/// - known secrets are scrubbed from every string
/// - stack traces are cut to [`STACK_TRACE_LINES`] lines
/// - other strings are length-capped
pub fn redact_value(value: &mut Value, secrets: &[String]) {
    match value {
        Value::String(s) => *s = truncate_for_log(&scrub_secrets(s, secrets)),
        Value::Array(items) => {
            for item in items {
                redact_value(item, secrets);
            }
        }
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_credential_key(key) {
                    mask_all(child);
                } else if is_stack_key(key) {
                    if let Value::String(s) = child {
                        *s = truncate_lines(&scrub_secrets(s, secrets), STACK_TRACE_LINES);
                    } else {
                        redact_value(child, secrets);
                    }
                } else {
                    redact_value(child, secrets);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mask_keeps_two_and_two() {
        assert_eq!(mask_secret("hunter2pass"), "hu***ss");
    }

    #[test]
    fn mask_is_idempotent() {
        for s in ["hunter2pass", "abcde", "ab", "", "p@ssw0rd-with-length"] {
            let once = mask_secret(s);
            assert_eq!(mask_secret(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn mask_never_contains_raw_middle() {
        let masked = mask_secret("hunter2pass");
        assert!(!masked.contains("nter2pa"));
    }

    #[test]
    fn short_secrets_use_fixed_mask() {
        assert_eq!(mask_secret(""), "****");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret("xy"), "****");
    }

    #[test]
    fn mask_handles_multibyte() {
        assert_eq!(mask_secret("密码很长很长"), "密码***长长");
    }

    #[test]
    fn truncate_lines_keeps_head() {
        let trace = (1..=10).map(|i| format!("at frame {i}")).collect::<Vec<_>>().join("\n");
        let cut = truncate_lines(&trace, 3);
        assert!(cut.starts_with("at frame 1\nat frame 2\nat frame 3"));
        assert!(cut.contains("7 more lines"));
        assert!(!cut.contains("at frame 4"));
    }

    #[test]
    fn truncate_lines_short_unchanged() {
        assert_eq!(truncate_lines("one\ntwo", 6), "one\ntwo");
    }

    #[test]
    fn truncate_for_log_multibyte_safe() {
        let s = "你".repeat(2000);
        assert!(truncate_for_log(&s).contains("... [truncated, total"));
    }

    #[test]
    fn redact_masks_credential_keys_at_any_depth() {
        let secrets = vec!["hunter2pass".to_string()];
        let mut ctx = json!({
            "password": "hunter2pass",
            "error": {
                "message": "auth failed for password hunter2pass",
                "details": [{ "sasl.password": "hunter2pass" }]
            }
        });
        redact_value(&mut ctx, &secrets);
        let rendered = ctx.to_string();
        assert!(!rendered.contains("hunter2pass"));
        assert_eq!(ctx["password"], "hu***ss");
        assert_eq!(ctx["error"]["details"][0]["sasl.password"], "hu***ss");
        assert_eq!(ctx["error"]["message"], "auth failed for password hu***ss");
    }

    #[test]
    fn redact_truncates_stack_traces() {
        let stack = (0..20).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let mut ctx = json!({ "error": { "stack": stack } });
        redact_value(&mut ctx, &[]);
        let kept = ctx["error"]["stack"].as_str().unwrap_or_default();
        assert_eq!(kept.lines().count(), STACK_TRACE_LINES + 1);
    }

    #[test]
    fn redact_leaves_plain_fields_alone() {
        let mut ctx = json!({ "broker": "kafka:9092", "attempt": 2, "ok": false });
        let before = ctx.clone();
        redact_value(&mut ctx, &["unrelated".to_string()]);
        assert_eq!(ctx, before);
    }
}
