//! Permissive JSON decoding for device responses
//!
//! The device mislabels JSON bodies (`text/json`, `text/javascript`) and
//! sometimes wraps them in stray output, so bodies are always decoded by
//! content, never by declared content-type. Fallback order: strict decode,
//! then the first-`{`-to-last-`}` substring, then give up.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a device response body into a JSON value.
pub fn decode_lenient(body: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

/// Decode a device response body into a typed value.
pub fn decode_lenient_as<T: DeserializeOwned>(body: &str) -> Option<T> {
    let value = decode_lenient(body)?;
    serde_json::from_value(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_decode_first() {
        let value = decode_lenient(r#"{"status":100}"#).unwrap();
        assert_eq!(value["status"], 100);
    }

    #[test]
    fn arrays_decode_strictly() {
        let value = decode_lenient(r#"[{"name":"default"}]"#).unwrap();
        assert_eq!(value[0]["name"], "default");
    }

    #[test]
    fn brace_extraction_strips_garbage() {
        let value = decode_lenient("boot log noise {\"name\":\"canvas\"}\r\n").unwrap();
        assert_eq!(value["name"], "canvas");
    }

    #[test]
    fn unsalvageable_body_is_none() {
        assert!(decode_lenient("not json at all").is_none());
        assert!(decode_lenient("} backwards {").is_none());
        assert!(decode_lenient("").is_none());
    }

    #[test]
    fn typed_decode_falls_through_the_same_path() {
        #[derive(serde::Deserialize)]
        struct Body {
            path: String,
        }
        let body: Body = decode_lenient_as("x{\"path\":\"/gallerys/default/\"}y").unwrap();
        assert_eq!(body.path, "/gallerys/default/");
    }
}
