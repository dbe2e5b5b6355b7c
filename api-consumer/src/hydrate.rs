//! Path template hydration and query-string serialization.
//!
//! Path templates carry `{identifier}` placeholders which are filled from an
//! endpoint's url params. Params can also be flattened into a literal query
//! string for APIs that reject structured (array-style) encoding.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Matches `{identifier}` placeholders in a path template (ASCII word
/// characters only).
static URL_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{((?-u:\w)+)\}").expect("url param pattern is valid"));

/// Everything except the RFC 3986 unreserved characters is encoded, so a
/// space becomes `%20` rather than `+`.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Substitutes `{name}` placeholders in `template` with values from `params`.
///
/// A placeholder is replaced only when its name is present with a non-empty
/// value; otherwise it is left in the output verbatim. Substituted values
/// are inserted literally and never re-scanned.
///
/// ## Examples
///
/// ```rust
/// use api_consumer::hydrate::hydrate_url_params;
///
/// let params = vec![("member_id".to_string(), "6".to_string())];
/// assert_eq!(
///     hydrate_url_params("/member_update/{member_id}/{missing}", &params),
///     "/member_update/6/{missing}"
/// );
/// ```
pub fn hydrate_url_params(template: &str, params: &[(String, String)]) -> String {
    URL_PARAM
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            match params.iter().find(|(key, _)| key == name) {
                Some((_, value)) if !value.is_empty() => value.clone(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Extracts placeholder names from a path template, in order of appearance.
pub fn path_params(template: &str) -> Vec<&str> {
    URL_PARAM
        .captures_iter(template)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Renders a single value as text.
///
/// Strings are used as-is, numbers via their display form, booleans as `1`
/// or `0`, `null` as an empty string, and arrays/objects as compact JSON.
pub fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => u8::from(*b).to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Flattens params into the `(key, value)` pairs of a query string.
///
/// `null` entries are dropped. Arrays and objects expand into bracketed
/// keys (`tags[0]`, `filter[name]`), recursively.
pub fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        push_pairs(key.clone(), value, &mut pairs);
    }
    pairs
}

fn push_pairs(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_pairs(format!("{key}[{index}]"), item, pairs);
            }
        }
        Value::Object(map) => {
            for (name, item) in map {
                push_pairs(format!("{key}[{name}]"), item, pairs);
            }
        }
        scalar => pairs.push((key, param_to_string(scalar))),
    }
}

/// Percent-encodes params into `key=value&...` pairs, keeping insertion order.
///
/// Pairs come from [`query_pairs`]. The result carries no leading `?`.
pub fn encode_query(params: &Map<String, Value>) -> String {
    query_pairs(params)
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_ENCODE_SET),
                utf8_percent_encode(value, QUERY_ENCODE_SET)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_hydrate_single_param() {
        let path = hydrate_url_params("/users/{id}", &pairs(&[("id", "42")]));
        assert_eq!(path, "/users/42");
    }

    #[test]
    fn test_hydrate_leaves_unknown_tokens() {
        let path = hydrate_url_params(
            "/users/{user_id}/posts/{post_id}",
            &pairs(&[("user_id", "7")]),
        );
        assert_eq!(path, "/users/7/posts/{post_id}");
    }

    #[test]
    fn test_hydrate_leaves_empty_values() {
        let path = hydrate_url_params("/users/{id}", &pairs(&[("id", "")]));
        assert_eq!(path, "/users/{id}");
    }

    #[test]
    fn test_hydrate_replaces_repeated_tokens() {
        let path = hydrate_url_params("/{v}/a/{v}", &pairs(&[("v", "x")]));
        assert_eq!(path, "/x/a/x");
    }

    #[test]
    fn test_hydrate_does_not_rescan_substituted_values() {
        let path = hydrate_url_params(
            "/{a}/{b}",
            &pairs(&[("a", "{b}"), ("b", "2")]),
        );
        assert_eq!(path, "/{b}/2");
    }

    #[test]
    fn test_hydrate_placeholders_are_ascii_only() {
        let path = hydrate_url_params("/city/{città}/{id}", &pairs(&[("città", "x"), ("id", "1")]));
        assert_eq!(path, "/city/{città}/1");
        assert_eq!(path_params("/{città}/{ok_1}"), vec!["ok_1"]);
    }

    #[test]
    fn test_hydrate_ignores_non_word_tokens() {
        let path = hydrate_url_params("/files/{not-a-token}", &pairs(&[("not-a-token", "x")]));
        assert_eq!(path, "/files/{not-a-token}");
    }

    #[test]
    fn test_path_params() {
        assert_eq!(
            path_params("/users/{user_id}/posts/{post_id}"),
            vec!["user_id", "post_id"]
        );
        assert!(path_params("/plain").is_empty());
    }

    #[test]
    fn test_encode_query_uses_percent_twenty() {
        let mut params = Map::new();
        params.insert("q".to_string(), json!("a b"));
        params.insert("page".to_string(), json!("2"));
        assert_eq!(encode_query(&params), "q=a%20b&page=2");
    }

    #[test]
    fn test_encode_query_keeps_insertion_order() {
        let mut params = Map::new();
        params.insert("zeta".to_string(), json!(1));
        params.insert("alpha".to_string(), json!(true));
        params.insert("omega".to_string(), json!(false));
        assert_eq!(encode_query(&params), "zeta=1&alpha=1&omega=0");
    }

    #[test]
    fn test_encode_query_skips_null_and_renders_booleans() {
        let mut params = Map::new();
        params.insert("a".to_string(), json!("1"));
        params.insert("b".to_string(), Value::Null);
        params.insert("c".to_string(), json!(true));
        assert_eq!(encode_query(&params), "a=1&c=1");
    }

    #[test]
    fn test_encode_query_expands_nested_values() {
        let mut params = Map::new();
        params.insert("tags".to_string(), json!(["x", null, "y"]));
        params.insert("filter".to_string(), json!({"name": "n", "active": false}));
        assert_eq!(
            encode_query(&params),
            "tags%5B0%5D=x&tags%5B2%5D=y&filter%5Bname%5D=n&filter%5Bactive%5D=0"
        );
    }

    #[test]
    fn test_query_pairs_drop_nulls() {
        let mut params = Map::new();
        params.insert("n".to_string(), json!(1));
        params.insert("empty".to_string(), Value::Null);
        assert_eq!(query_pairs(&params), vec![("n".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_encode_query_escapes_reserved_characters() {
        let mut params = Map::new();
        params.insert("filter[name]".to_string(), json!("a&b=c/d~e"));
        assert_eq!(
            encode_query(&params),
            "filter%5Bname%5D=a%26b%3Dc%2Fd~e"
        );
    }

    #[test]
    fn test_param_to_string_structured_values() {
        assert_eq!(param_to_string(&json!([1, 2])), "[1,2]");
        assert_eq!(param_to_string(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(param_to_string(&json!(2.5)), "2.5");
        assert_eq!(param_to_string(&json!(true)), "1");
    }
}
