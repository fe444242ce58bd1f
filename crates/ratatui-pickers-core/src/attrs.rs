//! Parsers for string-encoded host attributes.
//!
//! Hosts configure components with plain strings: comma lists, `key: value; key: value` maps or
//! JSON objects, presence flags and ISO dates. Each `from_attrs` constructor in this crate goes
//! through these helpers so malformed input is handled the same way everywhere.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::date;
use crate::error::ParseError;

/// Attribute bag handed over by the host, keyed by attribute name.
pub type Attrs = BTreeMap<String, String>;

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a JSON object or `key: value; key: value` pairs into a string map.
pub fn parse_map(input: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(BTreeMap::new());
    }
    if input.starts_with('{') {
        return parse_json_map(input);
    }

    let mut out = BTreeMap::new();
    for pair in input.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((k, v)) = pair.split_once(':') else {
            return Err(ParseError::InvalidMap(format!("missing ':' in {pair:?}")));
        };
        let k = k.trim();
        if k.is_empty() {
            return Err(ParseError::InvalidMap(format!("empty key in {pair:?}")));
        }
        out.insert(k.to_string(), v.trim().to_string());
    }
    Ok(out)
}

fn parse_json_map(input: &str) -> Result<BTreeMap<String, String>, ParseError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| ParseError::InvalidMap(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(ParseError::InvalidMap("expected a JSON object".to_string()));
    };
    obj.into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ParseError::InvalidMap(format!(
                        "value for {k:?} must be a scalar"
                    )));
                }
            };
            Ok((k, v))
        })
        .collect()
}

/// Like [`parse_map`], but logs malformed input and yields an empty map.
pub fn map_or_default(input: &str) -> BTreeMap<String, String> {
    parse_map(input).unwrap_or_else(|err| {
        tracing::warn!(%err, "ignoring malformed map attribute");
        BTreeMap::new()
    })
}

/// Boolean attribute with presence semantics.
pub fn parse_flag(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(v) => !v.trim().eq_ignore_ascii_case("false"),
    }
}

/// Parses a comma list of ISO dates, skipping (and logging) invalid entries.
pub fn parse_date_set(input: &str) -> BTreeSet<NaiveDate> {
    parse_list(input)
        .into_iter()
        .filter_map(|s| match date::parse_date(&s) {
            Ok(d) => Some(d),
            Err(err) => {
                tracing::warn!(%err, "skipping invalid date in list");
                None
            }
        })
        .collect()
}

/// Reads an optional ISO date attribute, logging and ignoring invalid values.
pub fn date_attr(attrs: &Attrs, key: &str) -> Option<NaiveDate> {
    let raw = attrs.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    match date::parse_date(raw) {
        Ok(d) => Some(d),
        Err(err) => {
            tracing::warn!(attr = key, %err, "ignoring invalid date attribute");
            None
        }
    }
}

pub fn flag_attr(attrs: &Attrs, key: &str) -> bool {
    parse_flag(attrs.get(key).map(String::as_str))
}

pub fn string_attr(attrs: &Attrs, key: &str) -> Option<String> {
    attrs
        .get(key)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_trims_and_drops_empty() {
        assert_eq!(parse_list(" a, b ,,c,"), vec!["a", "b", "c"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn map_accepts_pairs_and_json() {
        let pairs = parse_map("accept: application/json; x-token : abc").unwrap();
        assert_eq!(pairs.get("accept").map(String::as_str), Some("application/json"));
        assert_eq!(pairs.get("x-token").map(String::as_str), Some("abc"));

        let json = parse_map(r#"{"today": "Heute", "n": 3, "on": true}"#).unwrap();
        assert_eq!(json.get("today").map(String::as_str), Some("Heute"));
        assert_eq!(json.get("n").map(String::as_str), Some("3"));
        assert_eq!(json.get("on").map(String::as_str), Some("true"));
    }

    #[test]
    fn malformed_maps_degrade_to_empty() {
        assert!(parse_map("no separator here").is_err());
        assert!(parse_map(r#"{"a": [1]}"#).is_err());
        assert!(parse_map("[1, 2]").is_err());
        assert!(map_or_default("{broken").is_empty());
    }

    #[test]
    fn flags_use_presence() {
        assert!(!parse_flag(None));
        assert!(parse_flag(Some("")));
        assert!(parse_flag(Some("multiple")));
        assert!(!parse_flag(Some("False")));
    }

    #[test]
    fn date_set_skips_invalid_entries() {
        let set = parse_date_set("2024-02-10, nope, 2024-02-30, 2024-03-01");
        let got: Vec<String> = set.iter().map(|d| date::to_iso_date(*d)).collect();
        assert_eq!(got, vec!["2024-02-10", "2024-03-01"]);
    }
}
