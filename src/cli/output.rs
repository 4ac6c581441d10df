//! Parsing helpers for the tab-separated tables the CLIs print.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

const SDK_MESSAGE_PREFIX: &str = "0chain-core-sdk";
const KEY_HEX_LEN: usize = 64;

fn split_pair(line: &str) -> (String, String) {
    let mut parts = line.split('\t');
    let key = parts.next().unwrap_or_default().trim().to_string();
    let value = match (parts.next(), parts.next()) {
        (Some(v), None) => v.trim().to_string(),
        _ => String::new(),
    };
    (key, value)
}

/// `key\tvalue` lines into a string map plus a map of the values that parse as numbers.
pub fn key_value_pairs_to_map(lines: &[String]) -> (BTreeMap<String, String>, BTreeMap<String, f64>) {
    let mut strings = BTreeMap::new();
    let mut numbers = BTreeMap::new();
    for line in lines {
        let (key, value) = split_pair(line);
        if let Ok(n) = value.parse::<f64>() {
            numbers.insert(key.clone(), n);
        }
        strings.insert(key, value);
    }
    (strings, numbers)
}

/// Settings split by the type their value parses as, tried in field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingMaps {
    pub numeric: BTreeMap<String, f64>,
    pub boolean: BTreeMap<String, bool>,
    /// Whole seconds.
    pub duration: BTreeMap<String, i64>,
    /// 64+ char hex values, wallet and node ids.
    pub keys: BTreeMap<String, String>,
    pub messages: BTreeMap<String, String>,
}

pub fn key_value_settings_to_map(lines: &[String]) -> SettingMaps {
    let mut s = SettingMaps::default();
    for line in lines {
        let (key, value) = split_pair(line);
        if let Ok(n) = value.parse::<f64>() {
            s.numeric.insert(key, n);
        } else if let Some(b) = parse_bool(&value) {
            s.boolean.insert(key, b);
        } else if let Some(d) = parse_go_duration(&value) {
            s.duration.insert(key, d.as_secs() as i64);
        } else if value.len() >= KEY_HEX_LEN && hex::decode(&value).is_ok() {
            s.keys.insert(key, value);
        } else if key.starts_with(SDK_MESSAGE_PREFIX) {
            s.messages.insert(key, value);
        } else {
            debug!(%key, %value, "unexpected setting");
        }
    }
    s
}

fn parse_bool(v: &str) -> Option<bool> {
    match v {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Durations as the CLIs print them: `1h2m3.5s`, `300ms`, `0s`.
pub fn parse_go_duration(v: &str) -> Option<Duration> {
    if v.is_empty() {
        return None;
    }
    if v == "0" {
        return Some(Duration::ZERO);
    }
    let mut rest = v;
    let mut total = 0f64;
    while !rest.is_empty() {
        let num_end = rest.find(|c: char| !(c.is_ascii_digit() || c == '.')).unwrap_or(rest.len());
        if num_end == 0 {
            return None;
        }
        let n: f64 = rest[..num_end].parse().ok()?;
        rest = &rest[num_end..];
        let unit_end = rest.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        total += n * scale;
        rest = &rest[unit_end..];
    }
    Some(Duration::from_secs_f64(total))
}

/// Join output into one JSON document, skipping a leading banner line.
pub fn json_after_banner(lines: &[String], banner: &str) -> String {
    let start = usize::from(lines.first().map(|l| l.trim() == banner).unwrap_or(false));
    lines[start..].join("")
}
