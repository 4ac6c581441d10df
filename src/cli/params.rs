use std::collections::BTreeMap;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParamValue {
    Flag,
    Bool(bool),
    Value(String),
}

/// Command flags, rendered in key order: `--k v`, `--k=true`, or bare `--k`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Display) -> Self {
        self.0.insert(key.to_string(), ParamValue::Value(value.to_string()));
        self
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.0.insert(key.to_string(), ParamValue::Bool(value));
        self
    }

    pub fn flag(mut self, key: &str) -> Self {
        self.0.insert(key.to_string(), ParamValue::Flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.0.len() * 2);
        for (k, v) in &self.0 {
            match v {
                ParamValue::Flag => args.push(format!("--{k}")),
                ParamValue::Bool(b) => args.push(format!("--{k}={b}")),
                ParamValue::Value(s) => {
                    args.push(format!("--{k}"));
                    args.push(s.clone());
                }
            }
        }
        args
    }
}
