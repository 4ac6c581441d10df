use url::Url;

use crate::client::ClientError;

/// Path template plus query params, resolved against a node base URL.
///
/// Templates use `:name` placeholders, e.g. `/v1/screst/:sc_address/getblobbers`.
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    path: String,
    vars: Vec<(String, String)>,
    params: Vec<(String, String)>,
}

impl UrlBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }

    pub fn path_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.vars.push((name.to_string(), value.into()));
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Path with every placeholder substituted.
    pub fn path(&self) -> String {
        let mut path = self.path.clone();
        for (name, value) in &self.vars {
            path = path.replacen(&format!(":{name}"), value, 1);
        }
        path
    }

    pub fn build(&self, base: &str) -> Result<Url, ClientError> {
        let mut url = Url::parse(base)?;
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{prefix}{}", self.path()));
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(url)
    }
}
