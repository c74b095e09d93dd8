use crate::config::{DEFAULT_BASE_URL, DEFAULT_HEARTBEAT_PATH};

/// Maps envelope type tags onto gateway URLs.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    base_url: String,
    heartbeat_path: String,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl EndpointResolver {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        let base = base_url.as_ref().trim().trim_end_matches('/');
        Self {
            base_url: format!("{base}/"),
            heartbeat_path: DEFAULT_HEARTBEAT_PATH.to_string(),
        }
    }

    pub fn with_heartbeat_path(mut self, path: impl AsRef<str>) -> Self {
        self.heartbeat_path = path.as_ref().trim().trim_start_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `FOO_BAR` becomes `<base>foo/bar`. The result is not validated.
    pub fn resolve(&self, type_tag: &str) -> String {
        format!("{}{}", self.base_url, type_path(type_tag))
    }

    pub fn heartbeat_url(&self) -> String {
        format!("{}{}", self.base_url, self.heartbeat_path)
    }
}

pub fn type_path(type_tag: &str) -> String {
    type_tag.to_lowercase().replace('_', "/")
}
