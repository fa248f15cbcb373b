//! Endpoint URL construction

/// Suffix of every JSON endpoint on the server
pub const JSON_ENDPOINT: &str = "api/json";

/// Builds `api/json` endpoint URLs below a server base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder(String);

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self(base_url.trim_end_matches('/').to_string())
    }

    pub fn base_url(&self) -> &str {
        &self.0
    }

    /// `<base>/<segments...>/api/json`
    ///
    /// Leading and trailing slashes of each segment are ignored.
    pub fn json_endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.0.clone();
        for segment in segments
            .iter()
            .map(|s| s.trim_matches('/'))
            .filter(|s| !s.is_empty())
        {
            url.push('/');
            url.push_str(segment);
        }
        url.push('/');
        url.push_str(JSON_ENDPOINT);
        url
    }

    /// JSON endpoint of an absolute resource URL handed out by the server
    pub fn json_endpoint_of(resource_url: &str) -> String {
        format!("{}/{}", resource_url.trim_end_matches('/'), JSON_ENDPOINT)
    }
}
