use std::path::PathBuf;

/// Admin API version used when `SHOPIFY_API_VERSION` is not set.
pub const DEFAULT_API_VERSION: &str = "2024-10";

#[derive(Clone)]
pub struct AppConfig {
    pub shop_name: String,
    pub access_token: String,
    pub api_version: String,
    pub poll_interval_secs: u64,
    /// `None` polls until the bulk operation reaches a terminal status.
    pub poll_max_attempts: Option<u32>,
    pub request_timeout_secs: u64,
    pub download_dir: PathBuf,
    pub accept_invalid_certs: bool,
}

impl AppConfig {
    /// Admin GraphQL endpoint for the configured shop.
    ///
    /// A bare handle (`"seabags"`) expands to `seabags.myshopify.com`; a value
    /// that already contains a dot is used as the host as-is.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        let shop = self
            .shop_name
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/');
        let host = if shop.contains('.') {
            shop.to_string()
        } else {
            format!("{shop}.myshopify.com")
        };
        format!("https://{host}/admin/api/{}/graphql.json", self.api_version)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("shop_name", &self.shop_name)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("poll_max_attempts", &self.poll_max_attempts)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("download_dir", &self.download_dir)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}
