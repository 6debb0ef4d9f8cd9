//! API client configuration

/// Default REST API base URL
pub const DEFAULT_API_URL: &str = "https://testinium.io/Testinium.RestApi/api";

/// Default OAuth token endpoint
pub const DEFAULT_AUTH_URL: &str = "https://account.testinium.com/uaa/oauth/token";

/// OAuth client the token endpoint expects for password grants
const DEFAULT_CLIENT_ID: &str = "testiniumSuiteTrustedClient";
const DEFAULT_CLIENT_SECRET: &str = "testiniumSuiteSecretKey";

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: String,

    /// OAuth token endpoint
    pub auth_url: String,

    /// OAuth client id sent with the password grant
    pub client_id: String,

    /// OAuth client secret sent with the password grant
    pub client_secret: String,

    /// Timeout for a single request in seconds
    pub timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            timeout_secs: 300,
        }
    }
}

impl ApiClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
