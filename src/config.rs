use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8005;
pub const CATALOG_FILE: &str = "products.json";

/// Overall bound on one relayed chat request, body included.
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ollama_base_url: String,
    pub model: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub catalog_paths: Vec<PathBuf>,
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenvy::dotenv()`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ollama_base_url = lookup("OLLAMA_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            ollama_base_url,
            model: lookup("OLLAMA_MODEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            host: lookup("HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            request_timeout: RELAY_TIMEOUT,
            catalog_paths: default_catalog_paths(),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Working directory first, then the directory the service ships from.
pub fn default_catalog_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(CATALOG_FILE),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CATALOG_FILE),
    ]
}
