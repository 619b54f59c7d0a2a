use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the document store REST API, e.g. `https://cloud.appwrite.io/v1`.
    pub docstore_endpoint: String,
    pub docstore_project: String,
    pub docstore_api_key: Option<String>,
    pub database_id: String,
    pub deals_collection: String,
    /// Collection of products being tracked across marketplaces.
    pub products_collection: String,
    pub columns_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("docstore_endpoint", &self.docstore_endpoint)
            .field("docstore_project", &self.docstore_project)
            .field(
                "docstore_api_key",
                &self.docstore_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("database_id", &self.database_id)
            .field("deals_collection", &self.deals_collection)
            .field("products_collection", &self.products_collection)
            .field("columns_path", &self.columns_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
