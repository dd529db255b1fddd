//! Service configuration read from the environment.
//!
//! There is no configuration file. The binary loads `.env` (via `dotenvy`)
//! before calling [`ServiceConfig::from_env`].

use std::fmt;
use std::path::PathBuf;

use crate::utilities::errors::{CrewError, Result};

/// Default similarity threshold for crew reuse.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Default root for crew definition directories.
pub const DEFAULT_CREWS_DIR: &str = "data/crews";

/// Default store connection string.
pub const DEFAULT_STORE_URI: &str = "sqlite://data/prompt_store.db";

/// Model used to synthesize agent definitions.
pub const DEFAULT_SYNTHESIS_MODEL: &str = "gemini-2.0-flash";

/// Model shared by every executing agent.
pub const DEFAULT_EXECUTION_MODEL: &str = "gemini-2.5-pro";

/// Which embedding backend turns prompts into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    /// Gemini `embedContent` API.
    Google,
    /// Local sentence-transformer model (requires the `local-embeddings` feature).
    Local,
}

impl EmbeddingProviderKind {
    /// Local all-MiniLM-L6-v2 when compiled in, Gemini otherwise.
    ///
    /// The default similarity threshold of 0.9 is calibrated for
    /// all-MiniLM-L6-v2; Gemini embeddings score paraphrases differently.
    pub fn default_kind() -> Self {
        if cfg!(feature = "local-embeddings") {
            EmbeddingProviderKind::Local
        } else {
            EmbeddingProviderKind::Google
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            EmbeddingProviderKind::Google => "text-embedding-004",
            EmbeddingProviderKind::Local => "all-MiniLM-L6-v2",
        }
    }
}

/// Runtime configuration for the crew service.
#[derive(Clone)]
pub struct ServiceConfig {
    /// HTTP port.
    pub port: u16,
    /// Root directory holding one sub-directory per crew.
    pub crews_dir: PathBuf,
    /// Store connection string (`memory://`, `sqlite://...`, `postgres://...`).
    pub store_uri: String,
    /// Gemini API key.
    pub gemini_api_key: Option<String>,
    pub synthesis_model: String,
    pub execution_model: String,
    pub embedding_provider: EmbeddingProviderKind,
    pub embedding_model: String,
    /// Minimum cosine similarity for reusing an existing crew.
    pub similarity_threshold: f64,
    /// Per-request HTTP timeout for model calls.
    pub llm_timeout_secs: u64,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("port", &self.port)
            .field("crews_dir", &self.crews_dir)
            .field("store_uri", &redact_uri(&self.store_uri))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("synthesis_model", &self.synthesis_model)
            .field("execution_model", &self.execution_model)
            .field("embedding_provider", &self.embedding_provider)
            .field("embedding_model", &self.embedding_model)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .finish()
    }
}

impl ServiceConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| CrewError::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => 8000,
        };

        let similarity_threshold = match get("SIMILARITY_THRESHOLD") {
            Some(raw) => {
                let value = raw.parse::<f64>().map_err(|_| {
                    CrewError::Config(format!("SIMILARITY_THRESHOLD must be a number, got '{}'", raw))
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(CrewError::Config(format!(
                        "SIMILARITY_THRESHOLD must be within [0, 1], got {}",
                        value
                    )));
                }
                value
            }
            None => DEFAULT_SIMILARITY_THRESHOLD,
        };

        let embedding_provider = match get("EMBEDDING_PROVIDER").as_deref() {
            None => EmbeddingProviderKind::default_kind(),
            Some("google") | Some("gemini") => EmbeddingProviderKind::Google,
            Some("local") | Some("sentence-transformer") => EmbeddingProviderKind::Local,
            Some(other) => {
                return Err(CrewError::Config(format!(
                    "Unknown EMBEDDING_PROVIDER '{}'. Expected 'google' or 'local'",
                    other
                )))
            }
        };

        let llm_timeout_secs = match get("LLM_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CrewError::Config(format!("LLM_TIMEOUT_SECS must be an integer, got '{}'", raw))
            })?,
            None => 300,
        };

        Ok(Self {
            port,
            crews_dir: get("CREWS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREWS_DIR)),
            store_uri: get("CREW_STORE_URI")
                .or_else(|| get("DATABASE_URL"))
                .unwrap_or_else(|| DEFAULT_STORE_URI.to_string()),
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            synthesis_model: get("SYNTHESIS_MODEL")
                .unwrap_or_else(|| DEFAULT_SYNTHESIS_MODEL.to_string()),
            execution_model: get("EXECUTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EXECUTION_MODEL.to_string()),
            embedding_model: get("EMBEDDING_MODEL")
                .unwrap_or_else(|| embedding_provider.default_model().to_string()),
            embedding_provider,
            similarity_threshold,
            llm_timeout_secs,
        })
    }

    /// The Gemini API key, or a configuration error naming the variable.
    pub fn require_api_key(&self) -> Result<&str> {
        self.gemini_api_key.as_deref().ok_or_else(|| {
            CrewError::Config("GEMINI_API_KEY (or GOOGLE_API_KEY) is not set".to_string())
        })
    }
}

/// Hide credentials embedded in a connection string.
fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &uri[..scheme_end], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.crews_dir, PathBuf::from("data/crews"));
        assert_eq!(config.store_uri, DEFAULT_STORE_URI);
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.synthesis_model, "gemini-2.0-flash");
        assert_eq!(config.execution_model, "gemini-2.5-pro");
        assert_eq!(config.embedding_provider, EmbeddingProviderKind::default_kind());
        assert_eq!(
            config.embedding_model,
            config.embedding_provider.default_model()
        );
        assert!(config.gemini_api_key.is_none());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_default_embedding_provider_follows_features() {
        let expected = if cfg!(feature = "local-embeddings") {
            EmbeddingProviderKind::Local
        } else {
            EmbeddingProviderKind::Google
        };
        assert_eq!(EmbeddingProviderKind::default_kind(), expected);

        let config = config_from(&[("EMBEDDING_PROVIDER", "google")]).unwrap();
        assert_eq!(config.embedding_provider, EmbeddingProviderKind::Google);
        assert_eq!(config.embedding_model, "text-embedding-004");
    }

    #[test]
    fn test_overrides_and_fallbacks() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("GOOGLE_API_KEY", "g-key"),
            ("DATABASE_URL", "postgres://u:p@db/crews"),
            ("EMBEDDING_PROVIDER", "local"),
            ("SIMILARITY_THRESHOLD", "0.75"),
        ])
        .unwrap();
        assert_eq!(config.port, 9001);
        assert_eq!(config.require_api_key().unwrap(), "g-key");
        assert_eq!(config.store_uri, "postgres://u:p@db/crews");
        assert_eq!(config.embedding_provider, EmbeddingProviderKind::Local);
        assert_eq!(config.embedding_model, "all-MiniLM-L6-v2");
        assert_eq!(config.similarity_threshold, 0.75);
    }

    #[test]
    fn test_gemini_key_preferred_over_google_key() {
        let config = config_from(&[("GEMINI_API_KEY", "a"), ("GOOGLE_API_KEY", "b")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("a"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("SIMILARITY_THRESHOLD", "1.5")]).is_err());
        assert!(config_from(&[("SIMILARITY_THRESHOLD", "high")]).is_err());
        assert!(config_from(&[("EMBEDDING_PROVIDER", "openai")]).is_err());
        assert!(config_from(&[("LLM_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "super-secret"),
            ("CREW_STORE_URI", "postgres://user:pw@host/db"),
        ])
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("user:pw"));
        assert!(debug.contains("postgres://***@host/db"));
    }
}
