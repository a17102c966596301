//! Sync configuration: where the remote store lives and how to commit.

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// How a single-image commit brings the remote set in line with the
/// local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitStrategy {
    /// Delete every remote annotation, then create every local one.
    ReplaceAll,
    /// Keep unchanged annotations; delete stale and create new ones only.
    #[default]
    Reconcile,
}

impl CommitStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            CommitStrategy::ReplaceAll => "replace-all",
            CommitStrategy::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for CommitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace-all" | "replace_all" | "replace" => Ok(CommitStrategy::ReplaceAll),
            "reconcile" => Ok(CommitStrategy::Reconcile),
            other => Err(format!(
                "unknown commit strategy '{other}' (expected 'replace-all' or 'reconcile')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub api_url: String,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub token: Option<String>,
    /// Page size used when walking the unannotated queue.
    pub page_size: u32,
    pub strategy: CommitStrategy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            page_size: DEFAULT_PAGE_SIZE,
            strategy: CommitStrategy::default(),
        }
    }
}

impl SyncConfig {
    /// Read `BOXTAG_API_URL`, `BOXTAG_TOKEN`, `BOXTAG_PAGE_SIZE` and
    /// `BOXTAG_COMMIT_STRATEGY`, falling back to defaults.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("BOXTAG_API_URL") {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }
        config.token = non_empty("BOXTAG_TOKEN");
        if let Some(size) = non_empty("BOXTAG_PAGE_SIZE") {
            config.page_size = match size.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(format!("BOXTAG_PAGE_SIZE must be a positive integer, got '{size}'")),
            };
        }
        if let Some(strategy) = non_empty("BOXTAG_COMMIT_STRATEGY") {
            config.strategy = strategy.parse()?;
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_strategy(mut self, strategy: CommitStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = SyncConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.strategy, CommitStrategy::Reconcile);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn reads_all_variables() {
        let config = SyncConfig::from_lookup(lookup(&[
            ("BOXTAG_API_URL", "https://labels.example.com/api/"),
            ("BOXTAG_TOKEN", "secret"),
            ("BOXTAG_PAGE_SIZE", "20"),
            ("BOXTAG_COMMIT_STRATEGY", "Replace-All"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://labels.example.com/api");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.page_size, 20);
        assert_eq!(config.strategy, CommitStrategy::ReplaceAll);
    }

    #[test]
    fn blank_token_is_none() {
        let config = SyncConfig::from_lookup(lookup(&[("BOXTAG_TOKEN", "  ")])).unwrap();
        assert_eq!(config.token, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SyncConfig::from_lookup(lookup(&[("BOXTAG_PAGE_SIZE", "0")])).is_err());
        assert!(SyncConfig::from_lookup(lookup(&[("BOXTAG_PAGE_SIZE", "many")])).is_err());
        let err = SyncConfig::from_lookup(lookup(&[("BOXTAG_COMMIT_STRATEGY", "merge")]))
            .unwrap_err();
        assert!(err.contains("merge"));
    }

    #[test]
    fn strategy_round_trips_through_display() {
        for s in [CommitStrategy::ReplaceAll, CommitStrategy::Reconcile] {
            assert_eq!(s.to_string().parse::<CommitStrategy>(), Ok(s));
        }
    }
}
