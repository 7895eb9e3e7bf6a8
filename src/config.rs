mod ignore_store_config;

use std::{path::Path, time::Duration};

use anyhow::{Context as _, Result};
pub use ignore_store_config::IgnoreStoreConfig;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::consts::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_DEBOUNCE_TIME_MS, DEFAULT_FRAGMENT_PADDING, DEFAULT_LANGUAGE,
};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProofreadConfig {
    /// Without it no check is ever requested.
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default = "default_language")]
    pub language: String,

    /// Quiet period in milliseconds before a scheduled check starts.
    #[serde(default = "default_debounce_time")]
    pub debounce_time: u64,

    #[serde(default = "default_true")]
    pub enable_spellcheck: bool,

    #[serde(default = "default_true")]
    pub enable_grammar_check: bool,

    /// Scopes the ignore list. Without it nothing is ever ignored.
    #[serde(default)]
    pub document_id: Option<String>,

    /// Check automatically after edits, otherwise only on request.
    #[serde(default = "default_true")]
    pub automatic_mode: bool,

    /// Characters of context sent on each side of an edited span.
    #[serde(default = "default_fragment_padding")]
    pub fragment_padding: usize,

    /// Maximum number of cached fragments, 0 means unbounded.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub ignore_store: Option<IgnoreStoreConfig>,
}

fn default_language() -> String {
    debug!("Using default language: {DEFAULT_LANGUAGE}");
    DEFAULT_LANGUAGE.to_owned()
}

fn default_debounce_time() -> u64 {
    debug!("Using default debounce time (ms): {DEFAULT_DEBOUNCE_TIME_MS}");
    DEFAULT_DEBOUNCE_TIME_MS
}

fn default_fragment_padding() -> usize {
    debug!("Using default fragment padding: {DEFAULT_FRAGMENT_PADDING}");
    DEFAULT_FRAGMENT_PADDING
}

fn default_cache_capacity() -> usize {
    debug!("Using default cache capacity: {DEFAULT_CACHE_CAPACITY}");
    DEFAULT_CACHE_CAPACITY
}

const fn default_true() -> bool { true }

impl Default for ProofreadConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            language: default_language(),
            debounce_time: default_debounce_time(),
            enable_spellcheck: true,
            enable_grammar_check: true,
            document_id: None,
            automatic_mode: true,
            fragment_padding: default_fragment_padding(),
            cache_capacity: default_cache_capacity(),
            ignore_store: None,
        }
    }
}

impl ProofreadConfig {
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from '{}'", path.display());

        let contents = fs::read_to_string(path).await.with_context(|| {
            format!("Cannot load configuration from disk from {}", path.display())
        })?;

        serde_yaml::from_str(&contents).context("Failed to parse configuration")
    }

    #[must_use]
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_time) }

    /// Whether any kind of check is enabled at all.
    #[must_use]
    pub fn checks_enabled(&self) -> bool { self.enable_spellcheck || self.enable_grammar_check }
}
