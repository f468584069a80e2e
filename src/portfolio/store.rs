//! Latest-snapshot portfolio store
//!
//! Memory only by default. With `portfolioStorePath` set, every save is also
//! written to that file and the file is read back at startup.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::config::Config;

/// An acknowledged snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPortfolio {
    pub date: String,
    pub saved_at: DateTime<Utc>,
    pub data: Value,
}

pub struct PortfolioStore {
    latest: Mutex<Option<StoredPortfolio>>,
    path: Option<PathBuf>,
    /// Orders file writes so the file and `latest` agree
    write_lock: tokio::sync::Mutex<()>,
}

impl PortfolioStore {
    pub fn in_memory() -> Self {
        Self {
            latest: Mutex::new(None),
            path: None,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// File-backed store, restoring the snapshot already at `path`
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let latest = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read portfolio store: {}", path.display()))?;
            let stored: StoredPortfolio = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse portfolio store: {}", path.display()))?;
            Some(stored)
        } else {
            None
        };

        Ok(Self {
            latest: Mutex::new(latest),
            path: Some(path),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.portfolio_store_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::open(path),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn latest(&self) -> Option<StoredPortfolio> {
        self.latest.lock().clone()
    }

    /// Replace the latest snapshot
    pub async fn save(&self, date: String, data: Value) -> anyhow::Result<StoredPortfolio> {
        let stored = StoredPortfolio {
            date,
            saved_at: Utc::now(),
            data,
        };

        let _guard = self.write_lock.lock().await;

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&stored)
                .context("Failed to serialize portfolio")?;
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, json)
                .await
                .with_context(|| format!("Failed to write portfolio store: {}", tmp.display()))?;
            tokio::fs::rename(&tmp, path)
                .await
                .with_context(|| format!("Failed to replace portfolio store: {}", path.display()))?;
            tracing::debug!("Wrote portfolio snapshot to {}", path.display());
        }

        *self.latest.lock() = Some(stored.clone());
        Ok(stored)
    }
}
