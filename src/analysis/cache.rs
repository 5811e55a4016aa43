//! Condition cache: condition hash → stored analysis result.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::solver::AeroCoefficients;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(flatten)]
    pub coefficients: AeroCoefficients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,
    #[serde(rename = "smoothness_CM")]
    pub smoothness_cm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub airfoil_id: String,
    pub condition_hash: String,
    pub results: AnalysisResults,
    pub created_at: DateTime<Utc>,
}

pub trait ConditionCache: Send {
    fn get(&self, key: &str) -> Result<Option<CachedAnalysis>, AppError>;
    fn put(&mut self, key: &str, entry: CachedAnalysis) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: HashMap<String, CachedAnalysis>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConditionCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CachedAnalysis>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, entry: CachedAnalysis) -> Result<(), AppError> {
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }
}

/// A JSON object on disk, loaded once and rewritten (temp file + rename) on
/// every `put`. An entry is kept in memory only once the write succeeded.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, CachedAnalysis>,
}

impl JsonFileCache {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| {
                AppError::io(format!("Failed to read cache '{}': {e}", path.display()))
            })?;
            if text.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&text).map_err(|e| {
                    AppError::io(format!("Invalid cache file '{}': {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self, entries: &BTreeMap<String, CachedAnalysis>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Failed to create '{}': {e}", parent.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::io(format!("Failed to serialize cache: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)
            .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::io(format!("Failed to replace '{}': {e}", self.path.display()))
        })
    }
}

impl ConditionCache for JsonFileCache {
    fn get(&self, key: &str) -> Result<Option<CachedAnalysis>, AppError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, entry: CachedAnalysis) -> Result<(), AppError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), entry);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> CachedAnalysis {
        CachedAnalysis {
            airfoil_id: id.to_string(),
            condition_hash: "abc".to_string(),
            results: AnalysisResults {
                coefficients: AeroCoefficients {
                    alpha: vec![0.0],
                    cl: vec![0.2],
                    cd: vec![0.01],
                    cm: vec![-0.05],
                    cpmin: None,
                    top_xtr: None,
                    bot_xtr: None,
                    confidence: None,
                },
                avg_confidence: None,
                smoothness_cm: 0.0,
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn memory_cache_round_trip() {
        let mut cache = MemoryCache::new();
        assert!(cache.get("k").unwrap().is_none());
        cache.put("k", entry("a")).unwrap();
        assert_eq!(cache.get("k").unwrap().unwrap().airfoil_id, "a");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn file_cache_persists_across_reopen() {
        let dir = std::env::temp_dir().join(format!("foilfit-cache-{}", std::process::id()));
        let path = dir.join("cache.json");
        let _ = fs::remove_file(&path);

        let mut cache = JsonFileCache::open(&path).unwrap();
        assert!(cache.is_empty());
        cache.put("k1", entry("a")).unwrap();

        let reopened = JsonFileCache::open(&path).unwrap();
        let got = reopened.get("k1").unwrap().unwrap();
        assert_eq!(got.airfoil_id, "a");
        assert_eq!(got.results.coefficients.cl, vec![0.2]);
        assert!(reopened.get("k2").unwrap().is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn failed_write_leaves_cache_unchanged() {
        let dir = std::env::temp_dir().join(format!("foilfit-cache-ro-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        // A regular file where the cache's parent directory should be.
        let blocker = dir.join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let mut cache = JsonFileCache::open(blocker.join("cache.json")).unwrap();
        let err = cache.put("k1", entry("a")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
        assert!(cache.get("k1").unwrap().is_none());
        assert!(cache.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn results_serialize_flat() {
        let json = serde_json::to_value(entry("a").results).unwrap();
        assert!(json.get("CL").is_some());
        assert!(json.get("smoothness_CM").is_some());
        assert!(json.get("avg_confidence").is_none());
    }
}
