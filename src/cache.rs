use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use log::debug;

use crate::{BlogGenerationResult, BlogLength, BlogStyle};

/// Composite key identifying one generated post
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub video_id: String,
    pub length: BlogLength,
    pub style: BlogStyle,
}

impl CacheKey {
    pub fn new(video_id: impl Into<String>, length: BlogLength, style: BlogStyle) -> Self {
        Self {
            video_id: video_id.into(),
            length,
            style,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.video_id, self.length, self.style)
    }
}

/// Process-lifetime store of generated posts. No eviction; the last write for a key wins.
#[derive(Debug, Default)]
pub struct BlogCache {
    entries: RwLock<HashMap<CacheKey, BlogGenerationResult>>,
}

impl BlogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<BlogGenerationResult> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let hit = entries.get(key).cloned();
        if hit.is_some() {
            debug!("Cache hit: {key}");
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, result: BlogGenerationResult) {
        debug!("Caching blog post: {key}");
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
