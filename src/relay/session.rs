//! Per-caller language preference and the process-wide query counter.
//!
//! Lives for the process lifetime only. Shared between dispatcher
//! handlers through an `Arc`.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use crate::relay::language::Language;

/// Opaque caller identity (Telegram user id).
pub type CallerId = i64;

pub struct SessionStore {
    default_language: Language,
    languages: RwLock<HashMap<CallerId, Language>>,
    query_count: AtomicU64,
    started_at: DateTime<Utc>,
}

impl SessionStore {
    pub fn new(default_language: Language) -> Self {
        Self {
            default_language,
            languages: RwLock::new(HashMap::new()),
            query_count: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    /// Selected language, or the default if the caller never chose one.
    pub fn get_language(&self, caller_id: CallerId) -> Language {
        let languages = self.languages.read().unwrap_or_else(|e| e.into_inner());
        languages.get(&caller_id).copied().unwrap_or(self.default_language)
    }

    pub fn set_language(&self, caller_id: CallerId, language: Language) {
        let mut languages = self.languages.write().unwrap_or_else(|e| e.into_inner());
        languages.insert(caller_id, language);
    }

    /// Count one accepted request. Returns the new total.
    pub fn increment_query_count(&self) -> u64 {
        self.query_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
