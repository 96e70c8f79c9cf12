//! Access logger implementation

use std::sync::{Arc, RwLock};

use super::models::{AccessLogEntry, AccessOutcome, DecisionSource};

/// In-memory recorder of access checks.
///
/// Cloning shares the underlying log, so a screen and its admin view can
/// record into the same history.
#[derive(Clone)]
pub struct AccessLogger {
    entries: Arc<RwLock<Vec<AccessLogEntry>>>,
}

impl AccessLogger {
    /// Create a new empty logger
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Record a granted check
    pub fn log_allowed(
        &self,
        user: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        source: DecisionSource,
        context: Option<String>,
    ) -> Result<(), String> {
        let mut entry =
            AccessLogEntry::new(user, resource, action, AccessOutcome::Allowed, source);
        if let Some(ctx) = context {
            entry = entry.with_context(ctx);
        }
        self.record(entry)
    }

    /// Record a refused check
    pub fn log_denied(
        &self,
        user: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
        source: DecisionSource,
        context: Option<String>,
    ) -> Result<(), String> {
        let mut entry = AccessLogEntry::new(user, resource, action, AccessOutcome::Denied, source);
        if let Some(ctx) = context {
            entry = entry.with_context(ctx);
        }
        self.record(entry)
    }

    /// Append a pre-built entry
    pub fn record(&self, entry: AccessLogEntry) -> Result<(), String> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))?;
        entries.push(entry);
        Ok(())
    }

    /// All recorded entries
    pub fn entries(&self) -> Result<Vec<AccessLogEntry>, String> {
        let entries = self
            .entries
            .read()
            .map_err(|e| format!("Failed to acquire read lock: {}", e))?;
        Ok(entries.clone())
    }

    /// Number of recorded entries
    pub fn len(&self) -> Result<usize, String> {
        let entries = self
            .entries
            .read()
            .map_err(|e| format!("Failed to acquire read lock: {}", e))?;
        Ok(entries.len())
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> Result<bool, String> {
        Ok(self.len()? == 0)
    }

    /// Drop all recorded entries
    pub fn clear(&self) -> Result<(), String> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e))?;
        entries.clear();
        Ok(())
    }
}

impl Default for AccessLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_starts_empty() {
        let logger = AccessLogger::new();
        assert!(logger.is_empty().unwrap());
        assert_eq!(logger.len().unwrap(), 0);
    }

    #[test]
    fn test_log_allowed() {
        let logger = AccessLogger::new();
        logger
            .log_allowed("u-1", "articles", "edit", DecisionSource::Role, None)
            .unwrap();

        let entries = logger.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, AccessOutcome::Allowed);
        assert_eq!(entries[0].source, DecisionSource::Role);
    }

    #[test]
    fn test_log_denied_with_context() {
        let logger = AccessLogger::new();
        logger
            .log_denied(
                "u-1",
                "articles",
                "edit",
                DecisionSource::Override,
                Some("revoked pending review".to_string()),
            )
            .unwrap();

        let entries = logger.entries().unwrap();
        assert_eq!(entries[0].outcome, AccessOutcome::Denied);
        assert_eq!(
            entries[0].context,
            Some("revoked pending review".to_string())
        );
    }

    #[test]
    fn test_entries_keep_order() {
        let logger = AccessLogger::new();
        logger
            .log_allowed("u-1", "articles", "view", DecisionSource::Role, None)
            .unwrap();
        logger
            .log_denied("u-2", "articles", "edit", DecisionSource::Default, None)
            .unwrap();

        let entries = logger.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].user, "u-1");
        assert_eq!(entries[1].user, "u-2");
    }

    #[test]
    fn test_clear() {
        let logger = AccessLogger::new();
        logger
            .log_allowed("u-1", "articles", "view", DecisionSource::Role, None)
            .unwrap();
        logger.clear().unwrap();
        assert!(logger.is_empty().unwrap());
    }

    #[test]
    fn test_clone_shares_log() {
        let logger = AccessLogger::new();
        let shared = logger.clone();

        logger
            .log_allowed("u-1", "articles", "view", DecisionSource::Role, None)
            .unwrap();
        shared
            .log_denied("u-2", "articles", "edit", DecisionSource::Default, None)
            .unwrap();

        assert_eq!(logger.len().unwrap(), 2);
        assert_eq!(shared.len().unwrap(), 2);
    }
}
