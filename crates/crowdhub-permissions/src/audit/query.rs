//! Access log querying and filtering

use chrono::{DateTime, Utc};

use super::models::{AccessLogEntry, AccessOutcome, DecisionSource};

/// Filter criteria for access log queries
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    /// Filter by user id
    pub user: Option<String>,
    /// Filter by resource
    pub resource: Option<String>,
    /// Filter by outcome
    pub outcome: Option<AccessOutcome>,
    /// Filter by decision source
    pub source: Option<DecisionSource>,
    /// Entries at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Entries at or before this instant
    pub end_date: Option<DateTime<Utc>>,
}

impl QueryFilter {
    /// Create an empty filter matching everything
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_outcome(mut self, outcome: AccessOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_source(mut self, source: DecisionSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_start_date(mut self, date: DateTime<Utc>) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: DateTime<Utc>) -> Self {
        self.end_date = Some(date);
        self
    }

    fn matches(&self, entry: &AccessLogEntry) -> bool {
        if let Some(ref user) = self.user {
            if entry.user != *user {
                return false;
            }
        }

        if let Some(ref resource) = self.resource {
            if entry.resource != *resource {
                return false;
            }
        }

        if let Some(outcome) = self.outcome {
            if entry.outcome != outcome {
                return false;
            }
        }

        if let Some(source) = self.source {
            if entry.source != source {
                return false;
            }
        }

        if let Some(start_date) = self.start_date {
            if entry.timestamp < start_date {
                return false;
            }
        }

        if let Some(end_date) = self.end_date {
            if entry.timestamp > end_date {
                return false;
            }
        }

        true
    }
}

/// Pagination parameters
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Number of results per page
    pub limit: usize,
    /// Number of results to skip
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    pub fn first_page(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn next_page(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }

    pub fn prev_page(&self) -> Option<Self> {
        if self.offset >= self.limit {
            Some(Self {
                limit: self.limit,
                offset: self.offset - self.limit,
            })
        } else {
            None
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(10, 0)
    }
}

/// Query result with pagination metadata
#[derive(Debug, Clone)]
pub struct AccessQuery {
    /// Filtered, paginated entries
    pub entries: Vec<AccessLogEntry>,
    /// Total number of entries matching the filter
    pub total: usize,
    /// Pagination used
    pub pagination: Pagination,
}

impl AccessQuery {
    /// Execute a query over the given entries
    pub fn execute(
        entries: &[AccessLogEntry],
        filter: &QueryFilter,
        pagination: &Pagination,
    ) -> Self {
        let filtered: Vec<_> = entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();

        let total = filtered.len();
        let start = pagination.offset;
        let end = std::cmp::min(start + pagination.limit, total);

        let paginated = if start < total {
            filtered[start..end].to_vec()
        } else {
            Vec::new()
        };

        Self {
            entries: paginated,
            total,
            pagination: pagination.clone(),
        }
    }

    /// Total number of pages
    pub fn total_pages(&self) -> usize {
        if self.pagination.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.pagination.limit)
    }

    /// Current page number (1-indexed)
    pub fn current_page(&self) -> usize {
        if self.pagination.limit == 0 {
            return 0;
        }
        (self.pagination.offset / self.pagination.limit) + 1
    }

    pub fn has_next_page(&self) -> bool {
        self.pagination.offset + self.pagination.limit < self.total
    }

    pub fn has_prev_page(&self) -> bool {
        self.pagination.offset > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> Vec<AccessLogEntry> {
        vec![
            AccessLogEntry::new(
                "u-1",
                "articles",
                "view",
                AccessOutcome::Allowed,
                DecisionSource::Role,
            ),
            AccessLogEntry::new(
                "u-2",
                "articles",
                "edit",
                AccessOutcome::Denied,
                DecisionSource::Override,
            ),
            AccessLogEntry::new(
                "u-1",
                "hardware",
                "create",
                AccessOutcome::Denied,
                DecisionSource::Default,
            ),
            AccessLogEntry::new(
                "u-3",
                "articles",
                "view",
                AccessOutcome::Allowed,
                DecisionSource::Override,
            ),
        ]
    }

    #[test]
    fn test_filter_by_user() {
        let entries = sample_entries();
        let filter = QueryFilter::new().with_user("u-1");
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, 2);
        assert!(result.entries.iter().all(|e| e.user == "u-1"));
    }

    #[test]
    fn test_filter_by_resource() {
        let entries = sample_entries();
        let filter = QueryFilter::new().with_resource("articles");
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, 3);
    }

    #[test]
    fn test_filter_by_outcome() {
        let entries = sample_entries();
        let filter = QueryFilter::new().with_outcome(AccessOutcome::Denied);
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, 2);
        assert!(result
            .entries
            .iter()
            .all(|e| e.outcome == AccessOutcome::Denied));
    }

    #[test]
    fn test_filter_by_source() {
        let entries = sample_entries();
        let filter = QueryFilter::new().with_source(DecisionSource::Override);
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, 2);
    }

    #[test]
    fn test_combined_filters() {
        let entries = sample_entries();
        let filter = QueryFilter::new()
            .with_user("u-1")
            .with_outcome(AccessOutcome::Denied);
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, 1);
        assert_eq!(result.entries[0].resource, "hardware");
    }

    #[test]
    fn test_date_range_filter() {
        let entries = sample_entries();
        let now = Utc::now();
        let filter = QueryFilter::new()
            .with_start_date(now - chrono::Duration::hours(1))
            .with_end_date(now + chrono::Duration::hours(1));
        let result = AccessQuery::execute(&entries, &filter, &Pagination::first_page(10));

        assert_eq!(result.total, entries.len());
    }

    #[test]
    fn test_pagination_pages() {
        let entries = sample_entries();
        let filter = QueryFilter::new();

        let first = AccessQuery::execute(&entries, &filter, &Pagination::first_page(2));
        assert_eq!(first.total, 4);
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.current_page(), 1);
        assert_eq!(first.total_pages(), 2);
        assert!(first.has_next_page());
        assert!(!first.has_prev_page());

        let second = AccessQuery::execute(&entries, &filter, &Pagination::new(2, 2));
        assert_eq!(second.entries.len(), 2);
        assert_eq!(second.current_page(), 2);
        assert!(!second.has_next_page());
        assert!(second.has_prev_page());
    }

    #[test]
    fn test_pagination_offset_beyond_total() {
        let entries = sample_entries();
        let result =
            AccessQuery::execute(&entries, &QueryFilter::new(), &Pagination::new(2, 10));
        assert!(result.entries.is_empty());
        assert_eq!(result.total, 4);
    }

    #[test]
    fn test_pagination_navigation() {
        let pagination = Pagination::first_page(2);
        assert!(pagination.prev_page().is_none());

        let next = pagination.next_page();
        assert_eq!(next.offset, 2);
        assert_eq!(next.prev_page().unwrap().offset, 0);
    }
}
