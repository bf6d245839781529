// query.rs — list/filter shaping, one filter type per entity kind.
//
// Pure predicates over already-loaded rows. Free-text terms are
// case-insensitive substring matches over a fixed field set; enum filters
// are exact matches with `ALL`/`TODOS` (or absence) meaning "no filter";
// sort keys are restricted to a per-kind allow-list, with unknown keys
// silently falling back to creation-time descending.
//
// Result sets are bounded: callers must never assume full-table results.

use serde::Deserialize;

use crate::storage::{FollowupRow, InteractionRow, ProspectRow, RoutedContactRow};

pub const PROSPECT_LIST_CAP: usize = 100;
pub const INTERACTION_LIST_CAP: usize = 100;
pub const FOLLOWUP_LIST_CAP: usize = 50;
pub const ROUTED_CONTACT_LIST_CAP: usize = 100;

/// Enum filters treat absence, the empty string, and the `ALL`/`TODOS`
/// sentinels (the latter kept for legacy clients) as "no filter".
fn wildcard(value: &Option<String>) -> bool {
    match value.as_deref() {
        None | Some("") | Some("ALL") | Some("TODOS") => true,
        Some(_) => false,
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn eq_filter(filter: &Option<String>, value: &str) -> bool {
    match filter {
        Some(f) if !wildcard(filter) => f == value,
        _ => true,
    }
}

fn nonempty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ─── Prospects ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProspectQuery {
    /// Substring match over name/company/email.
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Substring match over city/province/country. Joins the SAME
    /// disjunction as `search`: when both are set, either matching is
    /// sufficient. Long-standing behavior, kept as-is.
    pub location: Option<String>,
    pub order_by: Option<String>,
    pub order_dir: Option<String>,
}

impl ProspectQuery {
    pub fn matches(&self, row: &ProspectRow) -> bool {
        let mut or_hits: Vec<bool> = Vec::new();
        if let Some(term) = nonempty(&self.search) {
            or_hits.push(
                contains_ci(&row.name, term)
                    || contains_ci(&row.company, term)
                    || contains_ci(&row.email, term),
            );
        }
        if let Some(term) = nonempty(&self.location) {
            or_hits.push(
                contains_ci(&row.city, term)
                    || contains_ci(&row.province, term)
                    || contains_ci(&row.country, term),
            );
        }
        if !or_hits.is_empty() && !or_hits.iter().any(|hit| *hit) {
            return false;
        }

        eq_filter(&self.status, &row.status) && eq_filter(&self.priority, &row.priority)
    }

    /// Sort in place. Allow-listed keys: name, company, status, priority,
    /// createdAt. Anything else falls back to creation-time descending.
    pub fn sort(&self, rows: &mut [ProspectRow]) {
        let ascending = matches!(self.order_dir.as_deref(), Some("asc") | Some("ASC"));
        let key = self.order_by.as_deref().unwrap_or("createdAt");

        match key {
            "name" => rows.sort_by(|a, b| a.name.cmp(&b.name)),
            "company" => rows.sort_by(|a, b| a.company.cmp(&b.company)),
            "status" => rows.sort_by(|a, b| a.status.cmp(&b.status)),
            "priority" => rows.sort_by(|a, b| a.priority.cmp(&b.priority)),
            "createdAt" => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            _ => {
                // Unknown key: creation-time descending, direction ignored.
                rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                return;
            }
        }
        if !ascending {
            rows.reverse();
        }
    }
}

// ─── Interactions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionQuery {
    /// Substring match over subject/body/prospect name.
    pub search: Option<String>,
    pub channel: Option<String>,
}

impl InteractionQuery {
    pub fn matches(&self, row: &InteractionRow) -> bool {
        if let Some(term) = nonempty(&self.search) {
            let hit = contains_ci(&row.subject, term)
                || contains_ci(&row.body, term)
                || contains_ci(&row.prospect_name, term);
            if !hit {
                return false;
            }
        }
        eq_filter(&self.channel, &row.channel)
    }
}

// ─── Followups ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FollowupQuery {
    pub status: Option<String>,
}

impl FollowupQuery {
    pub fn matches(&self, row: &FollowupRow) -> bool {
        eq_filter(&self.status, &row.status)
    }
}

// ─── Routed contacts ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoutedContactQuery {
    pub bucket: Option<String>,
    /// Substring match over name/company/email.
    pub search: Option<String>,
    pub status: Option<String>,
}

impl RoutedContactQuery {
    pub fn matches(&self, row: &RoutedContactRow) -> bool {
        if let Some(term) = nonempty(&self.search) {
            let hit = contains_ci(&row.name, term)
                || contains_ci(&row.company, term)
                || contains_ci(&row.email, term);
            if !hit {
                return false;
            }
        }
        eq_filter(&self.bucket, &row.bucket) && eq_filter(&self.status, &row.status)
    }
}
