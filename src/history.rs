use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::domain::{Order, RecordId};

/// Orders always shown at the top of the history page.
pub const RECENT_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecencyBucket {
    Recent,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub order: Order,
    pub placed_at: DateTime<Utc>,
    pub bucket: RecencyBucket,
}

/// Accepts RFC 3339, a bare local datetime, or a plain date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(at.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

/// `date` if it parses, else `createdAt`, else `now`.
pub fn resolve_timestamp(order: &Order, now: DateTime<Utc>) -> DateTime<Utc> {
    order
        .date
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| order.created_at.as_deref().and_then(parse_timestamp))
        .unwrap_or(now)
}

/// Orders newest first, split into recent and collapsed history.
#[derive(Debug, Clone, Default)]
pub struct OrderHistory {
    entries: Vec<HistoryEntry>,
    show_history: bool,
}

impl OrderHistory {
    pub fn build(orders: Vec<Order>, now: DateTime<Utc>) -> Self {
        let mut entries: Vec<HistoryEntry> = orders
            .into_iter()
            .map(|order| HistoryEntry {
                placed_at: resolve_timestamp(&order, now),
                order,
                bucket: RecencyBucket::History,
            })
            .collect();
        // stable, so equal timestamps keep store order
        entries.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        for entry in entries.iter_mut().take(RECENT_COUNT) {
            entry.bucket = RecencyBucket::Recent;
        }
        Self {
            entries,
            show_history: false,
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn recent(&self) -> &[HistoryEntry] {
        &self.entries[..self.entries.len().min(RECENT_COUNT)]
    }

    pub fn older(&self) -> &[HistoryEntry] {
        &self.entries[self.entries.len().min(RECENT_COUNT)..]
    }

    /// Recent orders, plus the older ones once history is expanded.
    pub fn visible(&self) -> &[HistoryEntry] {
        if self.show_history {
            &self.entries
        } else {
            self.recent()
        }
    }

    pub fn show_history(&self) -> bool {
        self.show_history
    }

    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_orders(self) -> Vec<Order> {
        self.entries.into_iter().map(|entry| entry.order).collect()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

/// Human-readable age of an order, e.g. "5 minutes ago" or "Yesterday".
pub fn describe_age(placed_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - placed_at).abs();
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        placed_at.format("%b %-d, %Y, %I:%M %p").to_string()
    }
}

/// Mean star rating over rated orders, `None` before the first rating.
pub fn average_rating(ratings: &BTreeMap<RecordId, u8>) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: u32 = ratings.values().map(|&stars| u32::from(stars)).sum();
    Some(f64::from(sum) / ratings.len() as f64)
}
