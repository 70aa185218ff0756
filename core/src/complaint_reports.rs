//! Role-gated complaint listings and category totals.

use crate::{
    complaint_service::{ComplaintRecord, ComplaintStatus},
    error::{DeskError, DeskResult},
    store::DeskStore,
    types::UserId,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Filter value meaning "no filter" for category, status, and date alike.
const ALL_SENTINEL: &str = "All";

/// Who is asking for a listing. Decided once from the caller's claims;
/// everything downstream branches on this and never re-checks roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    User(UserId),
    Admin,
    Anonymous,
}

impl Viewer {
    /// Build a viewer from an untrusted role claim. Absent or unrecognized
    /// claims collapse to Anonymous; the refusal happens later, wherever
    /// Anonymous tries to read.
    pub fn from_claim(role: Option<&str>, user_id: Option<UserId>) -> DeskResult<Viewer> {
        match role {
            Some("admin") => Ok(Viewer::Admin),
            Some("user") => match user_id {
                Some(id) => Ok(Viewer::User(id)),
                None => Err(DeskError::Validation {
                    reason: "a user role claim requires a user id".to_string(),
                }),
            },
            _ => Ok(Viewer::Anonymous),
        }
    }
}

/// Calendar-day filter, resolved against the caller's current date so the
/// relative forms stay testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Yesterday,
    On(NaiveDate),
}

impl DateFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "today" => Some(DateFilter::Today),
            "yesterday" => Some(DateFilter::Yesterday),
            other => other.parse::<NaiveDate>().ok().map(DateFilter::On),
        }
    }

    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateFilter::Today => today,
            DateFilter::Yesterday => today.pred_opt().unwrap_or(today),
            DateFilter::On(date) => date,
        }
    }
}

/// Admin listing filter. Unset fields do not narrow the listing.
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub category: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub date: Option<DateFilter>,
}

impl ComplaintFilter {
    /// Build a filter from raw query parameters. The sentinel "All" and
    /// blank values mean unset; anything else must parse.
    pub fn from_params(
        category: Option<&str>,
        status: Option<&str>,
        date: Option<&str>,
    ) -> DeskResult<Self> {
        let mut filter = ComplaintFilter::default();
        if let Some(raw) = category {
            let raw = raw.trim();
            if !raw.is_empty() && raw != ALL_SENTINEL {
                filter.category = Some(raw.to_string());
            }
        }
        if let Some(raw) = status {
            let raw = raw.trim();
            if !raw.is_empty() && raw != ALL_SENTINEL {
                filter.status = Some(ComplaintStatus::parse(raw).ok_or_else(|| {
                    DeskError::Validation {
                        reason: format!("unknown status filter '{raw}'"),
                    }
                })?);
            }
        }
        if let Some(raw) = date {
            let raw = raw.trim();
            if !raw.is_empty() && raw != ALL_SENTINEL {
                filter.date = Some(DateFilter::parse(raw).ok_or_else(|| {
                    DeskError::Validation {
                        reason: format!("unrecognized date filter '{raw}'"),
                    }
                })?);
            }
        }
        Ok(filter)
    }
}

/// Order details carried along with a complaint that references an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderContext {
    pub restaurant_name: String,
    pub items: String,
    pub total_amount: f64,
}

/// A complaint as shown in listings: the record itself, the complainant's
/// username, and the order context when there is one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintListing {
    pub complaint: ComplaintRecord,
    pub username: String,
    pub order: Option<OrderContext>,
}

pub struct ComplaintReports {
    store: DeskStore,
}

impl ComplaintReports {
    pub fn new(store: DeskStore) -> Self {
        Self { store }
    }

    /// List complaints for `viewer`, newest first.
    ///
    /// Users see exactly their own complaints and any filter is ignored
    /// for them. Admins see all complaints narrowed by the filter, with
    /// relative dates resolved against `today`. Anonymous viewers are
    /// refused.
    pub fn list(
        &self,
        viewer: Viewer,
        filter: &ComplaintFilter,
        today: NaiveDate,
    ) -> DeskResult<Vec<ComplaintListing>> {
        match viewer {
            Viewer::User(user_id) => self.store.complaints_for_user(user_id),
            Viewer::Admin => self.store.complaints_filtered(
                filter.category.as_deref(),
                filter.status,
                filter.date.map(|d| d.resolve(today)),
            ),
            Viewer::Anonymous => Err(DeskError::Forbidden {
                reason: "complaint listing requires an authenticated role".to_string(),
            }),
        }
    }

    /// Complaint totals per category, over every complaint on file.
    pub fn category_counts(&self) -> DeskResult<BTreeMap<String, i64>> {
        self.store.category_counts()
    }
}
