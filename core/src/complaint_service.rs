//! Complaint intake and status updates.
//!
//! Submission validates the text, asks the classifier for a category, and
//! persists the complaint as Pending in one pass. When the classifier
//! artifact could not be loaded the service runs degraded: submissions are
//! refused outright and nothing is recorded.

use crate::{
    classifier::Classifier,
    error::{DeskError, DeskResult},
    store::DeskStore,
    types::{ComplaintId, OrderId, UserId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    Verified,
    Resolved,
    #[serde(rename = "Not Responded")]
    NotResponded,
}

impl ComplaintStatus {
    /// Every status a complaint can hold. Transitions are unrestricted:
    /// an update may move a complaint from any status to any other.
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Verified,
        ComplaintStatus::Resolved,
        ComplaintStatus::NotResponded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::Verified => "Verified",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::NotResponded => "Not Responded",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Pending" => Some(ComplaintStatus::Pending),
            "Verified" => Some(ComplaintStatus::Verified),
            "Resolved" => Some(ComplaintStatus::Resolved),
            "Not Responded" => Some(ComplaintStatus::NotResponded),
            _ => None,
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub complaint_id: ComplaintId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub text: String,
    pub category: String,
    pub status: ComplaintStatus,
    pub admin_response: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// What the submitter gets back: the assigned id and category, the
/// starting status, and the complaint text echoed verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub complaint_id: ComplaintId,
    pub category: String,
    pub status: ComplaintStatus,
    pub text: String,
}

pub struct ComplaintService {
    store: DeskStore,
    classifier: Option<Arc<dyn Classifier>>,
}

impl ComplaintService {
    pub fn new(store: DeskStore, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self { store, classifier }
    }

    /// False when the classifier artifact failed to load at startup.
    pub fn classification_available(&self) -> bool {
        self.classifier.is_some()
    }

    /// File a complaint. The text is stored exactly as submitted; only the
    /// blank check looks at a trimmed copy. `order_id` is optional and must
    /// reference an existing order when present.
    pub fn submit(
        &self,
        user_id: UserId,
        order_id: Option<OrderId>,
        text: &str,
        now: DateTime<Utc>,
    ) -> DeskResult<SubmissionReceipt> {
        if text.trim().is_empty() {
            return Err(DeskError::Validation {
                reason: "complaint text must not be blank".to_string(),
            });
        }
        let classifier = match &self.classifier {
            Some(classifier) => classifier,
            None => return Err(DeskError::ClassifierUnavailable),
        };
        let category = classifier.classify(text);
        let complaint_id = self.store.insert_complaint(
            user_id,
            order_id,
            text,
            &category,
            ComplaintStatus::Pending,
            now,
        )?;
        log::debug!("complaint {complaint_id} from user {user_id} classified as '{category}'");
        Ok(SubmissionReceipt {
            complaint_id,
            category,
            status: ComplaintStatus::Pending,
            text: text.to_string(),
        })
    }

    /// Set a complaint's status, optionally attaching an admin response in
    /// the same update. A blank response is treated as omitted, and an
    /// omitted response never clears one already stored. Repeating an
    /// update is harmless.
    pub fn update_status(
        &self,
        complaint_id: ComplaintId,
        status: ComplaintStatus,
        admin_response: Option<&str>,
    ) -> DeskResult<ComplaintRecord> {
        let response = admin_response.map(str::trim).filter(|r| !r.is_empty());
        let updated = self.store.set_complaint_status(complaint_id, status, response)?;
        if !updated {
            return Err(DeskError::ComplaintNotFound { complaint_id });
        }
        log::debug!("complaint {complaint_id} moved to status '{status}'");
        match self.store.get_complaint(complaint_id)? {
            Some(record) => Ok(record),
            None => Err(DeskError::ComplaintNotFound { complaint_id }),
        }
    }

    pub fn get(&self, complaint_id: ComplaintId) -> DeskResult<Option<ComplaintRecord>> {
        self.store.get_complaint(complaint_id)
    }
}
