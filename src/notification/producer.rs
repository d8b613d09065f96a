use serde::Deserialize;

use crate::notification::model::{NewNotification, NotificationError, NotificationType};

/// Reviewer action on a business's payment receipt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ReceiptDecision {
    Approved,
    Rejected {
        reason: String,
        #[serde(default)]
        note: Option<String>,
    },
    NoteAdded {
        note: String,
    },
}

impl ReceiptDecision {
    /// Build the notification announcing this decision for `receipt_id`.
    pub fn to_notification(&self, receipt_id: &str) -> Result<NewNotification, NotificationError> {
        let notification = match self {
            ReceiptDecision::Approved => NewNotification::new(
                NotificationType::Success,
                format!("Receipt {} was approved.", receipt_id),
            )
            .with_title("Receipt approved"),
            ReceiptDecision::Rejected { reason, note } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    return Err(NotificationError::MissingReason);
                }
                NewNotification::new(
                    NotificationType::Error,
                    format!(
                        "Receipt {} was rejected: {}",
                        receipt_id,
                        rejection_reason(reason, note.as_deref())
                    ),
                )
                .with_title("Receipt rejected")
            }
            ReceiptDecision::NoteAdded { note } => {
                let note = note.trim();
                if note.is_empty() {
                    return Err(NotificationError::EmptyMessage);
                }
                NewNotification::new(
                    NotificationType::Info,
                    format!("Receipt {}: {}", receipt_id, note),
                )
                .with_title("Note added to receipt")
            }
        };
        Ok(notification)
    }
}

/// `reason` alone, or `reason: note` when a non-empty note is given.
pub fn rejection_reason(reason: &str, note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{}: {}", reason, note),
        None => reason.to_string(),
    }
}
