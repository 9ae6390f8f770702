use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, Contact, RequestStatus};
use crate::validation;

/// A buyer or tenant asking about a specific listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inquiry {
    pub id: Uuid,
    pub property_id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInquiry {
    pub property_id: Uuid,
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewInquiry {
    pub fn validate(&self) -> validation::Result {
        self.contact.validate()
    }

    pub fn normalized(self) -> Self {
        Self {
            property_id: self.property_id,
            contact: self.contact.normalized(),
            message: non_blank(self.message),
        }
    }

    pub fn into_inquiry(self, now: DateTime<Utc>) -> Inquiry {
        Inquiry {
            id: Uuid::new_v4(),
            property_id: self.property_id,
            contact: self.contact,
            message: self.message,
            status: RequestStatus::Pending,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryFilter {
    pub status: Option<RequestStatus>,
    pub property_id: Option<Uuid>,
}

impl InquiryFilter {
    pub fn matches(&self, inquiry: &Inquiry) -> bool {
        self.status.map_or(true, |s| inquiry.status == s)
            && self.property_id.map_or(true, |p| inquiry.property_id == p)
    }
}
