pub mod agreement;
pub mod calculator;
pub mod inquiry;
pub mod partner;
pub mod property;
pub mod requests;
pub mod society;

pub use agreement::{Agreement, NewAgreement};
pub use calculator::{CalculatorRate, CostBreakdown, CostQuery, NewRate};
pub use inquiry::{Inquiry, InquiryFilter, NewInquiry};
pub use partner::{
    BankDetails, BankDetailsForm, Partner, PartnerDocuments, PartnerLogin, PartnerSignup,
    PartnerStatus, RegistrationStep, WorkDetails,
};
pub use property::{
    Furnishing, ListingDetails, ListingType, NewProperty, NewProjectDetails, OwnershipType,
    Property, PropertyPatch, PropertyStatus, PropertyType, RentDetails, ResaleDetails, Viewer,
};
pub use requests::{
    HouseSize, LegalServiceRequest, LegalServiceType, MovingRequest, NewLegalServiceRequest,
    NewMovingRequest, NewPropertyTransfer, PropertyTransfer, TransferType,
};
pub use society::{NewSociety, Society};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::validation;

/// Processing state of an intake record (inquiry, legal request, move, ...)
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

/// Who to call back about an intake record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn validate(&self) -> validation::Result {
        validation::required("name", &self.name)?;
        validation::email(&self.email)?;
        validation::phone(&self.phone)
    }

    /// Trimmed copy with the email lowercased.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: self.phone.trim().to_string(),
        }
    }
}

/// Body of the status-change endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate<S> {
    pub status: S,
}

/// Treats blank optional text as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims list entries and drops the empty ones.
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
