use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::{clean_list, non_blank};
use crate::validation::{self, ValidationError};

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PartnerStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Furthest onboarding step a partner has completed
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegistrationStep {
    #[default]
    Basic,
    WorkDetails,
    Documents,
    BankDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankDetails {
    pub account_holder: String,
    #[serde(serialize_with = "mask_account")]
    pub account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

/// Account numbers go out with all but the last four digits starred.
fn mask_account<S: serde::Serializer>(account: &str, serializer: S) -> Result<S::Ok, S::Error> {
    let shown = account.len().saturating_sub(4);
    let masked: String = account
        .chars()
        .enumerate()
        .map(|(i, c)| if i < shown { '*' } else { c })
        .collect();
    serializer.serialize_str(&masked)
}

/// A registered broker. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub experience_years: Option<i32>,
    pub operating_cities: Vec<String>,
    pub specialization: Option<String>,
    pub rera_number: Option<String>,
    pub documents: Vec<String>,
    pub bank: Option<BankDetails>,
    pub status: PartnerStatus,
    pub registration_step: RegistrationStep,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Partner {
    pub fn new(signup: &PartnerSignup, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: signup.full_name.trim().to_string(),
            email: signup.email.trim().to_lowercase(),
            phone: signup.phone.trim().to_string(),
            company_name: None,
            experience_years: None,
            operating_cities: Vec::new(),
            specialization: None,
            rera_number: None,
            documents: Vec::new(),
            bank: None,
            status: PartnerStatus::Pending,
            registration_step: RegistrationStep::Basic,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the recorded step forward, never back.
    pub fn reach(&mut self, step: RegistrationStep) {
        self.registration_step = self.registration_step.max(step);
    }
}

/// Step 1 of onboarding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerSignup {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl PartnerSignup {
    pub fn validate(&self) -> validation::Result {
        validation::required("full_name", &self.full_name)?;
        validation::email(&self.email)?;
        validation::phone(&self.phone)?;
        validation::password(&self.password, &self.confirm_password)
    }
}

/// Step 2 of onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkDetails {
    pub company_name: Option<String>,
    pub experience_years: Option<i32>,
    #[serde(default)]
    pub operating_cities: Vec<String>,
    pub specialization: Option<String>,
    pub rera_number: Option<String>,
}

impl WorkDetails {
    pub fn validate(&self) -> validation::Result {
        if self.experience_years.is_some_and(|y| !(0..=80).contains(&y)) {
            return Err(ValidationError::invalid(
                "experience_years",
                "must be between 0 and 80",
            ));
        }
        if self.operating_cities.iter().all(|c| c.trim().is_empty()) {
            return Err(ValidationError::Required("operating_cities"));
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            company_name: non_blank(self.company_name),
            experience_years: self.experience_years,
            operating_cities: clean_list(self.operating_cities),
            specialization: non_blank(self.specialization),
            rera_number: non_blank(self.rera_number),
        }
    }
}

/// Step 3 of onboarding: URLs of already uploaded documents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartnerDocuments {
    pub documents: Vec<String>,
}

impl PartnerDocuments {
    pub fn validate(&self) -> validation::Result {
        if self.documents.iter().all(|d| d.trim().is_empty()) {
            return Err(ValidationError::Required("documents"));
        }
        if let Some(bad) = self
            .documents
            .iter()
            .map(|d| d.trim())
            .find(|d| !d.is_empty() && !d.starts_with("https://") && !d.starts_with("http://"))
        {
            return Err(ValidationError::invalid(
                "documents",
                format!("entry {bad:?} is not a URL"),
            ));
        }
        Ok(())
    }

    pub fn into_urls(self) -> Vec<String> {
        clean_list(self.documents)
    }
}

/// Step 4 of onboarding, with the account number typed twice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDetailsForm {
    pub account_holder: String,
    pub account_number: String,
    pub confirm_account_number: String,
    pub ifsc_code: String,
    pub bank_name: String,
}

impl BankDetailsForm {
    pub fn validate(&self) -> validation::Result {
        validation::required("account_holder", &self.account_holder)?;
        validation::account_number(&self.account_number, &self.confirm_account_number)?;
        validation::ifsc(&self.ifsc_code)?;
        validation::required("bank_name", &self.bank_name)
    }

    pub fn into_details(self) -> BankDetails {
        BankDetails {
            account_holder: self.account_holder.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            ifsc_code: self.ifsc_code.trim().to_uppercase(),
            bank_name: self.bank_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerLogin {
    pub email: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_number_is_masked_when_serialized() {
        let bank = BankDetails {
            account_holder: "Meera Kulkarni".into(),
            account_number: "50100012345678".into(),
            ifsc_code: "HDFC0001234".into(),
            bank_name: "HDFC Bank".into(),
        };
        let json = serde_json::to_value(&bank).unwrap();
        assert_eq!(json["account_number"], "**********5678");
        assert_eq!(json["ifsc_code"], "HDFC0001234");
        assert_eq!(bank.account_number, "50100012345678");

        let short = BankDetails { account_number: "123".into(), ..bank };
        assert_eq!(serde_json::to_value(&short).unwrap()["account_number"], "123");
    }

    fn signup() -> PartnerSignup {
        PartnerSignup {
            full_name: "Meera Kulkarni".into(),
            email: "Meera@Example.in ".into(),
            phone: "9822012345".into(),
            password: "brokerpass1".into(),
            confirm_password: "brokerpass1".into(),
        }
    }

    #[test]
    fn signup_normalizes_email() {
        let form = signup();
        assert!(form.validate().is_ok());
        let partner = Partner::new(&form, "hash".into(), Utc::now());
        assert_eq!(partner.email, "meera@example.in");
        assert_eq!(partner.registration_step, RegistrationStep::Basic);
        assert_eq!(partner.status, PartnerStatus::Pending);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let partner = Partner::new(&signup(), "secret-hash".into(), Utc::now());
        let value = serde_json::to_value(&partner).unwrap();
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn step_only_moves_forward() {
        let mut partner = Partner::new(&signup(), "hash".into(), Utc::now());
        partner.reach(RegistrationStep::BankDetails);
        partner.reach(RegistrationStep::WorkDetails);
        assert_eq!(partner.registration_step, RegistrationStep::BankDetails);
    }

    #[test]
    fn bank_form_checks_confirmation() {
        let form = BankDetailsForm {
            account_holder: "Meera Kulkarni".into(),
            account_number: "001234567890".into(),
            confirm_account_number: "001234567891".into(),
            ifsc_code: "hdfc0000123".into(),
            bank_name: "HDFC Bank".into(),
        };
        assert_eq!(form.validate(), Err(ValidationError::AccountNumberMismatch));
    }

    #[test]
    fn documents_must_be_urls() {
        let docs = PartnerDocuments {
            documents: vec!["https://files.example.in/pan.pdf".into(), "pan.pdf".into()],
        };
        assert!(docs.validate().is_err());
        let empty = PartnerDocuments::default();
        assert_eq!(empty.validate(), Err(ValidationError::Required("documents")));
    }

    #[test]
    fn work_details_need_a_city() {
        let details = WorkDetails {
            operating_cities: vec![" ".into()],
            ..Default::default()
        };
        assert_eq!(
            details.validate(),
            Err(ValidationError::Required("operating_cities"))
        );
    }
}
