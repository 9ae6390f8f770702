//! Four-step partner onboarding: basic details, work details, documents,
//! bank details. Each step is checked locally before it is sent, and the
//! flow only advances once the server accepts the step.

use strum::Display;
use tracing::info;
use uuid::Uuid;

use super::{ClientError, PartnerApi, Result};
use crate::models::{BankDetailsForm, Partner, PartnerDocuments, PartnerSignup, WorkDetails};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Basic,
    WorkDetails,
    Documents,
    BankDetails,
    Complete,
}

pub struct PartnerRegistration<'a, A: PartnerApi + ?Sized> {
    api: &'a A,
    stage: Stage,
    partner: Option<Partner>,
}

impl<'a, A: PartnerApi + ?Sized> PartnerRegistration<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            stage: Stage::Basic,
            partner: None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The partner as last returned by the server.
    pub fn partner(&self) -> Option<&Partner> {
        self.partner.as_ref()
    }

    fn require_stage(&self, stage: Stage, action: &'static str) -> Result<Uuid> {
        if self.stage != stage {
            return Err(ClientError::OutOfOrder {
                action,
                stage: self.stage,
            });
        }
        Ok(self.partner.as_ref().map(|p| p.id).unwrap_or_default())
    }

    fn advance(&mut self, partner: Partner, next: Stage) -> &Partner {
        info!(partner_id = %partner.id, stage = %next, "registration step accepted");
        self.stage = next;
        self.partner.insert(partner)
    }

    pub async fn submit_basic(&mut self, signup: PartnerSignup) -> Result<&Partner> {
        self.require_stage(Stage::Basic, "submit basic details")?;
        signup.validate()?;

        let partner = self.api.register_partner(&signup).await?;
        Ok(self.advance(partner, Stage::WorkDetails))
    }

    pub async fn submit_work_details(&mut self, details: WorkDetails) -> Result<&Partner> {
        let id = self.require_stage(Stage::WorkDetails, "submit work details")?;
        details.validate()?;

        let partner = self.api.save_work_details(id, &details).await?;
        Ok(self.advance(partner, Stage::Documents))
    }

    pub async fn submit_documents(&mut self, documents: PartnerDocuments) -> Result<&Partner> {
        let id = self.require_stage(Stage::Documents, "submit documents")?;
        documents.validate()?;

        let partner = self.api.save_documents(id, &documents).await?;
        Ok(self.advance(partner, Stage::BankDetails))
    }

    pub fn skip_documents(&mut self) -> Result<()> {
        self.require_stage(Stage::Documents, "skip documents")?;
        self.stage = Stage::BankDetails;
        Ok(())
    }

    pub async fn submit_bank_details(&mut self, form: BankDetailsForm) -> Result<&Partner> {
        let id = self.require_stage(Stage::BankDetails, "submit bank details")?;
        form.validate()?;

        let partner = self.api.save_bank_details(id, &form).await?;
        Ok(self.advance(partner, Stage::Complete))
    }

    pub fn skip_bank_details(&mut self) -> Result<()> {
        self.require_stage(Stage::BankDetails, "skip bank details")?;
        self.stage = Stage::Complete;
        Ok(())
    }
}
