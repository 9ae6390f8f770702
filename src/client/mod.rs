//! Typed HTTP client for the marketplace API, plus the multi-step flows a
//! front end drives through it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::error::ErrorBody;
use crate::models::{
    BankDetailsForm, CalculatorRate, CostBreakdown, CostQuery, Inquiry, NewInquiry, NewProperty,
    NewSociety, Partner, PartnerDocuments, PartnerLogin, PartnerSignup, Property, PropertyPatch,
    Society, Viewer, WorkDetails,
};
use crate::seed::SeedReport;
use crate::store::SearchParams;
use crate::validation::ValidationError;

pub mod editor;
pub mod registration;

pub use editor::PropertyEditor;
pub use registration::{PartnerRegistration, Stage};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Cannot {action} during the {stage} step")]
    OutOfOrder { action: &'static str, stage: Stage },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Partner onboarding calls, one per registration step
#[async_trait]
pub trait PartnerApi: Send + Sync {
    async fn register_partner(&self, signup: &PartnerSignup) -> Result<Partner>;

    async fn save_work_details(&self, id: Uuid, details: &WorkDetails) -> Result<Partner>;

    async fn save_documents(&self, id: Uuid, documents: &PartnerDocuments) -> Result<Partner>;

    async fn save_bank_details(&self, id: Uuid, form: &BankDetailsForm) -> Result<Partner>;
}

/// Listing calls used by the property editor
#[async_trait]
pub trait ListingApi: Send + Sync {
    async fn get_property(&self, id: Uuid) -> Result<Property>;

    async fn create_property(&self, property: &NewProperty) -> Result<Property>;

    async fn update_property(&self, id: Uuid, patch: &PropertyPatch) -> Result<Property>;

    async fn get_society(&self, id: Uuid) -> Result<Society>;
}

#[derive(Debug, Clone)]
pub struct MarketClient {
    client: Client,
    base_url: String,
    viewer: Viewer,
}

impl MarketClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("housing-market/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            viewer: Viewer::Public,
        })
    }

    /// Listings fetched through this client include owner contact details
    /// when `viewer` is [`Viewer::Partner`].
    pub fn with_viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = viewer;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {path}");
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {path}");
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("PUT {path}");
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    pub async fn health(&self) -> Result<serde_json::Value> {
        self.get("/health").await
    }

    pub async fn search_properties(&self, params: &SearchParams) -> Result<Vec<Property>> {
        let request = self
            .client
            .get(self.url("/properties"))
            .query(params)
            .query(&[("viewer", self.viewer.to_string())]);
        self.send(request).await
    }

    pub async fn delete_property(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/properties/{id}")))
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from(response).await)
        }
    }

    pub async fn create_society(&self, society: &NewSociety) -> Result<Society> {
        self.post("/societies", society).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Partner> {
        let login = PartnerLogin {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/partners/login", &login).await
    }

    pub async fn create_inquiry(&self, inquiry: &NewInquiry) -> Result<Inquiry> {
        inquiry.validate()?;
        self.post("/property-inquiries", inquiry).await
    }

    pub async fn calculator_rates(&self, state: &str) -> Result<Vec<CalculatorRate>> {
        let request = self
            .client
            .get(self.url("/calculator/rates"))
            .query(&[("state", state)]);
        self.send(request).await
    }

    pub async fn calculate(&self, query: &CostQuery) -> Result<CostBreakdown> {
        query.validate()?;
        self.post("/calculator/calculate", query).await
    }

    pub async fn seed(&self) -> Result<SeedReport> {
        self.post("/seed-data", &serde_json::json!({})).await
    }
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unexpected response")
            .to_string(),
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        Err(error_from(response).await)
    }
}

#[async_trait]
impl PartnerApi for MarketClient {
    async fn register_partner(&self, signup: &PartnerSignup) -> Result<Partner> {
        self.post("/partners", signup).await
    }

    async fn save_work_details(&self, id: Uuid, details: &WorkDetails) -> Result<Partner> {
        self.put(&format!("/partners/{id}/work-details"), details)
            .await
    }

    async fn save_documents(&self, id: Uuid, documents: &PartnerDocuments) -> Result<Partner> {
        self.put(&format!("/partners/{id}/documents"), documents)
            .await
    }

    async fn save_bank_details(&self, id: Uuid, form: &BankDetailsForm) -> Result<Partner> {
        self.put(&format!("/partners/{id}/bank-details"), form)
            .await
    }
}

#[async_trait]
impl ListingApi for MarketClient {
    async fn get_property(&self, id: Uuid) -> Result<Property> {
        self.get(&format!("/properties/{id}?viewer={}", self.viewer))
            .await
    }

    async fn create_property(&self, property: &NewProperty) -> Result<Property> {
        self.post("/properties", property).await
    }

    async fn update_property(&self, id: Uuid, patch: &PropertyPatch) -> Result<Property> {
        self.put(&format!("/properties/{id}"), patch).await
    }

    async fn get_society(&self, id: Uuid) -> Result<Society> {
        self.get(&format!("/societies/{id}")).await
    }
}
