//! Create/edit form state for a listing.
//!
//! A new listing is sent whole. An existing listing is loaded once, and
//! saving sends only the fields that differ from that snapshot.

use uuid::Uuid;

use super::{ListingApi, Result};
use crate::models::{NewProperty, Property, PropertyPatch, Society};

#[derive(Debug, Clone)]
pub struct PropertyEditor {
    draft: NewProperty,
    snapshot: Option<Property>,
}

impl PropertyEditor {
    pub fn create(draft: NewProperty) -> Self {
        Self {
            draft,
            snapshot: None,
        }
    }

    pub fn edit(snapshot: Property) -> Self {
        Self {
            draft: NewProperty::from(snapshot.clone()),
            snapshot: Some(snapshot),
        }
    }

    pub async fn load<A: ListingApi + ?Sized>(api: &A, id: Uuid) -> Result<Self> {
        Ok(Self::edit(api.get_property(id).await?))
    }

    pub fn is_editing(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn draft(&self) -> &NewProperty {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut NewProperty {
        &mut self.draft
    }

    /// Copies the society's location into the draft and links to it.
    pub fn apply_society(&mut self, society: &Society) {
        let draft = &mut self.draft;
        draft.society_id = Some(society.id);
        draft.address = society.address.clone();
        draft.locality = society.locality.clone();
        draft.city = society.city.clone();
        draft.state = society.state.clone();
        draft.pincode = society.pincode.clone();
        if society.total_floors.is_some() {
            draft.total_floors = society.total_floors;
        }
    }

    pub async fn select_society<A>(&mut self, api: &A, id: Uuid) -> Result<()>
    where
        A: ListingApi + ?Sized,
    {
        let society = api.get_society(id).await?;
        self.apply_society(&society);
        Ok(())
    }

    /// What an edit save would send, or `None` for a new listing.
    pub fn pending_patch(&self) -> Option<PropertyPatch> {
        self.snapshot
            .as_ref()
            .map(|snapshot| PropertyPatch::diff(snapshot, &self.draft))
    }

    /// Validates the draft, then creates or updates the listing. An edit with
    /// no changes makes no request.
    pub async fn save<A: ListingApi + ?Sized>(&mut self, api: &A) -> Result<Property> {
        self.draft.validate()?;

        let saved = match &self.snapshot {
            None => api.create_property(&self.draft).await?,
            Some(snapshot) => {
                let patch = PropertyPatch::diff(snapshot, &self.draft);
                if patch.is_empty() {
                    return Ok(snapshot.clone());
                }
                tracing::debug!(property_id = %snapshot.id, "sending listing changes");
                api.update_property(snapshot.id, &patch).await?
            }
        };

        *self = Self::edit(saved.clone());
        Ok(saved)
    }
}
