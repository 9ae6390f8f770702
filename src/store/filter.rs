use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::models::{ListingType, Property, PropertyStatus, PropertyType};
use crate::validation::ValidationError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Bedroom counts at or above this are grouped into one "4+" bucket
pub const OPEN_ENDED_BEDROOMS: i32 = 4;

/// Raw `GET /properties` query string
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchParams {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// `1`..`3`, or `4` / `4+` for four and up
    pub bedrooms: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
    pub status: Option<PropertyStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedroomFilter {
    Exactly(i32),
    AtLeast(i32),
}

impl BedroomFilter {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let (digits, open_ended) = match trimmed.strip_suffix('+') {
            Some(digits) => (digits.trim(), true),
            None => (trimmed, false),
        };
        let count: i32 = digits
            .parse()
            .map_err(|_| ValidationError::invalid("bedrooms", "must be a number such as 2 or 4+"))?;
        if count < 0 {
            return Err(ValidationError::invalid("bedrooms", "must not be negative"));
        }

        if open_ended || count >= OPEN_ENDED_BEDROOMS {
            Ok(BedroomFilter::AtLeast(count))
        } else {
            Ok(BedroomFilter::Exactly(count))
        }
    }

    pub fn matches(&self, bedrooms: i32) -> bool {
        match *self {
            BedroomFilter::Exactly(n) => bedrooms == n,
            BedroomFilter::AtLeast(n) => bedrooms >= n,
        }
    }
}

/// Validated search criteria. Absent criteria add no predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<BedroomFilter>,
    pub city: Option<String>,
    pub search: Option<String>,
    pub status: Option<PropertyStatus>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self {
            listing_type: None,
            property_type: None,
            min_price: None,
            max_price: None,
            bedrooms: None,
            city: None,
            search: None,
            status: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn text_criterion(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `%needle%` for ILIKE with the LIKE metacharacters escaped.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl TryFrom<SearchParams> for PropertyFilter {
    type Error = ValidationError;

    fn try_from(params: SearchParams) -> Result<Self, Self::Error> {
        for (field, price) in [("min_price", params.min_price), ("max_price", params.max_price)] {
            if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
                return Err(ValidationError::invalid(field, "must not be negative"));
            }
        }
        if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
            if min > max {
                return Err(ValidationError::invalid("min_price", "must not exceed max_price"));
            }
        }
        let bedrooms = match params.bedrooms.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => Some(BedroomFilter::parse(raw)?),
        };
        if params.offset.is_some_and(|o| o < 0) {
            return Err(ValidationError::invalid("offset", "must not be negative"));
        }

        Ok(Self {
            listing_type: params.listing_type,
            property_type: params.property_type,
            min_price: params.min_price,
            max_price: params.max_price,
            bedrooms,
            city: text_criterion(params.city),
            search: text_criterion(params.search),
            status: params.status,
            limit: params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: params.offset.unwrap_or(0),
        })
    }
}

impl PropertyFilter {
    /// In-memory evaluation with the same semantics as the SQL predicates.
    pub fn matches(&self, property: &Property) -> bool {
        if self.listing_type.is_some_and(|t| property.listing_type() != t) {
            return false;
        }
        if self.property_type.is_some_and(|t| property.property_type != t) {
            return false;
        }
        if self.min_price.is_some_and(|min| property.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| property.price > max) {
            return false;
        }
        if self.bedrooms.is_some_and(|b| !b.matches(property.bedrooms)) {
            return false;
        }
        if let Some(city) = &self.city {
            if !contains_ignore_case(&property.city, city) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            let hit = contains_ignore_case(&property.title, needle)
                || contains_ignore_case(&property.description, needle)
                || contains_ignore_case(&property.locality, needle);
            if !hit {
                return false;
            }
        }
        if self.status.is_some_and(|s| property.status != s) {
            return false;
        }
        true
    }

    /// Appends the WHERE clause for the set criteria. Column references use
    /// the `p` alias for the `properties` table.
    pub fn push_predicates(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE TRUE");

        if let Some(listing_type) = self.listing_type {
            builder.push(" AND p.listing_type = ");
            builder.push_bind(listing_type.to_string());
        }
        if let Some(property_type) = self.property_type {
            builder.push(" AND p.property_type = ");
            builder.push_bind(property_type.to_string());
        }
        if let Some(min) = self.min_price {
            builder.push(" AND p.price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = self.max_price {
            builder.push(" AND p.price <= ");
            builder.push_bind(max);
        }
        match self.bedrooms {
            Some(BedroomFilter::Exactly(n)) => {
                builder.push(" AND p.bedrooms = ");
                builder.push_bind(n);
            }
            Some(BedroomFilter::AtLeast(n)) => {
                builder.push(" AND p.bedrooms >= ");
                builder.push_bind(n);
            }
            None => {}
        }
        if let Some(city) = &self.city {
            builder.push(" AND p.city ILIKE ");
            builder.push_bind(like_pattern(city));
        }
        if let Some(needle) = &self.search {
            let pattern = like_pattern(needle);
            builder.push(" AND (p.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.locality ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(status) = self.status {
            builder.push(" AND p.status = ");
            builder.push_bind(status.to_string());
        }
    }

    /// Newest first, then offset/limit.
    pub fn push_order_and_page(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        builder.push_bind(self.limit);
        builder.push(" OFFSET ");
        builder.push_bind(self.offset);
    }
}
