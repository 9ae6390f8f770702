//! Postgres-backed store. Enum columns are stored as their snake_case text.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use super::error::{Result, StoreError};
use super::filter::{like_pattern, PropertyFilter};
use super::traits::{IntakeStore, PartnerStore, PropertyStore, RateStore, SocietyStore};
use crate::models::{
    Agreement, BankDetails, CalculatorRate, Contact, Inquiry, InquiryFilter, LegalServiceRequest,
    ListingDetails, MovingRequest, NewProjectDetails, NewProperty, NewRate, NewSociety, Partner,
    PartnerStatus, Property, PropertyPatch, PropertyTransfer, RegistrationStep, RentDetails,
    RequestStatus, ResaleDetails, Society, WorkDetails,
};

pub static MIGRATIONS: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        MIGRATIONS.run(&self.pool).await
    }
}

fn parse<T>(column: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| StoreError::corrupt(column, e))
}

fn parse_opt<T>(column: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|v| parse(column, &v)).transpose()
}

/// A foreign-key violation means the referenced `what` does not exist.
fn missing_reference(err: sqlx::Error, what: &'static str) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound(what),
        err => err.into(),
    }
}

fn required<T>(column: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| StoreError::corrupt(column, "missing detail row"))
}

// ---------------------------------------------------------------------------
// properties

const PROPERTY_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.description, p.property_type, p.listing_type, p.price,
        p.area_sqft, p.bedrooms, p.bathrooms, p.address, p.locality, p.city,
        p.state, p.pincode, p.latitude, p.longitude, p.floor_number,
        p.total_floors, p.furnishing, p.amenities, p.photos, p.status,
        p.society_id, p.partner_id, p.owner_name, p.owner_phone, p.owner_email,
        p.created_at, p.updated_at,
        r.monthly_rent, r.security_deposit, r.maintenance, r.available_from,
        r.preferred_tenants,
        s.ownership_type, s.property_age_years,
        n.builder_name, n.project_name, n.possession_date, n.rera_id
    FROM properties p
    LEFT JOIN rent_details r ON r.property_id = p.id
    LEFT JOIN resale_details s ON s.property_id = p.id
    LEFT JOIN new_project_details n ON n.property_id = p.id"#;

#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    title: String,
    description: String,
    property_type: String,
    listing_type: String,
    price: f64,
    area_sqft: f64,
    bedrooms: i32,
    bathrooms: i32,
    address: String,
    locality: String,
    city: String,
    state: String,
    pincode: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    floor_number: Option<i32>,
    total_floors: Option<i32>,
    furnishing: Option<String>,
    amenities: Vec<String>,
    photos: Vec<String>,
    status: String,
    society_id: Option<Uuid>,
    partner_id: Option<Uuid>,
    owner_name: Option<String>,
    owner_phone: Option<String>,
    owner_email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    monthly_rent: Option<f64>,
    security_deposit: Option<f64>,
    maintenance: Option<f64>,
    available_from: Option<NaiveDate>,
    preferred_tenants: Option<String>,
    ownership_type: Option<String>,
    property_age_years: Option<i32>,
    builder_name: Option<String>,
    project_name: Option<String>,
    possession_date: Option<NaiveDate>,
    rera_id: Option<String>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = StoreError;

    fn try_from(row: PropertyRow) -> Result<Self> {
        let details = match row.listing_type.as_str() {
            "rent" => ListingDetails::Rent(RentDetails {
                monthly_rent: required("monthly_rent", row.monthly_rent)?,
                security_deposit: required("security_deposit", row.security_deposit)?,
                maintenance: row.maintenance,
                available_from: row.available_from,
                preferred_tenants: row.preferred_tenants,
            }),
            "resale" => ListingDetails::Resale(ResaleDetails {
                ownership_type: parse(
                    "ownership_type",
                    &required("ownership_type", row.ownership_type)?,
                )?,
                property_age_years: row.property_age_years,
            }),
            "new" => ListingDetails::New(NewProjectDetails {
                builder_name: required("builder_name", row.builder_name)?,
                project_name: row.project_name,
                possession_date: row.possession_date,
                rera_id: row.rera_id,
            }),
            other => return Err(StoreError::corrupt("listing_type", other)),
        };

        Ok(Property {
            id: row.id,
            title: row.title,
            description: row.description,
            property_type: parse("property_type", &row.property_type)?,
            details,
            price: row.price,
            area_sqft: row.area_sqft,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            address: row.address,
            locality: row.locality,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            latitude: row.latitude,
            longitude: row.longitude,
            floor_number: row.floor_number,
            total_floors: row.total_floors,
            furnishing: parse_opt("furnishing", row.furnishing)?,
            amenities: row.amenities,
            photos: row.photos,
            status: parse("status", &row.status)?,
            society_id: row.society_id,
            partner_id: row.partner_id,
            owner_name: row.owner_name,
            owner_phone: row.owner_phone,
            owner_email: row.owner_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn insert_details(conn: &mut PgConnection, id: Uuid, details: &ListingDetails) -> Result<()> {
    match details {
        ListingDetails::Rent(rent) => {
            sqlx::query(
                r#"
                INSERT INTO rent_details (
                    property_id, monthly_rent, security_deposit, maintenance,
                    available_from, preferred_tenants
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id)
            .bind(rent.monthly_rent)
            .bind(rent.security_deposit)
            .bind(rent.maintenance)
            .bind(rent.available_from)
            .bind(&rent.preferred_tenants)
            .execute(&mut *conn)
            .await?;
        }
        ListingDetails::Resale(resale) => {
            sqlx::query(
                r#"
                INSERT INTO resale_details (property_id, ownership_type, property_age_years)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(id)
            .bind(resale.ownership_type.to_string())
            .bind(resale.property_age_years)
            .execute(&mut *conn)
            .await?;
        }
        ListingDetails::New(project) => {
            sqlx::query(
                r#"
                INSERT INTO new_project_details (
                    property_id, builder_name, project_name, possession_date, rera_id
                )
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(&project.builder_name)
            .bind(&project.project_name)
            .bind(project.possession_date)
            .bind(&project.rera_id)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

async fn delete_details(conn: &mut PgConnection, id: Uuid) -> Result<()> {
    for table in ["rent_details", "resale_details", "new_project_details"] {
        sqlx::query(&format!("DELETE FROM {table} WHERE property_id = $1"))
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// Appends `, column = $n` for every plain column present in the patch.
macro_rules! set_columns {
    ($builder:ident, $patch:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $builder.push(concat!(", ", stringify!($field), " = "));
                $builder.push_bind(value.clone());
            }
        )+
    };
}

fn push_patch(builder: &mut QueryBuilder<'_, Postgres>, patch: &PropertyPatch) {
    set_columns!(builder, patch;
        title, description, price, area_sqft, bedrooms, bathrooms, address, locality, city,
        state, pincode, latitude, longitude, floor_number, total_floors, amenities, photos,
        society_id, partner_id, owner_name, owner_phone, owner_email,
    );
    if let Some(property_type) = patch.property_type {
        builder.push(", property_type = ");
        builder.push_bind(property_type.to_string());
    }
    if let Some(furnishing) = patch.furnishing {
        builder.push(", furnishing = ");
        builder.push_bind(furnishing.to_string());
    }
    if let Some(status) = patch.status {
        builder.push(", status = ");
        builder.push_bind(status.to_string());
    }
    if let Some(details) = &patch.details {
        builder.push(", listing_type = ");
        builder.push_bind(details.listing_type().to_string());
    }
}

impl PgStore {
    async fn fetch_property(&self, id: Uuid) -> Result<Option<Property>> {
        let row: Option<PropertyRow> =
            sqlx::query_as(&format!("{PROPERTY_SELECT} WHERE p.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Property::try_from).transpose()
    }
}

#[async_trait]
impl PropertyStore for PgStore {
    #[tracing::instrument(skip(self, property), fields(title = %property.title))]
    async fn create_property(&self, property: NewProperty) -> Result<Property> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO properties (
                id, title, description, property_type, listing_type, price, area_sqft,
                bedrooms, bathrooms, address, locality, city, state, pincode, latitude,
                longitude, floor_number, total_floors, furnishing, amenities, photos,
                status, society_id, partner_id, owner_name, owner_phone, owner_email
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            "#,
        )
        .bind(id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.property_type.to_string())
        .bind(property.details.listing_type().to_string())
        .bind(property.price)
        .bind(property.area_sqft)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(&property.address)
        .bind(&property.locality)
        .bind(&property.city)
        .bind(&property.state)
        .bind(&property.pincode)
        .bind(property.latitude)
        .bind(property.longitude)
        .bind(property.floor_number)
        .bind(property.total_floors)
        .bind(property.furnishing.map(|f| f.to_string()))
        .bind(&property.amenities)
        .bind(&property.photos)
        .bind(property.status.to_string())
        .bind(property.society_id)
        .bind(property.partner_id)
        .bind(&property.owner_name)
        .bind(&property.owner_phone)
        .bind(&property.owner_email)
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, "Partner"))?;

        insert_details(&mut tx, id, &property.details).await?;
        tx.commit().await?;

        tracing::debug!(%id, "inserted property and listing details");

        self.fetch_property(id)
            .await?
            .ok_or_else(|| StoreError::corrupt("id", "inserted property vanished"))
    }

    async fn get_property(&self, id: Uuid) -> Result<Option<Property>> {
        self.fetch_property(id).await
    }

    #[tracing::instrument(skip(self))]
    async fn search_properties(&self, filter: &PropertyFilter) -> Result<Vec<Property>> {
        let mut builder = QueryBuilder::<Postgres>::new(PROPERTY_SELECT);
        filter.push_predicates(&mut builder);
        filter.push_order_and_page(&mut builder);

        let rows: Vec<PropertyRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Property::try_from).collect()
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update_property(&self, id: Uuid, patch: PropertyPatch) -> Result<Option<Property>> {
        let mut tx = self.pool.begin().await?;

        let current: Option<PropertyRow> =
            sqlx::query_as(&format!("{PROPERTY_SELECT} WHERE p.id = $1 FOR UPDATE OF p"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current.map(Property::try_from).transpose()? else {
            return Ok(None);
        };
        patch.merged_into(&current)?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE properties SET updated_at = now()");
        push_patch(&mut builder, &patch);
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| missing_reference(e, "Partner"))?;

        if let Some(details) = &patch.details {
            delete_details(&mut tx, id).await?;
            insert_details(&mut tx, id, details).await?;
        }
        tx.commit().await?;

        self.fetch_property(id).await
    }

    async fn delete_property(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// societies

const SOCIETY_COLUMNS: &str = "id, name, address, locality, city, state, pincode, total_floors, \
     total_towers, build_year, amenities, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SocietyRow {
    id: Uuid,
    name: String,
    address: String,
    locality: String,
    city: String,
    state: String,
    pincode: String,
    total_floors: Option<i32>,
    total_towers: Option<i32>,
    build_year: Option<i32>,
    amenities: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SocietyRow> for Society {
    fn from(row: SocietyRow) -> Self {
        Society {
            id: row.id,
            name: row.name,
            address: row.address,
            locality: row.locality,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            total_floors: row.total_floors,
            total_towers: row.total_towers,
            build_year: row.build_year,
            amenities: row.amenities,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl SocietyStore for PgStore {
    async fn create_society(&self, society: NewSociety) -> Result<Society> {
        let row: SocietyRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO societies (
                id, name, address, locality, city, state, pincode, total_floors,
                total_towers, build_year, amenities
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SOCIETY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&society.name)
        .bind(&society.address)
        .bind(&society.locality)
        .bind(&society.city)
        .bind(&society.state)
        .bind(&society.pincode)
        .bind(society.total_floors)
        .bind(society.total_towers)
        .bind(society.build_year)
        .bind(&society.amenities)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_society(&self, id: Uuid) -> Result<Option<Society>> {
        let row: Option<SocietyRow> =
            sqlx::query_as(&format!("SELECT {SOCIETY_COLUMNS} FROM societies WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Society::from))
    }

    async fn list_societies(&self, city: Option<&str>) -> Result<Vec<Society>> {
        let pattern = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(like_pattern);
        let rows: Vec<SocietyRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SOCIETY_COLUMNS} FROM societies
            WHERE ($1::text IS NULL OR city ILIKE $1)
            ORDER BY LOWER(name), id
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Society::from).collect())
    }

    async fn replace_society(&self, id: Uuid, society: NewSociety) -> Result<Option<Society>> {
        let row: Option<SocietyRow> = sqlx::query_as(&format!(
            r#"
            UPDATE societies SET
                name = $2, address = $3, locality = $4, city = $5, state = $6,
                pincode = $7, total_floors = $8, total_towers = $9, build_year = $10,
                amenities = $11, updated_at = now()
            WHERE id = $1
            RETURNING {SOCIETY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&society.name)
        .bind(&society.address)
        .bind(&society.locality)
        .bind(&society.city)
        .bind(&society.state)
        .bind(&society.pincode)
        .bind(society.total_floors)
        .bind(society.total_towers)
        .bind(society.build_year)
        .bind(&society.amenities)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Society::from))
    }

    async fn delete_society(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM societies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_societies(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM societies")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ---------------------------------------------------------------------------
// partners

const PARTNER_COLUMNS: &str = "id, full_name, email, phone, password_hash, company_name, \
     experience_years, operating_cities, specialization, rera_number, documents, \
     account_holder, account_number, ifsc_code, bank_name, status, registration_step, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
struct PartnerRow {
    id: Uuid,
    full_name: String,
    email: String,
    phone: String,
    password_hash: String,
    company_name: Option<String>,
    experience_years: Option<i32>,
    operating_cities: Vec<String>,
    specialization: Option<String>,
    rera_number: Option<String>,
    documents: Vec<String>,
    account_holder: Option<String>,
    account_number: Option<String>,
    ifsc_code: Option<String>,
    bank_name: Option<String>,
    status: String,
    registration_step: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PartnerRow> for Partner {
    type Error = StoreError;

    fn try_from(row: PartnerRow) -> Result<Self> {
        let bank = match (row.account_holder, row.account_number, row.ifsc_code, row.bank_name) {
            (Some(account_holder), Some(account_number), Some(ifsc_code), Some(bank_name)) => {
                Some(BankDetails {
                    account_holder,
                    account_number,
                    ifsc_code,
                    bank_name,
                })
            }
            _ => None,
        };

        Ok(Partner {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            company_name: row.company_name,
            experience_years: row.experience_years,
            operating_cities: row.operating_cities,
            specialization: row.specialization,
            rera_number: row.rera_number,
            documents: row.documents,
            bank,
            status: parse("status", &row.status)?,
            registration_step: parse("registration_step", &row.registration_step)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl PgStore {
    /// Loads the partner under a row lock, applies `update`, and writes back
    /// every mutable column.
    async fn update_partner(
        &self,
        id: Uuid,
        update: impl FnOnce(&mut Partner) + Send,
    ) -> Result<Option<Partner>> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PartnerRow> = sqlx::query_as(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mut partner) = row.map(Partner::try_from).transpose()? else {
            return Ok(None);
        };
        update(&mut partner);

        let bank = partner.bank.as_ref();
        let row: PartnerRow = sqlx::query_as(&format!(
            r#"
            UPDATE partners SET
                company_name = $2, experience_years = $3, operating_cities = $4,
                specialization = $5, rera_number = $6, documents = $7,
                account_holder = $8, account_number = $9, ifsc_code = $10, bank_name = $11,
                status = $12, registration_step = $13, updated_at = now()
            WHERE id = $1
            RETURNING {PARTNER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&partner.company_name)
        .bind(partner.experience_years)
        .bind(&partner.operating_cities)
        .bind(&partner.specialization)
        .bind(&partner.rera_number)
        .bind(&partner.documents)
        .bind(bank.map(|b| b.account_holder.clone()))
        .bind(bank.map(|b| b.account_number.clone()))
        .bind(bank.map(|b| b.ifsc_code.clone()))
        .bind(bank.map(|b| b.bank_name.clone()))
        .bind(partner.status.to_string())
        .bind(partner.registration_step.to_string())
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Partner::try_from(row).map(Some)
    }
}

#[async_trait]
impl PartnerStore for PgStore {
    #[tracing::instrument(skip(self, partner), fields(partner_id = %partner.id))]
    async fn create_partner(&self, partner: Partner) -> Result<Partner> {
        let result = sqlx::query_as::<_, PartnerRow>(&format!(
            r#"
            INSERT INTO partners (
                id, full_name, email, phone, password_hash, status, registration_step
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PARTNER_COLUMNS}
            "#
        ))
        .bind(partner.id)
        .bind(&partner.full_name)
        .bind(&partner.email)
        .bind(&partner.phone)
        .bind(&partner.password_hash)
        .bind(partner.status.to_string())
        .bind(partner.registration_step.to_string())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Partner::try_from(row),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                StoreError::Conflict("A partner with this email already exists".into()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn get_partner(&self, id: Uuid) -> Result<Option<Partner>> {
        let row: Option<PartnerRow> =
            sqlx::query_as(&format!("SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Partner::try_from).transpose()
    }

    async fn find_partner_by_email(&self, email: &str) -> Result<Option<Partner>> {
        let row: Option<PartnerRow> = sqlx::query_as(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Partner::try_from).transpose()
    }

    async fn list_partners(&self, status: Option<PartnerStatus>) -> Result<Vec<Partner>> {
        let rows: Vec<PartnerRow> = sqlx::query_as(&format!(
            r#"
            SELECT {PARTNER_COLUMNS} FROM partners
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(status.map(|s| s.to_string()))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Partner::try_from).collect()
    }

    async fn save_work_details(&self, id: Uuid, details: WorkDetails) -> Result<Option<Partner>> {
        self.update_partner(id, move |partner| {
            partner.company_name = details.company_name;
            partner.experience_years = details.experience_years;
            partner.operating_cities = details.operating_cities;
            partner.specialization = details.specialization;
            partner.rera_number = details.rera_number;
            partner.reach(RegistrationStep::WorkDetails);
        })
        .await
    }

    async fn save_documents(&self, id: Uuid, documents: Vec<String>) -> Result<Option<Partner>> {
        self.update_partner(id, move |partner| {
            partner.documents = documents;
            partner.reach(RegistrationStep::Documents);
        })
        .await
    }

    async fn save_bank_details(&self, id: Uuid, bank: BankDetails) -> Result<Option<Partner>> {
        self.update_partner(id, move |partner| {
            partner.bank = Some(bank);
            partner.reach(RegistrationStep::BankDetails);
        })
        .await
    }

    async fn set_partner_status(
        &self,
        id: Uuid,
        status: PartnerStatus,
    ) -> Result<Option<Partner>> {
        self.update_partner(id, move |partner| partner.status = status)
            .await
    }
}

// ---------------------------------------------------------------------------
// intake records

#[derive(sqlx::FromRow)]
struct InquiryRow {
    id: Uuid,
    property_id: Uuid,
    name: String,
    email: String,
    phone: String,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InquiryRow> for Inquiry {
    type Error = StoreError;

    fn try_from(row: InquiryRow) -> Result<Self> {
        Ok(Inquiry {
            id: row.id,
            property_id: row.property_id,
            contact: Contact {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            message: row.message,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LegalRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    service_type: String,
    property_address: Option<String>,
    city: String,
    remarks: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LegalRow> for LegalServiceRequest {
    type Error = StoreError;

    fn try_from(row: LegalRow) -> Result<Self> {
        Ok(LegalServiceRequest {
            id: row.id,
            contact: Contact {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            service_type: parse("service_type", &row.service_type)?,
            property_address: row.property_address,
            city: row.city,
            remarks: row.remarks,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MovingRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    from_city: String,
    from_address: String,
    to_city: String,
    to_address: String,
    moving_date: NaiveDate,
    house_size: String,
    remarks: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovingRow> for MovingRequest {
    type Error = StoreError;

    fn try_from(row: MovingRow) -> Result<Self> {
        Ok(MovingRequest {
            id: row.id,
            contact: Contact {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            from_city: row.from_city,
            from_address: row.from_address,
            to_city: row.to_city,
            to_address: row.to_address,
            moving_date: row.moving_date,
            house_size: parse("house_size", &row.house_size)?,
            remarks: row.remarks,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AgreementRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    landlord_name: String,
    tenant_name: String,
    property_address: String,
    city: String,
    monthly_rent: f64,
    security_deposit: f64,
    start_date: NaiveDate,
    duration_months: i32,
    notice_period_months: i32,
    remarks: Option<String>,
    document: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AgreementRow> for Agreement {
    type Error = StoreError;

    fn try_from(row: AgreementRow) -> Result<Self> {
        Ok(Agreement {
            id: row.id,
            contact: Contact {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            landlord_name: row.landlord_name,
            tenant_name: row.tenant_name,
            property_address: row.property_address,
            city: row.city,
            monthly_rent: row.monthly_rent,
            security_deposit: row.security_deposit,
            start_date: row.start_date,
            duration_months: u32::try_from(row.duration_months)
                .map_err(|e| StoreError::corrupt("duration_months", e))?,
            notice_period_months: u32::try_from(row.notice_period_months)
                .map_err(|e| StoreError::corrupt("notice_period_months", e))?,
            remarks: row.remarks,
            document: row.document,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    transfer_type: String,
    seller_name: String,
    buyer_name: String,
    property_address: String,
    city: String,
    state: String,
    property_value: Option<f64>,
    remarks: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransferRow> for PropertyTransfer {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> Result<Self> {
        Ok(PropertyTransfer {
            id: row.id,
            contact: Contact {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            transfer_type: parse("transfer_type", &row.transfer_type)?,
            seller_name: row.seller_name,
            buyer_name: row.buyer_name,
            property_address: row.property_address,
            city: row.city,
            state: row.state,
            property_value: row.property_value,
            remarks: row.remarks,
            status: parse("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

fn status_text(status: Option<RequestStatus>) -> Option<String> {
    status.map(|s| s.to_string())
}

#[async_trait]
impl IntakeStore for PgStore {
    async fn create_inquiry(&self, inquiry: Inquiry) -> Result<Inquiry> {
        let result = sqlx::query(
            r#"
            INSERT INTO property_inquiries (
                id, property_id, name, email, phone, message, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(inquiry.id)
        .bind(inquiry.property_id)
        .bind(&inquiry.contact.name)
        .bind(&inquiry.contact.email)
        .bind(&inquiry.contact.phone)
        .bind(&inquiry.message)
        .bind(inquiry.status.to_string())
        .bind(inquiry.created_at)
        .execute(&self.pool)
        .await;

        result.map_err(|e| missing_reference(e, "Property"))?;
        Ok(inquiry)
    }

    async fn list_inquiries(&self, filter: &InquiryFilter) -> Result<Vec<Inquiry>> {
        let rows: Vec<InquiryRow> = sqlx::query_as(
            r#"
            SELECT id, property_id, name, email, phone, message, status, created_at
            FROM property_inquiries
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR property_id = $2)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status_text(filter.status))
        .bind(filter.property_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Inquiry::try_from).collect()
    }

    async fn set_inquiry_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<Inquiry>> {
        let row: Option<InquiryRow> = sqlx::query_as(
            r#"
            UPDATE property_inquiries SET status = $2
            WHERE id = $1
            RETURNING id, property_id, name, email, phone, message, status, created_at
            "#,
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Inquiry::try_from).transpose()
    }

    async fn create_legal_request(
        &self,
        request: LegalServiceRequest,
    ) -> Result<LegalServiceRequest> {
        sqlx::query(
            r#"
            INSERT INTO legal_service_requests (
                id, name, email, phone, service_type, property_address, city, remarks,
                status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(request.id)
        .bind(&request.contact.name)
        .bind(&request.contact.email)
        .bind(&request.contact.phone)
        .bind(request.service_type.to_string())
        .bind(&request.property_address)
        .bind(&request.city)
        .bind(&request.remarks)
        .bind(request.status.to_string())
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_legal_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<LegalServiceRequest>> {
        let rows: Vec<LegalRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, service_type, property_address, city, remarks,
                   status, created_at
            FROM legal_service_requests
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status_text(status))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LegalServiceRequest::try_from).collect()
    }

    async fn create_moving_request(&self, request: MovingRequest) -> Result<MovingRequest> {
        sqlx::query(
            r#"
            INSERT INTO moving_requests (
                id, name, email, phone, from_city, from_address, to_city, to_address,
                moving_date, house_size, remarks, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(request.id)
        .bind(&request.contact.name)
        .bind(&request.contact.email)
        .bind(&request.contact.phone)
        .bind(&request.from_city)
        .bind(&request.from_address)
        .bind(&request.to_city)
        .bind(&request.to_address)
        .bind(request.moving_date)
        .bind(request.house_size.to_string())
        .bind(&request.remarks)
        .bind(request.status.to_string())
        .bind(request.created_at)
        .execute(&self.pool)
        .await?;
        Ok(request)
    }

    async fn list_moving_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<MovingRequest>> {
        let rows: Vec<MovingRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, from_city, from_address, to_city, to_address,
                   moving_date, house_size, remarks, status, created_at
            FROM moving_requests
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status_text(status))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(MovingRequest::try_from).collect()
    }

    async fn create_agreement(&self, agreement: Agreement) -> Result<Agreement> {
        let duration = i32::try_from(agreement.duration_months)
            .map_err(|e| StoreError::corrupt("duration_months", e))?;
        let notice = i32::try_from(agreement.notice_period_months)
            .map_err(|e| StoreError::corrupt("notice_period_months", e))?;

        sqlx::query(
            r#"
            INSERT INTO rental_agreements (
                id, name, email, phone, landlord_name, tenant_name, property_address,
                city, monthly_rent, security_deposit, start_date, duration_months,
                notice_period_months, remarks, document, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(agreement.id)
        .bind(&agreement.contact.name)
        .bind(&agreement.contact.email)
        .bind(&agreement.contact.phone)
        .bind(&agreement.landlord_name)
        .bind(&agreement.tenant_name)
        .bind(&agreement.property_address)
        .bind(&agreement.city)
        .bind(agreement.monthly_rent)
        .bind(agreement.security_deposit)
        .bind(agreement.start_date)
        .bind(duration)
        .bind(notice)
        .bind(&agreement.remarks)
        .bind(&agreement.document)
        .bind(agreement.status.to_string())
        .bind(agreement.created_at)
        .execute(&self.pool)
        .await?;
        Ok(agreement)
    }

    async fn get_agreement(&self, id: Uuid) -> Result<Option<Agreement>> {
        let row: Option<AgreementRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, landlord_name, tenant_name, property_address,
                   city, monthly_rent, security_deposit, start_date, duration_months,
                   notice_period_months, remarks, document, status, created_at
            FROM rental_agreements
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Agreement::try_from).transpose()
    }

    async fn list_agreements(&self, status: Option<RequestStatus>) -> Result<Vec<Agreement>> {
        let rows: Vec<AgreementRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, landlord_name, tenant_name, property_address,
                   city, monthly_rent, security_deposit, start_date, duration_months,
                   notice_period_months, remarks, document, status, created_at
            FROM rental_agreements
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status_text(status))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Agreement::try_from).collect()
    }

    async fn create_transfer(&self, transfer: PropertyTransfer) -> Result<PropertyTransfer> {
        sqlx::query(
            r#"
            INSERT INTO property_transfers (
                id, name, email, phone, transfer_type, seller_name, buyer_name,
                property_address, city, state, property_value, remarks, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(transfer.id)
        .bind(&transfer.contact.name)
        .bind(&transfer.contact.email)
        .bind(&transfer.contact.phone)
        .bind(transfer.transfer_type.to_string())
        .bind(&transfer.seller_name)
        .bind(&transfer.buyer_name)
        .bind(&transfer.property_address)
        .bind(&transfer.city)
        .bind(&transfer.state)
        .bind(transfer.property_value)
        .bind(&transfer.remarks)
        .bind(transfer.status.to_string())
        .bind(transfer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(transfer)
    }

    async fn list_transfers(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<PropertyTransfer>> {
        let rows: Vec<TransferRow> = sqlx::query_as(
            r#"
            SELECT id, name, email, phone, transfer_type, seller_name, buyer_name,
                   property_address, city, state, property_value, remarks, status, created_at
            FROM property_transfers
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(status_text(status))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(PropertyTransfer::try_from).collect()
    }
}

// ---------------------------------------------------------------------------
// calculator rates

#[derive(sqlx::FromRow)]
struct RateRow {
    id: Uuid,
    state: String,
    city: Option<String>,
    property_type: Option<String>,
    stamp_duty_pct: f64,
    registration_pct: f64,
    registration_cap: Option<f64>,
    metro_cess_pct: Option<f64>,
    female_discount_pct: Option<f64>,
    brokerage_pct: Option<f64>,
    effective_from: NaiveDate,
}

impl From<RateRow> for CalculatorRate {
    fn from(row: RateRow) -> Self {
        CalculatorRate {
            id: row.id,
            state: row.state,
            city: row.city,
            property_type: row.property_type,
            stamp_duty_pct: row.stamp_duty_pct,
            registration_pct: row.registration_pct,
            registration_cap: row.registration_cap,
            metro_cess_pct: row.metro_cess_pct,
            female_discount_pct: row.female_discount_pct,
            brokerage_pct: row.brokerage_pct,
            effective_from: row.effective_from,
        }
    }
}

#[async_trait]
impl RateStore for PgStore {
    async fn list_rates(&self, state: Option<&str>) -> Result<Vec<CalculatorRate>> {
        let rows: Vec<RateRow> = sqlx::query_as(
            r#"
            SELECT id, state, city, property_type, stamp_duty_pct, registration_pct,
                   registration_cap, metro_cess_pct, female_discount_pct, brokerage_pct,
                   effective_from
            FROM calculator_rates
            WHERE ($1::text IS NULL OR LOWER(state) = LOWER($1))
            ORDER BY state, city NULLS FIRST, property_type NULLS FIRST, effective_from DESC
            "#,
        )
        .bind(state.map(str::trim))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(CalculatorRate::from).collect())
    }

    async fn insert_rates(&self, rates: Vec<NewRate>) -> Result<usize> {
        if rates.is_empty() {
            return Ok(0);
        }
        let count = rates.len();

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO calculator_rates (id, state, city, property_type, stamp_duty_pct, \
             registration_pct, registration_cap, metro_cess_pct, female_discount_pct, \
             brokerage_pct, effective_from) ",
        );
        builder.push_values(rates, |mut row, rate| {
            row.push_bind(Uuid::new_v4())
                .push_bind(rate.state)
                .push_bind(rate.city)
                .push_bind(rate.property_type)
                .push_bind(rate.stamp_duty_pct)
                .push_bind(rate.registration_pct)
                .push_bind(rate.registration_cap)
                .push_bind(rate.metro_cess_pct)
                .push_bind(rate.female_discount_pct)
                .push_bind(rate.brokerage_pct)
                .push_bind(rate.effective_from);
        });
        builder.build().execute(&self.pool).await?;
        Ok(count)
    }

    async fn count_rates(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM calculator_rates")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Furnishing, PropertyStatus};

    #[test]
    fn patch_sets_only_present_columns() {
        let patch = PropertyPatch {
            price: Some(9_500_000.0),
            furnishing: Some(Furnishing::SemiFurnished),
            status: Some(PropertyStatus::Sold),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE properties SET updated_at = now()");
        push_patch(&mut builder, &patch);
        assert_eq!(
            builder.sql(),
            "UPDATE properties SET updated_at = now(), price = $1, furnishing = $2, status = $3"
        );
    }

    #[test]
    fn rent_row_without_detail_is_corrupt() {
        let row = PropertyRow {
            id: Uuid::new_v4(),
            title: "Flat".into(),
            description: String::new(),
            property_type: "apartment".into(),
            listing_type: "rent".into(),
            price: 1.0,
            area_sqft: 1.0,
            bedrooms: 1,
            bathrooms: 1,
            address: "x".into(),
            locality: String::new(),
            city: "Pune".into(),
            state: "Maharashtra".into(),
            pincode: String::new(),
            latitude: None,
            longitude: None,
            floor_number: None,
            total_floors: None,
            furnishing: None,
            amenities: vec![],
            photos: vec![],
            status: "active".into(),
            society_id: None,
            partner_id: None,
            owner_name: None,
            owner_phone: None,
            owner_email: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            monthly_rent: None,
            security_deposit: None,
            maintenance: None,
            available_from: None,
            preferred_tenants: None,
            ownership_type: None,
            property_age_years: None,
            builder_name: None,
            project_name: None,
            possession_date: None,
            rera_id: None,
        };
        assert!(matches!(Property::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
