use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use housing_market::api::{router, AppState};
use housing_market::store::MemoryStore;

fn app() -> Router {
    router(AppState::new(Arc::new(MemoryStore::new())))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rental(title: &str, bedrooms: i64) -> Value {
    json!({
        "title": title,
        "property_type": "apartment",
        "listing_type": "rent",
        "monthly_rent": 32000.0,
        "security_deposit": 96000.0,
        "price": 32000.0,
        "area_sqft": 1100.0,
        "bedrooms": bedrooms,
        "bathrooms": 2,
        "address": "ITPL Main Road",
        "locality": "Whitefield",
        "city": "Bengaluru",
        "state": "Karnataka",
        "owner_name": "Lakshmi Rao",
        "owner_phone": "9845012345"
    })
}

#[tokio::test]
async fn property_round_trip() {
    let app = app();
    let (status, created) = call(&app, "POST", "/properties", Some(rental("2 BHK in Whitefield", 2))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = call(&app, "GET", &format!("/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "2 BHK in Whitefield");
    assert_eq!(fetched["price"], 32000.0);
    assert_eq!(fetched["city"], "Bengaluru");
    assert_eq!(fetched["listing_type"], "rent");
    assert_eq!(fetched["monthly_rent"], 32000.0);
}

#[tokio::test]
async fn owner_contact_only_for_partners() {
    let app = app();
    let (_, created) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let id = created["id"].as_str().unwrap();

    let (_, public) = call(&app, "GET", &format!("/properties/{id}"), None).await;
    assert!(public.get("owner_phone").is_none());

    let (_, broker) = call(&app, "GET", &format!("/properties/{id}?viewer=partner"), None).await;
    assert_eq!(broker["owner_phone"], "9845012345");
}

#[tokio::test]
async fn four_bedrooms_means_four_or_more() {
    let app = app();
    for bedrooms in [2, 3, 4, 5] {
        let title = format!("{bedrooms} BHK");
        call(&app, "POST", "/properties", Some(rental(&title, bedrooms))).await;
    }

    let (status, hits) = call(&app, "GET", "/properties?bedrooms=4", None).await;
    assert_eq!(status, StatusCode::OK);
    let mut counts: Vec<i64> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["bedrooms"].as_i64().unwrap())
        .collect();
    counts.sort();
    assert_eq!(counts, vec![4, 5]);

    let (_, exact) = call(&app, "GET", "/properties?bedrooms=3", None).await;
    assert_eq!(exact.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_filters_by_city_and_text() {
    let app = app();
    call(&app, "POST", "/properties", Some(rental("Lake view flat", 2))).await;
    let mut pune = rental("Hill view flat", 2);
    pune["city"] = json!("Pune");
    pune["state"] = json!("Maharashtra");
    call(&app, "POST", "/properties", Some(pune)).await;

    let (_, hits) = call(&app, "GET", "/properties?city=bengal", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["title"], "Lake view flat");

    let (_, hits) = call(&app, "GET", "/properties?search=HILL", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["city"], "Pune");
}

#[tokio::test]
async fn update_applies_only_sent_fields() {
    let app = app();
    let (_, created) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/properties/{id}"),
        Some(json!({ "price": 30000.0, "status": "rented" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 30000.0);
    assert_eq!(updated["status"], "rented");
    assert_eq!(updated["title"], "Flat");
}

#[tokio::test]
async fn update_is_checked_against_the_whole_listing() {
    let app = app();
    let mut listing = rental("Flat", 2);
    listing["floor_number"] = json!(5);
    listing["total_floors"] = json!(10);
    let (_, created) = call(&app, "POST", "/properties", Some(listing)).await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/properties/{id}"),
        Some(json!({ "floor_number": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "floor_number must not exceed total_floors");

    let (_, fetched) = call(&app, "GET", &format!("/properties/{id}"), None).await;
    assert_eq!(fetched["floor_number"], 5);

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/properties/{id}"),
        Some(json!({ "floor_number": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["floor_number"], 9);
    assert_eq!(updated["total_floors"], 10);
}

#[tokio::test]
async fn update_cleans_fields_like_create() {
    let app = app();
    let (_, created) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/properties/{id}"),
        Some(json!({
            "title": "  Sunny flat  ",
            "owner_email": "Lakshmi.Rao@Example.IN",
            "amenities": [" Gym ", "", "  "]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Sunny flat");
    assert_eq!(updated["owner_email"], "lakshmi.rao@example.in");
    assert_eq!(updated["amenities"], json!(["Gym"]));
}

#[tokio::test]
async fn listing_for_an_unknown_partner_is_not_found() {
    let app = app();
    let stranger = uuid::Uuid::new_v4().to_string();

    let mut listing = rental("Flat", 2);
    listing["partner_id"] = json!(stranger);
    let (status, body) = call(&app, "POST", "/properties", Some(listing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Partner not found");

    let (_, created) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let id = created["id"].as_str().unwrap();
    let (status, body) = call(
        &app,
        "PUT",
        &format!("/properties/{id}"),
        Some(json!({ "partner_id": stranger })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Partner not found");

    let (_, fetched) = call(&app, "GET", &format!("/properties/{id}"), None).await;
    assert!(fetched["partner_id"].is_null());
}

#[tokio::test]
async fn delete_then_fetch_is_not_found() {
    let app = app();
    let (_, created) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = call(&app, "DELETE", &format!("/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, "GET", &format!("/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Property not found" }));
}

#[tokio::test]
async fn bad_input_is_a_400_with_an_error_body() {
    let app = app();
    let mut missing_title = rental("", 2);
    missing_title["title"] = json!("");
    let (status, body) = call(&app, "POST", "/properties", Some(missing_title)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "title is required");

    let (status, body) = call(&app, "GET", "/properties?min_price=-5", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "GET", "/properties/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = call(&app, "POST", "/partners", Some(json!({ "email": 7 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn inquiry_needs_a_real_property() {
    let app = app();
    let inquiry = json!({
        "property_id": "00000000-0000-4000-8000-000000000000",
        "name": "Sana",
        "email": "sana@example.in",
        "phone": "9123456780"
    });
    let (status, body) = call(&app, "POST", "/property-inquiries", Some(inquiry)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Property not found");
}

#[tokio::test]
async fn inquiry_status_can_be_updated() {
    let app = app();
    let (_, property) = call(&app, "POST", "/properties", Some(rental("Flat", 2))).await;
    let inquiry = json!({
        "property_id": property["id"],
        "name": "Sana",
        "email": "Sana@Example.in",
        "phone": "9123456780",
        "message": "Is the flat pet friendly?"
    });
    let (status, created) = call(&app, "POST", "/property-inquiries", Some(inquiry)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "sana@example.in");
    assert_eq!(created["status"], "pending");

    let id = created["id"].as_str().unwrap();
    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/property-inquiries/{id}/status"),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");

    let (_, pending) = call(&app, "GET", "/property-inquiries?status=pending", None).await;
    assert!(pending.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn partner_onboarding_and_login() {
    let app = app();
    let signup = json!({
        "full_name": "Neha Joshi",
        "email": "neha@example.in",
        "phone": "9765432109",
        "password": "broker-pass-9",
        "confirm_password": "broker-pass-9"
    });
    let (status, partner) = call(&app, "POST", "/partners", Some(signup.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(partner.get("password_hash").is_none());
    let id = partner["id"].as_str().unwrap().to_string();

    let mut shouting = signup.clone();
    shouting["email"] = json!("NEHA@example.in");
    let (status, _) = call(&app, "POST", "/partners", Some(shouting)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, partner) = call(
        &app,
        "PUT",
        &format!("/partners/{id}/work-details"),
        Some(json!({ "company_name": "Joshi Estates", "operating_cities": ["Nagpur"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(partner["registration_step"], "work_details");

    let (status, partner) = call(
        &app,
        "PUT",
        &format!("/partners/{id}/bank-details"),
        Some(json!({
            "account_holder": "Neha Joshi",
            "account_number": "50100012345678",
            "confirm_account_number": "50100012345678",
            "ifsc_code": "hdfc0001234",
            "bank_name": "HDFC Bank"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(partner["registration_step"], "bank_details");
    assert_eq!(partner["bank"]["ifsc_code"], "HDFC0001234");
    assert_eq!(partner["bank"]["account_number"], "**********5678");

    let (_, fetched) = call(&app, "GET", &format!("/partners/{id}"), None).await;
    assert_eq!(fetched["bank"]["account_number"], "**********5678");

    let login = json!({ "email": "Neha@example.in", "password": "broker-pass-9" });
    let (status, me) = call(&app, "POST", "/partners/login", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id.as_str());

    let wrong = json!({ "email": "neha@example.in", "password": "guess-guess" });
    let (status, body) = call(&app, "POST", "/partners/login", Some(wrong)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (_, partners) = call(&app, "GET", "/partners?status=pending", None).await;
    assert_eq!(partners.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn partner_signup_rejects_mismatched_passwords() {
    let app = app();
    let signup = json!({
        "full_name": "Neha Joshi",
        "email": "neha@example.in",
        "phone": "9765432109",
        "password": "broker-pass-9",
        "confirm_password": "broker-pass-0"
    });
    let (status, body) = call(&app, "POST", "/partners", Some(signup)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn calculator_after_seeding() {
    let app = app();
    let (status, report) = call(&app, "POST", "/seed-data", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["rates"].as_u64().unwrap() > 0);

    let query = json!({
        "price": 5000000.0,
        "state": "Maharashtra",
        "city": "Pune",
        "property_type": "residential"
    });
    let (status, costs) = call(&app, "POST", "/calculator/calculate", Some(query.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(costs["total"].as_f64().unwrap() >= 5_000_000.0);

    let mut female = query;
    female["female_buyer"] = json!(true);
    let (_, discounted) = call(&app, "POST", "/calculator/calculate", Some(female)).await;
    assert!(
        discounted["stamp_duty_payable"].as_f64().unwrap()
            < costs["stamp_duty_payable"].as_f64().unwrap()
    );

    let (status, rates) = call(&app, "GET", "/calculator/rates?state=maharashtra", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(rates
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["state"] == "Maharashtra"));
}

#[tokio::test]
async fn calculator_without_rates_is_a_400() {
    let app = app();
    let query = json!({ "price": 100.0, "state": "Goa" });
    let (status, body) = call(&app, "POST", "/calculator/calculate", Some(query)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No calculator rates configured for Goa");
}

#[tokio::test]
async fn societies_crud() {
    let app = app();
    let society = json!({
        "name": "Hiranandani Meadows",
        "address": "Gladys Alwares Road",
        "locality": "Manpada",
        "city": "Thane",
        "state": "Maharashtra",
        "pincode": "400610",
        "total_floors": 20,
        "build_year": 2008
    });
    let (status, created) = call(&app, "POST", "/societies", Some(society.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap();

    let mut renamed = society;
    renamed["name"] = json!("Hiranandani Meadows Phase 2");
    let (status, replaced) = call(&app, "PUT", &format!("/societies/{id}"), Some(renamed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["name"], "Hiranandani Meadows Phase 2");
    assert_eq!(replaced["created_at"], created["created_at"]);

    let (_, listed) = call(&app, "GET", "/societies?city=thane", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &format!("/societies/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&app, "GET", &format!("/societies/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn intake_forms_are_listed_newest_first() {
    let app = app();
    for city in ["Indore", "Bhopal"] {
        let request = json!({
            "name": "Vikram",
            "email": "vikram@example.in",
            "phone": "9009009009",
            "service_type": "title_search",
            "city": city
        });
        let (status, _) = call(&app, "POST", "/legal-services", Some(request)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = call(&app, "GET", "/legal-services", None).await;
    let cities: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["city"].as_str().unwrap())
        .collect();
    assert_eq!(cities, vec!["Bhopal", "Indore"]);
}

#[tokio::test]
async fn moving_request_in_the_past_is_rejected() {
    let app = app();
    let request = json!({
        "name": "Vikram",
        "email": "vikram@example.in",
        "phone": "9009009009",
        "from_city": "Pune",
        "to_city": "Goa",
        "moving_date": "2001-01-01",
        "house_size": "1bhk"
    });
    let (status, _) = call(&app, "POST", "/packers-movers", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn agreement_is_rendered_and_stored() {
    let app = app();
    let request = json!({
        "name": "Priya",
        "email": "priya@example.in",
        "phone": "9988776655",
        "landlord_name": "Suresh Iyer",
        "tenant_name": "Priya Menon",
        "property_address": "12 Residency Road",
        "city": "Bengaluru",
        "monthly_rent": 25000.0,
        "security_deposit": 75000.0,
        "start_date": "2026-01-01",
        "duration_months": 11
    });
    let (status, created) = call(&app, "POST", "/rental-agreements", Some(request)).await;
    assert_eq!(status, StatusCode::CREATED);
    let document = created["document"].as_str().unwrap();
    assert!(document.contains("Suresh Iyer"));
    assert!(document.contains("Priya Menon"));

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = call(&app, "GET", &format!("/rental-agreements/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["document"], created["document"]);
}

#[tokio::test]
async fn transfer_request_is_created() {
    let app = app();
    let request = json!({
        "name": "Kiran",
        "email": "kiran@example.in",
        "phone": "9811122233",
        "transfer_type": "sale",
        "seller_name": "Kiran Patil",
        "buyer_name": "Asha Patil",
        "property_address": "Plot 7, College Road",
        "city": "Nashik",
        "state": "Maharashtra",
        "property_value": 6500000.0
    });
    let (status, created) = call(&app, "POST", "/property-transfers", Some(request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");

    let (_, listed) = call(&app, "GET", "/property-transfers?status=pending", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}
