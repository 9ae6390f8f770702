//! Backend for a real-estate marketplace: listings and search, broker
//! onboarding, service intake forms, housing societies and a purchase cost
//! calculator, served as JSON over HTTP.

pub mod api;
pub mod calculator;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod seed;
pub mod store;
pub mod validation;
