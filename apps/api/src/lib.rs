pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod importer;
pub mod meta_values;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
