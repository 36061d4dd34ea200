pub mod config;
pub mod db;
pub mod errors;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod telemetry;
pub mod validations;
