pub mod errors;
pub mod models;
pub mod oidc;
pub mod ports;
pub mod service;
