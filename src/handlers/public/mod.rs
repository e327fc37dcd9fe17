// Token acquisition. No authentication required.
pub mod auth;
