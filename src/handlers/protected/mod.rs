// Routes behind `jwt_auth_middleware`. Every handler takes an `AuthUser`
// and scopes its store calls to `AuthUser::id`.
pub mod ai;
pub mod auth;
pub mod tasks;
