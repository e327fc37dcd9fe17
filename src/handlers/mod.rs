// Handlers are split by security tier:
// public (no token) and protected (bearer JWT, see `middleware::auth`).
pub mod public;
pub mod protected;
