pub mod bearer;
pub mod jwks;
pub mod jwt;
pub mod rbac;
