pub mod client;
pub mod entitlement;
pub mod subscription;
pub mod user;
