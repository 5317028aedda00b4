pub mod client;
pub mod subscription;
pub mod subscription_plan;
pub mod subscription_status;
pub mod user;
