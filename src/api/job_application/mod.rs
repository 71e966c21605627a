pub mod actions;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod requests;

pub use handlers::job_application_config;

