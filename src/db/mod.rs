pub mod connection;
pub mod job_application_repository;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod store;

pub use job_application_repository::PgJobApplicationRepository;
pub use memory::MemoryJobApplicationStore;
pub use store::{JobApplicationStore, StoreError};
