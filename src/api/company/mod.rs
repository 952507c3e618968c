pub mod models;
pub mod dto;
pub mod handlers;
pub mod service;

pub use models::{CompanyFilter, CompanyUpdate, NewCompany};
pub use service::CompanyService;
