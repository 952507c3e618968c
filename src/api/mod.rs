pub mod auth;
pub mod company;
pub mod health;
pub mod job;
pub mod validation;

use actix_web::web::ServiceConfig;

/// Mount every route the service exposes.
pub fn routes(config: &mut ServiceConfig) {
    config
        .configure(health::health_config)
        .configure(company::handlers::company_config)
        .configure(job::handlers::job_config);
}
