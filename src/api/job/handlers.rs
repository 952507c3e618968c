use actix_web::{
    delete, get, patch, post,
    web::{self, Data, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::{Json, Query};
use serde_json::{Map, Value};

use crate::api::auth::RequireAdmin;
use crate::error::ServiceError;
use super::dto::{JobDeletedResponse, JobListResponse, JobResponse};
use super::models::{JobFilter, NewJob};
use super::service::JobService;

#[post("")]
async fn create_job(
    _admin: RequireAdmin,
    service: Data<JobService>,
    job: Json<NewJob>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.create(&job).await?;
    Ok(HttpResponse::Created().json(JobResponse { job }))
}

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    filter: Query<JobFilter>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.find_all(&filter).await?;
    Ok(HttpResponse::Ok().json(JobListResponse { jobs }))
}

#[get("/{id}")]
async fn get_job(
    service: Data<JobService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobResponse { job }))
}

#[patch("/{id}")]
async fn update_job(
    _admin: RequireAdmin,
    service: Data<JobService>,
    id: web::Path<i32>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.update(id.into_inner(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobResponse { job }))
}

#[delete("/{id}")]
async fn delete_job(
    _admin: RequireAdmin,
    service: Data<JobService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = service.remove(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(JobDeletedResponse { deleted }))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("/jobs")
            .service(create_job)
            .service(list_jobs)
            .service(get_job)
            .service(update_job)
            .service(delete_job),
    );
}
