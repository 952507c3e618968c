use actix_web::{
    delete, get, patch, post,
    web::{self, Data, ServiceConfig, scope},
    HttpResponse,
};
use actix_web_validator::{Json, Query};
use serde_json::{Map, Value};

use crate::api::auth::RequireAdmin;
use crate::error::ServiceError;
use super::dto::{CompanyDeletedResponse, CompanyDetailResponse, CompanyListResponse, CompanyResponse};
use super::models::{CompanyFilter, NewCompany};
use super::service::CompanyService;

#[post("")]
async fn create_company(
    _admin: RequireAdmin,
    service: Data<CompanyService>,
    company: Json<NewCompany>,
) -> Result<HttpResponse, ServiceError> {
    let company = service.create(&company).await?;
    Ok(HttpResponse::Created().json(CompanyResponse { company }))
}

#[get("")]
async fn list_companies(
    service: Data<CompanyService>,
    filter: Query<CompanyFilter>,
) -> Result<HttpResponse, ServiceError> {
    let companies = service.find_all(&filter).await?;
    Ok(HttpResponse::Ok().json(CompanyListResponse { companies }))
}

#[get("/{handle}")]
async fn get_company(
    service: Data<CompanyService>,
    handle: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let company = service.get(&handle).await?;
    Ok(HttpResponse::Ok().json(CompanyDetailResponse { company }))
}

#[patch("/{handle}")]
async fn update_company(
    _admin: RequireAdmin,
    service: Data<CompanyService>,
    handle: web::Path<String>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ServiceError> {
    let company = service.update(&handle, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CompanyResponse { company }))
}

#[delete("/{handle}")]
async fn delete_company(
    _admin: RequireAdmin,
    service: Data<CompanyService>,
    handle: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let deleted = service.remove(&handle).await?;
    Ok(HttpResponse::Ok().json(CompanyDeletedResponse { deleted }))
}

pub fn company_config(config: &mut ServiceConfig) {
    config.service(
        scope("/companies")
            .service(create_company)
            .service(list_companies)
            .service(get_company)
            .service(update_company)
            .service(delete_company),
    );
}
