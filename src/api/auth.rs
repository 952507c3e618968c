use std::collections::HashSet;
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use tracing::debug;

use crate::error::ServiceError;

/// Bearer tokens that carry admin rights.
///
/// Issuing and rotating the tokens happens elsewhere; this only answers
/// whether a presented token is one of them.
#[derive(Debug, Clone, Default)]
pub struct AdminAuth {
    tokens: HashSet<String>,
}

impl AdminAuth {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::<String>::into)
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_admin(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Extractor guarding admin-only routes; fails with 401.
#[derive(Debug)]
pub struct RequireAdmin;

impl FromRequest for RequireAdmin {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_admin(req))
    }
}

pub fn require_admin(req: &HttpRequest) -> Result<RequireAdmin, ServiceError> {
    let Some(auth) = req.app_data::<web::Data<AdminAuth>>() else {
        debug!("No AdminAuth configured; denying {}", req.path());
        return Err(ServiceError::unauthorized("Admin access required"));
    };

    match bearer_token(req) {
        Some(token) if auth.is_admin(token) => Ok(RequireAdmin),
        Some(_) => Err(ServiceError::unauthorized("Admin access required")),
        None => Err(ServiceError::unauthorized("Missing bearer token")),
    }
}
