use actix_web::{dev::Payload, http::header::HeaderName, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;

use crate::api::error::AppError;
use crate::api::job_application::models::UserId;

/// Where the authenticating proxy in front of this service puts the caller's id
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    header: HeaderName,
}

impl IdentityConfig {
    pub fn new(header: &str) -> Result<Self, String> {
        let header = HeaderName::try_from(header.trim())
            .map_err(|e| format!("invalid identity header '{}': {}", header, e))?;
        Ok(Self { header })
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static("x-user-id"),
        }
    }
}

/// The authenticated user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    id: UserId,
}

impl Caller {
    pub fn id(&self) -> UserId {
        self.id
    }

    fn resolve(req: &HttpRequest) -> Result<Self, AppError> {
        let default_config;
        let config = match req.app_data::<web::Data<IdentityConfig>>() {
            Some(config) => config.get_ref(),
            None => {
                default_config = IdentityConfig::default();
                &default_config
            }
        };

        let id = req
            .headers()
            .get(&config.header)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                debug!("No usable '{}' header on {}", config.header, req.path());
                AppError::AuthenticationRequired
            })?;

        Ok(Caller { id })
    }
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Caller::resolve(req))
    }
}
