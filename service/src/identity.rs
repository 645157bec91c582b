use std::future::{ready, Ready};

use abi::{Error, Identity};
use actix_web::{dev::Payload, http::header::HeaderMap, FromRequest, HttpRequest};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const PROFILE_ID_HEADER: &str = "x-profile-id";

/// the verified caller forwarded by the authentication layer
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Identity);

/// a caller that must be hotel staff
#[derive(Debug, Clone, Copy)]
pub struct Staff(pub Identity);

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(identity_from_headers(req.headers()).map(Caller))
    }
}

impl FromRequest for Staff {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(identity_from_headers(req.headers()).and_then(|identity| {
            identity.require_staff()?;
            Ok(Staff(identity))
        }))
    }
}

fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, Error> {
    Identity::from_parts(
        header(headers, USER_ID_HEADER)?,
        header(headers, USER_ROLE_HEADER)?,
        header(headers, PROFILE_ID_HEADER)?,
    )
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, Error> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(Error::Unauthorized)
}
