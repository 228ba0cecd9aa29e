//! Request body extraction.
//!
//! Browsers post HTML forms, API clients post JSON, and some clients put
//! everything in the query string. [`Payload`] accepts all three.

use axum::{
    extract::{FromRequest, Query, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    /// No recognised body; fields are read from the query string.
    Query,
}

fn body_kind(req: &Request) -> BodyKind {
    let mime = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok());

    match mime {
        Some(m)
            if m.type_() == mime::APPLICATION
                && (m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON)) =>
        {
            BodyKind::Json
        }
        Some(m) if m.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
            BodyKind::Form
        }
        _ => BodyKind::Query,
    }
}

/// JSON, urlencoded form, or query-string fields, picked by `Content-Type`.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Json => {
                let Json(value) = Json::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Payload(value))
            }
            BodyKind::Form => {
                let Form(value) = Form::<T>::from_request(req, state)
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Payload(value))
            }
            BodyKind::Query => {
                let Query(value) = Query::<T>::try_from_uri(req.uri())
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                Ok(Payload(value))
            }
        }
    }
}
