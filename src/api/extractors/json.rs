//! `Json<T>` whose rejection is an `AppError::Validation`, so malformed bodies get the
//! same `{ "error": ... }` shape as every other failure.
use axum::Json;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejection_to_error(rejection)),
        }
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(error = %rejection, "json body rejected");
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::validation("Bad Request: Expected a JSON body")
        }
        _ => AppError::validation("Bad Request: Invalid JSON body"),
    }
}
