use std::fmt::Debug;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde::Serialize;

use super::error_chain_fmt;
use crate::domain::NewSubscriber;
use crate::domain::SubscriptionRequest;
use crate::mailing_list_client::MailingListClient;
use crate::mailing_list_client::MailingListError;

#[derive(thiserror::Error)]
pub enum SubscribeError {
    /// `email` absent, null, not a string, or empty
    #[error("Invalid subscription request: {0}")]
    ValidationError(String),
    /// Body could not be read as a JSON object at all
    #[error("Invalid subscription request body")]
    MalformedBody(#[source] JsonPayloadError),
    #[error("Failed to add subscriber to the mailing list")]
    UpstreamError(#[from] MailingListError),
}

impl Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl SubscribeError {
    /// What the caller gets to see; causes stay in the logs.
    fn public_message(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "Email is invalid",
            Self::MalformedBody(_) => "Request body is invalid",
            Self::UpstreamError(_) => "Could not subscribe to the newsletter",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Serialize)]
struct SuccessBody {
    message: &'static str,
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST, // 400
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,                           // 502
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.public_message(),
        })
    }
}

/// Handler for extractor failures of `web::Json<SubscriptionRequest>`, so that
/// a malformed body gets the same JSON error shape as every other failure.
/// Registered via `web::JsonConfig` in `startup::run`.
pub fn json_error_handler(
    err: JsonPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    SubscribeError::MalformedBody(err).into()
}

/// `POST /api/newsletter`. Forwards `email` to the mailing-list provider.
///
/// Success requires:
///     1. `email` present and non-empty (no format check)
///     2. provider answered 2xx
///
/// # Request example
///
/// ```sh
///     curl -v --json '{"email": "john@foo.com"}' http://127.0.0.1:8000/api/newsletter
/// ```
///
/// Invalid input returns 400 before any outbound call is made; a provider
/// failure (unreachable, timeout, non-2xx) returns 502.
#[tracing::instrument(
    name = "Adding new subscriber",
    skip(body, client),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn subscribe(
    body: web::Json<SubscriptionRequest>,
    client: web::Data<MailingListClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_sub: NewSubscriber = body
        .into_inner()
        .try_into()
        .map_err(SubscribeError::ValidationError)?;

    tracing::Span::current().record("subscriber_email", tracing::field::display(&new_sub.email));

    // failures are logged once, by `TracingLogger`, via `SubscribeError`'s
    // `Debug` (cause chain)
    client.add_member(&new_sub.email).await?;

    Ok(HttpResponse::Ok().json(SuccessBody {
        message: "Successfully subscribed to the newsletter",
    }))
}
