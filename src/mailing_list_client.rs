use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::SubscriberEmail;

/// Member status requested on creation (`pending` would trigger the provider's
/// own double opt-in email)
const MEMBER_STATUS: &str = "subscribed";

#[derive(thiserror::Error, Debug)]
pub enum MailingListError {
    /// Connection failure, timeout, etc; no response was received
    #[error("Could not reach mailing list provider")]
    Request(#[from] reqwest::Error),
    #[error("Mailing list provider rejected the request with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Thin client for the members endpoint of the Mailchimp Marketing API (v3).
///
/// Establishing a HTTP connection is expensive, so a single client (and its
/// connection pool) is built at startup and shared by all workers via
/// `web::Data`.
#[derive(Debug)]
pub struct MailingListClient {
    http_client: Client,
    /// Origin only, without trailing slash, e.g. `https://us21.api.mailchimp.com`
    base_url: String,
    audience_id: String,
    api_key: Secret<String>,
}

#[derive(Serialize)]
struct SubscriptionPayload<'a> {
    email_address: &'a str,
    status: &'a str,
}

/// The parts of the provider's reply that are worth logging. Everything else
/// in the (large) member object is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct MemberResponse {
    pub id: Option<String>,
    pub email_address: Option<String>,
    pub status: Option<String>,
}

impl MailingListClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        audience_id: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            audience_id,
            api_key,
        })
    }

    /// `{base_url}/3.0/lists/{audience_id}/members`
    pub fn members_url(&self) -> String {
        format!("{}/3.0/lists/{}/members", self.base_url, self.audience_id)
    }

    /// Add `email` to the configured audience. Only a 2xx response counts as
    /// success; the response body is parsed on a best-effort basis and never
    /// fails the call.
    #[tracing::instrument(
        name = "Adding member to mailing list",
        skip(self, email),
        fields(subscriber_email = %email, audience_id = %self.audience_id)
    )]
    pub async fn add_member(
        &self,
        email: &SubscriberEmail,
    ) -> Result<MemberResponse, MailingListError> {
        let body = SubscriptionPayload {
            email_address: email.as_ref(),
            status: MEMBER_STATUS,
        };

        // `json` also sets `Content-Type: application/json`
        let resp = self
            .http_client
            .post(self.members_url())
            .header(
                AUTHORIZATION,
                format!("Token {}", self.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MailingListError::Rejected { status, body });
        }

        let member = resp.json::<MemberResponse>().await.unwrap_or_else(|e| {
            tracing::warn!(error.message = %e, "unreadable response from mailing list provider");
            MemberResponse::default()
        });
        tracing::info!(
            member_id = ?member.id,
            member_status = ?member.status,
            "member added to mailing list"
        );
        Ok(member)
    }
}
