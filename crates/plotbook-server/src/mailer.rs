//! Outgoing email delivery.
//!
//! [`ResendMailer`] posts to the Resend HTTP API. Anything implementing
//! [`Mailer`] can stand in for it, which is how the relay is tested.

use std::{future::Future, time::Duration};

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::RelayConfig;

/// A fully-rendered message, in the shape the Resend API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
  pub from:    String,
  pub to:      Vec<String>,
  pub subject: String,
  pub html:    String,
}

#[derive(Debug, Error)]
pub enum MailError {
  #[error("mail API request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("mail API rejected the message ({status}): {body}")]
  Rejected { status: u16, body: String },
  #[error("mail API key is not configured")]
  MissingApiKey,
}

pub trait Mailer: Send + Sync {
  fn send<'a>(
    &'a self,
    email: &'a OutgoingEmail,
  ) -> impl Future<Output = Result<(), MailError>> + Send + 'a;
}

/// Sends mail through `POST {base_url}/emails` with a bearer API key.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ResendMailer {
  client:   Client,
  api_key:  String,
  base_url: String,
}

impl ResendMailer {
  pub fn new(config: &RelayConfig) -> Result<Self, MailError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(15))
      .build()?;
    Ok(Self {
      client,
      api_key: config.resend_api_key.clone(),
      base_url: config.resend_base_url.trim_end_matches('/').to_owned(),
    })
  }
}

impl Mailer for ResendMailer {
  async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
    if self.api_key.is_empty() {
      return Err(MailError::MissingApiKey);
    }

    let resp = self
      .client
      .post(format!("{}/emails", self.base_url))
      .bearer_auth(&self.api_key)
      .json(email)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(MailError::Rejected { status: status.as_u16(), body });
    }

    tracing::debug!(subject = %email.subject, "mail API accepted message");
    Ok(())
  }
}
