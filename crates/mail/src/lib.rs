//! Email dispatch collaborator.
//!
//! Outbound delivery (SMTP, a provider API) sits outside this repository;
//! the lifecycle service only needs the [`Mailer`] contract. The link
//! builder owns the frontend base URL so no handler ever consults global
//! state to build a link.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail dispatch failed: {0}")]
    Dispatch(String),
}

pub type Result<T> = std::result::Result<T, MailError>;

/// Builds the links embedded in outbound mail from the configured
/// frontend base URL, resolved once at startup.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    frontend_url: String,
}

impl LinkBuilder {
    pub fn new(frontend_url: impl Into<String>) -> Self {
        let mut frontend_url = frontend_url.into();
        while frontend_url.ends_with('/') {
            frontend_url.pop();
        }
        Self { frontend_url }
    }

    pub fn password_reset(&self, token: &str) -> String {
        format!("{}/reset-password/{token}", self.frontend_url)
    }

    pub fn email_verification(&self, token: &str) -> String {
        format!("{}/verify/{token}", self.frontend_url)
    }
}

/// Contract for outbound account mail. Implementations must be usable from
/// concurrent request handlers.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<()>;

    async fn send_email_verification(&self, to: &str, link: &str) -> Result<()>;
}

#[async_trait]
impl<T: Mailer + ?Sized> Mailer for std::sync::Arc<T> {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<()> {
        (**self).send_password_reset(to, link).await
    }

    async fn send_email_verification(&self, to: &str, link: &str) -> Result<()> {
        (**self).send_email_verification(to, link).await
    }
}

/// Logs outbound mail instead of delivering it. Stands in for the real
/// delivery integration in development and single-process deployments.
#[derive(Debug, Clone)]
pub struct TracingMailer {
    sender: String,
}

impl TracingMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<()> {
        tracing::info!(from = %self.sender, %to, %link, "password reset mail dispatched");
        Ok(())
    }

    async fn send_email_verification(&self, to: &str, link: &str) -> Result<()> {
        tracing::info!(from = %self.sender, %to, %link, "verification mail dispatched");
        Ok(())
    }
}

/// Test double: records every dispatch and can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent dispatches fail.
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Recorded `(recipient, link)` pairs, in dispatch order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, to: &str, link: &str) -> Result<()> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(MailError::Dispatch("recording mailer told to fail".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, to: &str, link: &str) -> Result<()> {
        self.record(to, link)
    }

    async fn send_email_verification(&self, to: &str, link: &str) -> Result<()> {
        self.record(to, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_builder_trims_trailing_slash() {
        let links = LinkBuilder::new("https://app.example.org/");
        assert_eq!(
            links.password_reset("abc123"),
            "https://app.example.org/reset-password/abc123"
        );
        assert_eq!(
            links.email_verification("abc123"),
            "https://app.example.org/verify/abc123"
        );
    }

    #[tokio::test]
    async fn test_recording_mailer_records_and_fails_on_demand() {
        let mailer = RecordingMailer::new();
        mailer
            .send_password_reset("a@example.com", "http://x/reset-password/t")
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);

        mailer.fail_next();
        assert!(mailer
            .send_password_reset("a@example.com", "http://x/reset-password/t")
            .await
            .is_err());

        // The failure is one-shot.
        mailer
            .send_email_verification("a@example.com", "http://x/verify/t")
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 2);
    }
}
