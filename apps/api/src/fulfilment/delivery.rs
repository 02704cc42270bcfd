//! Delivery of the assembled letter by e-mail (Mailgun).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use crate::fulfilment::assembly::LetterDocument;

pub const MAILGUN_API_BASE: &str = "https://api.mailgun.net/v3";
const SUBJECT: &str = "Your Generated Cover Letter";
const BODY: &str = "Please find your generated cover letter attached.";

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail API rejected the message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait LetterDelivery: Send + Sync {
    async fn deliver(&self, recipient: &str, document: &LetterDocument)
        -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct MailgunDelivery {
    client: Client,
    api_key: String,
    domain: String,
    from: String,
}

impl MailgunDelivery {
    pub fn new(api_key: String, domain: String, from: String) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_key,
            domain,
            from,
        })
    }

    fn endpoint(&self) -> String {
        format!("{MAILGUN_API_BASE}/{}/messages", self.domain)
    }
}

#[async_trait]
impl LetterDelivery for MailgunDelivery {
    async fn deliver(
        &self,
        recipient: &str,
        document: &LetterDocument,
    ) -> Result<(), DeliveryError> {
        info!("Sending cover letter '{}' to {}", document.title, recipient);

        let attachment = Part::bytes(document.body.clone().into_bytes())
            .file_name(document.filename.clone())
            .mime_str("text/plain; charset=utf-8")?;

        let form = Form::new()
            .text("from", self.from.clone())
            .text("to", recipient.to_string())
            .text("subject", SUBJECT)
            .text("text", BODY)
            .part("attachment", attachment);

        let response = self
            .client
            .post(self.endpoint())
            .basic_auth("api", Some(&self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Mail delivery failed ({}): {}", status, message);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        info!("Cover letter delivered to {}", recipient);
        Ok(())
    }
}
