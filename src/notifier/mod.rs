// region:    --- Imports
use crate::error::AuctionError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

// endregion: --- Imports

// region:    --- Notifier Trait

/// Outbound message delivery. The closer treats this as fire-and-forget: a
/// transport failure is reported, never retried.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AuctionError>;
}

// endregion: --- Notifier Trait

// region:    --- Http Mailer

/// Delivers mail through an HTTP mail gateway.
pub struct HttpMailer {
    client: reqwest::Client,
    gateway_url: String,
    from: String,
}

impl HttpMailer {
    pub fn new(gateway_url: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            from,
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AuctionError> {
        info!("{:<12} --> sending mail to {}: {}", "Notifier", to, subject);
        let response = self
            .client
            .post(&self.gateway_url)
            .json(&serde_json::json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| AuctionError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuctionError::Transport(format!(
                "mail gateway returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

// endregion: --- Http Mailer

// region:    --- Winner Mail Template

pub fn winner_subject(title: &str) -> String {
    format!("You won the auction: {title}")
}

pub fn winner_body(username: &str, title: &str, amount: Decimal) -> String {
    format!(
        "Hi {username},\n\n\
         Congratulations! You won the auction for '{title}'.\n\
         Winning bid: £{amount:.2}\n\n\
         Please proceed to purchase the item by logging into the site.\n\n\
         Thanks,\nAuction Team",
    )
}

// endregion: --- Winner Mail Template

// region:    --- Tests

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn subject_names_the_item() {
        assert_eq!(
            winner_subject("Vintage lamp"),
            "You won the auction: Vintage lamp"
        );
    }

    #[test]
    fn body_formats_amount_as_currency() {
        let body = winner_body("alice", "Vintage lamp", dec!(20.5));
        assert!(body.contains("Hi alice,"));
        assert!(body.contains("'Vintage lamp'"));
        assert!(body.contains("Winning bid: £20.50"));
    }
}

// endregion: --- Tests
