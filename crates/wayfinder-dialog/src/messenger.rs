//! Best-effort outbound text messages.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use wayfinder_core::config::TelephonyConfig;
use wayfinder_core::WayfinderError;

use crate::error::DialogError;

/// Sends a text message. Callers treat every failure as non-fatal.
#[async_trait]
pub trait TextMessenger: Send + Sync {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), DialogError>;
}

// =============================================================================
// Twilio
// =============================================================================

/// Messenger backed by the Twilio Messages REST resource.
pub struct TwilioMessenger {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
}

impl TwilioMessenger {
    pub fn new(config: &TelephonyConfig) -> Result<Self, WayfinderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WayfinderError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.api_base, self.account_sid)
    }
}

#[async_trait]
impl TextMessenger for TwilioMessenger {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), DialogError> {
        if self.account_sid.is_empty() || self.auth_token.is_empty() {
            return Err(DialogError::SideChannelDelivery(
                "Twilio credentials not configured".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", from), ("To", to), ("Body", body)])
            .send()
            .await
            .map_err(|e| DialogError::SideChannelDelivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DialogError::SideChannelDelivery(format!(
                "Twilio returned status {}",
                status.as_u16()
            )));
        }
        tracing::debug!(to = %to, chars = body.chars().count(), "Text message accepted");
        Ok(())
    }
}

// =============================================================================
// Recording messenger
// =============================================================================

/// A message captured by [`RecordingMessenger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// In-memory messenger for tests.
///
/// Records every attempt; in failing mode each attempt is still recorded but
/// reported as a delivery failure.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TextMessenger for RecordingMessenger {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<(), DialogError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMessage {
                from: from.to_string(),
                to: to.to_string(),
                body: body.to_string(),
            });
        }
        if self.fail {
            return Err(DialogError::SideChannelDelivery("simulated failure".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let config = TelephonyConfig {
            account_sid: "AC123".to_string(),
            api_base: "https://api.twilio.com/2010-04-01/".to_string(),
            ..TelephonyConfig::default()
        };
        let messenger = TwilioMessenger::new(&config).unwrap();
        assert_eq!(
            messenger.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_without_network() {
        let messenger = TwilioMessenger::new(&TelephonyConfig::default()).unwrap();
        let err = messenger.send("+1", "+2", "hi").await.unwrap_err();
        assert!(matches!(err, DialogError::SideChannelDelivery(_)));
    }

    #[tokio::test]
    async fn test_recording_messenger() {
        let messenger = RecordingMessenger::new();
        messenger.send("+911", "+912", "hello").await.unwrap();
        assert_eq!(
            messenger.sent(),
            vec![SentMessage {
                from: "+911".to_string(),
                to: "+912".to_string(),
                body: "hello".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failing_messenger_still_records() {
        let messenger = RecordingMessenger::failing();
        assert!(messenger.send("a", "b", "c").await.is_err());
        assert_eq!(messenger.sent().len(), 1);
    }

    // Messages API over HTTP

    fn config_for(server: &wiremock::MockServer) -> TelephonyConfig {
        TelephonyConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret-token".to_string(),
            api_base: server.uri(),
            ..TelephonyConfig::default()
        }
    }

    #[tokio::test]
    async fn test_send_posts_form_with_basic_auth() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/Accounts/AC123/Messages.json"))
            .and(wiremock::matchers::basic_auth("AC123", "secret-token"))
            .and(wiremock::matchers::header(
                "content-type",
                "application/x-www-form-urlencoded",
            ))
            .and(wiremock::matchers::body_string_contains("From=%2B915550001"))
            .and(wiremock::matchers::body_string_contains("To=%2B919990002"))
            .and(wiremock::matchers::body_string_contains("Body=Rasta+mil+gaya."))
            .respond_with(
                wiremock::ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"sid": "SM1", "status": "queued"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let messenger = TwilioMessenger::new(&config_for(&server)).unwrap();
        messenger
            .send("+915550001", "+919990002", "Rasta mil gaya.")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_error_status_is_delivery_failure() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"code": 20003, "message": "Authenticate"})),
            )
            .mount(&server)
            .await;

        let messenger = TwilioMessenger::new(&config_for(&server)).unwrap();
        let err = messenger.send("+1", "+2", "hi").await.unwrap_err();
        assert_eq!(
            err,
            DialogError::SideChannelDelivery("Twilio returned status 401".to_string())
        );
    }
}
