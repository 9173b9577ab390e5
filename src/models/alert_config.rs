use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result, msg};

/// How often a notification for a given urgency color may be re-sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl AlertFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFrequency::Daily => "daily",
            AlertFrequency::Weekly => "weekly",
            AlertFrequency::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for AlertFrequency {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "daily" => Ok(AlertFrequency::Daily),
            "weekly" => Ok(AlertFrequency::Weekly),
            "monthly" => Ok(AlertFrequency::Monthly),
            _ => Err(()),
        }
    }
}

/// Notification settings: who gets expiration alerts, over which channels,
/// and how often per urgency color. A singleton row; this service stores
/// and serves the configuration, delivery happens out of band.
#[derive(Debug, Serialize)]
pub struct AlertConfig {
    pub email_enabled: bool,
    pub email_recipients: Vec<String>,
    pub teams_enabled: bool,
    pub teams_webhook_url: Option<String>,
    pub frequency_critical: AlertFrequency,
    pub frequency_warning: AlertFrequency,
    pub frequency_upcoming: AlertFrequency,
    pub updated_by: Option<String>,
    pub updated_at: i64,
}

/// Replacement payload for the settings row. The row is a singleton, so
/// PUT carries every field instead of merging.
#[derive(Debug, Deserialize)]
pub struct PutAlertConfig {
    pub email_enabled: bool,
    pub email_recipients: Vec<String>,
    pub teams_enabled: bool,
    #[serde(default)]
    pub teams_webhook_url: Option<String>,
    pub frequency_critical: AlertFrequency,
    pub frequency_warning: AlertFrequency,
    pub frequency_upcoming: AlertFrequency,
}

impl PutAlertConfig {
    pub fn validate(&self) -> Result<()> {
        for recipient in &self.email_recipients {
            super::validate_email_format(recipient)?;
        }
        if self.teams_enabled
            && self
                .teams_webhook_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(AppError::BadRequest(msg::WEBHOOK_REQUIRED.into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> PutAlertConfig {
        PutAlertConfig {
            email_enabled: true,
            email_recipients: vec!["ops@example.com".into()],
            teams_enabled: false,
            teams_webhook_url: None,
            frequency_critical: AlertFrequency::Daily,
            frequency_warning: AlertFrequency::Weekly,
            frequency_upcoming: AlertFrequency::Monthly,
        }
    }

    #[test]
    fn test_valid_payload() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_recipient() {
        let mut input = payload();
        input.email_recipients.push("not-an-email".into());
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_teams_requires_webhook() {
        let mut input = payload();
        input.teams_enabled = true;
        assert!(input.validate().is_err());

        input.teams_webhook_url = Some("   ".into());
        assert!(input.validate().is_err());

        input.teams_webhook_url = Some("https://example.webhook.office.com/x".into());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_frequency_roundtrip() {
        for freq in [
            AlertFrequency::Daily,
            AlertFrequency::Weekly,
            AlertFrequency::Monthly,
        ] {
            assert_eq!(freq.as_str().parse::<AlertFrequency>(), Ok(freq));
        }
        assert!("hourly".parse::<AlertFrequency>().is_err());
    }
}
