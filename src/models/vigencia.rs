use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result, msg};
use crate::semaforo::{self, Classification, DEFAULT_THRESHOLDS, Thresholds, TrafficColor};

/// Lifecycle flag of a validity period. Independent of the traffic-light
/// color: an `Active` record can be expired by date, and an `Inactive` one
/// is simply excluded from dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VigenciaStatus {
    Active,
    Inactive,
    Cancelled,
}

impl VigenciaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for VigenciaStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for VigenciaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked license-validity window for one client-product link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vigencia {
    pub id: String,
    pub client_product_id: String,
    pub starts_at: i64,
    pub expires_at: i64,
    /// Informational period label (e.g. "annual", "monthly").
    pub period: Option<String>,
    pub threshold_green: i64,
    pub threshold_yellow: i64,
    pub threshold_red: i64,
    pub status: VigenciaStatus,
    pub notifications_enabled: bool,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Vigencia {
    /// The record's thresholds as a validated triple.
    ///
    /// Write paths enforce ordering, so this only fails on rows written
    /// before validation existed (or edited out-of-band).
    pub fn thresholds(&self) -> Result<Thresholds> {
        Ok(Thresholds::new(
            self.threshold_green,
            self.threshold_yellow,
            self.threshold_red,
        )?)
    }

    /// Classify this record at instant `now`.
    pub fn classify(&self, now: i64) -> Result<Classification> {
        Ok(semaforo::classify(self.expires_at, now, &self.thresholds()?))
    }
}

fn check_date_range(starts_at: i64, expires_at: i64) -> Result<()> {
    if expires_at <= starts_at {
        return Err(AppError::InvalidDateRange(
            msg::EXPIRATION_BEFORE_START.into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateVigencia {
    pub client_product_id: String,
    pub starts_at: i64,
    pub expires_at: i64,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub threshold_green: Option<i64>,
    #[serde(default)]
    pub threshold_yellow: Option<i64>,
    #[serde(default)]
    pub threshold_red: Option<i64>,
    #[serde(default)]
    pub status: Option<VigenciaStatus>,
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateVigencia {
    /// Validate the date invariant and resolve thresholds, applying the
    /// system default (90/30/15) for any omitted value.
    pub fn validate(&self) -> Result<Thresholds> {
        check_date_range(self.starts_at, self.expires_at)?;
        let (green, yellow, red) = DEFAULT_THRESHOLDS;
        Ok(Thresholds::new(
            self.threshold_green.unwrap_or(green),
            self.threshold_yellow.unwrap_or(yellow),
            self.threshold_red.unwrap_or(red),
        )?)
    }
}

/// Deserialize a double Option field where:
/// - Field absent in JSON -> None (don't update)
/// - Field present with null -> Some(None) (clear the value)
/// - Field present with value -> Some(Some(value))
fn deserialize_optional_nullable<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value: Option<T> = Option::deserialize(deserializer)?;
    Ok(Some(value))
}

/// Partial update: only present fields are written. The query layer
/// translates this into a parameterized statement; handlers never build
/// SQL from it directly.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVigencia {
    pub starts_at: Option<i64>,
    pub expires_at: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub period: Option<Option<String>>,
    pub threshold_green: Option<i64>,
    pub threshold_yellow: Option<i64>,
    pub threshold_red: Option<i64>,
    pub status: Option<VigenciaStatus>,
    pub notifications_enabled: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_nullable")]
    pub notes: Option<Option<String>>,
}

impl UpdateVigencia {
    /// Re-check invariants against the stored record.
    ///
    /// A partial edit that changes only one date is compared against the
    /// other date's stored value; likewise for thresholds.
    pub fn validate_against(&self, existing: &Vigencia) -> Result<Thresholds> {
        let starts_at = self.starts_at.unwrap_or(existing.starts_at);
        let expires_at = self.expires_at.unwrap_or(existing.expires_at);
        check_date_range(starts_at, expires_at)?;

        Ok(Thresholds::new(
            self.threshold_green.unwrap_or(existing.threshold_green),
            self.threshold_yellow.unwrap_or(existing.threshold_yellow),
            self.threshold_red.unwrap_or(existing.threshold_red),
        )?)
    }

    pub fn is_empty(&self) -> bool {
        self.starts_at.is_none()
            && self.expires_at.is_none()
            && self.period.is_none()
            && self.threshold_green.is_none()
            && self.threshold_yellow.is_none()
            && self.threshold_red.is_none()
            && self.status.is_none()
            && self.notifications_enabled.is_none()
            && self.notes.is_none()
    }
}

/// One row of the derived listing view: a vigencia joined with the client
/// and product it belongs to, plus audit names.
#[derive(Debug, Clone, Serialize)]
pub struct VigenciaDetail {
    #[serde(flatten)]
    pub vigencia: Vigencia,
    pub client_id: String,
    pub client_name: String,
    pub product_id: String,
    pub product_name: String,
    pub created_by_name: Option<String>,
    pub updated_by_name: Option<String>,
}

/// Listing row annotated with the engine's classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedVigencia {
    #[serde(flatten)]
    pub detail: VigenciaDetail,
    pub days_remaining: i64,
    pub color: TrafficColor,
}

impl ClassifiedVigencia {
    pub fn new(detail: VigenciaDetail, now: i64) -> Result<Self> {
        let classification = detail.vigencia.classify(now)?;
        Ok(Self {
            detail,
            days_remaining: classification.days_remaining,
            color: classification.color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_700_000_000;

    fn base_create() -> CreateVigencia {
        CreateVigencia {
            client_product_id: "vg_lnk_00000000000000000000000000000000".into(),
            starts_at: NOW,
            expires_at: NOW + 365 * DAY,
            period: Some("annual".into()),
            threshold_green: None,
            threshold_yellow: None,
            threshold_red: None,
            status: None,
            notifications_enabled: None,
            notes: None,
        }
    }

    fn stored(starts_at: i64, expires_at: i64) -> Vigencia {
        Vigencia {
            id: "vg_vig_00000000000000000000000000000000".into(),
            client_product_id: "vg_lnk_00000000000000000000000000000000".into(),
            starts_at,
            expires_at,
            period: None,
            threshold_green: 90,
            threshold_yellow: 30,
            threshold_red: 15,
            status: VigenciaStatus::Active,
            notifications_enabled: true,
            notes: None,
            created_by: None,
            updated_by: None,
            created_at: NOW,
            updated_at: NOW,
        }
    }

    #[test]
    fn test_create_defaults_thresholds() {
        let t = base_create().validate().unwrap();
        assert_eq!((t.green(), t.yellow(), t.red()), DEFAULT_THRESHOLDS);
    }

    #[test]
    fn test_create_rejects_equal_dates() {
        let mut input = base_create();
        input.expires_at = input.starts_at;
        assert!(matches!(
            input.validate(),
            Err(AppError::InvalidDateRange(_))
        ));
    }

    #[test]
    fn test_create_rejects_inverted_thresholds() {
        let mut input = base_create();
        input.threshold_red = Some(120); // above default yellow and green
        assert!(matches!(
            input.validate(),
            Err(AppError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_partial_update_rechecks_against_stored_date() {
        let existing = stored(NOW, NOW + 30 * DAY);

        // Moving the start past the stored expiration must fail even though
        // the update itself carries no expiration.
        let update = UpdateVigencia {
            starts_at: Some(NOW + 60 * DAY),
            ..Default::default()
        };
        assert!(matches!(
            update.validate_against(&existing),
            Err(AppError::InvalidDateRange(_))
        ));

        // Moving the expiration before the stored start fails symmetrically.
        let update = UpdateVigencia {
            expires_at: Some(NOW - DAY),
            ..Default::default()
        };
        assert!(matches!(
            update.validate_against(&existing),
            Err(AppError::InvalidDateRange(_))
        ));

        // A consistent partial edit passes and keeps stored thresholds.
        let update = UpdateVigencia {
            expires_at: Some(NOW + 90 * DAY),
            ..Default::default()
        };
        let t = update.validate_against(&existing).unwrap();
        assert_eq!((t.green(), t.yellow(), t.red()), (90, 30, 15));
    }

    #[test]
    fn test_partial_update_rechecks_merged_thresholds() {
        let existing = stored(NOW, NOW + 365 * DAY);
        let update = UpdateVigencia {
            threshold_yellow: Some(10), // now below stored red of 15
            ..Default::default()
        };
        assert!(matches!(
            update.validate_against(&existing),
            Err(AppError::InvalidThresholds(_))
        ));
    }

    #[test]
    fn test_vigencia_classify_uses_own_thresholds() {
        let mut v = stored(NOW - 10 * DAY, NOW + 20 * DAY);
        v.threshold_red = 25;
        v.threshold_yellow = 40;
        v.threshold_green = 90;
        let c = v.classify(NOW).unwrap();
        assert_eq!(c.days_remaining, 20);
        assert_eq!(c.color, TrafficColor::Critical);
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            VigenciaStatus::Active,
            VigenciaStatus::Inactive,
            VigenciaStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<VigenciaStatus>(), Ok(status));
        }
    }
}
