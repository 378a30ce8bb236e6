use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The wiki a bot edits and the account it edits as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteProfile {
    pub id: String,
    pub api_url: url::Url,
    /// Bot-password login name, e.g. `ReadingBot@bot`.
    pub username: String,
    #[serde(default)]
    pub throttle_policy: ThrottlePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottlePolicy {
    #[serde(with = "duration_secs")]
    pub min_edit_interval: Duration,
    pub maxlag: u32,
    pub max_retries: u32,
    #[serde(with = "duration_secs")]
    pub backoff_base: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            min_edit_interval: Duration::from_secs(12),
            maxlag: 5,
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_policy_default() {
        let policy = ThrottlePolicy::default();
        assert_eq!(policy.min_edit_interval, Duration::from_secs(12));
        assert_eq!(policy.maxlag, 5);
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_base, Duration::from_secs(2));
    }

    #[test]
    fn test_throttle_policy_serialization() {
        let policy = ThrottlePolicy {
            min_edit_interval: Duration::from_secs(10),
            maxlag: 3,
            max_retries: 5,
            backoff_base: Duration::from_millis(1500),
        };

        let json = serde_json::to_string(&policy).unwrap();
        let deserialized: ThrottlePolicy = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.min_edit_interval, Duration::from_secs(10));
        assert_eq!(deserialized.maxlag, 3);
        assert_eq!(deserialized.max_retries, 5);
        assert_eq!(deserialized.backoff_base, Duration::from_millis(1500));
    }

    #[test]
    fn test_site_profile_defaults_throttle_policy() {
        let json = r#"{
            "id": "hive",
            "api_url": "https://wiki.example.org/w/api.php",
            "username": "ReadingBot@bot"
        }"#;
        let profile: SiteProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, "hive");
        assert_eq!(profile.api_url.as_str(), "https://wiki.example.org/w/api.php");
        assert_eq!(profile.throttle_policy.maxlag, 5);
    }
}
