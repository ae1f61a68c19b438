//! Pure codec between posts and external trigger jobs.

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use plume_store::{PostId, UserId};

/// Fixed prefix of trigger job names. Combined with the post id this is
/// collision-free, so re-deriving the name always targets the same trigger.
pub const JOB_NAME_PREFIX: &str = "post-share";

/// Deterministic trigger name for a post.
pub fn job_name(post_id: PostId) -> String {
    format!("{}-{}", JOB_NAME_PREFIX, post_id)
}

/// One-shot 5-field cron expression firing at `at` in `tz`.
///
/// Instants are truncated to the minute; the service offers no sub-minute
/// precision. The year is not representable in cron, which is fine for
/// triggers scheduled less than a year out.
pub fn to_cron(at: DateTime<Utc>, tz: Tz) -> String {
    let local = at.with_timezone(&tz);
    format!(
        "{} {} {} {} *",
        local.minute(),
        local.hour(),
        local.day(),
        local.month()
    )
}

/// JSON body the trigger delivers to the callback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    pub user_id: UserId,
    pub post_id: PostId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use uuid::Uuid;

    #[test]
    fn test_job_name_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(job_name(id), job_name(id));
        assert!(job_name(id).starts_with("post-share-"));
    }

    #[test]
    fn test_job_name_distinct_per_post() {
        assert_ne!(job_name(Uuid::new_v4()), job_name(Uuid::new_v4()));
    }

    #[test]
    fn test_to_cron_utc() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(to_cron(at, chrono_tz::UTC), "30 14 15 1 *");
    }

    #[test]
    fn test_to_cron_converts_timezone() {
        // 14:30 UTC is 09:30 in New York in January (EST, UTC-5)
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap();
        assert_eq!(to_cron(at, chrono_tz::America::New_York), "30 9 15 1 *");
    }

    #[test]
    fn test_to_cron_crosses_date_line() {
        // 23:30 UTC on Jan 15 is already Jan 16 in Tokyo (UTC+9)
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 23, 30, 0).unwrap();
        assert_eq!(to_cron(at, chrono_tz::Asia::Tokyo), "30 8 16 1 *");
    }

    #[test]
    fn test_to_cron_truncates_seconds() {
        let exact = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 0).unwrap();
        let with_seconds = Utc.with_ymd_and_hms(2024, 6, 1, 8, 5, 59).unwrap();
        assert_eq!(
            to_cron(exact, chrono_tz::UTC),
            to_cron(with_seconds, chrono_tz::UTC)
        );
    }

    #[test]
    fn test_callback_payload_json_shape() {
        let payload = CallbackPayload {
            user_id: Uuid::nil(),
            post_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("user_id").is_some());
        assert!(value.get("post_id").is_some());
    }

    proptest! {
        // Five space-separated fields, trailing wildcard, in-range values
        #[test]
        fn cron_is_well_formed(secs in 0i64..4_000_000_000) {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            let cron = to_cron(at, chrono_tz::UTC);
            let fields: Vec<&str> = cron.split(' ').collect();

            prop_assert_eq!(fields.len(), 5);
            prop_assert_eq!(fields[4], "*");
            prop_assert!(fields[0].parse::<u32>().unwrap() < 60);
            prop_assert!(fields[1].parse::<u32>().unwrap() < 24);
            let day = fields[2].parse::<u32>().unwrap();
            prop_assert!((1..=31).contains(&day));
            let month = fields[3].parse::<u32>().unwrap();
            prop_assert!((1..=12).contains(&month));
        }

        // Same post id, same job name; the registration key is stable
        #[test]
        fn job_name_stable(bytes in prop::array::uniform16(any::<u8>())) {
            let id = Uuid::from_bytes(bytes);
            prop_assert_eq!(job_name(id), job_name(id));
        }
    }
}
