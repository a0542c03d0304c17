//! Schedule decisions - pure go/no-go logic over a campaign snapshot
//!
//! Everything here is side-effect free: callers pass the current instant
//! explicitly, and all evaluation happens in UTC.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use zapflow_storage::models::Campaign;

/// True when the campaign has no start date.
///
/// Quick-start means "run once, right now": the weekday and time-window
/// gates are intentionally ignored, even when configured. This is
/// declared behavior, not an accident of the checks below.
pub fn is_quick_start(campaign: &Campaign) -> bool {
    campaign.start_date.is_none()
}

/// True when the campaign has an end boundary and it has passed
pub fn is_expired(campaign: &Campaign, now: DateTime<Utc>) -> bool {
    match campaign.end_date {
        Some(end) => now > end,
        None => false,
    }
}

/// Decide whether the campaign should execute at `now`.
///
/// Gates, in order: quick-start bypass, start date, expiry, scheduled
/// weekdays, wall-clock window (inclusive on both ends).
pub fn should_execute_now(campaign: &Campaign, now: DateTime<Utc>) -> bool {
    if is_quick_start(campaign) {
        return true;
    }

    // Not due yet
    match campaign.start_date {
        Some(start) if now < start => return false,
        _ => {}
    }

    if is_expired(campaign, now) {
        return false;
    }

    let days = campaign.scheduled_days_vec();
    if !days.is_empty() {
        let today = weekday_name(now.weekday());
        if !days.iter().any(|d| d.eq_ignore_ascii_case(today)) {
            return false;
        }
    }

    if let (Some(start), Some(end)) = (&campaign.start_time, &campaign.end_time) {
        // Malformed window values do not gate; launch-side validation
        // is outside this core.
        if let (Some(start), Some(end)) = (parse_wall_clock(start), parse_wall_clock(end)) {
            let time_of_day = now.time();
            if time_of_day < start || time_of_day > end {
                return false;
            }
        }
    }

    true
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn parse_wall_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_campaign() -> Campaign {
        Campaign {
            id: uuid::Uuid::new_v4(),
            tenant_id: uuid::Uuid::new_v4(),
            name: "promo".to_string(),
            campaign_type: "individual".to_string(),
            instance_id: "main".to_string(),
            status: "active".to_string(),
            scheduled_days: serde_json::json!([]),
            start_time: None,
            end_time: None,
            start_date: None,
            end_date: None,
            message_interval: 30,
            total_contacts: 0,
            sent_messages: 0,
            failed_messages: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_quick_start_bypasses_all_gates() {
        // Monday-only window campaign with no start date: runs any time
        let mut campaign = base_campaign();
        campaign.scheduled_days = serde_json::json!(["monday"]);
        campaign.start_time = Some("09:00".to_string());
        campaign.end_time = Some("18:00".to_string());

        // 2024-01-06 is a Saturday, 03:30 is outside the window
        let now = at(2024, 1, 6, 3, 30);
        assert!(is_quick_start(&campaign));
        assert!(should_execute_now(&campaign, now));
    }

    #[test]
    fn test_not_due_before_start_date() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 10, 0, 0));

        assert!(!should_execute_now(&campaign, at(2024, 1, 9, 23, 59)));
        assert!(should_execute_now(&campaign, at(2024, 1, 10, 0, 0)));
    }

    #[test]
    fn test_expired_campaign_does_not_execute() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));
        campaign.end_date = Some(at(2024, 1, 31, 23, 59));

        let past_expiry = at(2024, 2, 1, 0, 0);
        assert!(is_expired(&campaign, past_expiry));
        assert!(!should_execute_now(&campaign, past_expiry));

        let before_expiry = at(2024, 1, 15, 12, 0);
        assert!(!is_expired(&campaign, before_expiry));
        assert!(should_execute_now(&campaign, before_expiry));
    }

    #[test]
    fn test_window_gating_is_inclusive() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));
        campaign.start_time = Some("09:00".to_string());
        campaign.end_time = Some("18:00".to_string());

        assert!(!should_execute_now(&campaign, at(2024, 1, 2, 8, 59)));
        assert!(should_execute_now(&campaign, at(2024, 1, 2, 9, 0)));
        assert!(should_execute_now(&campaign, at(2024, 1, 2, 18, 0)));
        assert!(!should_execute_now(&campaign, at(2024, 1, 2, 18, 1)));
    }

    #[test]
    fn test_day_gating() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));
        campaign.scheduled_days = serde_json::json!(["monday"]);

        // 2024-01-01 is a Monday
        assert!(should_execute_now(&campaign, at(2024, 1, 1, 12, 0)));

        // Tuesday through Sunday
        for day in 2..=7 {
            assert!(
                !should_execute_now(&campaign, at(2024, 1, day, 12, 0)),
                "2024-01-0{} should be gated",
                day
            );
        }

        // Next Monday again
        assert!(should_execute_now(&campaign, at(2024, 1, 8, 12, 0)));
    }

    #[test]
    fn test_day_gate_combines_with_window() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));
        campaign.scheduled_days = serde_json::json!(["monday"]);
        campaign.start_time = Some("09:00".to_string());
        campaign.end_time = Some("18:00".to_string());

        // Right day, wrong hour
        assert!(!should_execute_now(&campaign, at(2024, 1, 1, 8, 0)));
        // Right day, right hour
        assert!(should_execute_now(&campaign, at(2024, 1, 1, 10, 0)));
    }

    #[test]
    fn test_empty_days_means_no_restriction() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));

        for day in 1..=7 {
            assert!(should_execute_now(&campaign, at(2024, 1, day, 12, 0)));
        }
    }

    #[test]
    fn test_malformed_window_does_not_gate() {
        let mut campaign = base_campaign();
        campaign.start_date = Some(at(2024, 1, 1, 0, 0));
        campaign.start_time = Some("9am".to_string());
        campaign.end_time = Some("6pm".to_string());

        assert!(should_execute_now(&campaign, at(2024, 1, 2, 3, 0)));
    }
}
