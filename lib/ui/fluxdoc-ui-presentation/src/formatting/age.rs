use chrono::{DateTime, Duration, Utc};

pub fn format_age(created: Option<DateTime<Utc>>) -> String {
    match created {
        Some(created) => format_age_since(created, Utc::now()),
        None => "<unknown>".to_string(),
    }
}

/// Compact age like `45s`, `3h12m` or `1y20d`.
pub fn format_age_since(created: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created).max(Duration::zero());
    if elapsed < Duration::minutes(1) {
        return format!("{}s", elapsed.num_seconds());
    }
    if elapsed < Duration::hours(1) {
        return format!("{}m", elapsed.num_minutes());
    }
    if elapsed < Duration::days(1) {
        let hours = elapsed.num_hours();
        let minutes = elapsed.num_minutes() % 60;
        return if minutes > 0 {
            format!("{hours}h{minutes}m")
        } else {
            format!("{hours}h")
        };
    }
    let days = elapsed.num_days();
    if days > 365 {
        format!("{}y{}d", days / 365, days % 365)
    } else {
        format!("{days}d")
    }
}
