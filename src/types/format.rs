//! Human-readable elapsed-time formatting shared by notifications and the
//! StatusView stopwatch.

/// Formats a number of seconds as days/hours/minutes/seconds, omitting
/// leading units that are zero, e.g. `"1 day 2 hours 0 minutes 5 seconds"`
/// or `"42 seconds"`. Zero seconds renders as an empty string.
pub fn format_duration(total_secs: u64) -> String {
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut text = String::new();
    if days > 0 {
        text.push_str(&unit(days, "day"));
        text.push(' ');
    }
    if days > 0 || hours > 0 {
        text.push_str(&unit(hours, "hour"));
        text.push(' ');
    }
    if days > 0 || hours > 0 || minutes > 0 {
        text.push_str(&unit(minutes, "minute"));
        text.push(' ');
    }
    if days > 0 || hours > 0 || minutes > 0 || seconds > 0 {
        text.push_str(&unit(seconds, "second"));
    }
    text.trim_end().to_string()
}

fn unit(n: u64, name: &str) -> String {
    if n == 1 {
        format!("1 {}", name)
    } else {
        format!("{} {}s", n, name)
    }
}
