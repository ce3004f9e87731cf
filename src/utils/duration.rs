//! Human-facing millisecond formatting and parsing.

/// `M:SS` once a minute has passed, plain seconds before that, optionally followed
/// by `.cc` centiseconds.
pub fn format_ms(ms: u64, with_centis: bool) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;

    let mut output = if minutes > 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        seconds.to_string()
    };
    if with_centis {
        output.push_str(&format!(".{:02}", (ms / 10) % 100));
    }
    output
}

/// Accepts `90`, `90s`, `1m30s`, `1m30` and `2m`. Bare numbers are seconds.
pub fn parse_duration(input: &str) -> Option<u64> {
    let input = input.trim().to_ascii_lowercase();
    if input.is_empty() {
        return None;
    }

    let (minutes, rest) = match input.split_once('m') {
        Some((minutes, rest)) => (parse_number(minutes)?, rest),
        None => (0, input.as_str()),
    };
    let seconds_part = rest.strip_suffix('s').unwrap_or(rest);
    let seconds = match (seconds_part.is_empty(), rest.is_empty()) {
        // "2m"
        (true, true) => 0,
        // a dangling "s"
        (true, false) => return None,
        _ => parse_number(seconds_part)?,
    };

    minutes
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)
}

fn parse_number(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
