//! Display helpers shared by dashboard consumers.

use serde::Serialize;
use url::Url;

const LABEL_MAX_CHARS: usize = 30;

/// Groups the integer part of `value` with commas, e.g. `1234567.8` → `"1,234,568"`.
pub fn format_number(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Korean won, which has no minor unit: `89000.0` → `"₩89,000"`.
pub fn format_currency_krw(value: f64) -> String {
    let number = format_number(value);
    match number.strip_prefix('-') {
        Some(abs) => format!("-₩{abs}"),
        None => format!("₩{number}"),
    }
}

/// One decimal place, e.g. `66.666` → `"66.7%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Human-readable duration from millis: `850ms`, `42s`, `1m 5s`, `2h 3m`.
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{ms}ms");
    }
    let seconds = ms / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;

    if hours > 0 {
        format!("{hours}h {}m", minutes % 60)
    } else if minutes > 0 {
        format!("{minutes}m {}s", seconds % 60)
    } else {
        format!("{seconds}s")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoiTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl RoiTier {
    pub fn classify(roi: f64) -> Self {
        if roi >= 400.0 {
            Self::Excellent
        } else if roi >= 200.0 {
            Self::Good
        } else if roi >= 0.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ConversionTier {
    pub fn classify(rate: f64) -> Self {
        if rate >= 50.0 {
            Self::Excellent
        } else if rate >= 30.0 {
            Self::Good
        } else if rate >= 10.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

/// Short node label: the URL path, or the host when the path is `/`.
/// Strings that do not parse as URLs are used as-is. Labels longer than 30
/// characters are cut and suffixed with `...`.
pub fn url_label(raw: &str) -> String {
    let label = match Url::parse(raw) {
        Ok(url) => match (url.path(), url.host_str()) {
            ("/" | "", Some(host)) => host.to_string(),
            (path, _) => path.to_string(),
        },
        Err(_) => raw.to_string(),
    };

    if label.chars().count() > LABEL_MAX_CHARS {
        let cut: String = label.chars().take(LABEL_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        label
    }
}

/// Extract the host from a full referrer URL, lowercased.
///
/// Returns `None` if referrer is empty or cannot be parsed to a non-empty host.
pub fn extract_referrer_domain(referrer: &str) -> Option<String> {
    if referrer.is_empty() {
        return None;
    }
    // Strip scheme prefix and take everything before the first '/'.
    let stripped = referrer
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let domain = stripped.split(['/', '?', '#']).next()?;
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_lowercase())
    }
}
