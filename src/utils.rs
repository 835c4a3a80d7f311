use crate::consts::DEFAULT_COUNTRY_CODE;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Reduce a raw phone value to bare digits, stripping the default country
/// prefix when present.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if digits.len() == 12 && digits.starts_with(DEFAULT_COUNTRY_CODE) {
        return Some(digits[DEFAULT_COUNTRY_CODE.len()..].to_string());
    }
    Some(digits)
}

/// Bare 10-digit numbers get the default country prefix before dialing.
pub fn prefix_country_code(digits: &str) -> String {
    if digits.len() == 10 {
        format!("{DEFAULT_COUNTRY_CODE}{digits}")
    } else {
        digits.to_string()
    }
}

/// Locate the first balanced `{...}` substring, skipping braces inside JSON
/// string literals.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + idx + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Render an ISO callback time the way the dashboard shows it ("3:30 PM").
/// Anything that does not parse as a timestamp passes through untouched.
pub fn format_callback_time(raw: &str) -> String {
    let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) else {
        return raw.to_string();
    };
    let meridiem = if dt.hour() >= 12 { "PM" } else { "AM" };
    let hour = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    if dt.minute() == 0 {
        format!("{hour} {meridiem}")
    } else {
        format!("{hour}:{:02} {meridiem}", dt.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_country_prefix() {
        assert_eq!(normalize_phone("+919876543210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("919876543210").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("9876543210").as_deref(), Some("9876543210"));
    }

    #[test]
    fn normalize_keeps_digits_only() {
        assert_eq!(normalize_phone("98-76 54(32)10").as_deref(), Some("9876543210"));
        assert_eq!(normalize_phone("N/A"), None);
        assert_eq!(normalize_phone(""), None);
    }

    #[test]
    fn prefix_only_applies_to_ten_digit_numbers() {
        assert_eq!(prefix_country_code("9876543210"), "919876543210");
        assert_eq!(prefix_country_code("919876543210"), "919876543210");
        assert_eq!(prefix_country_code("12345"), "12345");
    }

    #[test]
    fn finds_first_balanced_object() {
        let text = "Here you go:\n{\"name\": \"Asha\", \"nested\": {\"a\": 1}}\nHope that helps!";
        assert_eq!(
            first_json_object(text),
            Some("{\"name\": \"Asha\", \"nested\": {\"a\": 1}}")
        );
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"summary": "asked about {pricing}", "name": null}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(first_json_object("no json here"), None);
        assert_eq!(first_json_object("{unterminated"), None);
    }

    #[test]
    fn callback_time_renders_twelve_hour_clock() {
        assert_eq!(format_callback_time("2024-05-01T15:30:00Z"), "3:30 PM");
        assert_eq!(format_callback_time("2024-05-01T09:00:00Z"), "9 AM");
        assert_eq!(format_callback_time("2024-05-01T00:05:00Z"), "12:05 AM");
    }

    #[test]
    fn callback_time_passes_through_free_text() {
        assert_eq!(format_callback_time("tomorrow evening"), "tomorrow evening");
        assert_eq!(format_callback_time("N/A"), "N/A");
    }
}
