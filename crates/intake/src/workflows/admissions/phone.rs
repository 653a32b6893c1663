/// Marker that identifies a number already in international form.
const INTERNATIONAL_PREFIX: char = '+';

/// Normalize a stored phone number for delivery.
///
/// Numbers that already start with `+` are kept as-is; anything else gets `+{country_code}`
/// prepended exactly once. Surrounding whitespace is dropped.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with(INTERNATIONAL_PREFIX) {
        return trimmed.to_string();
    }

    let country_code = country_code.trim().trim_start_matches(INTERNATIONAL_PREFIX);
    format!("{INTERNATIONAL_PREFIX}{country_code}{trimmed}")
}
