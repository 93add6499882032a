/// Normalizes an Ethiopian phone number to the `+251...` form used as account id.
///
/// Numbers that match none of the known shapes are returned unchanged.
pub fn normalize_msisdn(raw: &str) -> String {
    let cleaned = raw.trim();

    if cleaned.starts_with("+251") {
        cleaned.to_string()
    } else if cleaned.starts_with("251") {
        format!("+{cleaned}")
    } else if let Some(rest) = cleaned.strip_prefix('0')
        && rest.starts_with('9')
    {
        format!("+251{rest}")
    } else if cleaned.len() == 9 && (cleaned.starts_with('9') || cleaned.starts_with('7')) {
        format!("+251{cleaned}")
    } else {
        raw.to_string()
    }
}
