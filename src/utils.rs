/// turns an ISO country code into its regional-indicator flag emoji
/// ("US" -> 🇺🇸). The profile API promises uppercase ASCII codes.
pub fn country_emoji(country_code: &str) -> String {
    country_code
        .chars()
        .filter_map(|c| char::from_u32(127_397 + c as u32))
        .collect()
}
