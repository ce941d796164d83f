/// Reduce raw OCR text to a plate token: ASCII letters and digits only, uppercased.
///
/// Total over all inputs; punctuation-only text yields an empty token.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
