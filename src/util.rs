//! Small utility helpers used across modules.

/// Parse a submitted answer string. Accepts integers and decimals with
/// surrounding whitespace; anything else means an invalid submission.
/// Invalid submissions are scored, not raised (see `engine`).
pub fn parse_answer(raw: &str) -> Option<f64> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to two decimals for wire payloads; keeps elapsed-time floats tidy.
pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn answers_parse_as_integers_or_decimals() {
    assert_eq!(parse_answer("42"), Some(42.0));
    assert_eq!(parse_answer("  -7 "), Some(-7.0));
    assert_eq!(parse_answer("3.5"), Some(3.5));
    assert_eq!(parse_answer(""), None);
    assert_eq!(parse_answer("  "), None);
    assert_eq!(parse_answer("seven"), None);
    assert_eq!(parse_answer("NaN"), None);
    assert_eq!(parse_answer("inf"), None);
  }

  #[test]
  fn round2_truncates_noise() {
    assert_eq!(round2(1.23456), 1.23);
    assert_eq!(round2(0.999), 1.0);
  }
}
