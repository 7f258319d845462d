//! Byte sizes written as `256MB`, `1GB`, `512KB` or plain bytes.

use thiserror::Error;

/// A size string that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid size '{0}' - expected format like '256MB', '1GB', or '512KB'")]
pub struct SizeParseError(String);

/// Parse a size into bytes. Suffixes are binary and case-insensitive.
///
/// ```
/// use regobs_tiles::config::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("2 KB").unwrap(), 2048);
/// assert_eq!(parse_size("256mb").unwrap(), 256 * 1024 * 1024);
/// ```
pub fn parse_size(input: &str) -> Result<usize, SizeParseError> {
    let trimmed = input.trim();
    let upper = trimmed.to_uppercase();

    let (number, multiplier) = [("GB", 1usize << 30), ("G", 1 << 30), ("MB", 1 << 20), ("M", 1 << 20), ("KB", 1 << 10), ("K", 1 << 10), ("B", 1)]
        .iter()
        .find_map(|(suffix, multiplier)| {
            upper
                .strip_suffix(suffix)
                .map(|number| (number.trim().to_string(), *multiplier))
        })
        .unwrap_or_else(|| (upper.clone(), 1));

    number
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_mul(multiplier))
        .ok_or_else(|| SizeParseError(input.to_string()))
}

/// Format bytes with the largest whole binary unit.
pub fn format_size(bytes: usize) -> String {
    for (suffix, unit) in [("GB", 1usize << 30), ("MB", 1 << 20), ("KB", 1 << 10)] {
        if bytes >= unit && bytes % unit == 0 {
            return format!("{}{}", bytes / unit, suffix);
        }
    }
    bytes.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suffixes() {
        assert_eq!(parse_size("1G").unwrap(), 1 << 30);
        assert_eq!(parse_size("3m").unwrap(), 3 << 20);
        assert_eq!(parse_size(" 10 kb ").unwrap(), 10 << 10);
        assert_eq!(parse_size("77B").unwrap(), 77);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_size("").is_err());
        assert!(parse_size("MB").is_err());
        assert!(parse_size("1.5GB").is_err());
        assert!(parse_size("-1").is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format_size(256 << 20), "256MB");
        assert_eq!(format_size(2 << 30), "2GB");
        assert_eq!(format_size(1500), "1500");
    }
}
