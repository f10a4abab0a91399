//! Title normalisation for uploaded media.

use percent_encoding::percent_decode_str;

use crate::error::AppError;

/// Decode a form-encoded title and strip a trailing filename extension.
///
/// `+` decodes to a space and `%XX` sequences must form valid UTF-8. Everything
/// after the last `.` is dropped, unless that would leave nothing behind
/// (`.hidden` stays as is).
pub fn decode_title(raw: &str) -> Result<String, AppError> {
    let plus_decoded = raw.replace('+', " ");
    let decoded = percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map_err(|e| AppError::InvalidInput(format!("Title is not valid UTF-8: {}", e)))?
        .into_owned();

    if decoded.trim().is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()));
    }

    match decoded.rfind('.') {
        Some(0) | None => Ok(decoded),
        Some(idx) => Ok(decoded[..idx].to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_extension() {
        assert_eq!(decode_title("My Vacation.png").unwrap(), "My Vacation");
        assert_eq!(decode_title("archive.tar.gz").unwrap(), "archive.tar");
        assert_eq!(decode_title("no extension").unwrap(), "no extension");
    }

    #[test]
    fn test_url_decodes_before_stripping() {
        assert_eq!(decode_title("My+Vacation%2Epng").unwrap(), "My Vacation");
        assert_eq!(decode_title("%D0%9C%D0%BE%D1%80%D0%B5.jpg").unwrap(), "Море");
    }

    #[test]
    fn test_leading_dot_only_is_kept() {
        assert_eq!(decode_title(".hidden").unwrap(), ".hidden");
    }

    #[test]
    fn test_rejects_blank_and_invalid_titles() {
        assert!(matches!(decode_title(""), Err(AppError::InvalidInput(_))));
        assert!(matches!(decode_title("+++"), Err(AppError::InvalidInput(_))));
        assert!(matches!(decode_title("%FF%FE"), Err(AppError::InvalidInput(_))));
    }
}
