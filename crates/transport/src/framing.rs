//! Marker-terminated text units: `<payload> \EOF\n`.

use crate::error::{TransportError, TransportResult};

/// Literal token closing every unit on the wire.
pub const EOF_TOKEN: &str = "\\EOF";

/// Frame `payload` for the wire.
pub fn encode_unit(payload: &str) -> TransportResult<String> {
    if payload.contains(['\n', '\r']) {
        return Err(TransportError::InvalidPayload("payload contains a line break"));
    }
    Ok(format!("{payload} {EOF_TOKEN}\n"))
}

/// If `line` (without its line terminator) ends a unit, return the payload
/// part before the marker with exactly one separator removed.
///
/// The marker must be its own whitespace-delimited token; anything after it
/// other than whitespace means the line does not end a unit.
pub fn strip_marker(line: &str) -> Option<&str> {
    let line = line.trim_end();
    if line == EOF_TOKEN {
        return Some("");
    }
    let head = line.strip_suffix(EOF_TOKEN)?;
    let sep = head.chars().next_back().filter(|c| c.is_whitespace())?;
    Some(&head[..head.len() - sep.len_utf8()])
}

/// Drop a trailing `\n` or `\r\n`.
pub(crate) fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(encode_unit("9").unwrap(), "9 \\EOF\n");
        assert_eq!(encode_unit(" A  B ").unwrap(), " A  B  \\EOF\n");
        assert!(matches!(
            encode_unit("A\nB"),
            Err(TransportError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("9 \\EOF"), Some("9"));
        assert_eq!(strip_marker("9 \\EOF  "), Some("9"));
        assert_eq!(strip_marker("\\EOF"), Some(""));
        assert_eq!(strip_marker(" A  B  \\EOF"), Some(" A  B "));
        assert_eq!(strip_marker("9\t\\EOF"), Some("9"));
        assert_eq!(strip_marker("9\\EOF"), None);
        assert_eq!(strip_marker("9 \\EOF X"), None);
        assert_eq!(strip_marker("HELLO"), None);
    }

    #[test]
    fn test_chomp() {
        assert_eq!(chomp("AB\r\n"), "AB");
        assert_eq!(chomp("AB\n"), "AB");
        assert_eq!(chomp("AB "), "AB ");
    }
}
