//! Shared formatting utilities for UI components.

/// Format a Unix timestamp (seconds) as `YYYY-MM-DD HH:MM`, UTC.
///
/// A hand-rolled civil-calendar conversion (Howard Hinnant's `civil_from_days`
/// algorithm) rather than a date/time crate dependency, since the only thing
/// needed here is one fixed display format for a last-write time.
pub fn format_timestamp(unix_seconds: i64) -> String {
    let days = unix_seconds.div_euclid(86_400);
    let secs_of_day = unix_seconds.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    let hour = secs_of_day / 3600;
    let minute = (secs_of_day % 3600) / 60;
    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")
}

/// Days-since-epoch to (year, month, day), proleptic Gregorian, UTC.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}

/// Short, single-line preview of a registry value's raw bytes, tailored to
/// its declared type string (as returned by the hive reader). Falls back to
/// a hex dump for types the reader doesn't name as one of the common
/// `REG_*` kinds.
pub fn preview_value(value_type: &str, bytes: &[u8]) -> String {
    match value_type {
        t if t.contains("MULTI_SZ") => decode_multi_sz(bytes),
        t if t.contains("SZ") || t.contains("EXPAND") => {
            decode_utf16_nul(bytes).unwrap_or_else(|| hex_preview(bytes))
        }
        t if t.contains("DWORD") => read_u32_le(bytes)
            .map(|n| n.to_string())
            .unwrap_or_else(|| hex_preview(bytes)),
        t if t.contains("QWORD") => read_u64_le(bytes)
            .map(|n| n.to_string())
            .unwrap_or_else(|| hex_preview(bytes)),
        _ => hex_preview(bytes),
    }
}

fn decode_utf16_nul(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 || bytes.is_empty() {
        return None;
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16(&units).ok()
}

fn decode_multi_sz(bytes: &[u8]) -> String {
    if bytes.len() % 2 != 0 {
        return hex_preview(bytes);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let strings: Vec<String> = units
        .split(|&u| u == 0)
        .filter(|s| !s.is_empty())
        .filter_map(|s| String::from_utf16(s).ok())
        .collect();
    if strings.is_empty() {
        "(empty)".to_string()
    } else {
        strings.join("; ")
    }
}

fn read_u32_le(bytes: &[u8]) -> Option<u32> {
    Some(u32::from_le_bytes(bytes.get(0..4)?.try_into().ok()?))
}

fn read_u64_le(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_le_bytes(bytes.get(0..8)?.try_into().ok()?))
}

fn hex_preview(bytes: &[u8]) -> String {
    const MAX: usize = 16;
    let shown = &bytes[..bytes.len().min(MAX)];
    let mut s: String = shown.iter().map(|b| format!("{b:02x} ")).collect();
    if bytes.len() > MAX {
        s.push('…');
    }
    s.trim_end().to_string()
}

/// Format a `(subkeys)` suffix for a tree row, or an empty string for a leaf.
pub fn counts_suffix(has_children: bool, subkey_count: u32) -> String {
    if has_children {
        format!(" ({subkey_count})")
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch_start() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
    }

    #[test]
    fn formats_a_known_date() {
        // 2024-01-15 12:30:00 UTC
        assert_eq!(format_timestamp(1_705_321_800), "2024-01-15 12:30");
    }

    #[test]
    fn previews_a_dword_as_decimal() {
        assert_eq!(preview_value("REG_DWORD", &42u32.to_le_bytes()), "42");
    }

    #[test]
    fn previews_a_sz_as_text() {
        let utf16: Vec<u8> = "hi"
            .encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|u| u.to_le_bytes())
            .collect();
        assert_eq!(preview_value("REG_SZ", &utf16), "hi");
    }

    #[test]
    fn falls_back_to_hex_for_binary() {
        assert_eq!(preview_value("REG_BINARY", &[0xde, 0xad, 0xbe, 0xef]), "de ad be ef");
    }
}
