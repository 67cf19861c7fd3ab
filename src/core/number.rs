//! Numeric text handling for the `time` and `MHavgTime` columns.
//!
//! Parsing is lenient by default: the longest leading decimal literal is used
//! and anything after it is ignored, so `"1.5s"` reads as `1.5` and `"abc"`
//! reads as NaN. Rendering uses the shortest digits that round-trip, switching
//! to exponent notation for magnitudes below `1e-6` or from `1e21` up.

const INFINITY_WORD: &[u8] = b"Infinity";

/// Unicode white space plus the byte order mark, minus NEL (U+0085).
fn is_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Byte length of the run of leading white space in `text`, decoding
/// multi-byte UTF-8 characters as it goes.
fn leading_space_len(text: &[u8]) -> usize {
    let mut i = 0;
    while let Some(&lead) = text.get(i) {
        let width = match lead {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => break,
        };
        let Some(bytes) = text.get(i..i + width) else {
            break;
        };
        let Some(c) = std::str::from_utf8(bytes).ok().and_then(|s| s.chars().next()) else {
            break;
        };
        if !is_space(c) {
            break;
        }
        i += width;
    }
    i
}

/// Parses the longest numeric prefix of `text` after leading white space.
/// Returns NaN when no prefix is numeric.
pub fn parse_float_prefix(text: &[u8]) -> f64 {
    let text = &text[leading_space_len(text)..];
    match scan_number(text) {
        Some((value, _)) => value,
        None => f64::NAN,
    }
}

/// Parses `text` only if the whole of it is a single number.
pub fn parse_float_strict(text: &[u8]) -> Option<f64> {
    match scan_number(text) {
        Some((value, used)) if used == text.len() => Some(value),
        _ => None,
    }
}

/// Returns the value of the numeric literal at the start of `text` and the
/// number of bytes it spans.
fn scan_number(text: &[u8]) -> Option<(f64, usize)> {
    let sign_len = usize::from(matches!(text.first(), Some(b'+' | b'-')));
    let negative = text.first() == Some(&b'-');
    let body = &text[sign_len..];

    if body.starts_with(INFINITY_WORD) {
        let value = if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some((value, sign_len + INFINITY_WORD.len()));
    }

    let len = decimal_len(body);
    if len == 0 {
        return None;
    }
    let used = sign_len + len;
    // The slice is ASCII digits, sign, '.', and exponent markers only.
    let literal = std::str::from_utf8(&text[..used]).ok()?;
    literal.parse::<f64>().ok().map(|v| (v, used))
}

/// Length of `digits [. digits] [e|E [sign] digits]` at the start of `s`,
/// requiring at least one mantissa digit. Zero when there is none.
fn decimal_len(s: &[u8]) -> usize {
    let digits_from = |i: usize| s[i..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = digits_from(0);
    let mut i = int_digits;
    let mut frac_digits = 0;
    if s.get(i) == Some(&b'.') {
        frac_digits = digits_from(i + 1);
        if int_digits + frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(s.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(s.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = digits_from(j.min(s.len()));
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }
    i
}

/// Renders `v` with the shortest round-trip digits: `2`, `2.5`, `0.001`,
/// `1e+21`, `1.5e-7`, `NaN`, `Infinity`.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }

    // `{:e}` yields the shortest round-trip mantissa, e.g. "1.2345e3".
    let sci = format!("{:e}", v.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // Decimal point position: value = 0.digits * 10^n.
    let n = exp + 1;

    let mut out = String::with_capacity(digits.len() + 8);
    if v < 0.0 {
        out.push('-');
    }
    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (n - k) as usize));
    } else if 0 < n && n <= 21 {
        out.push_str(&digits[..n as usize]);
        out.push('.');
        out.push_str(&digits[n as usize..]);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-n) as usize));
        out.push_str(&digits);
    } else {
        out.push_str(&digits[..1]);
        if k > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        out.push('e');
        out.push(if n >= 1 { '+' } else { '-' });
        out.push_str(&(n - 1).abs().to_string());
    }
    out
}
