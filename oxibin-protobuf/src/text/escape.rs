//! C-style escapes in `bytes` string literals.

/// Decode the body of a quoted bytes literal.
///
/// Supports the named escapes `\' \" \\ \? \a \b \f \n \r \t \v`, two-digit
/// hex `\xNN` and one to three digit octal `\NNN`. Unescaped characters are
/// copied as their UTF-8 bytes. On failure the message describes the bad
/// escape; the caller attaches the location.
pub(crate) fn unescape_bytes(raw: &str) -> Result<Vec<u8>, String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        i += 1;
        if c != b'\\' {
            out.push(c);
            continue;
        }

        let Some(&escape) = bytes.get(i) else {
            return Err("Unexpected end of bytes string".to_string());
        };
        i += 1;

        let value = match escape {
            b'\'' | b'"' | b'\\' | b'?' => escape,
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0C,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'v' => 0x0B,
            b'x' | b'X' => {
                let mut value = 0u8;
                for _ in 0..2 {
                    let Some(&digit) = bytes.get(i) else {
                        return Err("Unexpected end of bytes string".to_string());
                    };
                    let Some(nibble) = (digit as char).to_digit(16) else {
                        return Err(format!(
                            "Unexpected hex digit '{}' in bytes string",
                            digit as char
                        ));
                    };
                    value = (value << 4) | nibble as u8;
                    i += 1;
                }
                value
            }
            b'0'..=b'7' => {
                let mut value = u32::from(escape - b'0');
                for _ in 0..2 {
                    match bytes.get(i) {
                        Some(&digit @ b'0'..=b'7') => {
                            value = (value << 3) | u32::from(digit - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                u8::try_from(value)
                    .map_err(|_| format!("Octal escape \\{value:o} is out of range"))?
            }
            other => {
                return Err(format!(
                    "Unexpected character '{}' in bytes string",
                    other as char
                ));
            }
        };
        out.push(value);
    }

    Ok(out)
}
