use super::SourceMapError;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CONTINUATION: u8 = 0b10_0000;
const DIGIT_MASK: u8 = 0b1_1111;
const MAX_SHIFT: u32 = 60;

fn base64_value(byte: u8) -> Option<u8> {
    match byte {
        b'A'..=b'Z' => Some(byte - b'A'),
        b'a'..=b'z' => Some(byte - b'a' + 26),
        b'0'..=b'9' => Some(byte - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

pub fn encode(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        value.unsigned_abs() << 1
    };

    loop {
        let mut digit = (vlq & u64::from(DIGIT_MASK)) as u8;
        vlq >>= 5;
        if vlq > 0 {
            digit |= CONTINUATION;
        }
        out.push(BASE64[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Decodes every value of one mappings segment (e.g. `AAAA`).
pub fn decode_segment(segment: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::with_capacity(5);
    let mut acc: i64 = 0;
    let mut shift: u32 = 0;

    for byte in segment.bytes() {
        let digit =
            base64_value(byte).ok_or(SourceMapError::InvalidVlqCharacter(byte as char))?;
        acc += i64::from(digit & DIGIT_MASK) << shift;

        if digit & CONTINUATION != 0 {
            shift += 5;
            if shift > MAX_SHIFT {
                return Err(SourceMapError::VlqOverflow(segment.to_string()));
            }
        } else {
            let magnitude = acc >> 1;
            values.push(if acc & 1 == 1 { -magnitude } else { magnitude });
            acc = 0;
            shift = 0;
        }
    }

    if shift != 0 {
        return Err(SourceMapError::TruncatedVlq(segment.to_string()));
    }
    Ok(values)
}
