//! HTML entity and escape decoding for scraped message text

/// Decode the entities and escapes found in scraped message bodies
///
/// Reductions, in order:
/// 1. `&#<decimal>;` character references
/// 2. `\u` followed by four octal digits, control results become a space
/// 3. `</a>` removed, `&quot;` and `&amp;` replaced
/// 4. remaining control characters become a space
/// 5. a single pass merging each pair of spaces into one
///
/// The last step is not a full collapse: three spaces become two.
pub fn decode_html(input: &str) -> String {
    let decoded = decode_char_references(input);
    let decoded = decode_octal_escapes(&decoded);

    let cleaned = decoded
        .replace("</a>", "")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    let cleaned: String = cleaned
        .chars()
        .map(|c| if c < ' ' { ' ' } else { c })
        .collect();

    cleaned.replace("  ", " ")
}

/// Replace the leftmost `&#N;` until none is left or one cannot be decoded
fn decode_char_references(input: &str) -> String {
    let mut s = input.to_string();

    while let Some(start) = s.find("&#") {
        let Some(end) = s[start + 2..].find(';').map(|i| start + 2 + i) else {
            break;
        };
        let digits = &s[start + 2..end];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        let Some(c) = digits.parse::<u32>().ok().and_then(char::from_u32) else {
            break;
        };

        s.replace_range(start..=end, c.encode_utf8(&mut [0; 4]));
    }

    s
}

/// Replace the leftmost `\uNNNN` (octal) until none is left or one is malformed
fn decode_octal_escapes(input: &str) -> String {
    let mut s = input.to_string();

    while let Some(start) = s.find("\\u") {
        let Some(digits) = s.get(start + 2..start + 6) else {
            break;
        };
        if !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            break;
        }
        let Some(c) = u32::from_str_radix(digits, 8).ok().and_then(char::from_u32) else {
            break;
        };
        let c = if c < ' ' { ' ' } else { c };

        s.replace_range(start..start + 6, c.encode_utf8(&mut [0; 4]));
    }

    s
}
