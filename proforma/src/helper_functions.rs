use std::num::{IntErrorKind, ParseIntError};

/// Find the enclosed text by the given symbols, assumes a single open is already read just before
/// the start. A backslash escapes the next character so it does not count towards the nesting
/// depth. Guarantees to only pick full characters.
pub(crate) fn end_of_enclosure(text: &str, start: usize, open: u8, close: u8) -> Option<usize> {
    let mut state = 1;
    let mut escaped = false;
    for (i, ch) in text.as_bytes()[start..].iter().enumerate() {
        // Check if this byte is a full character (is_char_boundary also works on index==len)
        if !(text.is_char_boundary(start + i) && text.is_char_boundary(start + i + 1)) {
            escaped = false;
            continue;
        }
        if escaped {
            escaped = false;
        } else if *ch == b'\\' {
            escaped = true;
        } else if *ch == open {
            state += 1;
        } else if *ch == close {
            state -= 1;
            if state == 0 {
                return Some(start + i);
            }
        }
    }
    None
}

/// Split the given text on every unescaped occurrence of `separator`. Each part is returned with
/// its byte offset into `text` and with the escaping backslash removed from escaped separators.
pub(crate) fn split_unescaped(text: &str, separator: char) -> Vec<(usize, String)> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        if ch == '\\' && chars.peek().is_some_and(|(_, next)| *next == separator) {
            current.push(separator);
            let _ = chars.next();
        } else if ch == separator {
            parts.push((current_start, std::mem::take(&mut current)));
            current_start = index + ch.len_utf8();
        } else {
            current.push(ch);
        }
    }
    parts.push((current_start, current));
    parts
}

/// Escape every occurrence of `separator` with a backslash, the inverse of [`split_unescaped`].
pub(crate) fn escape(text: &str, separator: char) -> String {
    let mut output = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == separator {
            output.push('\\');
        }
        output.push(ch);
    }
    output
}

/// Get the next number, returns length in bytes and the number.
/// Returns none if there is no number or if it is too big to fit in a `isize`.
pub(crate) fn next_num(chars: &[u8], mut start: usize) -> Option<(usize, isize)> {
    let mut sign = 1;
    let mut sign_set = false;
    if chars.get(start) == Some(&b'-') {
        sign = -1;
        start += 1;
        sign_set = true;
    } else if chars.get(start) == Some(&b'+') {
        start += 1;
        sign_set = true;
    }
    let len = chars
        .get(start..)?
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let num: isize = std::str::from_utf8(&chars[start..start + len])
        .ok()?
        .parse()
        .ok()?;
    Some((usize::from(sign_set) + len, sign * num))
}

/// Check if the text is a signed floating point literal, as used for mass shifts (`+15.995`).
pub(crate) fn is_signed_number(text: &str) -> bool {
    (text.starts_with('+') || text.starts_with('-')) && text[1..].parse::<f64>().is_ok()
}

/// Implement a binary operator for all ref cases after the implementation for the ref-ref case (assumes deref operator works)
macro_rules! impl_binop_ref_cases {
    (impl $imp:ident, $method:ident for $t:ty, $u:ty, $o:ty) => {
        impl $imp<$u> for &'_ $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: $u) -> $o {
                $imp::$method(self, &other)
            }
        }

        impl<'a> $imp<&'a $u> for $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: &'a $u) -> $o {
                $imp::$method(&self, other)
            }
        }

        impl $imp<$u> for $t {
            type Output = $o;

            #[inline]
            fn $method(self, other: $u) -> $o {
                $imp::$method(&self, &other)
            }
        }
    };
}

/// To be used as `The xx number ` + the explanation from here (does not have a dot).
pub(crate) const fn explain_number_error(error: &ParseIntError) -> &'static str {
    match error.kind() {
        IntErrorKind::Empty => "is empty",
        IntErrorKind::InvalidDigit => "contains an invalid character",
        IntErrorKind::NegOverflow => "is too small to fit in the internal representation",
        IntErrorKind::PosOverflow => "is too big to fit in the internal representation",
        IntErrorKind::Zero => "is zero, which is not allowed here",
        _ => "is not a valid number",
    }
}

/// Strip the given prefix from the text ignoring ASCII casing
pub(crate) fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    (text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix))
    .then(|| &text[prefix.len()..])
}
