use context_error::*;

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
    helper_functions::explain_number_error,
};

impl ChemicalFormula {
    /// Parse a chemical formula. This accepts the formula dialects in use by ProForma and the
    /// common ontologies:
    /// * `C12H20O2` or `C12 H20 O2`, elements with optional counts (a missing count is 1)
    /// * `C(12) H(20) O(2)` and `C(-1)`, parenthesised counts (Unimod)
    /// * `C 12 H 20 O 2` and `C -1`, counts separated by whitespace (RESID)
    /// * `13C(6)`, an isotope prefixed with its mass number (Unimod)
    /// * `[13C6]` or `[13C-2]`, an isotope between square brackets (ProForma)
    ///
    /// An empty text, or a formula where all counts cancel out, results in the empty formula.
    ///
    /// ```rust
    /// use proforma::prelude::*;
    /// let table = PeriodicTable::common();
    /// let a = ChemicalFormula::parse("C6H10O4", &table).unwrap();
    /// let b = ChemicalFormula::parse("H(10) C(6) O(4)", &table).unwrap();
    /// assert_eq!(a, b);
    /// assert!(ChemicalFormula::parse("C6Q2", &table).is_err());
    /// ```
    /// # Errors
    /// If the text contains an unknown element or isotope, an invalid count, or an unclosed bracket.
    pub fn parse<'a>(
        value: &'a str,
        elements: &dyn ElementProvider,
    ) -> Result<Self, BoxedError<'a, ProFormaErrorKind>> {
        let base_context = Context::none().lines(0, value);
        let bytes = value.as_bytes();
        let mut index = 0;
        let mut result = Self::default();

        while index < bytes.len() {
            match bytes[index] {
                b if b.is_ascii_whitespace() => index += 1,
                b'[' => {
                    let close = bytes[index..]
                        .iter()
                        .position(|c| *c == b']')
                        .map(|p| index + p)
                        .ok_or_else(|| {
                            BoxedError::new(
                                ProFormaErrorKind::Parse,
                                "Invalid chemical formula",
                                "No closing square bracket found for this isotope",
                                base_context.clone().add_highlight((0, index, 1)),
                            )
                        })?;
                    let start = index + 1 + skip_whitespace(&bytes[index + 1..close]);
                    let (mass_number, symbol_start) =
                        parse_mass_number(value, start, &base_context)?;
                    let (symbol_end, element) =
                        parse_element(value, symbol_start, close, Some(mass_number), elements)
                            .ok_or_else(|| unknown_element(value, symbol_start, &base_context))?;
                    let count_start = symbol_end + skip_whitespace(&bytes[symbol_end..close]);
                    let count = if count_start == close {
                        1
                    } else {
                        parse_count(value, count_start..close, &base_context)?
                    };
                    add_count(&mut result, element, count, index..close + 1, &base_context)?;
                    index = close + 1;
                }
                b'0'..=b'9' => {
                    let (mass_number, symbol_start) =
                        parse_mass_number(value, index, &base_context)?;
                    let (symbol_end, element) = parse_element(
                        value,
                        symbol_start,
                        bytes.len(),
                        Some(mass_number),
                        elements,
                    )
                    .ok_or_else(|| unknown_element(value, symbol_start, &base_context))?;
                    let (count, next) = parse_trailing_count(value, symbol_end, &base_context)?;
                    add_count(&mut result, element, count, index..next, &base_context)?;
                    index = next;
                }
                b'A'..=b'Z' => {
                    let (symbol_end, element) =
                        parse_element(value, index, bytes.len(), None, elements)
                            .ok_or_else(|| unknown_element(value, index, &base_context))?;
                    let (count, next) = parse_trailing_count(value, symbol_end, &base_context)?;
                    add_count(&mut result, element, count, index..next, &base_context)?;
                    index = next;
                }
                _ => {
                    let len = value[index..].chars().next().map_or(1, char::len_utf8);
                    return Err(BoxedError::new(
                        ProFormaErrorKind::Parse,
                        "Invalid chemical formula",
                        "This character is not allowed in a chemical formula, only elements, isotopes and counts are allowed",
                        base_context.clone().add_highlight((0, index, len)),
                    ));
                }
            }
        }
        Ok(result)
    }

    /// Parse a chemical formula, see [`Self::parse`], but ignore the reason for failure.
    pub fn try_parse(value: &str, elements: &dyn ElementProvider) -> Option<Self> {
        Self::parse(value, elements).ok()
    }
}

fn skip_whitespace(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_whitespace()).count()
}

/// Parse the mass number of an isotope, returns the mass number and the index just after it.
fn parse_mass_number<'a>(
    value: &'a str,
    start: usize,
    base_context: &Context<'a>,
) -> Result<(u16, usize), BoxedError<'a, ProFormaErrorKind>> {
    let len = value.as_bytes()[start..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    let mass_number = value[start..start + len].parse::<u16>().map_err(|err| {
        BoxedError::new(
            ProFormaErrorKind::Parse,
            "Invalid chemical formula",
            format!("The isotope number {}", explain_number_error(&err)),
            base_context.clone().add_highlight((0, start, len.max(1))),
        )
    })?;
    Ok((mass_number, start + len))
}

/// Parse an element symbol starting at `start`, a two letter symbol is preferred over a single
/// letter symbol. Returns the index just after the symbol and the element.
fn parse_element(
    value: &str,
    start: usize,
    end: usize,
    mass_number: Option<u16>,
    elements: &dyn ElementProvider,
) -> Option<(usize, std::sync::Arc<crate::chemistry::Element>)> {
    let bytes = value.as_bytes();
    if start >= end || !bytes[start].is_ascii_uppercase() {
        return None;
    }
    let get = |symbol: &str| {
        mass_number.map_or_else(
            || elements.get_element(symbol),
            |n| elements.get_element_isotope(symbol, n),
        )
    };
    if start + 1 < end
        && bytes[start + 1].is_ascii_lowercase()
        && let Some(element) = get(&value[start..start + 2])
    {
        return Some((start + 2, element));
    }
    get(&value[start..=start]).map(|e| (start + 1, e))
}

fn add_count<'a>(
    formula: &mut ChemicalFormula,
    element: std::sync::Arc<crate::chemistry::Element>,
    count: i32,
    range: std::ops::Range<usize>,
    base_context: &Context<'a>,
) -> Result<(), BoxedError<'a, ProFormaErrorKind>> {
    formula.checked_add_element(element, count).ok_or_else(|| {
        BoxedError::new(
            ProFormaErrorKind::Parse,
            "Invalid chemical formula",
            "The total count for this element is too big to fit in a 32 bit integer",
            base_context.clone().add_highlight((0, range)),
        )
    })
}

fn unknown_element<'a>(
    value: &'a str,
    start: usize,
    base_context: &Context<'a>,
) -> BoxedError<'a, ProFormaErrorKind> {
    let len = value.as_bytes()[start..]
        .iter()
        .enumerate()
        .take_while(|(i, c)| c.is_ascii_alphabetic() && (*i == 0 || c.is_ascii_lowercase()))
        .count()
        .max(1);
    BoxedError::new(
        ProFormaErrorKind::Parse,
        "Invalid chemical formula",
        "Unknown element or isotope",
        base_context.clone().add_highlight((0, start, len)),
    )
}

/// Parse a signed count in the given range, the range may be parenthesised.
fn parse_count<'a>(
    value: &'a str,
    range: std::ops::Range<usize>,
    base_context: &Context<'a>,
) -> Result<i32, BoxedError<'a, ProFormaErrorKind>> {
    let text = value[range.clone()].trim();
    let text = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .unwrap_or(text)
        .trim();
    text.strip_prefix('+')
        .unwrap_or(text)
        .parse::<i32>()
        .map_err(|err| {
            BoxedError::new(
                ProFormaErrorKind::Parse,
                "Invalid chemical formula",
                format!("The element count {}", explain_number_error(&err)),
                base_context.clone().add_highlight((0, range)),
            )
        })
}

/// Parse the count that follows an element, returns the count and the index after it. The count
/// can be directly attached (`C12`, `C-1`), parenthesised (`C(12)`) or separated by whitespace
/// (`C 12`). A number separated by whitespace followed by a letter is the mass number of the next
/// isotope instead (`C 13C(2)`).
fn parse_trailing_count<'a>(
    value: &'a str,
    start: usize,
    base_context: &Context<'a>,
) -> Result<(i32, usize), BoxedError<'a, ProFormaErrorKind>> {
    let bytes = value.as_bytes();
    let signed_digits = |from: usize| {
        let sign = usize::from(matches!(bytes.get(from), Some(b'-' | b'+')));
        let digits = bytes[(from + sign).min(bytes.len())..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        (digits > 0).then_some(sign + digits)
    };

    if bytes.get(start) == Some(&b'(') {
        let close = bytes[start..]
            .iter()
            .position(|c| *c == b')')
            .map(|p| start + p)
            .ok_or_else(|| {
                BoxedError::new(
                    ProFormaErrorKind::Parse,
                    "Invalid chemical formula",
                    "No closing parenthesis found for this element count",
                    base_context.clone().add_highlight((0, start, 1)),
                )
            })?;
        Ok((
            parse_count(value, start..close + 1, base_context)?,
            close + 1,
        ))
    } else if let Some(len) = signed_digits(start) {
        Ok((parse_count(value, start..start + len, base_context)?, start + len))
    } else {
        let ws = skip_whitespace(&bytes[start..]);
        if ws > 0
            && let Some(len) = signed_digits(start + ws)
            && bytes
                .get(start + ws + len)
                .is_none_or(u8::is_ascii_whitespace)
        {
            Ok((
                parse_count(value, start + ws..start + ws + len, base_context)?,
                start + ws + len,
            ))
        } else {
            Ok((1, start))
        }
    }
}
