use std::{ops::Range, sync::LazyLock};

use context_error::*;
use ordered_float::OrderedFloat;
use regex::Regex;
use tracing::trace;

use crate::{
    ProFormaErrorKind,
    helper_functions::{end_of_enclosure, next_num, split_unescaped},
    sequence::{
        ProFormaAmbiguityAffix, ProFormaDescriptor, ProFormaGlobalModification,
        ProFormaMembershipDescriptor, ProFormaTag, ProFormaTagGroup, ProFormaTerm,
        ProFormaUnlocalizedTag,
    },
};

/// A descriptor segment that places a tag group: `#name`, `#name(0.5)`, `value#name` or `value#name(0.5)`
static MEMBERSHIP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)#([^#()]*)(?:\(([^()]*)\))?$").unwrap());

/// An isotope label as used in a global modification: `13C`, `15N`, `2H` or `D`
static ISOTOPE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[A-Z][a-z]?|D)$").unwrap());

const KEY_TOKENS: &[&str] = &[
    "U", "M", "R", "X", "G", "B", "UNIMOD", "MOD", "RESID", "XLMOD", "GNO", "UniProt", "Obs",
    "Formula", "Glycan", "Info",
];

impl ProFormaTerm {
    /// Parse a ProForma term.
    ///
    /// The supported sections, in order of appearance:
    /// * Global modifications `<[Carbamidomethyl]@C>` and isotope labels `<13C>`
    /// * Labile modifications `{Glycan:Hex}` and unlocalized modifications `[Phospho]^2?`, in any order
    /// * N terminal modifications `[Acetyl]-`
    /// * The sequence with tags on residues `EM[Oxidation]`, ranges `(EOS)[+19.05]`, ranges with
    ///   an unknown sequence `(?DQ)` and tag groups `S[Phospho#g1(0.9)]AS[#g1(0.1)]`
    /// * C terminal modifications `-[Amidated]`
    ///
    /// Inside a tag, descriptors are separated by `|` (use `\|` for a literal pipe) and have an
    /// optional key separated by the first colon (`U:Oxidation`, `Formula:C2H2O`, `info:text`).
    ///
    /// ```rust
    /// use proforma::sequence::*;
    /// let term = ProFormaTerm::parse("[Acetyl]-PROT(EOSFORMS)[+19.0523]ISK").unwrap();
    /// assert_eq!(term.sequence(), "PROTEOSFORMSISK");
    /// assert_eq!(term.n_term().len(), 1);
    /// assert_eq!((term.tags()[0].start(), term.tags()[0].end()), (4, 11));
    /// ```
    /// # Errors
    /// If the text is empty or not valid ProForma, the error highlights the offending position.
    pub fn parse(line: &str) -> Result<Self, BoxedError<'_, ProFormaErrorKind>> {
        let base_context = Context::none().lines(0, line);
        if line.trim().is_empty() {
            return Err(BoxedError::new(
                ProFormaErrorKind::Parse,
                "Invalid ProForma term",
                "A ProForma term cannot be empty",
                base_context,
            ));
        }
        let bytes = line.as_bytes();
        let mut groups = GroupLookup::default();

        // Global modifications
        let mut index = 0;
        let mut global_modifications = Vec::new();
        while bytes.get(index) == Some(&b'<') {
            let (end, modification) = global_modification(&base_context, line, index)?;
            global_modifications.push(modification);
            index = end;
        }

        // Labile and unlocalized modifications, followed by the N terminal modifications
        let mut labile = Vec::new();
        let mut unlocalized = Vec::new();
        let mut n_term = Vec::new();
        loop {
            match bytes.get(index) {
                Some(b'{') => {
                    let end = end_of_enclosure(line, index + 1, b'{', b'}').ok_or_else(|| {
                        unclosed(&base_context, index, "labile modification", '}')
                    })?;
                    labile.extend(
                        parse_tag_content(&base_context, line, index + 1..end, false)?
                            .descriptors,
                    );
                    index = end + 1;
                }
                Some(b'[') => {
                    let (end, blocks) = leading_blocks(&base_context, line, index)?;
                    match bytes.get(end) {
                        Some(b'?') => {
                            for (range, count) in blocks {
                                unlocalized.push(ProFormaUnlocalizedTag::new(
                                    parse_tag_content(&base_context, line, range, false)?
                                        .descriptors,
                                    count.unwrap_or(1),
                                ));
                            }
                            index = end + 1;
                        }
                        Some(b'-') => {
                            for (range, count) in blocks {
                                if count.is_some() {
                                    return Err(BoxedError::new(
                                        ProFormaErrorKind::Parse,
                                        "Invalid N terminal modification",
                                        "An N terminal modification cannot have a count",
                                        base_context.clone().add_highlight((0, range.end, 1)),
                                    ));
                                }
                                n_term.extend(
                                    parse_tag_content(&base_context, line, range, false)?
                                        .descriptors,
                                );
                            }
                            index = end + 1;
                            break;
                        }
                        _ => {
                            return Err(BoxedError::new(
                                ProFormaErrorKind::Parse,
                                "Invalid ProForma term",
                                "A tag before the sequence has to be followed by '?' for an unlocalized modification or '-' for an N terminal modification",
                                base_context.clone().add_highlight((0, index, end - index)),
                            ));
                        }
                    }
                }
                _ => break,
            }
        }

        // The sequence
        let mut sequence = String::with_capacity(bytes.len() - index);
        let mut tags = Vec::new();
        let mut c_term = Vec::new();
        let mut open_range: Option<(usize, bool, usize)> = None; // sequence index, ambiguous sequence, byte index
        while index < bytes.len() {
            match bytes[index] {
                b'(' => {
                    if let Some((_, _, open)) = open_range {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid ranged modification",
                            "Ranges cannot be nested",
                            base_context
                                .clone()
                                .add_highlight((0, open, 1))
                                .add_highlight((0, index, 1)),
                        ));
                    }
                    let ambiguous = bytes.get(index + 1) == Some(&b'?');
                    open_range = Some((sequence.len(), ambiguous, index));
                    index += 1 + usize::from(ambiguous);
                }
                b')' => {
                    let Some((start, ambiguous, open)) = open_range.take() else {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid ranged modification",
                            "This closing parenthesis has no matching opening parenthesis",
                            base_context.clone().add_highlight((0, index, 1)),
                        ));
                    };
                    if start == sequence.len() {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid ranged modification",
                            "A range cannot be empty",
                            base_context.clone().add_highlight((0, open..index + 1)),
                        ));
                    }
                    let end = sequence.len() - 1;
                    let (next, blocks) = trailing_blocks(&base_context, line, index + 1)?;
                    if blocks.is_empty() && !ambiguous {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid ranged modification",
                            "A range needs a modification, unless its sequence is ambiguous '(?'",
                            base_context.clone().add_highlight((0, open..index + 1)),
                        ));
                    }
                    let mut tagged = false;
                    for range in blocks {
                        let content = parse_tag_content(&base_context, line, range, true)?;
                        groups.place(&base_context, content.memberships, start, end)?;
                        if !content.descriptors.is_empty() {
                            tags.push(
                                ProFormaTag::new(start, end, content.descriptors)
                                    .with_ambiguous_sequence(ambiguous),
                            );
                            tagged = true;
                        }
                    }
                    // An ambiguous sequence is stored on a tag, even if there is no modification
                    if ambiguous && !tagged {
                        tags.push(ProFormaTag::new(start, end, []).with_ambiguous_sequence(true));
                    }
                    index = next;
                }
                b'[' => {
                    if sequence.is_empty()
                        || open_range.is_some_and(|(start, _, _)| start == sequence.len())
                    {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid modification",
                            "A modification has to follow a residue, or has to be followed by '-' for an N terminal modification",
                            base_context.clone().add_highlight((0, index, 1)),
                        ));
                    }
                    let position = sequence.len() - 1;
                    let (next, blocks) = trailing_blocks(&base_context, line, index)?;
                    for range in blocks {
                        let content = parse_tag_content(&base_context, line, range, true)?;
                        groups.place(&base_context, content.memberships, position, position)?;
                        if !content.descriptors.is_empty() {
                            tags.push(ProFormaTag::single(position, content.descriptors));
                        }
                    }
                    index = next;
                }
                b'-' => {
                    if sequence.is_empty() || open_range.is_some() || bytes.get(index + 1) != Some(&b'[')
                    {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid C terminal modification",
                            "A C terminal modification is written as '-[modification]' after the last residue",
                            base_context.clone().add_highlight((0, index, 1)),
                        ));
                    }
                    let (next, blocks) = trailing_blocks(&base_context, line, index + 1)?;
                    for range in blocks {
                        c_term.extend(parse_tag_content(&base_context, line, range, false)?.descriptors);
                    }
                    if next != bytes.len() {
                        return Err(BoxedError::new(
                            ProFormaErrorKind::Parse,
                            "Invalid C terminal modification",
                            "The C terminal modification has to end the ProForma term",
                            base_context.clone().add_highlight((0, next..bytes.len())),
                        ));
                    }
                    index = next;
                }
                c if c.is_ascii_uppercase() => {
                    sequence.push(char::from(c));
                    index += 1;
                }
                c => {
                    let len = line[index..].chars().next().map_or(1, char::len_utf8);
                    return Err(BoxedError::new(
                        ProFormaErrorKind::Parse,
                        "Invalid ProForma term",
                        if c.is_ascii_lowercase() {
                            "Residues have to be written as uppercase one letter codes"
                        } else {
                            "This character is not valid at this position"
                        },
                        base_context.clone().add_highlight((0, index, len)),
                    ));
                }
            }
        }

        if let Some((_, _, open)) = open_range {
            return Err(unclosed(&base_context, open, "range", ')'));
        }
        if sequence.is_empty() {
            return Err(BoxedError::new(
                ProFormaErrorKind::Parse,
                "Invalid ProForma term",
                "A ProForma term needs at least one residue",
                base_context.clone().add_highlight((0, 0..line.len())),
            ));
        }

        trace!(
            sequence = sequence.as_str(),
            tags = tags.len(),
            "parsed ProForma term"
        );
        let tag_groups = groups.finish(&base_context)?;
        Ok(ProFormaTerm::new(sequence, tags)?
            .with_tag_groups(tag_groups)?
            .with_n_term(n_term)
            .with_c_term(c_term)
            .with_labile(labile)
            .with_unlocalized(unlocalized)
            .with_global_modifications(global_modifications))
    }
}

fn unclosed<'a>(
    base_context: &Context<'a>,
    index: usize,
    what: &str,
    close: char,
) -> BoxedError<'a, ProFormaErrorKind> {
    BoxedError::new(
        ProFormaErrorKind::Parse,
        format!("Invalid {what}"),
        format!("No closing '{close}' found"),
        base_context.clone().add_highlight((0, index, 1)),
    )
}

/// Find the consecutive bracketed blocks starting at `index`, which has to be an opening
/// bracket. Returns the index after the last block and the range of the content of each block.
fn trailing_blocks<'a>(
    base_context: &Context<'a>,
    line: &'a str,
    mut index: usize,
) -> Result<(usize, Vec<Range<usize>>), BoxedError<'a, ProFormaErrorKind>> {
    let mut blocks = Vec::new();
    while line.as_bytes().get(index) == Some(&b'[') {
        let end = end_of_enclosure(line, index + 1, b'[', b']')
            .ok_or_else(|| unclosed(base_context, index, "modification", ']'))?;
        blocks.push(index + 1..end);
        index = end + 1;
    }
    Ok((index, blocks))
}

/// Find the consecutive bracketed blocks before the sequence, each optionally followed by a count `^N`.
fn leading_blocks<'a>(
    base_context: &Context<'a>,
    line: &'a str,
    mut index: usize,
) -> Result<(usize, Vec<(Range<usize>, Option<u32>)>), BoxedError<'a, ProFormaErrorKind>> {
    let bytes = line.as_bytes();
    let mut blocks = Vec::new();
    while bytes.get(index) == Some(&b'[') {
        let end = end_of_enclosure(line, index + 1, b'[', b']')
            .ok_or_else(|| unclosed(base_context, index, "modification", ']'))?;
        let range = index + 1..end;
        index = end + 1;
        let count = if bytes.get(index) == Some(&b'^') {
            let (len, count) = next_num(bytes, index + 1)
                .filter(|(_, n)| *n > 0)
                .and_then(|(len, n)| u32::try_from(n).ok().map(|n| (len, n)))
                .ok_or_else(|| {
                    BoxedError::new(
                        ProFormaErrorKind::Parse,
                        "Invalid unlocalized modification",
                        "The count of an unlocalized modification has to be a positive number",
                        base_context.clone().add_highlight((0, index, 1)),
                    )
                })?;
            index += 1 + len;
            Some(count)
        } else {
            None
        };
        blocks.push((range, count));
    }
    Ok((index, blocks))
}

/// Parse a global modification starting at the `<` at `index`, returns the index after the closing `>`.
fn global_modification<'a>(
    base_context: &Context<'a>,
    line: &'a str,
    index: usize,
) -> Result<(usize, ProFormaGlobalModification), BoxedError<'a, ProFormaErrorKind>> {
    let end = end_of_enclosure(line, index + 1, b'<', b'>')
        .ok_or_else(|| unclosed(base_context, index, "global modification", '>'))?;
    let content = &line[index + 1..end];
    let invalid = |long: &'static str, range: Range<usize>| {
        BoxedError::new(
            ProFormaErrorKind::Parse,
            "Invalid global modification",
            long,
            base_context.clone().add_highlight((0, range)),
        )
    };

    let (descriptors, targets) = if content.starts_with('[') {
        let close = end_of_enclosure(line, index + 2, b'[', b']')
            .filter(|close| *close < end)
            .ok_or_else(|| unclosed(base_context, index + 1, "global modification", ']'))?;
        if line.as_bytes().get(close + 1) != Some(&b'@') {
            return Err(invalid(
                "A global modification needs target residues, written as '@' followed by the residues",
                close + 1..end,
            ));
        }
        (index + 2..close, close + 2..end)
    } else if let Some(at) = content.rfind('@') {
        (index + 1..index + 1 + at, index + 2 + at..end)
    } else {
        if !ISOTOPE_LABEL_REGEX.is_match(content) {
            return Err(invalid(
                "A global modification without target residues has to be an isotope label, like '13C', '15N' or 'D'",
                index + 1..end,
            ));
        }
        return Ok((end + 1, ProFormaGlobalModification::isotope(content)));
    };

    let descriptors = parse_tag_content(base_context, line, descriptors, false)?.descriptors;
    let mut target_residues = Vec::new();
    let mut offset = targets.start;
    for target in line[targets.clone()].split(',') {
        let mut chars = target.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => target_residues.push(c),
            _ => {
                return Err(invalid(
                    "The target residues have to be separated by commas and be single uppercase residue codes",
                    offset..offset + target.len().max(1),
                ));
            }
        }
        offset += target.len() + 1;
    }
    Ok((
        end + 1,
        ProFormaGlobalModification::fixed(descriptors, target_residues),
    ))
}

/// The contents of a single tag
struct TagContent {
    descriptors: Vec<ProFormaDescriptor>,
    memberships: Vec<Membership>,
}

/// A tag group reference found inside a tag
struct Membership {
    name: String,
    definition: Option<ProFormaDescriptor>,
    weight: OrderedFloat<f64>,
    range: Range<usize>,
}

/// Parse the contents of a tag (without the brackets), `range` is the byte range in `line`.
fn parse_tag_content<'a>(
    base_context: &Context<'a>,
    line: &'a str,
    range: Range<usize>,
    allow_membership: bool,
) -> Result<TagContent, BoxedError<'a, ProFormaErrorKind>> {
    let error = |long: &'static str, range: Range<usize>| {
        BoxedError::new(
            ProFormaErrorKind::Parse,
            "Invalid modification",
            long,
            base_context.clone().add_highlight((0, range)),
        )
    };
    if range.is_empty() {
        return Err(error(
            "A modification cannot be empty",
            range.start.saturating_sub(1)..range.end + 1,
        ));
    }
    let content = &line[range.clone()];
    let parts = split_unescaped(content, '|');
    let mut result = TagContent {
        descriptors: Vec::new(),
        memberships: Vec::new(),
    };

    for (i, (offset, segment)) in parts.iter().enumerate() {
        let raw = range.start + offset
            ..parts
                .get(i + 1)
                .map_or(range.end, |(next, _)| range.start + next - 1);
        if segment.is_empty() {
            return Err(error(
                "A descriptor cannot be empty",
                raw.start.saturating_sub(1)..raw.end + 1,
            ));
        }
        if let Some(captures) = MEMBERSHIP_REGEX.captures(segment) {
            if !allow_membership {
                return Err(error(
                    "A tag group cannot be placed here, only on residues and ranges",
                    raw,
                ));
            }
            let name_match = captures.get(2).map_or("", |m| m.as_str());
            if name_match.is_empty() {
                return Err(error("The name of a tag group cannot be empty", raw));
            }
            let weight = match captures.get(3) {
                Some(weight) => OrderedFloat(weight.as_str().trim().parse::<f64>().map_err(
                    |_| error("The weight of a tag group membership has to be a number", raw.clone()),
                )?),
                None => OrderedFloat(0.0),
            };
            let value = captures.get(1).map_or("", |m| m.as_str());
            let definition = if value.is_empty() {
                None
            } else {
                Some(parse_descriptor(base_context, value, raw.clone())?)
            };
            result.memberships.push(Membership {
                name: name_match.to_string(),
                definition,
                weight,
                range: raw,
            });
        } else if !segment.contains(':')
            && let Some(group) = segment.strip_suffix("->")
        {
            if group.is_empty() {
                return Err(error("The name of an ambiguity boundary cannot be empty", raw));
            }
            result.descriptors.push(ProFormaDescriptor::ambiguity(
                ProFormaAmbiguityAffix::LeftBoundary,
                group,
            ));
        } else if !segment.contains(':')
            && let Some(group) = segment.strip_prefix("<-")
        {
            if group.is_empty() {
                return Err(error("The name of an ambiguity boundary cannot be empty", raw));
            }
            result.descriptors.push(ProFormaDescriptor::ambiguity(
                ProFormaAmbiguityAffix::RightBoundary,
                group,
            ));
        } else {
            result
                .descriptors
                .push(parse_descriptor(base_context, segment, raw)?);
        }
    }
    Ok(result)
}

/// Parse a single descriptor, splitting the key token from the value on the first colon
fn parse_descriptor<'a>(
    base_context: &Context<'a>,
    segment: &str,
    raw: Range<usize>,
) -> Result<ProFormaDescriptor, BoxedError<'a, ProFormaErrorKind>> {
    match segment.split_once(':') {
        None => Ok(ProFormaDescriptor::from_value(segment)),
        Some((_, "")) => Err(BoxedError::new(
            ProFormaErrorKind::Parse,
            "Invalid modification",
            "The value of a descriptor cannot be empty",
            base_context.clone().add_highlight((0, raw)),
        )),
        Some((token, value)) => ProFormaDescriptor::from_token(token, value).ok_or_else(|| {
            BoxedError::new(
                ProFormaErrorKind::Parse,
                "Invalid modification",
                format!(
                    "The key '{token}' is not known, a modification name containing a colon has to be prefixed with its ontology, eg 'U:{segment}'"
                ),
                base_context
                    .clone()
                    .add_highlight((0, raw.start, token.len().max(1))),
            )
            .suggestions(
                similar::get_close_matches(token, KEY_TOKENS, 3, 0.5)
                    .into_iter()
                    .map(|t| format!("{t}:{value}"))
                    .collect::<Vec<_>>(),
            )
        }),
    }
}

/// Keeps track of all tag groups while parsing
#[derive(Default)]
struct GroupLookup {
    groups: Vec<GroupBuilder>,
}

struct GroupBuilder {
    name: String,
    definition: Option<(ProFormaDescriptor, usize)>,
    memberships: Vec<ProFormaMembershipDescriptor>,
    first: Range<usize>,
}

impl GroupLookup {
    fn place<'a>(
        &mut self,
        base_context: &Context<'a>,
        memberships: Vec<Membership>,
        start: usize,
        end: usize,
    ) -> Result<(), BoxedError<'a, ProFormaErrorKind>> {
        for membership in memberships {
            let index = if let Some(index) =
                self.groups.iter().position(|g| g.name == membership.name)
            {
                index
            } else {
                self.groups.push(GroupBuilder {
                    name: membership.name.clone(),
                    definition: None,
                    memberships: Vec::new(),
                    first: membership.range.clone(),
                });
                self.groups.len() - 1
            };
            let group = &mut self.groups[index];
            if let Some(definition) = membership.definition {
                if group.definition.is_some() {
                    return Err(BoxedError::new(
                        ProFormaErrorKind::Parse,
                        "Invalid tag group",
                        format!(
                            "The modification of group '{}' is defined more than once, only one location can carry the modification",
                            membership.name
                        ),
                        base_context
                            .clone()
                            .add_highlight((0, group.first.clone()))
                            .add_highlight((0, membership.range)),
                    ));
                }
                group.definition = Some((definition, group.memberships.len()));
            }
            group.memberships.push(ProFormaMembershipDescriptor {
                start,
                end,
                weight: membership.weight,
            });
        }
        Ok(())
    }

    fn finish<'a>(
        self,
        base_context: &Context<'a>,
    ) -> Result<Vec<ProFormaTagGroup>, BoxedError<'a, ProFormaErrorKind>> {
        self.groups
            .into_iter()
            .map(|group| {
                let (descriptor, preferred) = group.definition.ok_or_else(|| {
                    BoxedError::new(
                        ProFormaErrorKind::Parse,
                        "Invalid tag group",
                        format!(
                            "The modification of group '{}' is never defined, write it at one of the locations, eg '[Phospho#{0}]'",
                            group.name
                        ),
                        base_context.clone().add_highlight((0, group.first.clone())),
                    )
                })?;
                Ok(ProFormaTagGroup::new(
                    group.name,
                    descriptor,
                    group.memberships,
                    preferred,
                ))
            })
            .collect()
    }
}
