use std::{
    collections::BTreeMap,
    fmt::{Display, Write},
};

use itertools::Itertools;

use crate::sequence::{ProFormaDescriptor, ProFormaTag, ProFormaTagGroup, ProFormaTerm};

/// Anything that is written as a bracketed block after a residue or range
enum Annotation<'a> {
    Tag(&'a ProFormaTag),
    Membership {
        group: &'a ProFormaTagGroup,
        index: usize,
    },
}

impl Annotation<'_> {
    fn display(&self, f: &mut impl Write) -> std::fmt::Result {
        match self {
            Self::Tag(tag) => {
                if !tag.descriptors().is_empty() {
                    write!(f, "[")?;
                    display_descriptors(f, tag.descriptors())?;
                    write!(f, "]")?;
                }
            }
            Self::Membership { group, index } => {
                let membership = group.memberships()[*index];
                write!(f, "[")?;
                if *index == group.preferred_location() {
                    group.descriptor().display(f)?;
                }
                write!(f, "#{}", group.name())?;
                if membership.weight.0 != 0.0 {
                    write!(f, "({})", membership.weight)?;
                }
                write!(f, "]")?;
            }
        }
        Ok(())
    }
}

fn display_descriptors(f: &mut impl Write, descriptors: &[ProFormaDescriptor]) -> std::fmt::Result {
    let mut first = true;
    for descriptor in descriptors {
        if !first {
            write!(f, "|")?;
        }
        descriptor.display(f)?;
        first = false;
    }
    Ok(())
}

/// A range with all annotations placed on it
#[derive(Default)]
struct RangeAnnotations<'a> {
    end: usize,
    ambiguous: bool,
    annotations: Vec<Annotation<'a>>,
}

impl ProFormaTerm {
    /// Write this term in canonical ProForma notation, this is the inverse of [`Self::parse`].
    /// ```rust
    /// use proforma::sequence::*;
    /// let text = "<[Carbamidomethyl]@C>[Phospho]^2?[Acetyl]-EM[U:Oxidation|info:found]EVEC(?DQ)-[Amidated]";
    /// assert_eq!(ProFormaTerm::parse(text).unwrap().write(), text);
    /// ```
    /// # Panics
    /// If ranges overlap without being identical. This cannot happen for terms built with
    /// [`Self::new`] or [`Self::parse`], as these validate the ranges.
    pub fn write(&self) -> String {
        self.to_string()
    }

    fn display(&self, f: &mut impl Write) -> std::fmt::Result {
        for global in self.global_modifications() {
            if let Some(targets) = &global.target_residues {
                write!(f, "<[")?;
                display_descriptors(f, &global.descriptors)?;
                write!(f, "]@{}>", targets.iter().join(","))?;
            } else {
                write!(f, "<")?;
                display_descriptors(f, &global.descriptors)?;
                write!(f, ">")?;
            }
        }
        for descriptor in self.labile() {
            write!(f, "{{{descriptor}}}")?;
        }
        if !self.unlocalized().is_empty() {
            for tag in self.unlocalized() {
                write!(f, "[")?;
                display_descriptors(f, &tag.descriptors)?;
                write!(f, "]")?;
                if tag.count != 1 {
                    write!(f, "^{}", tag.count)?;
                }
            }
            write!(f, "?")?;
        }
        if !self.n_term().is_empty() {
            write!(f, "[")?;
            display_descriptors(f, self.n_term())?;
            write!(f, "]-")?;
        }

        let mut points: Vec<Vec<Annotation>> = (0..self.len()).map(|_| Vec::new()).collect();
        let mut ranges: BTreeMap<usize, RangeAnnotations> = BTreeMap::new();
        let mut place = |start: usize, end: usize, ambiguous: bool, annotation| {
            if start == end && !ambiguous {
                points[start].push(annotation);
            } else {
                let range = ranges.entry(start).or_insert_with(|| RangeAnnotations {
                    end,
                    ..RangeAnnotations::default()
                });
                assert_eq!(
                    range.end, end,
                    "Ranges starting at {start} have different ends, ranges cannot overlap"
                );
                range.ambiguous |= ambiguous;
                range.annotations.push(annotation);
            }
        };
        for tag in self.tags() {
            place(
                tag.start(),
                tag.end(),
                tag.has_ambiguous_sequence(),
                Annotation::Tag(tag),
            );
        }
        for group in self.tag_groups() {
            for (index, membership) in group.memberships().iter().enumerate() {
                place(
                    membership.start,
                    membership.end,
                    false,
                    Annotation::Membership { group, index },
                );
            }
        }

        let mut open: Option<&RangeAnnotations> = None;
        for (index, residue) in self.sequence().chars().enumerate() {
            if let Some(range) = ranges.get(&index) {
                assert!(
                    open.is_none(),
                    "A range starts at {index} within another range, ranges cannot be nested"
                );
                write!(f, "{}", if range.ambiguous { "(?" } else { "(" })?;
                open = Some(range);
            }
            write!(f, "{residue}")?;
            for annotation in &points[index] {
                annotation.display(f)?;
            }
            if let Some(range) = open
                && range.end == index
            {
                write!(f, ")")?;
                for annotation in &range.annotations {
                    annotation.display(f)?;
                }
                open = None;
            }
        }

        if !self.c_term().is_empty() {
            write!(f, "-[")?;
            display_descriptors(f, self.c_term())?;
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl Display for ProFormaTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}
