//! Delimiter matching for the streaming segmenter
//!
//! A delimiter is the static text between (or around) the capture groups of
//! an extraction pattern: literal characters plus the whitespace classes
//! `\s` and `\s*`. Matching follows regex leftmost-first semantics with greedy
//! whitespace, and can report that a match might still complete once more
//! text arrives.

/// One element of a delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Atom {
    /// An exact character
    Char(char),
    /// Exactly one whitespace character (`\s`)
    Space,
    /// Any run of whitespace, greedy (`\s*`)
    SpaceStar,
}

impl Atom {
    /// Whether this atom can consume a whitespace character
    fn accepts_whitespace(&self) -> bool {
        match self {
            Self::Char(c) => c.is_whitespace(),
            Self::Space | Self::SpaceStar => true,
        }
    }
}

/// Outcome of matching a delimiter at one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Matched, ending at this byte offset
    Full(usize),
    /// The text ran out before the match was decided
    NeedMore,
    /// Cannot match here
    Fail,
}

/// Result of scanning a buffer for a delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Probe {
    /// Delimiter occupies `start..end`
    Match {
        /// Byte offset where the delimiter starts
        start: usize,
        /// Byte offset just past the delimiter
        end: usize,
    },
    /// Text from `start` onwards may be the beginning of the delimiter
    Partial {
        /// Byte offset of the earliest possible delimiter start
        start: usize,
    },
    /// The delimiter cannot start anywhere in the buffer
    Absent,
}

/// A literal-ish delimiter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Delimiter {
    atoms: Vec<Atom>,
}

impl Delimiter {
    pub(crate) fn new(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Ends with a greedy whitespace run whose extent depends on what follows
    pub(crate) fn ends_with_space_run(&self) -> bool {
        matches!(self.atoms.last(), Some(Atom::SpaceStar))
    }

    /// First atom could consume whitespace
    pub(crate) fn starts_with_whitespace(&self) -> bool {
        self.atoms.first().is_some_and(Atom::accepts_whitespace)
    }

    /// Find the leftmost position in `text` where this delimiter matches or
    /// may still match. With `at_end` set no more text will arrive, so
    /// partial matches are resolved.
    pub(crate) fn probe(&self, text: &str, at_end: bool) -> Probe {
        let positions = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()));

        for start in positions {
            match match_atoms(&self.atoms, text, start, at_end) {
                Outcome::Full(end) => return Probe::Match { start, end },
                Outcome::NeedMore => return Probe::Partial { start },
                Outcome::Fail => {}
            }
        }
        Probe::Absent
    }
}

fn match_atoms(atoms: &[Atom], text: &str, pos: usize, at_end: bool) -> Outcome {
    let Some((first, rest)) = atoms.split_first() else {
        return Outcome::Full(pos);
    };

    let starved = if at_end {
        Outcome::Fail
    } else {
        Outcome::NeedMore
    };

    match first {
        Atom::Char(expected) => match text[pos..].chars().next() {
            None => starved,
            Some(c) if c == *expected => match_atoms(rest, text, pos + c.len_utf8(), at_end),
            Some(_) => Outcome::Fail,
        },
        Atom::Space => match text[pos..].chars().next() {
            None => starved,
            Some(c) if c.is_whitespace() => {
                match_atoms(rest, text, pos + c.len_utf8(), at_end)
            }
            Some(_) => Outcome::Fail,
        },
        Atom::SpaceStar => {
            let mut ends = vec![pos];
            let mut cursor = pos;
            for c in text[pos..].chars() {
                if !c.is_whitespace() {
                    break;
                }
                cursor += c.len_utf8();
                ends.push(cursor);
            }
            // the run touches the end of the buffer: more whitespace may follow
            if cursor == text.len() && !at_end {
                return Outcome::NeedMore;
            }
            for end in ends.into_iter().rev() {
                match match_atoms(rest, text, end, at_end) {
                    Outcome::Fail => continue,
                    decided => return decided,
                }
            }
            Outcome::Fail
        }
    }
}
