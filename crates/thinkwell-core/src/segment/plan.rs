//! Streaming plans compiled from extraction patterns
//!
//! A pattern such as `<think>(?P<thinking>.*?)</think>(?P<content>.*)` is
//! split into the delimiters around its capture groups. Each step of the
//! plan waits for one delimiter and then switches the segmenter into the
//! bucket of the group that follows it.
//!
//! Only patterns whose structure the step machine reproduces exactly are
//! planned; anything else (character classes, alternation, greedy groups
//! followed by more text, ...) gets `None` and is segmented in buffered mode.

use super::delimiter::{Atom, Delimiter};
use super::SegmentMode;

/// One transition of the streaming state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    /// Delimiter that ends the current mode
    pub(crate) delimiter: Delimiter,
    /// Mode entered once the delimiter has been consumed
    pub(crate) next: SegmentMode,
}

/// Ordered transitions for one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StreamPlan {
    pub(crate) steps: Vec<Step>,
}

#[derive(Debug)]
enum Piece {
    Literal(Atom),
    Group { mode: SegmentMode, lazy: bool },
}

struct Group {
    mode: SegmentMode,
    lazy: bool,
}

impl StreamPlan {
    /// Compile a plan from pattern source, or `None` if it cannot stream
    pub(crate) fn compile(source: &str) -> Option<Self> {
        let pieces = tokenize(source)?;

        let mut delimiters = vec![Vec::new()];
        let mut groups = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Literal(atom) => delimiters.last_mut()?.push(atom),
                Piece::Group { mode, lazy } => {
                    groups.push(Group { mode, lazy });
                    delimiters.push(Vec::new());
                }
            }
        }
        let delimiters: Vec<Delimiter> = delimiters.into_iter().map(Delimiter::new).collect();

        if groups.is_empty() || groups.len() > 2 {
            return None;
        }

        let last = groups.len() - 1;
        let trailing = &delimiters[last + 1];
        for (i, group) in groups.iter().enumerate() {
            if i < last && !group.lazy {
                return None;
            }
        }
        // a lazy final group with nothing after it always captures "";
        // a greedy one followed by text reaches for the last occurrence
        if groups[last].lazy == trailing.is_empty() {
            return None;
        }

        // `\s*` followed by a group whose closer may start with whitespace
        // needs regex backtracking across the group
        for pair in delimiters.windows(2) {
            if pair[0].ends_with_space_run() && pair[1].starts_with_whitespace() {
                return None;
            }
        }

        let mut steps = Vec::new();
        for (i, group) in groups.iter().enumerate() {
            steps.push(Step {
                delimiter: delimiters[i].clone(),
                next: group.mode,
            });
        }
        if groups[last].lazy {
            steps.push(Step {
                delimiter: trailing.clone(),
                next: SegmentMode::InContent,
            });
        }

        Some(Self { steps })
    }
}

fn tokenize(source: &str) -> Option<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '(' => {
                let rest: String = chars.clone().collect();
                let header = if rest.starts_with("?P<") {
                    3
                } else if rest.starts_with("?<") {
                    2
                } else {
                    return None;
                };
                for _ in 0..header {
                    chars.next();
                }

                let name: String = chars.by_ref().take_while(|&c| c != '>').collect();
                let body: String = chars.by_ref().take_while(|&c| c != ')').collect();
                let lazy = match body.as_str() {
                    ".*?" => true,
                    ".*" => false,
                    _ => return None,
                };
                let mode = match name.as_str() {
                    "reasoning" | "thinking" => SegmentMode::InReasoning,
                    "content" => SegmentMode::InContent,
                    _ => return None,
                };
                pieces.push(Piece::Group { mode, lazy });
            }
            '\\' => {
                let escaped = chars.next()?;
                match escaped {
                    'n' => pieces.push(Piece::Literal(Atom::Char('\n'))),
                    't' => pieces.push(Piece::Literal(Atom::Char('\t'))),
                    'r' => pieces.push(Piece::Literal(Atom::Char('\r'))),
                    's' => match chars.peek() {
                        Some('*') => {
                            chars.next();
                            pieces.push(Piece::Literal(Atom::SpaceStar));
                        }
                        Some('+') => {
                            chars.next();
                            pieces.push(Piece::Literal(Atom::Space));
                            pieces.push(Piece::Literal(Atom::SpaceStar));
                        }
                        _ => pieces.push(Piece::Literal(Atom::Space)),
                    },
                    c if c.is_alphanumeric() => return None,
                    c => pieces.push(Piece::Literal(Atom::Char(c))),
                }
            }
            '.' | '^' | '$' | '*' | '+' | '?' | '{' | '}' | '[' | ']' | '|' | ')' => {
                return None;
            }
            c => pieces.push(Piece::Literal(Atom::Char(c))),
        }
    }

    Some(pieces)
}
