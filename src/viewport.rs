//! Media query matching.
//!
//! The selector never reads viewport state itself: callers hand it a
//! [`MediaMatcher`]. A browser host would back this with `matchMedia`; tests
//! can pass a closure. [`Viewport`] is a small evaluator for the queries that
//! responsive sources actually use, so the CLI can simulate screen sizes.
//!
//! ## Supported Queries
//!
//! | Syntax | Example |
//! |---|---|
//! | Query lists (any branch) | `(max-width: 480px), print` |
//! | Conjunctions | `screen and (min-width: 768px) and (max-width: 1023px)` |
//! | Prefixes | `only screen ...`, `not print` |
//! | Media types | `all`, `screen` match; `print` never does |
//! | Width/height | `min-width`, `max-width`, `width`, same for `height` |
//! | Orientation | `(orientation: portrait)`, `(orientation: landscape)` |
//! | Lengths | `px`, `em`/`rem` (16px), unitless `0` |
//!
//! Anything else makes its branch fail to match.

/// Answers whether a media query currently matches.
pub trait MediaMatcher {
    fn matches(&self, query: &str) -> bool;
}

impl<F> MediaMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, query: &str) -> bool {
        self(query)
    }
}

/// Pixels per `em`/`rem` when resolving lengths.
pub const EM_PX: f64 = 16.0;

/// A simulated viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn matches_branch(&self, branch: &str) -> bool {
        let tokens = tokenize(branch);
        let mut rest = tokens.as_slice();

        let negate = match rest.first() {
            Some(Token::Word(w)) if w == "not" => {
                rest = &rest[1..];
                true
            }
            Some(Token::Word(w)) if w == "only" => {
                rest = &rest[1..];
                false
            }
            _ => false,
        };
        if rest.is_empty() {
            return false;
        }

        let mut result = true;
        let mut expect_condition = true;
        for token in rest {
            match (token, expect_condition) {
                (Token::Word(w), false) if w == "and" => expect_condition = true,
                (Token::Word(w), true) => {
                    result &= matches_media_type(w);
                    expect_condition = false;
                }
                (Token::Group(feature), true) => {
                    result &= self.matches_feature(feature);
                    expect_condition = false;
                }
                _ => return false,
            }
        }
        if expect_condition {
            // Trailing `and`
            return false;
        }
        result != negate
    }

    fn matches_feature(&self, feature: &str) -> bool {
        let Some((name, value)) = feature.split_once(':') else {
            return false;
        };
        let name = name.trim();
        let value = value.trim();
        let width = f64::from(self.width);
        let height = f64::from(self.height);

        match name {
            "orientation" => match value {
                "portrait" => self.height >= self.width,
                "landscape" => self.width > self.height,
                _ => false,
            },
            _ => {
                let Some(px) = parse_length(value) else {
                    return false;
                };
                match name {
                    "min-width" => width >= px,
                    "max-width" => width <= px,
                    "width" => width == px,
                    "min-height" => height >= px,
                    "max-height" => height <= px,
                    "height" => height == px,
                    _ => false,
                }
            }
        }
    }
}

impl MediaMatcher for Viewport {
    fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }
        query.split(',').any(|branch| self.matches_branch(branch))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    /// Contents of a parenthesized feature, without the parens
    Group(String),
}

fn tokenize(branch: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = branch.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            let mut end = branch.len();
            let mut closed = false;
            for (i, c) in chars.by_ref() {
                if c == ')' {
                    end = i;
                    closed = true;
                    break;
                }
            }
            // An unclosed group can never match a known feature
            let inner = if closed { &branch[start + 1..end] } else { "" };
            tokens.push(Token::Group(inner.to_string()));
        } else {
            let mut end = branch.len();
            while let Some(&(i, c)) = chars.peek() {
                if c.is_whitespace() || c == '(' {
                    end = i;
                    break;
                }
                chars.next();
            }
            tokens.push(Token::Word(branch[start..end].to_string()));
        }
    }
    tokens
}

fn matches_media_type(media_type: &str) -> bool {
    matches!(media_type, "all" | "screen")
}

/// Parse a CSS length into pixels.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let number: f64 = number.parse().ok()?;
    match unit.trim() {
        "px" => Some(number),
        "em" | "rem" => Some(number * EM_PX),
        "" if number == 0.0 => Some(0.0),
        _ => None,
    }
}
