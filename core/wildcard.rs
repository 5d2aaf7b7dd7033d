//! Shell-style wildcard patterns.
//!
//! `?` matches exactly one character and `*` matches any run of characters,
//! including none. Every other character is literal. In multi-pattern mode a
//! pattern may hold several alternatives separated by `;`.

use log;
use regex::{Regex, RegexBuilder};

/// Matches any single character.
pub const ANY_CHARACTER: char = '?';

/// Matches zero or more characters.
pub const ANY_CHARACTERS: char = '*';

/// Separates alternatives in [`WildcardOptions::MultiPattern`] mode.
pub const DELIMITER: char = ';';

/// Compiled size limit per alternative, far above the regex crate default.
const REGEX_SIZE_LIMIT: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WildcardOptions {
    /// The whole string is one pattern; `;` is an ordinary character.
    #[default]
    SinglePattern,
    /// The string is split on `;` and empty alternatives are dropped.
    MultiPattern,
}

/// A compiled wildcard pattern.
///
/// Compilation never fails. An empty pattern, or a multi-pattern made only of
/// delimiters, has no alternatives and matches nothing.
#[derive(Debug, Clone)]
pub struct Wildcard {
    pattern: String,
    options: WildcardOptions,
    regexes: Vec<Regex>,
}

impl Wildcard {
    pub fn new(pattern: &str, options: WildcardOptions) -> Self {
        let regexes = alternatives(pattern, options)
            .filter_map(|alternative| {
                let source = to_regex_source(alternative);
                match compile(&source) {
                    Ok(regex) => Some(regex),
                    Err(e) => {
                        log::error!(
                            "Dropping wildcard alternative \"{}\" (compiled as \"{}\"): {}",
                            alternative,
                            source,
                            e
                        );
                        None
                    }
                }
            })
            .collect::<Vec<_>>();
        log::trace!(
            "Compiled wildcard \"{}\" ({:?}) into {} alternative(s)",
            pattern,
            options,
            regexes.len()
        );
        Self {
            pattern: pattern.to_string(),
            options,
            regexes,
        }
    }

    /// Shorthand for [`WildcardOptions::MultiPattern`].
    pub fn multi(pattern: &str) -> Self {
        Self::new(pattern, WildcardOptions::MultiPattern)
    }

    /// True when the whole of `input` matches at least one alternative.
    pub fn is_match(&self, input: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(input))
    }

    /// One-shot form of [`Wildcard::new`] followed by [`Wildcard::is_match`].
    pub fn is_match_pattern(input: &str, pattern: &str, options: WildcardOptions) -> bool {
        alternatives(pattern, options)
            .any(|alternative| match_alternative(alternative, input))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> WildcardOptions {
        self.options
    }

    /// Number of compiled alternatives.
    pub fn alternatives(&self) -> usize {
        self.regexes.len()
    }

    /// True when there are no alternatives, i.e. nothing can match.
    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }
}

fn alternatives(pattern: &str, options: WildcardOptions) -> Box<dyn Iterator<Item = &str> + '_> {
    if pattern.is_empty() {
        return Box::new(std::iter::empty());
    }
    match options {
        WildcardOptions::MultiPattern => Box::new(
            pattern
                .split(DELIMITER)
                .filter(|alternative| !alternative.is_empty()),
        ),
        WildcardOptions::SinglePattern => Box::new(std::iter::once(pattern)),
    }
}

fn to_regex_source(alternative: &str) -> String {
    let mut source = String::with_capacity(alternative.len() + 8);
    // (?s) lets the wildcards cover '\n' as well.
    source.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for c in alternative.chars() {
        match c {
            ANY_CHARACTER => source.push('.'),
            ANY_CHARACTERS => source.push_str(".*"),
            c => source.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    source.push('$');
    source
}

fn compile(source: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(source)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_SIZE_LIMIT)
        .build()
}

fn match_alternative(alternative: &str, input: &str) -> bool {
    compile(&to_regex_source(alternative))
        .map(|regex| regex.is_match(input))
        .unwrap_or(false)
}
