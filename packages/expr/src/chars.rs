/*
 * Character Codes
 *
 * Character classes shared by the template grammar and the key extractor
 */

//! Character constants and classes used throughout the parser

use crate::config::GrammarFeatures;

// Whitespace recognised by the grammar
pub const TAB: char = '\t';
pub const NEWLINE: char = '\n';
pub const SPACE: char = ' ';

// Punctuation
pub const DQ: char = '"';
pub const SQ: char = '\'';
pub const DOLLAR: char = '$';
pub const UNDERSCORE: char = '_';
pub const BACKSLASH: char = '\\';

// Region delimiters
pub const LBRACE: char = '{';
pub const RBRACE: char = '}';

// Digits
pub const ZERO: char = '0';
pub const NINE: char = '9';

// Hangul compatibility jamo through the end of the syllables block
pub const HANGUL_FIRST: char = '\u{3131}';
pub const HANGUL_LAST: char = '\u{D7A3}';

/// Grammar whitespace: tab, newline and space only
pub fn is_whitespace(ch: char) -> bool {
    ch == SPACE || ch == TAB || ch == NEWLINE
}

/// Check if character is a digit
pub fn is_digit(ch: char) -> bool {
    (ZERO..=NINE).contains(&ch)
}

/// Check if character is ASCII letter
pub fn is_ascii_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic()
}

pub fn is_hangul(ch: char) -> bool {
    (HANGUL_FIRST..=HANGUL_LAST).contains(&ch)
}

pub fn is_brace(ch: char) -> bool {
    ch == LBRACE || ch == RBRACE
}

/// Check if character can start an identifier under the given grammar
pub fn is_identifier_start(ch: char, features: GrammarFeatures) -> bool {
    is_ascii_letter(ch)
        || ch == UNDERSCORE
        || (ch == DOLLAR && features.contains(GrammarFeatures::DOLLAR_IDENTIFIERS))
        || (is_hangul(ch) && features.contains(GrammarFeatures::HANGUL_IDENTIFIERS))
}

/// Check if character can be part of an identifier under the given grammar
pub fn is_identifier_part(ch: char, features: GrammarFeatures) -> bool {
    is_identifier_start(ch, features) || is_digit(ch)
}
