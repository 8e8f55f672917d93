use std::collections::HashSet;

use crate::{
    error::ParseError,
    interpreter::{parser::core::ParseResult, syntax::SyntaxConfig, trie::Trie},
};

/// An immutable string token. Its kind is re-derived from context: digit
/// runs are numeric, bracket and operator tables classify the rest.
pub type Lexeme = String;

/// Result of scanning a text: the lexemes and the character offsets that
/// could not be classified.
struct Scan {
    lexemes:  Vec<Lexeme>,
    rejected: Vec<usize>,
}

/// Turns raw text into a sequence of lexemes.
///
/// Keywords are matched greedily through a [`Trie`]; digit runs form a single
/// lexeme; separators break lexemes and are dropped. After a raw-expression
/// open bracket (such as `[` or `{`), every character up to the matching
/// close bracket is captured verbatim as one body lexeme, with nested raw
/// regions tracked on a stack so that `{x | [x, {y | y}]}` captures the
/// whole inner text.
///
/// # Example
/// ```
/// use calctree::interpreter::{lexer::Tokenizer, syntax::SyntaxConfig};
///
/// let tokenizer = Tokenizer::new(&SyntaxConfig::standard());
///
/// assert_eq!(tokenizer.tokenize("12+3.5*2").unwrap(),
///            ["12", "+", "3", ".", "5", "*", "2"]);
/// assert_eq!(tokenizer.tokenize("sigma [1, [2, 3]]").unwrap(),
///            ["sigma", "[", "1, [2, 3]", "]"]);
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer {
    keywords:     Trie,
    delimiters:   Trie,
    raw_pairs:    Vec<(String, String)>,
    separators:   HashSet<char>,
}

impl Tokenizer {
    /// Builds a tokenizer from the keyword, bracket and separator tables of
    /// `config`.
    #[must_use]
    pub fn new(config: &SyntaxConfig) -> Self {
        let mut keywords = Trie::new();
        for keyword in config.keywords() {
            keywords.insert(&keyword);
        }

        let mut delimiters = Trie::new();
        let mut raw_pairs = Vec::new();
        for raw in config.raw_brackets() {
            delimiters.insert(&raw.open);
            delimiters.insert(&raw.close);
            raw_pairs.push((raw.open.clone(), raw.close.clone()));
        }

        Self { keywords,
               delimiters,
               raw_pairs,
               separators: config.separators().clone() }
    }

    /// Adds a keyword. Returns `true` if it was not known before.
    pub fn insert_keyword(&mut self, keyword: &str) -> bool {
        self.keywords.insert(keyword)
    }

    /// Removes a keyword. Returns `true` if it was known.
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        self.keywords.remove(keyword)
    }

    /// Returns `true` if `word` is a keyword.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.search(word)
    }

    /// Tokenizes `text`, failing on any character that is neither a
    /// separator, a digit, nor part of a keyword.
    ///
    /// # Errors
    /// Returns `ParseError::Lexing`, whose message echoes `text` with a `^`
    /// under every rejected character.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tokenize(&self, text: &str) -> ParseResult<Vec<Lexeme>> {
        let scan = self.scan(text);
        if scan.rejected.is_empty() {
            tracing::trace!(count = scan.lexemes.len(), "tokenized");
            return Ok(scan.lexemes);
        }

        let flattened: String = text.chars()
                                    .map(|c| if c.is_whitespace() { ' ' } else { c })
                                    .collect();
        let mut marker = vec![' '; flattened.chars().count()];
        for &position in &scan.rejected {
            marker[position] = '^';
        }
        let marker: String = marker.into_iter().collect();

        Err(ParseError::Lexing { text:      flattened,
                                 marker:    marker.trim_end().to_string(),
                                 positions: scan.rejected, })
    }

    /// Tokenizes `text`, silently dropping unclassifiable characters.
    #[must_use]
    pub fn tokenize_lossy(&self, text: &str) -> Vec<Lexeme> {
        self.scan(text).lexemes
    }

    fn scan(&self, text: &str) -> Scan {
        let chars: Vec<char> = text.chars().collect();
        let mut lexemes = Vec::new();
        let mut rejected = Vec::new();
        let mut raw_buffer = String::new();
        let mut open_raw: Vec<usize> = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            if let Some(&kind) = open_raw.last() {
                i += self.scan_raw(&chars[i..], kind, &mut open_raw, &mut raw_buffer, &mut lexemes);
                continue;
            }

            let c = chars[i];
            if self.separators.contains(&c) {
                i += 1;
                continue;
            }

            let keyword_len = self.keywords
                                  .longest_match(chars[i..].iter().copied())
                                  .unwrap_or(0);
            let digit_len = chars[i..].iter().take_while(|c| c.is_ascii_digit()).count();

            if digit_len > 0 && digit_len >= keyword_len {
                lexemes.push(chars[i..i + digit_len].iter().collect());
                i += digit_len;
            } else if keyword_len > 0 {
                let keyword: String = chars[i..i + keyword_len].iter().collect();
                if let Some(kind) = self.raw_pairs.iter().position(|(open, _)| *open == keyword) {
                    open_raw.push(kind);
                }
                lexemes.push(keyword);
                i += keyword_len;
            } else {
                rejected.push(i);
                i += 1;
            }
        }

        if !open_raw.is_empty() && !raw_buffer.is_empty() {
            lexemes.push(raw_buffer);
        }

        Scan { lexemes, rejected }
    }

    /// Consumes one delimiter or character inside a raw region and returns
    /// how many characters were consumed.
    fn scan_raw(&self,
                rest: &[char],
                kind: usize,
                open_raw: &mut Vec<usize>,
                raw_buffer: &mut String,
                lexemes: &mut Vec<Lexeme>)
                -> usize {
        if let Some(len) = self.delimiters.longest_match(rest.iter().copied()) {
            let delimiter: String = rest[..len].iter().collect();

            if delimiter == self.raw_pairs[kind].1 {
                open_raw.pop();
                if open_raw.is_empty() {
                    if !raw_buffer.trim().is_empty() {
                        lexemes.push(std::mem::take(raw_buffer));
                    }
                    raw_buffer.clear();
                    lexemes.push(delimiter);
                } else {
                    raw_buffer.push_str(&delimiter);
                }
                return len;
            }

            if let Some(nested) = self.raw_pairs.iter().position(|(open, _)| *open == delimiter) {
                open_raw.push(nested);
                raw_buffer.push_str(&delimiter);
                return len;
            }
        }

        raw_buffer.push(rest[0]);
        1
    }
}
