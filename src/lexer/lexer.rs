//! Pull-based tokenizer for spec files
//!
//! Block structure is significant: a run of newlines produces a single
//! NEWLINE token, and the indentation delta of the following line (in
//! units of 4 spaces) is emitted as INDENT or DEDENT tokens. A single
//! scan step may therefore produce several tokens; they are staged in a
//! pending queue and handed out one at a time by `next_token`.
//!
//! Tokenization never fails on an unrecognized character. Bad characters
//! are recorded as `(character, line)` pairs and skipped; only
//! indentation that is not a multiple of 4 aborts the stream.

use std::collections::VecDeque;

use super::errors::{LexError, LexResult};
use super::token::{Token, TokenKind, TokenValue};

/// Width of one indentation level, in spaces.
pub const INDENT_WIDTH: usize = 4;

/// All reserved words. A subset gets a dedicated token kind; the rest are
/// emitted as KEYWORD tokens carrying their text.
const KEYWORDS: [&str; 16] = [
    "alias",
    "deprecated",
    "doc",
    "example",
    "error",
    "extends",
    "attrs",
    "include",
    "namespace",
    "of",
    "pass",
    "request",
    "response",
    "route",
    "struct",
    "union",
];

fn reserved_kind(word: &str) -> Option<TokenKind> {
    match word {
        "deprecated" => Some(TokenKind::Deprecated),
        "extends" => Some(TokenKind::Extends),
        "attrs" => Some(TokenKind::Attrs),
        "include" => Some(TokenKind::Include),
        "of" => Some(TokenKind::Of),
        "pass" => Some(TokenKind::Pass),
        "route" => Some(TokenKind::Route),
        "struct" => Some(TokenKind::Struct),
        "union" => Some(TokenKind::Union),
        _ => None,
    }
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn is_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '/'
}

/// Tokenizer for a single source text.
///
/// One instance per input; the indent counter, pending queue, and error
/// list are private per-invocation state and must not be shared across
/// concurrent tokenizations.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    cur_indent: usize,
    queue: VecDeque<Token>,
    last_kind: Option<TokenKind>,
    errors: Vec<(char, usize)>,
}

impl Lexer {
    /// Creates a lexer over `source`. A trailing newline is appended so
    /// files that do not end in one still tokenize their last statement.
    pub fn new(source: &str) -> Self {
        let mut chars: Vec<char> = source.chars().collect();
        chars.push('\n');
        Self {
            chars,
            pos: 0,
            line: 1,
            cur_indent: 0,
            queue: VecDeque::new(),
            last_kind: None,
            errors: Vec::new(),
        }
    }

    /// Bad characters seen so far, as `(character, line)` pairs.
    ///
    /// Callers must check this after the stream ends even if tokens were
    /// produced.
    pub fn errors(&self) -> &[(char, usize)] {
        &self.errors
    }

    /// Returns the next token, or `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Returns `LexError` if a line's indentation is not a multiple of 4.
    pub fn next_token(&mut self) -> LexResult<Option<Token>> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                self.last_kind = Some(token.kind);
                return Ok(Some(token));
            }

            if self.pos >= self.chars.len() {
                if self.cur_indent > 0 {
                    // Close all open blocks at end of input.
                    if self.last_kind != Some(TokenKind::Newline) {
                        self.queue.push_back(Token::new(
                            TokenKind::Newline,
                            TokenValue::None,
                            self.line,
                            self.pos,
                        ));
                    }
                    for _ in 0..self.cur_indent / INDENT_WIDTH {
                        self.queue.push_back(Token::new(
                            TokenKind::Dedent,
                            TokenValue::None,
                            self.line,
                            self.pos,
                        ));
                    }
                    self.cur_indent = 0;
                    continue;
                }
                return Ok(None);
            }

            let c = self.chars[self.pos];
            match c {
                ' ' | '\t' => self.pos += 1,
                '\n' => {
                    let start_line = self.line;
                    let start_pos = self.pos;
                    self.consume_newlines();
                    self.emit_line_break(start_line, start_pos)?;
                }
                '#' => self.scan_comment()?,
                '"' => self.scan_string(),
                '/' => self.scan_path(),
                ',' => self.push_punct(TokenKind::Comma),
                '=' => self.push_punct(TokenKind::Eq),
                '(' => self.push_punct(TokenKind::LParen),
                ')' => self.push_punct(TokenKind::RParen),
                '|' => self.push_punct(TokenKind::Pipe),
                '*' => self.push_punct(TokenKind::Asterisk),
                '?' => self.push_punct(TokenKind::Question),
                '.' => {
                    if self.digit_at(self.pos + 1) {
                        self.scan_number();
                    } else {
                        self.push_punct(TokenKind::Dot);
                    }
                }
                _ if c.is_ascii_digit() => self.scan_number(),
                _ if is_word_start(c) => self.scan_word(),
                _ => {
                    self.errors.push((c, self.line));
                    self.pos += 1;
                }
            }
        }
    }

    fn push_punct(&mut self, kind: TokenKind) {
        self.queue
            .push_back(Token::new(kind, TokenValue::None, self.line, self.pos));
        self.pos += 1;
    }

    fn digit_at(&self, i: usize) -> bool {
        self.chars.get(i).is_some_and(|c| c.is_ascii_digit())
    }

    fn consume_newlines(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos] == '\n' {
            self.pos += 1;
            self.line += 1;
        }
    }

    /// Emits the NEWLINE for a just-consumed newline run, followed by the
    /// INDENT/DEDENT tokens implied by the next line's leading spaces.
    /// `self.pos` must be at the start of the next line.
    fn emit_line_break(&mut self, start_line: usize, start_pos: usize) -> LexResult<()> {
        let newline = Token::new(TokenKind::Newline, TokenValue::None, start_line, start_pos);

        if self.pos >= self.chars.len() {
            // End of input; dedents are synthesized by next_token.
            self.queue.push_back(newline);
            return Ok(());
        }

        let mut i = self.pos;
        while i < self.chars.len() && self.chars[i] == ' ' {
            i += 1;
        }
        let indent = i - self.pos;

        let delta = indent as isize - self.cur_indent as isize;
        if delta % INDENT_WIDTH as isize != 0 {
            return Err(LexError::IndentNotAligned {
                width: indent,
                line: self.line,
            });
        }

        self.queue.push_back(newline);
        let kind = if delta > 0 {
            TokenKind::Indent
        } else {
            TokenKind::Dedent
        };
        for _ in 0..delta.unsigned_abs() / INDENT_WIDTH {
            self.queue
                .push_back(Token::new(kind, TokenValue::None, self.line, self.pos));
        }
        self.cur_indent = indent;
        Ok(())
    }

    /// Discards a comment. A comment with nothing but spaces before it on
    /// its line vanishes entirely, trailing newlines included. A comment
    /// after code consumed the newline run the newline rule would have
    /// seen, so it re-dispatches through the line-break handler to keep
    /// the NEWLINE token and the indentation bookkeeping.
    fn scan_comment(&mut self) -> LexResult<()> {
        let start_line = self.line;
        let start_pos = self.pos;

        let mut full_line = true;
        let mut i = self.pos;
        while i > 0 {
            let prev = self.chars[i - 1];
            if prev == '\n' {
                break;
            }
            if prev != ' ' {
                full_line = false;
                break;
            }
            i -= 1;
        }

        while self.pos < self.chars.len() && self.chars[self.pos] != '\n' {
            self.pos += 1;
        }
        self.consume_newlines();

        if full_line {
            Ok(())
        } else {
            self.emit_line_break(start_line, start_pos)
        }
    }

    /// Scans a quoted string. Escapes `\\`, `\"`, `\n`, `\t` translate;
    /// any other escaped character drops the backslash. Each line of the
    /// result is de-indented by the current tracked indent so multi-line
    /// literals inside a block carry only their authored content.
    fn scan_string(&mut self) {
        let start_line = self.line;
        let start_pos = self.pos;

        let mut raw = String::new();
        let mut i = self.pos + 1;
        let mut terminated = false;
        while i < self.chars.len() {
            let c = self.chars[i];
            if c == '\\' && i + 1 < self.chars.len() {
                raw.push(c);
                raw.push(self.chars[i + 1]);
                i += 2;
                continue;
            }
            if c == '"' {
                terminated = true;
                i += 1;
                break;
            }
            raw.push(c);
            i += 1;
        }

        if !terminated {
            self.errors.push(('"', start_line));
            self.pos = start_pos + 1;
            return;
        }

        self.line += raw.chars().filter(|&c| c == '\n').count();
        self.pos = i;

        let text = self.process_string(&raw);
        self.queue.push_back(Token::new(
            TokenKind::String,
            TokenValue::Text(text),
            start_line,
            start_pos,
        ));
    }

    fn process_string(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut escaped = false;
        for c in raw.chars() {
            if escaped {
                match c {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    other => out.push(other),
                }
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                out.push(c);
            }
        }

        if self.cur_indent == 0 {
            return out;
        }
        let prefix = " ".repeat(self.cur_indent);
        out.split('\n')
            .map(|line| line.strip_prefix(prefix.as_str()).unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn scan_path(&mut self) {
        let start = self.pos;
        let mut i = self.pos + 1;
        while i < self.chars.len() && is_path_char(self.chars[i]) {
            i += 1;
        }
        let text: String = self.chars[start..i].iter().collect();
        self.pos = i;
        self.queue.push_back(Token::new(
            TokenKind::Path,
            TokenValue::Text(text),
            self.line,
            start,
        ));
    }

    /// Scans an integer or float. Floats are either a decimal fraction
    /// with an optional exponent, or a nonzero-leading integer with an
    /// exponent.
    fn scan_number(&mut self) {
        let start = self.pos;
        let mut i = self.pos;
        while i < self.chars.len() && self.chars[i].is_ascii_digit() {
            i += 1;
        }

        let mut is_float = false;
        if i < self.chars.len() && self.chars[i] == '.' && self.digit_at(i + 1) {
            is_float = true;
            i += 1;
            while i < self.chars.len() && self.chars[i].is_ascii_digit() {
                i += 1;
            }
            i = self.scan_exponent(i);
        } else if i > start && self.chars[start] != '0' {
            let j = self.scan_exponent(i);
            if j > i {
                is_float = true;
                i = j;
            }
        }

        let text: String = self.chars[start..i].iter().collect();
        self.pos = i;

        if is_float {
            match text.parse::<f64>() {
                Ok(x) => self.queue.push_back(Token::new(
                    TokenKind::Float,
                    TokenValue::Float(x),
                    self.line,
                    start,
                )),
                Err(_) => self.errors.push((self.chars[start], self.line)),
            }
        } else {
            match text.parse::<u64>() {
                Ok(n) => self.queue.push_back(Token::new(
                    TokenKind::Integer,
                    TokenValue::Int(n),
                    self.line,
                    start,
                )),
                Err(_) => self.errors.push((self.chars[start], self.line)),
            }
        }
    }

    /// Returns the index past an exponent (`[eE][+-]?\d+`) starting at
    /// `i`, or `i` if there is none.
    fn scan_exponent(&self, i: usize) -> usize {
        if !self.chars.get(i).is_some_and(|c| matches!(*c, 'e' | 'E')) {
            return i;
        }
        let mut j = i + 1;
        if self.chars.get(j).is_some_and(|c| matches!(*c, '+' | '-')) {
            j += 1;
        }
        let digits_start = j;
        while j < self.chars.len() && self.chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            j
        } else {
            i
        }
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        let mut i = self.pos + 1;
        while i < self.chars.len() && is_word_char(self.chars[i]) {
            i += 1;
        }
        let text: String = self.chars[start..i].iter().collect();
        self.pos = i;

        let token = match text.as_str() {
            "true" => Token::new(TokenKind::Boolean, TokenValue::Bool(true), self.line, start),
            "false" => Token::new(
                TokenKind::Boolean,
                TokenValue::Bool(false),
                self.line,
                start,
            ),
            "null" => Token::new(TokenKind::Null, TokenValue::Null, self.line, start),
            word => {
                if let Some(kind) = reserved_kind(word) {
                    Token::new(kind, TokenValue::Text(text), self.line, start)
                } else if KEYWORDS.contains(&word) {
                    Token::new(TokenKind::Keyword, TokenValue::Text(text), self.line, start)
                } else {
                    Token::new(TokenKind::Id, TokenValue::Text(text), self.line, start)
                }
            }
        };
        self.queue.push_back(token);
    }
}

impl Iterator for Lexer {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Drains a full token stream from `source`.
///
/// Returns the tokens and the batched `(bad character, line)` errors.
///
/// # Errors
///
/// Returns `LexError` on indentation that is not a multiple of 4.
pub fn tokenize(source: &str) -> LexResult<(Vec<Token>, Vec<(char, usize)>)> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok((tokens, lexer.errors))
}
