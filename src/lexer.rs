//! Positioned tokenizer over a stack of source files.
//!
//! The generated [`RawToken`] matcher recognises one lexeme at a time; this
//! wrapper tracks line and column, classifies words through a reserved-word
//! table, folds integer literals, skips nested block comments, and splices
//! included files into the token stream.

use crate::error::{Diagnostic, ErrorCategory};
use crate::token::{RawToken, Token, TokenKind, KEYWORDS};
use logos::Logos;
use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Maximum nesting of `include` directives.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// One file (or in-memory buffer) being tokenized.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: Rc<str>,
    /// Location on disk, used to resolve relative includes.
    pub path: Option<PathBuf>,
    pub text: Rc<str>,
}

impl SourceFile {
    pub fn in_memory(name: &str, text: &str) -> Self {
        SourceFile {
            name: Rc::from(name),
            path: None,
            text: Rc::from(text),
        }
    }

    pub fn read(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(SourceFile {
            name: Rc::from(path.display().to_string()),
            path: Some(path.to_path_buf()),
            text: Rc::from(text),
        })
    }

    fn directory(&self) -> PathBuf {
        self.path
            .as_ref()
            .and_then(|path| path.parent())
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

/// Saved lexing position of a file suspended by an include.
#[derive(Debug)]
struct Memento {
    file: SourceFile,
    offset: usize,
    line: usize,
    column: usize,
    previous: Option<Box<Memento>>,
}

pub struct Lexer {
    file: SourceFile,
    offset: usize,
    line: usize,
    column: usize,
    saved: Option<Box<Memento>>,
    depth: usize,
    reserved: FxHashMap<Rc<str>, TokenKind>,
}

impl Lexer {
    pub fn new(name: &str, source: &str) -> Self {
        Self::with_file(SourceFile::in_memory(name, source))
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        Ok(Self::with_file(SourceFile::read(path)?))
    }

    pub fn with_file(file: SourceFile) -> Self {
        let reserved = KEYWORDS
            .iter()
            .map(|(word, kind)| (Rc::from(*word), *kind))
            .collect();
        Lexer {
            file,
            offset: 0,
            line: 1,
            column: 1,
            saved: None,
            depth: 0,
            reserved,
        }
    }

    /// Name of the file tokens are currently read from.
    pub fn file_name(&self) -> &Rc<str> {
        &self.file.name
    }

    /// Number of files suspended beneath the current one.
    pub fn include_depth(&self) -> usize {
        self.depth
    }

    /// Returns the classification the reserved-word table holds for `word`,
    /// if the lexer has seen it.
    pub fn classify(&self, word: &str) -> Option<TokenKind> {
        self.reserved.get(word).copied()
    }

    /// Consumes input and returns the next token, or an end-of-file token once
    /// every file is exhausted. Reaching the end of an included file resumes
    /// the including file transparently.
    pub fn next_token(&mut self) -> Result<Token, Diagnostic> {
        loop {
            let text = Rc::clone(&self.file.text);
            let rest = &text[self.offset..];
            let mut raw = RawToken::lexer(rest);

            let Some(result) = raw.next() else {
                self.advance_to(&text, text.len());
                if self.pop_file() {
                    continue;
                }
                return Ok(self.token_at(TokenKind::Eof, Rc::from(""), self.line, self.column));
            };

            let span = raw.span();
            let start = self.offset + span.start;
            let end = self.offset + span.end;
            self.advance_to(&text, start);
            let (line, column) = (self.line, self.column);
            let lexeme = &text[start..end];
            self.advance_to(&text, end);

            let raw = match result {
                Ok(raw) => raw,
                Err(()) => {
                    return Err(self.error_at(
                        line,
                        column,
                        format!("Unexpected character '{}'.", lexeme),
                    ))
                }
            };

            match raw {
                RawToken::BlockCommentStart => {
                    self.skip_block_comment(&text, line, column)?;
                }
                RawToken::UnterminatedString => {
                    return Err(self.error_at(line, column, "Unterminated string.".to_string()));
                }
                RawToken::String => {
                    let content = Rc::from(&lexeme[1..lexeme.len() - 1]);
                    return Ok(self.token_at(TokenKind::String, content, line, column));
                }
                RawToken::Integer => {
                    let value = fold_digits(lexeme).ok_or_else(|| {
                        self.error_at(line, column, "Integer literal too large.".to_string())
                    })?;
                    let mut token = self.token_at(TokenKind::Integer, Rc::from(lexeme), line, column);
                    token.integer = Some(value);
                    return Ok(token);
                }
                RawToken::Word => {
                    let (kind, word) = self.classify_word(lexeme);
                    return Ok(self.token_at(kind, word, line, column));
                }
                other => {
                    // Every remaining raw kind maps to a fixed-text token.
                    let kind = TokenKind::from_raw(other).unwrap_or(TokenKind::Eof);
                    return Ok(self.token_at(kind, Rc::from(lexeme), line, column));
                }
            }
        }
    }

    /// Suspends the current file and redirects reads to `path`, resolved
    /// relative to the directory of the file currently being read.
    pub fn push_file(&mut self, path: &str, at: &Token) -> Result<(), Diagnostic> {
        if self.depth >= MAX_INCLUDE_DEPTH {
            return Err(self.error_at(
                at.line,
                at.column,
                format!("Too many nested includes (limit {}).", MAX_INCLUDE_DEPTH),
            ));
        }

        let resolved = self.file.directory().join(path);
        if self.is_open(&resolved) {
            return Err(self.error_at(
                at.line,
                at.column,
                format!("Include cycle detected for '{}'.", resolved.display()),
            ));
        }

        let file = SourceFile::read(&resolved).map_err(|err| {
            self.error_at(
                at.line,
                at.column,
                format!("Cannot read '{}': {}.", resolved.display(), err),
            )
        })?;

        log::debug!("including {}", file.name);
        let previous = std::mem::replace(&mut self.file, file);
        self.saved = Some(Box::new(Memento {
            file: previous,
            offset: self.offset,
            line: self.line,
            column: self.column,
            previous: self.saved.take(),
        }));
        self.offset = 0;
        self.line = 1;
        self.column = 1;
        self.depth += 1;
        Ok(())
    }

    /// Restores the position saved by the matching [`Lexer::push_file`].
    /// Returns false when no file is suspended.
    pub fn pop_file(&mut self) -> bool {
        let Some(memento) = self.saved.take() else {
            return false;
        };
        let memento = *memento;
        log::debug!("leaving {}, resuming {}", self.file.name, memento.file.name);
        self.file = memento.file;
        self.offset = memento.offset;
        self.line = memento.line;
        self.column = memento.column;
        self.saved = memento.previous;
        self.depth -= 1;
        true
    }

    fn is_open(&self, candidate: &Path) -> bool {
        let canonical = |path: &Path| fs::canonicalize(path).ok();
        let Some(target) = canonical(candidate) else {
            return false;
        };
        let matches = |file: &SourceFile| {
            file.path
                .as_deref()
                .and_then(canonical)
                .is_some_and(|open| open == target)
        };
        if matches(&self.file) {
            return true;
        }
        let mut memento = self.saved.as_deref();
        while let Some(saved) = memento {
            if matches(&saved.file) {
                return true;
            }
            memento = saved.previous.as_deref();
        }
        false
    }

    /// Looks `word` up in the reserved-word table, memoising unknown words
    /// as identifiers so later occurrences share the same classification.
    fn classify_word(&mut self, word: &str) -> (TokenKind, Rc<str>) {
        if let Some((key, kind)) = self.reserved.get_key_value(word) {
            return (*kind, Rc::clone(key));
        }
        let key: Rc<str> = Rc::from(word);
        self.reserved.insert(Rc::clone(&key), TokenKind::Identifier);
        (TokenKind::Identifier, key)
    }

    /// Skips a block comment whose opening `/*` has been consumed. Openers and
    /// closers nest; the stack keeps each opener's position for error reports.
    fn skip_block_comment(
        &mut self,
        text: &str,
        line: usize,
        column: usize,
    ) -> Result<(), Diagnostic> {
        let mut openers = vec![(line, column)];
        let bytes = text.as_bytes();
        let mut index = self.offset;

        while index < bytes.len() {
            match (bytes[index], bytes.get(index + 1)) {
                (b'/', Some(b'*')) => {
                    self.advance_to(text, index);
                    openers.push((self.line, self.column));
                    index += 2;
                }
                (b'*', Some(b'/')) => {
                    index += 2;
                    openers.pop();
                    if openers.is_empty() {
                        self.advance_to(text, index);
                        return Ok(());
                    }
                }
                _ => index += 1,
            }
        }

        self.advance_to(text, bytes.len());
        let (line, column) = openers.last().copied().unwrap_or((line, column));
        Err(self.error_at(line, column, "Unterminated block comment.".to_string()))
    }

    /// Moves the read position forward to `target`, keeping line and column
    /// in step with the characters passed over.
    fn advance_to(&mut self, text: &str, target: usize) {
        if target <= self.offset {
            return;
        }
        for ch in text[self.offset..target].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = target;
    }

    fn token_at(&self, kind: TokenKind, lexeme: Rc<str>, line: usize, column: usize) -> Token {
        Token::new(kind, lexeme, Rc::clone(&self.file.name), line, column)
    }

    fn error_at(&self, line: usize, column: usize, message: String) -> Diagnostic {
        Diagnostic {
            category: ErrorCategory::Lexical,
            file: Rc::clone(&self.file.name),
            line,
            column,
            message,
        }
    }
}

/// Folds a run of ASCII digits with `acc * 10 + digit`, failing on overflow.
fn fold_digits(digits: &str) -> Option<i64> {
    digits.bytes().try_fold(0i64, |acc, digit| {
        acc.checked_mul(10)?.checked_add(i64::from(digit - b'0'))
    })
}
