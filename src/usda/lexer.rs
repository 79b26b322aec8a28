//! Tokenizer for `.usda` text.

use crate::util::{Error, Result};

/// Token kind.
#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    /// Identifier or keyword. Namespaced names (`inputs:intensity`) and
    /// property suffixes (`.timeSamples`) are part of one identifier.
    Ident(String),
    /// Numeric literal, kept as written (`1`, `-0.5`, `1e-3`, `-inf`).
    Number(String),
    /// Quoted string with escapes resolved.
    Str(String),
    /// `@asset/path@`, without the `@`s.
    Asset(String),
    /// `</prim/path>`, without the brackets.
    Path(String),
    /// Single punctuation character.
    Punct(char),
}

impl Tok {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("'{s}'"),
            Self::Number(s) => format!("number {s}"),
            Self::Str(s) => format!("string {s:?}"),
            Self::Asset(s) => format!("asset @{s}@"),
            Self::Path(s) => format!("path <{s}>"),
            Self::Punct(c) => format!("'{c}'"),
        }
    }
}

/// A token with the 1-based line it starts on.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub line: usize,
}

const PUNCT: &[char] = &['(', ')', '{', '}', '[', ']', '=', ',', ':', ';'];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.')
}

/// Character cursor over the source text.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(text: &str, first_line: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: first_line,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| pred(*c)) {
            out.push(c);
            self.bump();
        }
        out
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Result<String> {
        let line = self.line;
        let mut text = String::new();
        if let Some(sign) = self.peek().filter(|c| matches!(c, '-' | '+')) {
            text.push(sign);
            self.bump();
        }
        if self.peek().is_some_and(is_ident_start) {
            let word = self.take_while(|c| c.is_ascii_alphabetic());
            if !matches!(word.as_str(), "inf" | "nan") {
                return Err(Error::syntax(line, format!("invalid number '{text}{word}'")));
            }
            text.push_str(&word);
            return Ok(text);
        }
        text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        if self.peek() == Some('.') {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if self.peek().is_some_and(|c| matches!(c, 'e' | 'E')) {
            self.bump();
            text.push('e');
            if let Some(sign) = self.peek().filter(|c| matches!(c, '-' | '+')) {
                text.push(sign);
                self.bump();
            }
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if !text.chars().any(|c| c.is_ascii_digit()) {
            return Err(Error::syntax(line, format!("invalid number '{text}'")));
        }
        Ok(text)
    }

    fn string(&mut self, quote: char) -> Result<String> {
        let line = self.line;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        let width = if triple { 3 } else { 1 };
        for _ in 0..width {
            self.bump();
        }
        let mut out = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(Error::syntax(line, "unterminated string"));
            };
            match c {
                '\\' => {
                    let Some(esc) = self.bump() else {
                        return Err(Error::syntax(line, "unterminated string"));
                    };
                    out.push(match esc {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                '\n' if !triple => return Err(Error::syntax(line, "newline in string")),
                c if c == quote && !triple => return Ok(out),
                c if c == quote && self.peek() == Some(quote) && self.peek_at(1) == Some(quote) => {
                    self.bump();
                    self.bump();
                    return Ok(out);
                }
                c => out.push(c),
            }
        }
    }

    fn delimited(&mut self, close: char, what: &str) -> Result<String> {
        let line = self.line;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == close => return Ok(out),
                Some('\n') | None => return Err(Error::syntax(line, format!("unterminated {what}"))),
                Some(c) => out.push(c),
            }
        }
    }
}

/// Split the `#usda <version>` header from the body.
///
/// Returns the version and the text after the header line.
pub fn split_header(text: &str) -> Result<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let version = first
        .trim_end()
        .strip_prefix("#usda ")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::syntax(1, "missing '#usda' header"))?;
    Ok((version, rest))
}

/// Tokenize layer text. `first_line` is the line number of `text`'s first line.
pub fn tokenize(text: &str, first_line: usize) -> Result<Vec<Token>> {
    let mut cur = Cursor::new(text, first_line);
    let mut tokens = Vec::new();
    loop {
        cur.skip_trivia();
        let Some(c) = cur.peek() else {
            break;
        };
        let line = cur.line;
        let tok = match c {
            '"' | '\'' => Tok::Str(cur.string(c)?),
            '@' => Tok::Asset(cur.delimited('@', "asset path")?),
            '<' => Tok::Path(cur.delimited('>', "path")?),
            '-' | '+' => Tok::Number(cur.number()?),
            c if c.is_ascii_digit() => Tok::Number(cur.number()?),
            '.' if cur.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => Tok::Number(cur.number()?),
            c if is_ident_start(c) => Tok::Ident(cur.take_while(is_ident_char)),
            c if PUNCT.contains(&c) => {
                cur.bump();
                Tok::Punct(c)
            }
            other => return Err(Error::syntax(line, format!("unexpected character '{other}'"))),
        };
        tokens.push(Token { tok, line });
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<Tok> {
        tokenize(text, 1).unwrap().into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn test_header() {
        let (version, rest) = split_header("#usda 1.0\n(\n)\n").unwrap();
        assert_eq!(version, "1.0");
        assert_eq!(rest, "(\n)\n");
        assert!(matches!(split_header("def Xform \"a\" {}"), Err(Error::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_property_tokens() {
        assert_eq!(
            toks("float inputs:intensity.timeSamples = { 1: -0.5, 11: 1e3 }"),
            vec![
                Tok::Ident("float".into()),
                Tok::Ident("inputs:intensity.timeSamples".into()),
                Tok::Punct('='),
                Tok::Punct('{'),
                Tok::Number("1".into()),
                Tok::Punct(':'),
                Tok::Number("-0.5".into()),
                Tok::Punct(','),
                Tok::Number("11".into()),
                Tok::Punct(':'),
                Tok::Number("1e3".into()),
                Tok::Punct('}'),
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            toks("@./ies/a.ies@ </lights/rect> \"a\\\"b\" 'c' -inf # comment\n"),
            vec![
                Tok::Asset("./ies/a.ies".into()),
                Tok::Path("/lights/rect".into()),
                Tok::Str("a\"b".into()),
                Tok::Str("c".into()),
                Tok::Number("-inf".into()),
            ]
        );
        assert_eq!(toks("\"\"\"multi\nline\"\"\""), vec![Tok::Str("multi\nline".into())]);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\n\n  b # c\n d", 2).unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(tokenize("\"open", 1), Err(Error::Syntax { line: 1, .. })));
        assert!(matches!(tokenize("a\n$", 1), Err(Error::Syntax { line: 2, .. })));
        assert!(matches!(tokenize("-foo", 1), Err(Error::Syntax { .. })));
    }
}
