use peekmore::{PeekMore, PeekMoreIterator};
use std::collections::HashMap;
use std::str::Chars;
use substring::Substring;

use crate::error::{Diagnostics, ScanError};
use crate::token::{Location, Token, TokenLiteral, Type};

fn keywords() -> HashMap<&'static str, Type> {
    HashMap::from([
        ("and", Type::And),
        ("break", Type::Break),
        ("class", Type::Class),
        ("else", Type::Else),
        ("false", Type::False),
        ("for", Type::For),
        ("fun", Type::Fun),
        ("if", Type::If),
        ("nil", Type::Nil),
        ("or", Type::Or),
        ("print", Type::Print),
        ("return", Type::Return),
        ("super", Type::Super),
        ("this", Type::This),
        ("true", Type::True),
        ("var", Type::Var),
        ("while", Type::While),
    ])
}

/// Turns raw source text into a flat token stream, reporting (but not
/// halting on) lexical errors so a single run can surface more than one
/// bad character or unterminated string.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    keywords: HashMap<&'static str, Type>,

    tokens: Vec<Token>,
    start: usize,
    current: usize,
    length: usize,
    line: usize,
    column: usize,
    start_column: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            keywords: keywords(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            length: source.chars().count(),
            line: 1,
            column: 1,
            start_column: 1,
        }
    }

    pub fn scan_tokens(mut self, diagnostics: &Diagnostics) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_column = self.column;
            self.scan_token(diagnostics);
        }

        self.tokens.push(Token::new(Type::EOF, String::new(), None, Location::new(self.line, self.column)));
        self.tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.length
    }

    fn advance(&mut self) -> char {
        let c = self.chars.next().expect("advance() called past end of source");
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.is_at_end() {
            return false;
        }
        if self.chars.peek() != Some(&expected) {
            return false;
        }
        self.advance();
        true
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&mut self) -> Option<char> {
        self.chars.peek_nth(1).copied()
    }

    fn lexeme(&self) -> String {
        self.source.substring(self.start, self.current).to_string()
    }

    fn add_token(&mut self, r#type: Type) {
        self.add_token_literal(r#type, None);
    }

    fn add_token_literal(&mut self, r#type: Type, literal: Option<TokenLiteral>) {
        let lexeme = self.lexeme();
        self.tokens.push(Token::new(r#type, lexeme, literal, Location::new(self.line, self.start_column)));
    }

    fn scan_token(&mut self, diagnostics: &Diagnostics) {
        let c = self.advance();
        match c {
            '(' => self.add_token(Type::LeftParen),
            ')' => self.add_token(Type::RightParen),
            '{' => self.add_token(Type::LeftBrace),
            '}' => self.add_token(Type::RightBrace),
            ',' => self.add_token(Type::Comma),
            '.' => self.add_token(Type::Dot),
            '-' => self.add_token(Type::Minus),
            '+' => self.add_token(Type::Plus),
            ';' => self.add_token(Type::Semicolon),
            '*' => self.add_token(Type::Star),
            '?' => self.add_token(Type::Question),
            ':' => self.add_token(Type::Colon),

            '!' => {
                let t = if self.matches('=') { Type::BangEqual } else { Type::Bang };
                self.add_token(t);
            }
            '=' => {
                let t = if self.matches('=') { Type::EqualEqual } else { Type::Equal };
                self.add_token(t);
            }
            '<' => {
                let t = if self.matches('=') { Type::LessEqual } else { Type::Less };
                self.add_token(t);
            }
            '>' => {
                let t = if self.matches('=') { Type::GreaterEqual } else { Type::Greater };
                self.add_token(t);
            }

            '#' => self.line_comment(),
            '/' => {
                if self.matches('/') {
                    self.line_comment();
                } else {
                    self.add_token(Type::Slash);
                }
            }

            ' ' | '\r' | '\t' | '\n' => {}

            '"' | '\'' => self.string(c, diagnostics),

            _ if c.is_ascii_digit() => self.number(),
            _ if c.is_alphabetic() || c == '_' => self.identifier(),

            _ => diagnostics.report(&ScanError {
                line: self.line,
                column: self.start_column,
                message: format!("Unexpected character '{c}'."),
            }),
        }
    }

    fn line_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    /// `quote` is whichever of `"`/`'` opened the string; only that same
    /// character closes it.
    fn string(&mut self, quote: char, diagnostics: &Diagnostics) {
        while self.peek().is_some_and(|c| c != quote) {
            self.advance();
        }

        if self.is_at_end() {
            diagnostics.report(&ScanError {
                line: self.line,
                column: self.start_column,
                message: "Unterminated string.".to_string(),
            });
            return;
        }

        // The closing quote.
        self.advance();

        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_token_literal(Type::String, Some(TokenLiteral::Str(value)));
    }

    fn number(&mut self) {
        let mut is_float = false;

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = self.lexeme();
        if is_float {
            let value: f64 = text.parse().expect("scanned number lexeme must be valid float syntax");
            self.add_token_literal(Type::Number, Some(TokenLiteral::Float(value)));
        } else {
            // A digit-only lexeme still overflows `i64` past 19-ish
            // digits (`99999999999999999999`); the grammar places no
            // length limit on integer literals, so fall back to a
            // float rather than panic on otherwise-valid input.
            match text.parse::<i64>() {
                Ok(value) => self.add_token_literal(Type::Number, Some(TokenLiteral::Integer(value))),
                Err(_) => {
                    let value: f64 = text.parse().expect("digit-only lexeme must be valid float syntax");
                    self.add_token_literal(Type::Number, Some(TokenLiteral::Float(value)));
                }
            }
        }
    }

    fn identifier(&mut self) {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }

        let text = self.lexeme();
        let r#type = self.keywords.get(text.as_str()).copied().unwrap_or(Type::Identifier);
        self.add_token(r#type);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(source: &str) -> Vec<Type> {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new(source).scan_tokens(&diagnostics);
        assert!(!diagnostics.had_error(), "unexpected scan error in {source:?}");
        tokens.into_iter().map(|t| t.r#type).collect()
    }

    #[test]
    fn two_character_operators_are_recognized_with_one_lookahead() {
        assert_eq!(scan("!= == <= >= ! = < >"), vec![
            Type::BangEqual,
            Type::EqualEqual,
            Type::LessEqual,
            Type::GreaterEqual,
            Type::Bang,
            Type::Equal,
            Type::Less,
            Type::Greater,
            Type::EOF,
        ]);
    }

    #[test]
    fn integer_and_float_numbers_are_distinguished() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("1 1.5").scan_tokens(&diagnostics);
        assert_eq!(tokens[0].literal, Some(TokenLiteral::Integer(1)));
        assert_eq!(tokens[1].literal, Some(TokenLiteral::Float(1.5)));
    }

    #[test]
    fn an_integer_literal_too_large_for_i64_falls_back_to_a_float_instead_of_panicking() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("99999999999999999999").scan_tokens(&diagnostics);
        assert!(!diagnostics.had_error());
        assert_eq!(tokens[0].literal, Some(TokenLiteral::Float(99999999999999999999.0)));
    }

    #[test]
    fn both_quote_styles_close_a_string() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new(r#""double" 'single'"#).scan_tokens(&diagnostics);
        assert_eq!(tokens[0].literal, Some(TokenLiteral::Str("double".to_string())));
        assert_eq!(tokens[1].literal, Some(TokenLiteral::Str("single".to_string())));
    }

    #[test]
    fn unterminated_string_reports_an_error_and_emits_no_token() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("\"unterminated").scan_tokens(&diagnostics);
        assert!(diagnostics.had_error());
        assert_eq!(tokens, vec![tokens[0].clone()]);
        assert_eq!(tokens[0].r#type, Type::EOF);
    }

    #[test]
    fn hash_and_slash_slash_both_start_a_line_comment() {
        assert_eq!(scan("1 // comment\n# another comment\n2"), vec![Type::Number, Type::Number, Type::EOF]);
    }

    #[test]
    fn identifiers_match_the_keyword_table_exactly() {
        assert_eq!(scan("classy class"), vec![Type::Identifier, Type::Class, Type::EOF]);
    }

    #[test]
    fn unexpected_character_is_reported_but_scanning_continues() {
        let diagnostics = Diagnostics::new();
        let tokens = Scanner::new("1 @ 2").scan_tokens(&diagnostics);
        assert!(diagnostics.had_error());
        assert_eq!(tokens.iter().map(|t| t.r#type).collect::<Vec<_>>(), vec![Type::Number, Type::Number, Type::EOF]);
    }
}
