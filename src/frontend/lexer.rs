use thiserror::Error;
use tracing::debug;

use crate::frontend::token::{Token, TokenKind};

/// A lexical error. Lexing never stops on one of these: the offending
/// fragment is skipped and scanning resumes after it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    /// Text that matches no token pattern.
    #[error("{line}:{col}: unrecognized token '{text}'")]
    Unrecognized { text: String, line: usize, col: usize },

    /// A well-formed identifier that does not directly follow `NAME`.
    #[error("{line}:{col}: unrecognized token '{text}' (identifiers are only allowed after NAME)")]
    IdentifierOutsideName { text: String, line: usize, col: usize },
}

impl LexerError {
    pub fn line(&self) -> usize {
        match self {
            LexerError::Unrecognized { line, .. } | LexerError::IdentifierOutsideName { line, .. } => {
                *line
            }
        }
    }

    pub fn col(&self) -> usize {
        match self {
            LexerError::Unrecognized { col, .. } | LexerError::IdentifierOutsideName { col, .. } => {
                *col
            }
        }
    }
}

/// Hand-written scanner for the addressing language.
///
/// Patterns are tried in a fixed order at each position: keywords, dotted
/// IPv4 literal, `/n` prefix, plain number, identifier, `,` and `;`.
/// Whitespace separates tokens and is never emitted.
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    /// Kind of the last token that was accepted into the output.
    last_kind: Option<TokenKind>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 0,
            last_kind: None,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current();
        if ch == Some('\n') {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        self.pos += 1;
        ch
    }

    fn take(&mut self, len: usize) -> String {
        let mut text = String::with_capacity(len);
        for _ in 0..len {
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }
        text
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Number of ASCII digits starting `offset` chars ahead.
    fn digits_at(&self, offset: usize) -> usize {
        let mut n = 0;
        while self
            .peek_at(offset + n)
            .map(|c| c.is_ascii_digit())
            .unwrap_or(false)
        {
            n += 1;
        }
        n
    }

    /// Length of a `d+.d+.d+.d+` literal at the cursor, if there is one.
    fn ip_address_len(&self) -> Option<usize> {
        let mut len = 0;
        for group in 0..4 {
            if group > 0 {
                if self.peek_at(len) != Some('.') {
                    return None;
                }
                len += 1;
            }
            let digits = self.digits_at(len);
            if digits == 0 {
                return None;
            }
            len += digits;
        }
        Some(len)
    }

    fn word_len(&self) -> usize {
        let mut n = 0;
        while let Some(ch) = self.peek_at(n) {
            let ok = if n == 0 {
                ch.is_ascii_alphabetic() || ch == '_'
            } else {
                ch.is_ascii_alphanumeric() || ch == '_'
            };
            if !ok {
                break;
            }
            n += 1;
        }
        n
    }

    /// Length of the whitespace-delimited fragment at the cursor.
    fn fragment_len(&self) -> usize {
        let mut n = 0;
        while let Some(ch) = self.peek_at(n) {
            if ch.is_whitespace() {
                break;
            }
            n += 1;
        }
        n
    }

    /// Matches one token pattern at the cursor, returning its kind and length.
    fn match_pattern(&self) -> Option<(TokenKind, usize)> {
        let ch = self.current()?;

        if ch.is_ascii_alphabetic() || ch == '_' {
            let len = self.word_len();
            let word: String = self.source[self.pos..self.pos + len].iter().collect();
            return Some(match TokenKind::keyword(&word) {
                Some(kind) => (kind, len),
                None => (TokenKind::Identifier, len),
            });
        }

        if ch.is_ascii_digit() {
            if let Some(len) = self.ip_address_len() {
                return Some((TokenKind::IpAddress, len));
            }
            return Some((TokenKind::Number, self.digits_at(0)));
        }

        match ch {
            '/' => {
                let digits = self.digits_at(1);
                if digits == 0 {
                    None
                } else {
                    Some((TokenKind::SubnetMask, digits + 1))
                }
            }
            ',' => Some((TokenKind::Comma, 1)),
            ';' => Some((TokenKind::StatementEnd, 1)),
            _ => None,
        }
    }

    /// Scans the whole source.
    ///
    /// Returns every accepted token in order together with every lexical
    /// error in order. An identifier is accepted only when the previously
    /// accepted token was `NAME`.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            self.skip_whitespace();
            if self.current().is_none() {
                break;
            }

            let line = self.line;
            let col = self.col;

            match self.match_pattern() {
                Some((kind, len)) => {
                    let text = self.take(len);

                    if kind == TokenKind::Identifier && self.last_kind != Some(TokenKind::Name) {
                        errors.push(LexerError::IdentifierOutsideName { text, line, col });
                        continue;
                    }

                    self.last_kind = Some(kind);
                    tokens.push(Token::new(kind, text, line, col));
                }
                None => {
                    let len = self.fragment_len();
                    let text = self.take(len);
                    errors.push(LexerError::Unrecognized { text, line, col });
                }
            }
        }

        debug!(
            tokens = tokens.len(),
            errors = errors.len(),
            "lexing finished"
        );

        (tokens, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let (tokens, errors) = lexer.tokenize();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn lex(source: &str) -> (Vec<Token>, Vec<LexerError>) {
        Lexer::new(source).tokenize()
    }

    #[test]
    fn test_full_statement() {
        let t = kinds("IP 192.168.1.0 MASK /24 HOSTS 50,20 NAME Oficina;");
        assert_eq!(
            t,
            vec![
                TokenKind::Ip,
                TokenKind::IpAddress,
                TokenKind::Mask,
                TokenKind::SubnetMask,
                TokenKind::Hosts,
                TokenKind::Number,
                TokenKind::Comma,
                TokenKind::Number,
                TokenKind::Name,
                TokenKind::Identifier,
                TokenKind::StatementEnd,
            ]
        );
    }

    #[test]
    fn test_lexemes_are_kept() {
        let (tokens, _) = lex("IP 10.0.0.0 MASK /8");
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["IP", "10.0.0.0", "MASK", "/8"]);
    }

    #[test]
    fn test_keyword_vs_identifier_boundary() {
        // "IPX" is one word, so it is an identifier, not IP + X.
        let (tokens, errors) = lex("NAME IPX");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].lexeme, "IPX");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_identifier_only_after_name() {
        // Identifiers are restricted to network names. This mirrors the
        // language as shipped and is kept deliberately.
        let (tokens, errors) = lex("NAME Oficina");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert!(errors.is_empty());

        let (tokens, errors) = lex("HOSTS Oficina");
        assert_eq!(tokens.len(), 1);
        assert_eq!(
            errors,
            vec![LexerError::IdentifierOutsideName {
                text: "Oficina".to_string(),
                line: 1,
                col: 6,
            }]
        );
    }

    #[test]
    fn test_rejected_identifier_does_not_update_gate() {
        // The second word follows a rejected identifier, not NAME.
        let (tokens, errors) = lex("IP foo bar");
        assert_eq!(tokens.len(), 1);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_identifier_after_identifier_is_rejected() {
        let (tokens, errors) = lex("NAME Sala Norte");
        assert_eq!(tokens.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("Norte"));
    }

    #[test]
    fn test_unrecognized_fragment_is_skipped() {
        let (tokens, errors) = lex("IP @@bad MASK /24");
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Ip, TokenKind::Mask, TokenKind::SubnetMask]
        );
        assert_eq!(
            errors,
            vec![LexerError::Unrecognized {
                text: "@@bad".to_string(),
                line: 1,
                col: 3,
            }]
        );
    }

    #[test]
    fn test_partial_ip_falls_back_to_number() {
        // "192.168" is not an address: NUMBER then an unrecognized ".168".
        let (tokens, errors) = lex("192.168");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, "192");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], LexerError::Unrecognized { text, .. } if text == ".168"));
    }

    #[test]
    fn test_slash_without_digits_is_error() {
        let (tokens, errors) = lex("MASK /x");
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&errors[0], LexerError::Unrecognized { text, .. } if text == "/x"));
    }

    #[test]
    fn test_spans_are_line_1_based_col_0_based() {
        let (tokens, _) = lex("IP 10.0.0.0\n  MASK /8;");
        let at: Vec<(usize, usize)> = tokens.iter().map(|t| (t.span.line, t.span.col)).collect();
        assert_eq!(at, vec![(1, 0), (1, 3), (2, 2), (2, 7), (2, 9)]);
    }

    #[test]
    fn test_errors_and_tokens_across_lines() {
        let (tokens, errors) = lex("IP 1.2.3.4 ;\n# x\nHOSTS 3;");
        assert_eq!(tokens.len(), 6);
        assert_eq!(errors.len(), 2);
        assert_eq!((errors[0].line(), errors[0].col()), (2, 0));
        assert_eq!((errors[1].line(), errors[1].col()), (2, 2));
    }

    #[test]
    fn test_empty_source() {
        let (tokens, errors) = lex("   \n\t ");
        assert!(tokens.is_empty());
        assert!(errors.is_empty());
    }
}
