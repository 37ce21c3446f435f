use serde::Serialize;

/// Kind of a lexed token.
///
/// Keyword kinds come first because the lexer tries them before the generic
/// literal and identifier patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Keywords
    Ip,
    Mask,
    Hosts,
    Name,

    // Literals
    IpAddress,  // 192.168.1.0
    SubnetMask, // /24
    Number,     // 50

    // Network name (only valid right after NAME)
    Identifier,

    // Punctuation
    Comma,
    StatementEnd, // ;
}

impl TokenKind {
    /// Maps a whole word to its keyword kind, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "IP" => Some(TokenKind::Ip),
            "MASK" => Some(TokenKind::Mask),
            "HOSTS" => Some(TokenKind::Hosts),
            "NAME" => Some(TokenKind::Name),
            _ => None,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Ip => "IP",
            TokenKind::Mask => "MASK",
            TokenKind::Hosts => "HOSTS",
            TokenKind::Name => "NAME",
            TokenKind::IpAddress => "IP_ADDRESS",
            TokenKind::SubnetMask => "SUBNET_MASK",
            TokenKind::Number => "NUMBER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Comma => "COMMA",
            TokenKind::StatementEnd => "STATEMENT_END",
        };
        f.pad(name)
    }
}

/// Source position: `line` is 1-based, `col` is 0-based within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

/// A token with its source text and position. Never mutated after lexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, col: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            span: Span { line, col },
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.lexeme)
    }
}
