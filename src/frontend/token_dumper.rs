use crate::frontend::token::{Token, TokenKind};

pub struct TokenDumper {
    pub color: bool,
    pub show_debug_repr: bool, // if false, prints only kind and lexeme
}

impl Default for TokenDumper {
    fn default() -> Self {
        Self {
            color: true,
            show_debug_repr: true,
        }
    }
}

impl TokenDumper {
    // ANSI colors
    const RESET: &'static str = "\x1b[0m";
    const DIM: &'static str = "\x1b[2m";
    const GRN: &'static str = "\x1b[32m";
    const YEL: &'static str = "\x1b[33m";
    const CYN: &'static str = "\x1b[36m";
    const MAG: &'static str = "\x1b[35m";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_color(mut self) -> Self {
        self.color = false;
        self
    }

    pub fn pretty(mut self) -> Self {
        self.show_debug_repr = false;
        self
    }

    pub fn dump(&self, tokens: &[Token]) {
        print!("{}", self.render(tokens));
    }

    pub fn render(&self, tokens: &[Token]) -> String {
        tokens.iter().map(|t| self.render_one(t)).collect()
    }

    fn render_one(&self, t: &Token) -> String {
        let colr = if self.color { Self::color(t.kind) } else { "" };
        let reset = if self.color { Self::RESET } else { "" };

        if self.show_debug_repr {
            format!(
                "[{:02}:{:02}] {}{:<8} {:?}{}\n",
                t.span.line,
                t.span.col,
                colr,
                Self::class(t.kind),
                t,
                reset
            )
        } else {
            format!(
                "[{:02}:{:02}] {}{:<13} {}{}\n",
                t.span.line, t.span.col, colr, t.kind, t.lexeme, reset
            )
        }
    }

    fn class(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Ip | Mask | Hosts | Name => "KEYWORD",
            IpAddress | SubnetMask => "ADDR",
            Number => "INT",
            Identifier => "IDENT",
            Comma | StatementEnd => "PUNCT",
        }
    }

    fn color(kind: TokenKind) -> &'static str {
        use TokenKind::*;
        match kind {
            Ip | Mask | Hosts | Name => Self::MAG,
            IpAddress | SubnetMask => Self::GRN,
            Number => Self::CYN,
            Identifier => Self::YEL,
            Comma | StatementEnd => Self::DIM,
        }
    }
}
