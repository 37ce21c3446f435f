use tracing::{debug, warn};

use crate::frontend::parser_error::ParserError;
use crate::frontend::token::{Span, Token, TokenKind};
use crate::lang::block::Block;
use crate::lang::tree::TreeNode;

/// Everything one parse produces.
///
/// `blocks[i]` and `trees[i]` describe the same statement. Statements that
/// failed to parse appear in neither list, only as an entry in `errors`.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    pub blocks: Vec<Block>,
    pub trees: Vec<TreeNode>,
    pub errors: Vec<ParserError>,
}

/// Recursive-descent parser for network statements.
///
/// ```text
/// block := IP IP_ADDRESS MASK SUBNET_MASK HOSTS hosts [NAME IDENTIFIER] ';'
/// hosts := NUMBER (',' NUMBER)*
/// ```
///
/// The grammar is LL(1): every clause is consumed with [`Parser::expect`].
/// On a syntax error the parser records it, skips ahead to the next `IP`
/// keyword and carries on, so one bad statement does not hide the rest.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Span of the most recently consumed token.
    ///
    /// Used to locate errors that happen at end of input.
    last_span: Option<Span>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            last_span: None,
        }
    }

    /// Returns the current token without consuming it.
    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    /// Advances by one token and returns it.
    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        if let Some(t) = token {
            self.last_span = Some(t.span);
        }
        self.pos += 1;
        token
    }

    /// Consumes a token of kind `kind`, or fails with what was found instead.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParserError> {
        match self.current() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            Some(token) => Err(ParserError::UnexpectedToken {
                expected: kind,
                found: token.kind,
                lexeme: token.lexeme.clone(),
                line: token.span.line,
                col: token.span.col,
            }),
            None => {
                let span = self.last_span.unwrap_or(Span { line: 1, col: 0 });
                Err(ParserError::UnexpectedEof {
                    expected: kind,
                    line: span.line,
                    col: span.col,
                })
            }
        }
    }

    /// Skips tokens up to the next `IP` keyword or end of input.
    fn synchronize(&mut self) {
        while let Some(kind) = self.peek_kind() {
            if kind == TokenKind::Ip {
                break;
            }
            self.advance();
        }
    }

    /// Parses every statement in the token stream.
    pub fn parse(&mut self) -> ParseOutput {
        let mut out = ParseOutput::default();

        while self.current().is_some() {
            let ordinal = out.blocks.len() + 1;
            match self.parse_block(ordinal) {
                Ok((block, tree)) => {
                    out.blocks.push(block);
                    out.trees.push(tree);
                }
                Err(e) => {
                    warn!(error = %e, "syntax error, resynchronizing at next IP");
                    out.errors.push(e);
                    self.synchronize();
                }
            }
        }

        debug!(
            blocks = out.blocks.len(),
            errors = out.errors.len(),
            "parsing finished"
        );

        out
    }

    /// Parses one statement into its block record and derivation tree.
    fn parse_block(&mut self, ordinal: usize) -> Result<(Block, TreeNode), ParserError> {
        let mut children = Vec::new();

        let ip_kw = self.expect(TokenKind::Ip)?;
        children.push(leaf(&ip_kw));
        let ip = self.expect(TokenKind::IpAddress)?;
        children.push(leaf(&ip));

        children.push(leaf(&self.expect(TokenKind::Mask)?));
        let mask = self.expect(TokenKind::SubnetMask)?;
        children.push(leaf(&mask));

        children.push(leaf(&self.expect(TokenKind::Hosts)?));
        let (num_hosts, host_leaves) = self.parse_hosts()?;
        children.push(TreeNode::interior("HOSTS_LIST", host_leaves));

        let mut name = None;
        if self.peek_kind() == Some(TokenKind::Name) {
            children.push(leaf(&self.expect(TokenKind::Name)?));
            let ident = self.expect(TokenKind::Identifier)?;
            children.push(leaf(&ident));
            name = Some(ident.lexeme);
        }

        children.push(leaf(&self.expect(TokenKind::StatementEnd)?));

        let label = name.clone().unwrap_or_else(|| "BLOCK".to_string());
        let block = Block {
            ordinal,
            ip_address: ip.lexeme,
            subnet_mask: mask.lexeme,
            num_hosts,
            name,
            span: ip_kw.span,
        };

        Ok((block, TreeNode::interior(label, children)))
    }

    /// Parses `NUMBER (',' NUMBER)*`.
    fn parse_hosts(&mut self) -> Result<(Vec<u32>, Vec<TreeNode>), ParserError> {
        let mut hosts = Vec::new();
        let mut leaves = Vec::new();

        let first = self.expect(TokenKind::Number)?;
        hosts.push(host_count(&first)?);
        leaves.push(leaf(&first));

        while self.peek_kind() == Some(TokenKind::Comma) {
            leaves.push(leaf(&self.expect(TokenKind::Comma)?));
            let next = self.expect(TokenKind::Number)?;
            hosts.push(host_count(&next)?);
            leaves.push(leaf(&next));
        }

        Ok((hosts, leaves))
    }
}

fn leaf(token: &Token) -> TreeNode {
    TreeNode::leaf(token.kind, token.lexeme.clone())
}

fn host_count(token: &Token) -> Result<u32, ParserError> {
    token
        .lexeme
        .parse::<u32>()
        .map_err(|_| ParserError::HostCountOutOfRange {
            lexeme: token.lexeme.clone(),
            line: token.span.line,
            col: token.span.col,
        })
}
