use crate::frontend::token::Span;

/// One parsed network statement:
///
/// ```text
/// IP <ipv4> MASK /<n> HOSTS <h1>[,<h2>...] [NAME <ident>] ;
/// ```
///
/// The parser guarantees at least one host count was read. Whether the
/// address, prefix and host counts make sense is checked later by the
/// semantic analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// 1-based position among the blocks the parser accepted.
    pub ordinal: usize,
    pub ip_address: String,
    /// CIDR literal including the slash, e.g. `/24`.
    pub subnet_mask: String,
    pub num_hosts: Vec<u32>,
    pub name: Option<String>,
    /// Location of the leading `IP` keyword.
    pub span: Span,
}

impl Block {
    /// Name used for this block downstream: the declared name, or
    /// `block<ordinal>` for anonymous blocks.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("block{}", self.ordinal),
        }
    }
}
