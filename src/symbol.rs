use std::fmt;

/// A symbol in a straight-line grammar.
///
/// Symbols are plain values: two symbols are equal when they carry equal
/// payloads, regardless of which rule body they live in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol<T, N> {
    /// A literal unit of the expanded sequence.
    Terminal(T),

    /// A reference to the rule of nonterminal `N`.
    Nonterminal(N),
}

impl<T, N> Symbol<T, N> {
    /// Returns true if this symbol refers to a rule.
    #[inline]
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }

    /// Returns true if this symbol is a literal value.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Returns the terminal value, if any.
    pub fn as_terminal(&self) -> Option<&T> {
        match self {
            Symbol::Terminal(value) => Some(value),
            Symbol::Nonterminal(_) => None,
        }
    }

    /// Returns the referenced nonterminal, if any.
    pub fn as_nonterminal(&self) -> Option<&N> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::Nonterminal(id) => Some(id),
        }
    }
}

impl<T, N: PartialEq> Symbol<T, N> {
    /// Checks whether this symbol is a reference to `id`.
    #[inline]
    pub fn matches(&self, id: &N) -> bool {
        matches!(self, Symbol::Nonterminal(other) if other == id)
    }
}

impl<T: fmt::Display, N: fmt::Display> fmt::Display for Symbol<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(value) => write!(f, "{value}"),
            Symbol::Nonterminal(id) => write!(f, "<{id}>"),
        }
    }
}
