use thiserror::Error;

/// Errors reported by grammar operations.
///
/// Every operation checks its preconditions before touching the grammar, so
/// an error always leaves the grammar exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError<N> {
    #[error("nonterminal {0:?} has no rule")]
    UndefinedNonterminal(N),

    #[error("the start symbol {0:?} cannot be inlined or deleted")]
    StartSymbol(N),

    #[error("cannot merge nonterminal {0:?} into itself")]
    SelfMerge(N),

    #[error("reference cycle through nonterminal {0:?}")]
    Cycle(N),

    #[error("nonterminal {id:?} is still referenced {count} time(s)")]
    StillReferenced { id: N, count: usize },

    #[error("rule for {0:?} has an empty body")]
    EmptyRule(N),

    #[error("the start symbol {0:?} is referenced by a rule body")]
    StartReferenced(N),
}
