//! # Straight-line grammar rewriting
//!
//! A straight-line grammar is a context-free grammar in which every
//! nonterminal has exactly one rule. It derives exactly one string, which
//! makes it a compressed representation of that string: the data structure
//! behind grammar-based codes such as Sequitur and RePair.
//!
//! This crate provides the rewriting engine for such grammars:
//! - rule bodies with O(k) splicing ([`Sequence`])
//! - substitution, inlining, and cycle-safe merging of nonterminals
//! - memoized expansion back to the terminal string
//! - reduction to an irreducible grammar, in which every rule other than the
//!   start rule is referenced at least twice
//!
//! ## Example
//!
//! ```
//! use slg_rewrite::{Grammar, Symbol};
//!
//! let mut grammar = Grammar::new("S");
//! grammar.add_rule("S", vec![Symbol::Nonterminal("B")]);
//! grammar.add_rule("B", vec![Symbol::Nonterminal("A"), Symbol::Nonterminal("A")]);
//! grammar.add_rule("A", vec![Symbol::Terminal('a'), Symbol::Terminal('b')]);
//!
//! assert_eq!(grammar.expand_start().unwrap(), &['a', 'b', 'a', 'b']);
//!
//! // B is used once, so it gets inlined; A is shared and stays
//! assert_eq!(grammar.reduce().unwrap(), 1);
//! assert_eq!(grammar.len(), 2);
//! assert_eq!(grammar.expand_start().unwrap(), &['a', 'b', 'a', 'b']);
//! ```
//!
//! The engine is single-threaded: every mutating operation takes `&mut self`
//! and clears the expansion cache.

mod error;
mod expand;
mod grammar;
mod iter;
mod reduce;
mod rewrite;
mod sequence;
mod symbol;

#[cfg(test)]
mod tests;

pub use error::GrammarError;
pub use grammar::{Grammar, GrammarStats};
pub use iter::GrammarIter;
pub use sequence::{Position, Positions, Sequence, SequenceIter};
pub use symbol::Symbol;
