use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use ahash::AHashMap as HashMap;
use log::info;
use std::fmt::Debug;
use std::hash::Hash;

/// Reference count assigned to the start symbol so it is never inlined.
const START_COUNT: usize = 2;

impl<T: Clone, N: Hash + Eq + Clone + Debug> Grammar<T, N> {
    /// Counts how often each nonterminal is referenced across all bodies.
    ///
    /// Every rule gets an entry, starting at zero. The start symbol is pinned
    /// at 2 regardless of references.
    pub fn reference_counts(&self) -> HashMap<N, usize> {
        let mut counts: HashMap<N, usize> =
            self.rules.keys().map(|lhs| (lhs.clone(), 0)).collect();

        for body in self.rules.values() {
            for id in body.iter().filter_map(Symbol::as_nonterminal) {
                *counts.entry(id.clone()).or_insert(0) += 1;
            }
        }
        counts.insert(self.start.clone(), START_COUNT);

        counts
    }

    /// Inlines rules until every rule other than the start is referenced at
    /// least twice.
    ///
    /// Victims are picked in insertion order, one per pass. Every inline
    /// preserves the expansion of the start symbol. Returns the number of
    /// rules that were inlined. A grammar with a reference cycle is rejected
    /// before anything is rewritten.
    pub fn reduce(&mut self) -> Result<usize, GrammarError<N>> {
        self.check_acyclic()?;

        let before = self.rules.len();
        let mut inlined = 0;
        while let Some(victim) = self.next_reducible() {
            self.inline(&victim)?;
            inlined += 1;
        }

        info!(
            "Reduced grammar from {before} to {} rules ({inlined} inlined)",
            self.rules.len()
        );
        Ok(inlined)
    }

    /// Returns true if no rule qualifies for inlining.
    pub fn is_irreducible(&self) -> bool {
        self.next_reducible().is_none()
    }

    /// The first rule, in insertion order, referenced at most once.
    fn next_reducible(&self) -> Option<N> {
        let counts = self.reference_counts();

        self.rules
            .keys()
            .find(|&lhs| *lhs != self.start && counts.get(lhs).copied().unwrap_or(0) <= 1)
            .cloned()
    }
}
