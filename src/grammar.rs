use crate::error::GrammarError;
use crate::sequence::Sequence;
use crate::symbol::Symbol;
use ahash::{AHashMap as HashMap, RandomState};
use indexmap::IndexMap;
use log::debug;
use std::fmt;
use std::hash::Hash;

/// A straight-line grammar: every nonterminal owns exactly one rule body.
///
/// Rules are kept in insertion order, which makes display output and the
/// choice of inlining victims during reduction deterministic. Expansions are
/// memoized and the memo table is cleared by every mutating method.
pub struct Grammar<T, N> {
    /// The nonterminal whose expansion is the grammar's answer
    pub(crate) start: N,

    /// Rule bodies keyed by nonterminal, in insertion order
    pub(crate) rules: IndexMap<N, Sequence<T, N>, RandomState>,

    /// Memoized expansions, valid only until the next mutation
    pub(crate) cache: HashMap<N, Vec<T>>,
}

impl<T: Clone, N: Hash + Eq + Clone + fmt::Debug> Grammar<T, N> {
    /// Creates an empty grammar rooted at `start`.
    ///
    /// The start symbol has no rule until one is added with [`Grammar::add_rule`].
    pub fn new(start: N) -> Self {
        Self {
            start,
            rules: IndexMap::default(),
            cache: HashMap::new(),
        }
    }

    /// Returns the start symbol.
    pub fn start(&self) -> &N {
        &self.start
    }

    /// Changes the start symbol.
    pub fn set_start(&mut self, start: N) {
        self.start = start;
    }

    /// Number of rules, including the start rule.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule has been added.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns true if `id` has a rule.
    pub fn contains_rule(&self, id: &N) -> bool {
        self.rules.contains_key(id)
    }

    /// Returns the body of the rule for `id`.
    pub fn rule(&self, id: &N) -> Option<&Sequence<T, N>> {
        self.rules.get(id)
    }

    /// Returns the body of the rule for `id` for in-place editing.
    ///
    /// Clears the expansion cache, since the caller may change the body.
    pub fn rule_mut(&mut self, id: &N) -> Option<&mut Sequence<T, N>> {
        self.invalidate_cache();
        self.rules.get_mut(id)
    }

    /// Iterates over all rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = (&N, &Sequence<T, N>)> {
        self.rules.iter()
    }

    /// Installs the rule `lhs -> rhs`, returning the body it replaced.
    ///
    /// Overwriting an existing rule keeps its place in the insertion order.
    pub fn add_rule<S>(&mut self, lhs: N, rhs: S) -> Option<Sequence<T, N>>
    where
        S: Into<Sequence<T, N>>,
    {
        self.invalidate_cache();
        self.rules.insert(lhs, rhs.into())
    }

    /// Removes the rule for `id` and returns its body.
    ///
    /// Fails if `id` is undefined, is the start symbol, or is still
    /// referenced by another rule body.
    pub fn delete_rule(&mut self, id: &N) -> Result<Sequence<T, N>, GrammarError<N>> {
        if !self.rules.contains_key(id) {
            return Err(GrammarError::UndefinedNonterminal(id.clone()));
        }
        if *id == self.start {
            return Err(GrammarError::StartSymbol(id.clone()));
        }

        let count: usize = self
            .rules
            .iter()
            .filter(|(lhs, _)| *lhs != id)
            .map(|(_, body)| body.count_nonterminal(id))
            .sum();
        if count > 0 {
            return Err(GrammarError::StillReferenced {
                id: id.clone(),
                count,
            });
        }

        debug!("Deleting rule {id:?}");
        self.invalidate_cache();
        self.rules
            .shift_remove(id)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(id.clone()))
    }

    /// Checks the structural invariants of the grammar.
    ///
    /// The start symbol must have a rule, every body must be non-empty, every
    /// reference must point at a defined rule other than the start, and the
    /// reference graph must be acyclic.
    pub fn validate(&self) -> Result<(), GrammarError<N>> {
        if !self.rules.contains_key(&self.start) {
            return Err(GrammarError::UndefinedNonterminal(self.start.clone()));
        }

        for (lhs, body) in &self.rules {
            if body.is_empty() {
                return Err(GrammarError::EmptyRule(lhs.clone()));
            }

            for id in body.iter().filter_map(Symbol::as_nonterminal) {
                if *id == self.start {
                    return Err(GrammarError::StartReferenced(id.clone()));
                }
                if !self.rules.contains_key(id) {
                    return Err(GrammarError::UndefinedNonterminal(id.clone()));
                }
            }
        }

        self.check_acyclic()
    }

    /// Fails with [`GrammarError::Cycle`] if any rule can reach itself.
    pub(crate) fn check_acyclic(&self) -> Result<(), GrammarError<N>> {
        let mut marks = HashMap::new();
        for lhs in self.rules.keys() {
            self.visit_acyclic(lhs, &mut marks)?;
        }

        Ok(())
    }

    /// Depth-first search over references; `false` marks a rule on the
    /// current path, `true` a finished one.
    fn visit_acyclic<'a>(
        &'a self,
        id: &'a N,
        marks: &mut HashMap<&'a N, bool>,
    ) -> Result<(), GrammarError<N>> {
        match marks.get(id) {
            Some(true) => return Ok(()),
            Some(false) => return Err(GrammarError::Cycle(id.clone())),
            None => {}
        }

        marks.insert(id, false);
        if let Some(body) = self.rules.get(id) {
            for child in body.iter().filter_map(Symbol::as_nonterminal) {
                self.visit_acyclic(child, marks)?;
            }
        }
        marks.insert(id, true);

        Ok(())
    }

    /// Returns size statistics of the grammar.
    pub fn stats(&self) -> GrammarStats {
        GrammarStats {
            num_rules: self.rules.len(),
            grammar_symbols: self.rules.values().map(Sequence::len).sum(),
        }
    }

    /// Drops every memoized expansion.
    pub(crate) fn invalidate_cache(&mut self) {
        self.cache.clear();
    }
}

impl<T: Clone> Default for Grammar<T, String> {
    /// An empty grammar rooted at `"*"`.
    fn default() -> Self {
        Self::new("*".to_string())
    }
}

impl<T: fmt::Display, N: fmt::Display> fmt::Display for Grammar<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start: {}", self.start)?;
        for (lhs, rhs) in &self.rules {
            writeln!(f, "{lhs} :> {rhs}")?;
        }
        Ok(())
    }
}

impl<T: fmt::Debug, N: fmt::Debug> fmt::Debug for Grammar<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start)
            .field("rules", &self.rules)
            .finish()
    }
}

/// Size statistics of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrammarStats {
    /// Number of rules, including the start rule
    pub num_rules: usize,
    /// Total symbols across all rule bodies
    pub grammar_symbols: usize,
}

impl GrammarStats {
    /// Returns the grammar size as a percentage of `input_length`.
    pub fn compression_ratio(&self, input_length: usize) -> f64 {
        if input_length == 0 {
            0.0
        } else {
            (self.grammar_symbols as f64 / input_length as f64) * 100.0
        }
    }
}
