use crate::grammar::Grammar;
use crate::sequence::{Position, Sequence};
use crate::symbol::Symbol;
use std::fmt::Debug;
use std::hash::Hash;

/// Iterator that walks the expansion of the start symbol lazily.
///
/// Uses a stack of rule bodies to track expansion depth, so nothing is
/// materialized and the expansion cache is left alone. Iteration stops early
/// at a reference to an undefined rule and never ends on a cyclic grammar.
pub struct GrammarIter<'a, T, N> {
    grammar: &'a Grammar<T, N>,
    stack: Vec<Frame<'a, T, N>>,
}

/// A rule body being walked, with the next position to visit.
struct Frame<'a, T, N> {
    body: &'a Sequence<T, N>,
    next: Option<Position>,
}

impl<'a, T, N: Hash + Eq> GrammarIter<'a, T, N> {
    pub(crate) fn new(grammar: &'a Grammar<T, N>) -> Self {
        let stack = grammar
            .rules
            .get(&grammar.start)
            .map(|body| Frame {
                body,
                next: body.first(),
            })
            .into_iter()
            .collect();

        Self { grammar, stack }
    }
}

impl<'a, T, N: Hash + Eq> Iterator for GrammarIter<'a, T, N> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(position) = frame.next else {
                // End of rule, resume the parent
                self.stack.pop();
                continue;
            };

            let body = frame.body;
            frame.next = body.next(position);

            match body.get(position)? {
                Symbol::Terminal(value) => return Some(value),
                Symbol::Nonterminal(id) => {
                    let child = self.grammar.rules.get(id)?;
                    self.stack.push(Frame {
                        body: child,
                        next: child.first(),
                    });
                }
            }
        }
    }
}

impl<T: Clone, N: Hash + Eq + Clone + Debug> Grammar<T, N> {
    /// Returns an iterator over the expansion of the start symbol.
    pub fn iter(&self) -> GrammarIter<'_, T, N> {
        GrammarIter::new(self)
    }
}

impl<'a, T: Clone, N: Hash + Eq + Clone + Debug> IntoIterator for &'a Grammar<T, N> {
    type Item = &'a T;
    type IntoIter = GrammarIter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
