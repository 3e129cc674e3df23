use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::sequence::Sequence;
use crate::symbol::Symbol;
use ahash::AHashSet as HashSet;
use log::debug;
use std::fmt::Debug;
use std::hash::Hash;

impl<T: Clone, N: Hash + Eq + Clone + Debug> Grammar<T, N> {
    /// Replaces every reference to `id`, in every rule body, by a copy of
    /// `replacement`.
    ///
    /// The rule for `id` itself is left alone. Returns the number of
    /// references that were replaced.
    pub fn substitute(&mut self, id: &N, replacement: &[Symbol<T, N>]) -> usize {
        self.invalidate_cache();

        self.rules
            .values_mut()
            .map(|body| substitute_in(body, id, replacement))
            .sum()
    }

    /// Removes the rule for `id` and splices its body into every place that
    /// referenced it.
    ///
    /// Returns the number of call sites that were rewritten.
    pub fn inline(&mut self, id: &N) -> Result<usize, GrammarError<N>> {
        let body = self
            .rules
            .get(id)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(id.clone()))?;
        if *id == self.start {
            return Err(GrammarError::StartSymbol(id.clone()));
        }
        if body.contains_nonterminal(id) {
            return Err(GrammarError::Cycle(id.clone()));
        }

        let replacement = body.to_vec();
        self.rules.shift_remove(id);
        let sites = self.substitute(id, &replacement);

        debug!("Inlined rule {id:?} into {sites} site(s)");
        Ok(sites)
    }

    /// Merges `source` into `dest`: every reference to `source` is redirected
    /// to `dest` and the rule for `source` is removed.
    ///
    /// Only meaningful when both nonterminals expand to the same terminals.
    /// References to `source` inside the body of `dest` are replaced by a
    /// copy of `source`'s body instead, so `dest` never refers to itself. If
    /// `source` was the start symbol, `dest` becomes the start symbol.
    ///
    /// A merge that would leave the start symbol referenced from another
    /// rule is rejected with [`GrammarError::StartReferenced`].
    pub fn replace(&mut self, source: &N, dest: &N) -> Result<(), GrammarError<N>> {
        if source == dest {
            return Err(GrammarError::SelfMerge(source.clone()));
        }
        let source_body = self
            .rules
            .get(source)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(source.clone()))?;
        let dest_body = self
            .rules
            .get(dest)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(dest.clone()))?;
        if self.merge_would_cycle(source, dest) {
            return Err(GrammarError::Cycle(dest.clone()));
        }
        // Whichever of the two ends up as the start must stay unreferenced
        let start_referenced = if *dest == self.start {
            self.referenced_outside(source, dest)
        } else if *source == self.start {
            self.referenced_outside(dest, source)
        } else {
            false
        };
        if start_referenced {
            return Err(GrammarError::StartReferenced(dest.clone()));
        }

        let needs_repair = dest_body.contains_nonterminal(source);
        let source_symbols = source_body.to_vec();

        if needs_repair {
            if let Some(dest_body) = self.rules.get_mut(dest) {
                let repaired = substitute_in(dest_body, source, &source_symbols);
                debug!("Copied the body of {source:?} into {dest:?} at {repaired} site(s)");
            }
        }

        self.rules.shift_remove(source);
        let sites = self.substitute(source, &[Symbol::Nonterminal(dest.clone())]);

        if self.start == *source {
            self.start = dest.clone();
        }
        self.invalidate_cache();

        debug!("Merged rule {source:?} into {dest:?}, redirecting {sites} reference(s)");
        Ok(())
    }

    /// Returns true if a body other than the one of `skip` refers to `id`.
    fn referenced_outside(&self, id: &N, skip: &N) -> bool {
        self.rules
            .iter()
            .any(|(lhs, body)| lhs != skip && body.contains_nonterminal(id))
    }

    /// Checks whether merging `source` into `dest` would close a reference
    /// cycle through `dest`.
    ///
    /// After the merge, the children of `dest` are its current children with
    /// `source` replaced by the children of `source`. A cycle appears exactly
    /// when one of those can reach `source` (now redirected to `dest`) or
    /// `dest` itself.
    fn merge_would_cycle(&self, source: &N, dest: &N) -> bool {
        let mut stack: Vec<&N> = Vec::new();

        if let Some(dest_body) = self.rules.get(dest) {
            for child in dest_body.iter().filter_map(Symbol::as_nonterminal) {
                if child == source {
                    if let Some(source_body) = self.rules.get(source) {
                        stack.extend(source_body.iter().filter_map(Symbol::as_nonterminal));
                    }
                } else {
                    stack.push(child);
                }
            }
        }

        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == source || id == dest {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(body) = self.rules.get(id) {
                stack.extend(body.iter().filter_map(Symbol::as_nonterminal));
            }
        }

        false
    }
}

/// Replaces each reference to `id` in `body` by a fresh copy of `replacement`.
fn substitute_in<T: Clone, N: Clone + PartialEq>(
    body: &mut Sequence<T, N>,
    id: &N,
    replacement: &[Symbol<T, N>],
) -> usize {
    let sites = body.positions_where(|symbol| symbol.matches(id));
    for &site in &sites {
        body.replace_at(site, replacement.iter().cloned());
    }
    sites.len()
}
