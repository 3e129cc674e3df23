use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::symbol::Symbol;
use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use log::trace;
use std::fmt::Debug;
use std::hash::Hash;

impl<T: Clone, N: Hash + Eq + Clone + Debug> Grammar<T, N> {
    /// Returns the terminals that `id` expands to.
    ///
    /// Results are memoized per nonterminal until the next mutation, so the
    /// work is proportional to the total size of the rule bodies rather than
    /// to the length of the expansion. Rule bodies are not modified.
    pub fn expand(&mut self, id: &N) -> Result<&[T], GrammarError<N>> {
        let mut in_progress = HashSet::new();
        self.expand_into_cache(id, &mut in_progress)?;

        self.cache
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(id.clone()))
    }

    /// Returns the terminals that the start symbol expands to.
    pub fn expand_start(&mut self) -> Result<&[T], GrammarError<N>> {
        let start = self.start.clone();
        self.expand(&start)
    }

    /// Expands `id` on a working copy of its body: a single pass swaps each
    /// reference for the (memoized) expansion of its rule, resuming after the
    /// splice so spliced terminals are never rescanned.
    fn expand_into_cache(
        &mut self,
        id: &N,
        in_progress: &mut HashSet<N>,
    ) -> Result<(), GrammarError<N>> {
        if self.cache.contains_key(id) {
            return Ok(());
        }

        let mut working = self
            .rules
            .get(id)
            .cloned()
            .ok_or_else(|| GrammarError::UndefinedNonterminal(id.clone()))?;
        if !in_progress.insert(id.clone()) {
            return Err(GrammarError::Cycle(id.clone()));
        }
        trace!("Expanding rule {id:?}");

        let mut cursor = working.first();
        while let Some(position) = cursor {
            cursor = working.next(position);
            let child = match working.get(position) {
                Some(Symbol::Nonterminal(child)) => child.clone(),
                _ => continue,
            };

            self.expand_into_cache(&child, in_progress)?;
            let expansion = self
                .cache
                .get(&child)
                .ok_or_else(|| GrammarError::UndefinedNonterminal(child.clone()))?;
            working.replace_at(position, expansion.iter().cloned().map(Symbol::Terminal));
        }

        in_progress.remove(id);
        let terminals = working
            .iter()
            .filter_map(Symbol::as_terminal)
            .cloned()
            .collect();
        self.cache.insert(id.clone(), terminals);

        Ok(())
    }

    /// Computes the length of the expansion of `id` without materializing it.
    pub fn expanded_len(&self, id: &N) -> Result<usize, GrammarError<N>> {
        let mut lengths = HashMap::new();
        let mut in_progress = HashSet::new();
        self.expanded_len_memo(id, &mut lengths, &mut in_progress)
    }

    fn expanded_len_memo<'a>(
        &'a self,
        id: &'a N,
        lengths: &mut HashMap<&'a N, usize>,
        in_progress: &mut HashSet<&'a N>,
    ) -> Result<usize, GrammarError<N>> {
        if let Some(&length) = lengths.get(id) {
            return Ok(length);
        }

        let body = self
            .rules
            .get(id)
            .ok_or_else(|| GrammarError::UndefinedNonterminal(id.clone()))?;
        if !in_progress.insert(id) {
            return Err(GrammarError::Cycle(id.clone()));
        }

        let mut length = 0;
        for symbol in body {
            length += match symbol {
                Symbol::Terminal(_) => 1,
                Symbol::Nonterminal(child) => self.expanded_len_memo(child, lengths, in_progress)?,
            };
        }

        in_progress.remove(id);
        lengths.insert(id, length);
        Ok(length)
    }
}
