use crate::symbol::Symbol;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! {
    /// Stable handle to one symbol of a [`Sequence`].
    ///
    /// A position stays valid until the symbol it names is removed; splices
    /// elsewhere in the sequence never invalidate it. Using a position with a
    /// sequence other than the one that issued it is a logic error.
    pub struct Position;
}

/// A node in the doubly-linked list of symbols.
#[derive(Debug, Clone)]
struct SymbolNode<T, N> {
    symbol: Symbol<T, N>,
    prev: Option<Position>,
    next: Option<Position>,
}

impl<T, N> SymbolNode<T, N> {
    fn new(symbol: Symbol<T, N>) -> Self {
        Self {
            symbol,
            prev: None,
            next: None,
        }
    }
}

/// The body of a rule: an ordered list of symbols with cheap splicing.
///
/// Nodes live in a [`SlotMap`] and are linked through generational keys, so
/// inserting `k` symbols before a position costs O(k) and removing a single
/// position costs O(1), independent of the length of the body.
#[derive(Clone)]
pub struct Sequence<T, N> {
    nodes: SlotMap<Position, SymbolNode<T, N>>,
    head: Option<Position>,
    tail: Option<Position>,
}

impl<T, N> Sequence<T, N> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of symbols in the sequence.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the sequence holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the first symbol.
    pub fn first(&self) -> Option<Position> {
        self.head
    }

    /// Position of the last symbol.
    pub fn last(&self) -> Option<Position> {
        self.tail
    }

    /// Position following `position`, if any.
    pub fn next(&self, position: Position) -> Option<Position> {
        self.nodes.get(position)?.next
    }

    /// Position preceding `position`, if any.
    pub fn prev(&self, position: Position) -> Option<Position> {
        self.nodes.get(position)?.prev
    }

    /// Returns the symbol stored at `position`.
    pub fn get(&self, position: Position) -> Option<&Symbol<T, N>> {
        self.nodes.get(position).map(|node| &node.symbol)
    }

    /// Appends a symbol and returns its position.
    pub fn push_back(&mut self, symbol: Symbol<T, N>) -> Position {
        let key = self.nodes.insert(SymbolNode::new(symbol));

        self.nodes[key].prev = self.tail;
        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);

        key
    }

    /// Splices `symbols` immediately before `position`.
    ///
    /// Returns false, leaving the sequence untouched, if `position` has been
    /// removed from this sequence. Positions are only meaningful for the
    /// sequence that issued them.
    pub fn insert_before<I>(&mut self, position: Position, symbols: I) -> bool
    where
        I: IntoIterator<Item = Symbol<T, N>>,
    {
        if !self.nodes.contains_key(position) {
            return false;
        }

        let mut last = self.nodes[position].prev;
        for symbol in symbols {
            let key = self.nodes.insert(SymbolNode::new(symbol));
            self.nodes[key].prev = last;
            match last {
                Some(prev) => self.nodes[prev].next = Some(key),
                None => self.head = Some(key),
            }
            last = Some(key);
        }

        // Close the splice: last inserted -> position
        match last {
            Some(prev) => self.nodes[prev].next = Some(position),
            None => self.head = Some(position),
        }
        self.nodes[position].prev = last;

        true
    }

    /// Detaches the symbol at `position` and returns it.
    pub fn remove(&mut self, position: Position) -> Option<Symbol<T, N>> {
        let node = self.nodes.remove(position)?;

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }

        Some(node.symbol)
    }

    /// Replaces the symbol at `position` by `symbols`, returning the old one.
    pub fn replace_at<I>(&mut self, position: Position, symbols: I) -> Option<Symbol<T, N>>
    where
        I: IntoIterator<Item = Symbol<T, N>>,
    {
        if !self.insert_before(position, symbols) {
            return None;
        }
        self.remove(position)
    }

    /// Finds the first symbol satisfying `predicate`.
    pub fn find_first<P>(&self, mut predicate: P) -> Option<Position>
    where
        P: FnMut(&Symbol<T, N>) -> bool,
    {
        self.positions()
            .find(|&position| predicate(&self.nodes[position].symbol))
    }

    /// Collects the positions of every symbol satisfying `predicate`.
    ///
    /// The result can be used to mutate the sequence afterwards, since
    /// positions survive splices at other positions.
    pub fn positions_where<P>(&self, mut predicate: P) -> Vec<Position>
    where
        P: FnMut(&Symbol<T, N>) -> bool,
    {
        self.positions()
            .filter(|&position| predicate(&self.nodes[position].symbol))
            .collect()
    }

    /// Iterates over positions from front to back.
    pub fn positions(&self) -> Positions<'_, T, N> {
        Positions {
            sequence: self,
            current: self.head,
        }
    }

    /// Iterates over symbols from front to back.
    pub fn iter(&self) -> SequenceIter<'_, T, N> {
        SequenceIter {
            positions: self.positions(),
        }
    }
}

impl<T: Clone, N: Clone> Sequence<T, N> {
    /// Copies the symbols into a vector, front to back.
    pub fn to_vec(&self) -> Vec<Symbol<T, N>> {
        self.iter().cloned().collect()
    }
}

impl<T, N: PartialEq> Sequence<T, N> {
    /// Returns true if any symbol refers to `id`.
    pub fn contains_nonterminal(&self, id: &N) -> bool {
        self.iter().any(|symbol| symbol.matches(id))
    }

    /// Counts the references to `id`.
    pub fn count_nonterminal(&self, id: &N) -> usize {
        self.iter().filter(|symbol| symbol.matches(id)).count()
    }
}

/// Iterator over the positions of a [`Sequence`].
pub struct Positions<'a, T, N> {
    sequence: &'a Sequence<T, N>,
    current: Option<Position>,
}

impl<T, N> Iterator for Positions<'_, T, N> {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.current?;
        self.current = self.sequence.nodes[position].next;
        Some(position)
    }
}

/// Iterator over the symbols of a [`Sequence`].
pub struct SequenceIter<'a, T, N> {
    positions: Positions<'a, T, N>,
}

impl<'a, T, N> Iterator for SequenceIter<'a, T, N> {
    type Item = &'a Symbol<T, N>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.positions.next()?;
        let sequence = self.positions.sequence;
        Some(&sequence.nodes[position].symbol)
    }
}

impl<'a, T, N> IntoIterator for &'a Sequence<T, N> {
    type Item = &'a Symbol<T, N>;
    type IntoIter = SequenceIter<'a, T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, N> Default for Sequence<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, N> FromIterator<Symbol<T, N>> for Sequence<T, N> {
    fn from_iter<I: IntoIterator<Item = Symbol<T, N>>>(iter: I) -> Self {
        let mut sequence = Sequence::new();
        sequence.extend(iter);
        sequence
    }
}

impl<T, N> Extend<Symbol<T, N>> for Sequence<T, N> {
    fn extend<I: IntoIterator<Item = Symbol<T, N>>>(&mut self, iter: I) {
        for symbol in iter {
            self.push_back(symbol);
        }
    }
}

impl<T, N> From<Vec<Symbol<T, N>>> for Sequence<T, N> {
    fn from(symbols: Vec<Symbol<T, N>>) -> Self {
        symbols.into_iter().collect()
    }
}

impl<T: PartialEq, N: PartialEq> PartialEq for Sequence<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, N: Eq> Eq for Sequence<T, N> {}

impl<T: fmt::Debug, N: fmt::Debug> fmt::Debug for Sequence<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, N: fmt::Display> fmt::Display for Sequence<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}
