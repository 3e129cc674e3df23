use crate::grammar::Grammar;
use crate::symbol::Symbol;
use crate::tests::test_logger;
use proptest::prelude::*;

/// One symbol slot of a generated rule: (is reference, terminal, target pick).
type Slot = (bool, u8, u8);

/// Builds an acyclic grammar over `u32` ids from a list of rule shapes.
///
/// Rule `i` only references rules with larger ids, so the reference graph is
/// acyclic and rule 0, the start, is never referenced.
fn build_grammar(shape: &[Vec<Slot>]) -> Grammar<u8, u32> {
    let num_rules = shape.len() as u32;
    let mut grammar = Grammar::new(0);

    for (lhs, slots) in (0u32..).zip(shape) {
        let later = num_rules - lhs - 1;
        let body: Vec<Symbol<u8, u32>> = slots
            .iter()
            .map(|&(is_ref, terminal, pick)| {
                if is_ref && later > 0 {
                    Symbol::Nonterminal(lhs + 1 + u32::from(pick) % later)
                } else {
                    Symbol::Terminal(b'a' + terminal % 4)
                }
            })
            .collect();
        grammar.add_rule(lhs, body);
    }

    grammar
}

/// Splits fuzzer bytes into rule shapes: three bytes per slot, a new rule
/// whenever the high bit of the first byte is set.
fn shape_from_bytes(input: &[u8]) -> Vec<Vec<Slot>> {
    let mut shape: Vec<Vec<Slot>> = vec![Vec::new()];

    for chunk in input.chunks_exact(3) {
        let starts_rule = chunk[0] & 0x80 != 0;
        let current_len = shape.last().map_or(0, Vec::len);
        if (starts_rule && current_len > 0 && shape.len() < 8) || current_len >= 6 {
            if shape.len() >= 8 {
                break;
            }
            shape.push(Vec::new());
        }
        if let Some(rule) = shape.last_mut() {
            rule.push((chunk[0] & 1 == 1, chunk[1], chunk[2]));
        }
    }

    shape.retain(|rule| !rule.is_empty());
    if shape.is_empty() {
        shape.push(vec![(false, 0, 0)]);
    }
    shape
}

fn grammar_shape() -> impl Strategy<Value = Vec<Vec<Slot>>> {
    prop::collection::vec(prop::collection::vec(any::<Slot>(), 1..5), 1..7)
}

/// Ids of all rules other than the start, in insertion order.
fn non_start_rules(grammar: &Grammar<u8, u32>) -> Vec<u32> {
    grammar
        .rules()
        .map(|(lhs, _)| *lhs)
        .filter(|lhs| lhs != grammar.start())
        .collect()
}

proptest! {
    /// Property 1: Generated grammars are well formed
    #[test]
    fn prop_generated_grammar_is_valid(shape in grammar_shape()) {
        let grammar = build_grammar(&shape);
        prop_assert_eq!(grammar.validate(), Ok(()));
    }

    /// Property 2: Lazy iteration agrees with memoized expansion
    #[test]
    fn prop_iter_matches_expand(shape in grammar_shape()) {
        let mut grammar = build_grammar(&shape);

        let lazy: Vec<u8> = grammar.iter().copied().collect();
        prop_assert_eq!(grammar.expanded_len(&0), Ok(lazy.len()));
        prop_assert_eq!(grammar.expand_start().unwrap(), lazy.as_slice());
    }

    /// Property 3: Reduction preserves the expansion of the start symbol
    #[test]
    fn prop_reduce_preserves_expansion(shape in grammar_shape()) {
        let mut grammar = build_grammar(&shape);
        let before = grammar.expand_start().unwrap().to_vec();

        grammar.reduce().unwrap();

        prop_assert_eq!(grammar.expand_start().unwrap(), before.as_slice());
        prop_assert_eq!(grammar.validate(), Ok(()));
    }

    /// Property 4: Reduction reaches a fixed point
    /// A second pass performs no inlines and every non-start rule is shared.
    #[test]
    fn prop_reduce_fixed_point(shape in grammar_shape()) {
        let mut grammar = build_grammar(&shape);
        let before = grammar.len();

        let inlined = grammar.reduce().unwrap();
        prop_assert_eq!(grammar.len(), before - inlined);
        prop_assert_eq!(grammar.reduce(), Ok(0));

        let counts = grammar.reference_counts();
        for lhs in non_start_rules(&grammar) {
            prop_assert!(
                counts[&lhs] >= 2,
                "Rule {} has count {}, expected >= 2",
                lhs,
                counts[&lhs]
            );
        }
    }

    /// Property 5: Inlining any non-start rule preserves the expansion
    #[test]
    fn prop_inline_preserves_expansion(shape in grammar_shape(), pick in any::<usize>()) {
        let mut grammar = build_grammar(&shape);
        let candidates = non_start_rules(&grammar);
        prop_assume!(!candidates.is_empty());

        let victim = candidates[pick % candidates.len()];
        let before = grammar.expand_start().unwrap().to_vec();

        grammar.inline(&victim).unwrap();

        prop_assert!(!grammar.contains_rule(&victim));
        prop_assert_eq!(grammar.expand_start().unwrap(), before.as_slice());
    }

    /// Property 6: Merging rules with equal expansions preserves the expansion
    #[test]
    fn prop_merge_equal_expansions(
        shape in grammar_shape(),
        pick in any::<usize>(),
        forward in any::<bool>(),
    ) {
        let mut grammar = build_grammar(&shape);
        let candidates = non_start_rules(&grammar);
        prop_assume!(!candidates.is_empty());

        // Clone a rule under a fresh id and reference the copy from the start
        let original = candidates[pick % candidates.len()];
        let copy = grammar.len() as u32;
        let body = grammar.rule(&original).unwrap().to_vec();
        grammar.add_rule(copy, body);
        grammar.rule_mut(&0).unwrap().push_back(Symbol::Nonterminal(copy));
        let before = grammar.expand_start().unwrap().to_vec();

        let (source, dest) = if forward { (copy, original) } else { (original, copy) };
        grammar.replace(&source, &dest).unwrap();

        prop_assert!(!grammar.contains_rule(&source));
        prop_assert!(grammar.rules().all(|(_, body)| !body.contains_nonterminal(&source)));
        prop_assert_eq!(grammar.expand_start().unwrap(), before.as_slice());
        prop_assert_eq!(grammar.validate(), Ok(()));
    }

    /// Property 7: A merge never leaves a self-reference in the destination
    #[test]
    fn prop_merge_no_self_reference(shape in grammar_shape(), pick in any::<usize>()) {
        let mut grammar = build_grammar(&shape);
        let candidates = non_start_rules(&grammar);
        prop_assume!(!candidates.is_empty());

        let source = candidates[pick % candidates.len()];
        let dest = grammar.len() as u32;
        grammar.add_rule(dest, vec![Symbol::Nonterminal(source), Symbol::Terminal(b'z')]);
        grammar.rule_mut(&0).unwrap().push_back(Symbol::Nonterminal(dest));
        let source_expansion = grammar.expand(&source).unwrap().to_vec();

        grammar.replace(&source, &dest).unwrap();

        let dest_body = grammar.rule(&dest).unwrap();
        prop_assert!(!dest_body.contains_nonterminal(&source));
        prop_assert!(!dest_body.contains_nonterminal(&dest));

        let mut expected = source_expansion;
        expected.push(b'z');
        prop_assert_eq!(grammar.expand(&dest).unwrap(), expected.as_slice());
    }

    /// Property 8: Stale cache entries are never returned
    #[test]
    fn prop_cache_coherence(shape in grammar_shape(), value in any::<u8>()) {
        let mut grammar = build_grammar(&shape);
        grammar.expand_start().unwrap();

        let last = grammar.len() as u32 - 1;
        grammar.add_rule(last, vec![Symbol::Terminal(value)]);

        let lazy: Vec<u8> = grammar.iter().copied().collect();
        prop_assert_eq!(grammar.expand_start().unwrap(), lazy.as_slice());
    }
}

/// Bolero fuzz test: No panics on arbitrary grammars
#[test]
fn fuzz_no_panic() {
    bolero::check!().with_type::<Vec<u8>>().for_each(|input| {
        let mut grammar = build_grammar(&shape_from_bytes(input));

        let lazy: Vec<u8> = grammar.iter().copied().collect();
        assert_eq!(grammar.expand_start().unwrap(), lazy.as_slice());

        // Merges may be rejected, but must never break the grammar
        let rules = non_start_rules(&grammar);
        if let [first, second, ..] = rules[..] {
            let _ = grammar.replace(&first, &second);
            assert_eq!(grammar.validate(), Ok(()));
        }

        // Merging into the start must not leave it referenced either
        let start = *grammar.start();
        if let Some(&other) = non_start_rules(&grammar).last() {
            let _ = grammar.replace(&other, &start);
            assert_eq!(grammar.validate(), Ok(()));
        }
    });
}

/// Bolero fuzz test: Reduction always preserves the expansion
#[test]
fn fuzz_reduce_preserves_expansion() {
    test_logger();

    bolero::check!()
        .with_type::<Vec<u8>>()
        .for_each(|input| {
            let mut grammar = build_grammar(&shape_from_bytes(input));
            let before = grammar.expand_start().unwrap().to_vec();

            grammar.reduce().unwrap();

            assert!(grammar.is_irreducible());
            assert_eq!(grammar.expand_start().unwrap(), before.as_slice());
        });
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_shape_from_bytes_limits() {
        let shape = shape_from_bytes(&[0xff; 300]);
        assert!(shape.len() <= 8);
        assert!(shape.iter().all(|rule| !rule.is_empty() && rule.len() <= 6));

        assert_eq!(shape_from_bytes(&[]), vec![vec![(false, 0, 0)]]);
    }

    #[test]
    fn test_build_grammar_references_forward() {
        let grammar = build_grammar(&[
            vec![(true, 0, 0), (false, 1, 0)],
            vec![(true, 0, 5)],
            vec![(true, 2, 0)],
        ]);

        assert_eq!(
            grammar.rule(&0).unwrap().to_vec(),
            vec![Symbol::Nonterminal(1), Symbol::Terminal(b'b')]
        );
        assert_eq!(grammar.rule(&1).unwrap().to_vec(), vec![Symbol::Nonterminal(2)]);
        // The last rule has nothing to reference.
        assert_eq!(grammar.rule(&2).unwrap().to_vec(), vec![Symbol::Terminal(b'c')]);
    }

    #[test]
    fn test_reduce_generated_chain() {
        let mut grammar = build_grammar(&[
            vec![(true, 0, 0), (true, 0, 0)],
            vec![(true, 0, 0)],
            vec![(false, 0, 0), (false, 1, 0)],
        ]);
        let before = grammar.expand_start().unwrap().to_vec();
        assert_eq!(before, b"abab");

        // Rule 1 is shared by the start; rule 2 is only used by rule 1
        assert_eq!(grammar.reduce(), Ok(1));
        assert_eq!(grammar.len(), 2);
        assert_eq!(grammar.expand_start().unwrap(), before.as_slice());
    }
}
