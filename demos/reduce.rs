use slg_rewrite::{Grammar, Symbol};
use std::env;

/// Builds a small grammar for `word`, reduces it, and prints both versions.
///
/// Usage: cargo run --example reduce [word]
fn main() {
    let word = env::args().nth(1).unwrap_or_else(|| "abracadabra".to_string());

    // A deliberately wasteful grammar: one rule per character, each used once,
    // wrapped twice around the start
    let mut grammar = Grammar::<char, String>::default();
    let mut body = Vec::new();
    for (i, c) in word.chars().enumerate() {
        let id = format!("C{i}");
        grammar.add_rule(id.clone(), vec![Symbol::Terminal(c)]);
        body.push(Symbol::Nonterminal(id));
    }
    grammar.add_rule("W".to_string(), body);
    grammar.add_rule(
        "*".to_string(),
        vec![
            Symbol::Nonterminal("W".to_string()),
            Symbol::Terminal('/'),
            Symbol::Nonterminal("W".to_string()),
        ],
    );

    if let Err(e) = grammar.validate() {
        eprintln!("Invalid grammar: {e}");
        std::process::exit(1);
    }

    let before: String = match grammar.expand_start() {
        Ok(expansion) => expansion.iter().collect(),
        Err(e) => {
            eprintln!("Expansion failed: {e}");
            std::process::exit(1);
        }
    };
    println!("=== Before ===\n{grammar}");

    let inlined = match grammar.reduce() {
        Ok(inlined) => inlined,
        Err(e) => {
            eprintln!("Reduction failed: {e}");
            std::process::exit(1);
        }
    };
    println!("=== After ({inlined} rules inlined) ===\n{grammar}");

    let after: String = grammar.iter().collect();
    if before != after {
        eprintln!("Mismatch: {before:?} != {after:?}");
        std::process::exit(1);
    }

    let stats = grammar.stats();
    println!("=== Statistics ===");
    println!("Expanded length: {}", after.chars().count());
    println!("Symbols in grammar: {}", stats.grammar_symbols);
    println!("Rules: {}", stats.num_rules);
    println!(
        "Compression ratio: {:.2}%",
        stats.compression_ratio(after.chars().count())
    );
}
