mod properties;

use crate::symbol::Symbol;

/// Terminal shorthand for unit tests.
pub(crate) fn t(value: char) -> Symbol<char, &'static str> {
    Symbol::Terminal(value)
}

/// Nonterminal shorthand for unit tests.
pub(crate) fn nt(id: &'static str) -> Symbol<char, &'static str> {
    Symbol::Nonterminal(id)
}

/// Installs a logger that writes to the test output capture.
pub(crate) fn test_logger() {
    // Ignore double initialisations in tests since tests are ran in parallel.
    let _ = env_logger::builder().is_test(true).try_init();
}
