use std::collections::HashSet;

use crate::procedure::Procedure;

/// Keep the first procedure for each exact title, preserving input order.
/// Later duplicates are dropped even when they carry more steps.
pub fn dedup_by_title(procedures: Vec<Procedure>) -> Vec<Procedure> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(procedures.len());
    for p in procedures {
        if seen.insert(p.title().to_string()) {
            unique.push(p);
        }
    }
    unique
}

// ── Tests ──
