use scraper::ElementRef;

/// List items that start with one of these are navigation hints, not steps.
pub const BOILERPLATE_PREFIXES: &[&str] = &["Click here", "Getting Started"];

/// Drop-down sub-steps and "Step by Step" items must be longer than this.
pub const MIN_SUBSTEP_CHARS: usize = 15;

/// Trim and collapse every whitespace run to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text content of an element, whitespace collapsed.
pub fn element_text(el: ElementRef) -> String {
    collapse_whitespace(&el.text().collect::<String>())
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE_PREFIXES.iter().any(|p| text.starts_with(p))
}

pub fn keep_substep(text: &str) -> bool {
    char_len(text) > MIN_SUBSTEP_CHARS && !is_boilerplate(text)
}

// ── Tests ──
