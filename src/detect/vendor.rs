//! MadCap Flare help pages: one procedure per page, titled by the `<h1>`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::descendants;
use crate::loader::ParsedDocument;
use crate::normalize::{char_len, element_text, keep_substep, MIN_SUBSTEP_CHARS};
use crate::procedure::Candidate;

/// Upper bound on steps kept per page; later steps are dropped.
pub const MAX_VENDOR_STEPS: usize = 30;

const INDEX_MARKER: &str = "Index";
const MIN_TITLE_CHARS: usize = 5;
const MIN_HEADER_CHARS: usize = 5;
const MIN_NUMBERED_CHARS: usize = 20;
const SUBSTEP_BULLET: &str = "  • ";

static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static DROPDOWN_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.MCDropDown").unwrap());
static HEAD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".MCDropDownHead, .dropDownHead").unwrap());
static BODY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".MCDropDownBody, .dropDownBody").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static EMPHASIS_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b, strong").unwrap());
static P_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

static STEP_BY_STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)step by step").unwrap());
static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9]\d?\.\s").unwrap());

/// Page title, or `None` for index/menu pages and pages without an `<h1>`.
pub fn page_title(doc: &ParsedDocument) -> Option<String> {
    let h1 = doc.select(&TITLE_SEL).next()?;
    let title = element_text(h1);
    if title.contains(INDEX_MARKER) || char_len(&title) < MIN_TITLE_CHARS {
        return None;
    }
    Some(title)
}

/// A candidate as soon as one step is found; the two-step minimum is
/// checked later so that a one-step result still blocks the fallbacks.
pub fn page_candidate(title: &str, mut steps: Vec<String>) -> Vec<Candidate> {
    if steps.is_empty() {
        return Vec::new();
    }
    steps.truncate(MAX_VENDOR_STEPS);
    vec![Candidate {
        title: title.to_string(),
        steps,
    }]
}

pub fn drop_downs(doc: &ParsedDocument) -> Vec<String> {
    let mut steps = Vec::new();
    for dropdown in doc.select(&DROPDOWN_SEL) {
        if let Some(head) = descendants(dropdown, &HEAD_SEL).next() {
            let text = element_text(head);
            if char_len(&text) > MIN_HEADER_CHARS {
                steps.push(text);
            }
        }
        if let Some(body) = descendants(dropdown, &BODY_SEL).next() {
            steps.extend(
                descendants(body, &LI_SEL)
                    .map(element_text)
                    .filter(|t| keep_substep(t))
                    .map(|t| format!("{SUBSTEP_BULLET}{t}")),
            );
        }
    }
    steps
}

pub fn step_by_step(doc: &ParsedDocument) -> Vec<String> {
    let Some(label) = doc
        .select(&EMPHASIS_SEL)
        .find(|el| STEP_BY_STEP_RE.is_match(&element_text(*el)))
    else {
        return Vec::new();
    };
    let Some(para) = label
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "p")
    else {
        return Vec::new();
    };

    para.next_siblings()
        .filter_map(ElementRef::wrap)
        .flat_map(|sibling| descendants(sibling, &LI_SEL))
        .map(element_text)
        .filter(|t| char_len(t) > MIN_SUBSTEP_CHARS)
        .collect()
}

pub fn numbered_paragraphs(doc: &ParsedDocument) -> Vec<String> {
    doc.select(&P_SEL)
        .map(element_text)
        .filter(|t| NUMBERED_RE.is_match(t) && char_len(t) > MIN_NUMBERED_CHARS)
        .collect()
}

// ── Tests ──
