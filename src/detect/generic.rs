use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::descendants;
use crate::loader::ParsedDocument;
use crate::normalize::element_text;
use crate::procedure::{Candidate, MIN_STEPS};

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("section, article, .procedure, .steps").unwrap());
static HEADING_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2, h3, h4").unwrap());
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

/// Every content container with a heading and at least two list items.
pub fn section_scan(doc: &ParsedDocument) -> Vec<Candidate> {
    let mut out = Vec::new();
    for container in doc.select(&CONTAINER_SEL) {
        let Some(heading) = descendants(container, &HEADING_SEL).next() else {
            continue;
        };
        let items: Vec<ElementRef> = descendants(container, &LI_SEL).collect();
        if items.len() < MIN_STEPS {
            continue;
        }
        if let Some(c) = list_candidate(element_text(heading), &items) {
            out.push(c);
        }
    }
    out
}

/// Every `<ol>` titled by the nearest heading before it in document order.
///
/// The heading need not be an ancestor of the list, so deeply nested pages
/// can attribute a list to an unrelated heading.
pub fn ordered_list_scan(doc: &ParsedDocument) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::new();
    let mut last_heading: Option<ElementRef> = None;

    for node in doc.html.root_element().descendants() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = el.value().name();
        if HEADING_TAGS.contains(&tag) {
            last_heading = Some(el);
            continue;
        }
        if tag != "ol" {
            continue;
        }

        let Some(heading) = last_heading else {
            continue;
        };
        let items: Vec<ElementRef> = descendants(el, &LI_SEL).collect();
        if items.len() < MIN_STEPS {
            continue;
        }
        let title = element_text(heading);
        if out.iter().any(|c| c.title == title) {
            continue;
        }
        if let Some(c) = list_candidate(title, &items) {
            out.push(c);
        }
    }
    out
}

fn list_candidate(title: String, items: &[ElementRef]) -> Option<Candidate> {
    let steps: Vec<String> = items
        .iter()
        .map(|li| element_text(*li))
        .filter(|t| !t.is_empty())
        .collect();
    if title.is_empty() || steps.len() < MIN_STEPS {
        return None;
    }
    Some(Candidate { title, steps })
}

// ── Tests ──
