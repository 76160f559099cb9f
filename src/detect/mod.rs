pub mod generic;
pub mod vendor;

use clap::ValueEnum;
use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::loader::ParsedDocument;
use crate::procedure::{Candidate, Procedure};

/// Authoring convention of the input corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Semantic HTML: sections, articles and ordered lists under headings.
    Generic,
    /// MadCap Flare drop-down help pages.
    Vendor,
}

/// One generic heuristic. Strategies are pure and tried in list order.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: fn(&ParsedDocument) -> Vec<Candidate>,
}

/// One vendor heuristic. It only collects steps; the page title comes from
/// the shared `<h1>` gate, evaluated once per document.
#[derive(Clone, Copy)]
pub struct StepFinder {
    pub name: &'static str,
    pub find: fn(&ParsedDocument) -> Vec<String>,
}

const GENERIC_STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "section-scan",
        run: generic::section_scan,
    },
    Strategy {
        name: "ordered-list-scan",
        run: generic::ordered_list_scan,
    },
];

const VENDOR_FINDERS: &[StepFinder] = &[
    StepFinder {
        name: "drop-down",
        find: vendor::drop_downs,
    },
    StepFinder {
        name: "step-by-step",
        find: vendor::step_by_step,
    },
    StepFinder {
        name: "numbered-paragraphs",
        find: vendor::numbered_paragraphs,
    },
];

impl Variant {
    pub fn default_extensions(self) -> &'static [&'static str] {
        match self {
            Variant::Generic => &["html"],
            Variant::Vendor => &["html", "htm"],
        }
    }
}

/// What detection produced for one document.
#[derive(Debug, Default)]
pub struct Detection {
    /// Name of the strategy that claimed the document, if any did.
    pub strategy: Option<&'static str>,
    pub procedures: Vec<Procedure>,
    /// Candidates dropped for a blank title or fewer than two steps.
    pub discarded: usize,
}

/// Run the variant's strategies in order; the first one with any output
/// claims the document and the rest are skipped.
pub fn detect(doc: &ParsedDocument, variant: Variant) -> Detection {
    match variant {
        Variant::Generic => first_claim(
            doc,
            GENERIC_STRATEGIES.iter().map(|s| (s.name, (s.run)(doc))),
        ),
        Variant::Vendor => {
            let Some(title) = vendor::page_title(doc) else {
                return Detection::default();
            };
            first_claim(
                doc,
                VENDOR_FINDERS
                    .iter()
                    .map(|f| (f.name, vendor::page_candidate(&title, (f.find)(doc)))),
            )
        }
    }
}

/// `outputs` is lazy, so strategies after the claiming one never run.
fn first_claim(
    doc: &ParsedDocument,
    outputs: impl Iterator<Item = (&'static str, Vec<Candidate>)>,
) -> Detection {
    for (name, candidates) in outputs {
        if candidates.is_empty() {
            continue;
        }

        let total = candidates.len();
        let procedures: Vec<Procedure> = candidates
            .into_iter()
            .filter_map(|c| Procedure::from_candidate(c, &doc.name))
            .collect();
        let discarded = total - procedures.len();
        if discarded > 0 {
            debug!(file = %doc.name, strategy = name, discarded, "dropped malformed candidates");
        }

        return Detection {
            strategy: Some(name),
            procedures,
            discarded,
        };
    }
    Detection::default()
}

/// Descendants of `el` matching `sel`, never `el` itself.
pub(crate) fn descendants<'a>(
    el: ElementRef<'a>,
    sel: &'a Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.select(sel).filter(move |d| d.id() != el.id())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> ParsedDocument {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap();
        ParsedDocument::from_html(name, &html)
    }

    fn titles(d: &Detection) -> Vec<&str> {
        d.procedures.iter().map(|p| p.title()).collect()
    }

    #[test]
    fn reset_password_scenario() {
        let doc = ParsedDocument::from_html(
            "reset.html",
            "<h2>Reset Password</h2><ol><li>Open settings</li><li>Click reset</li></ol>",
        );
        let d = detect(&doc, Variant::Generic);
        assert_eq!(d.strategy, Some("ordered-list-scan"));
        assert_eq!(d.procedures.len(), 1);
        let p = &d.procedures[0];
        assert_eq!(p.title(), "Reset Password");
        assert_eq!(p.steps(), ["Open settings", "Click reset"]);
        assert_eq!(p.source_file(), "reset.html");
    }

    #[test]
    fn section_hit_suppresses_list_scan() {
        let doc = fixture("generic_sections.html");
        let d = detect(&doc, Variant::Generic);
        assert_eq!(d.strategy, Some("section-scan"));
        // the <ol> inside "Create Vendor" must not produce a second candidate
        assert_eq!(titles(&d), ["Create Vendor", "Void a Check"]);
    }

    #[test]
    fn no_lists_no_candidates() {
        for variant in [Variant::Generic, Variant::Vendor] {
            let d = detect(&fixture("no_lists.html"), variant);
            assert!(d.procedures.is_empty());
            assert_eq!(d.strategy, None);
        }
    }

    #[test]
    fn navigation_lists_are_not_procedures() {
        let doc = ParsedDocument::from_html(
            "menu.html",
            r#"<nav><section><h2>Site Menu</h2><ul><li>Home</li><li>About</li></ul></section></nav>
               <footer><article><h3>Contact Us</h3><ol><li>Email</li><li>Phone</li></ol></article></footer>
               <p>No lists in the body.</p>"#,
        );
        let d = detect(&doc, Variant::Generic);
        assert!(d.procedures.is_empty(), "{:?}", d.procedures);
        assert_eq!(d.strategy, None);
    }

    #[test]
    fn body_section_detected_beside_navigation() {
        let doc = ParsedDocument::from_html(
            "page.html",
            r#"<nav><section><h2>Site Menu</h2><ul><li>Home</li><li>About</li></ul></section></nav>
               <section><h2>Reset Password</h2><ul><li>Open settings</li><li>Click reset</li></ul></section>"#,
        );
        let d = detect(&doc, Variant::Generic);
        assert_eq!(titles(&d), ["Reset Password"]);
    }

    #[test]
    fn vendor_title_ignores_banner_heading() {
        let doc = ParsedDocument::from_html(
            "invoices.htm",
            r#"<header><h1>Springbrook Help Home</h1></header>
               <h1>Entering Invoices</h1>
               <p>1. Open the invoice entry screen.</p>
               <p>2. Type the vendor number and press Tab.</p>"#,
        );
        let d = detect(&doc, Variant::Vendor);
        assert_eq!(titles(&d), ["Entering Invoices"]);
    }

    #[test]
    fn vendor_index_page_skipped() {
        let doc = ParsedDocument::from_html(
            "idx.htm",
            r#"<h1>Idx</h1>
               <div class="MCDropDown"><a class="MCDropDownHead">Step 1 Open the module</a>
               <div class="MCDropDownBody"><ul><li>Select the Accounts Payable menu</li></ul></div></div>
               <p>1. Turn on the device.</p><p>2. Wait for the light.</p>"#,
        );
        let d = detect(&doc, Variant::Vendor);
        assert!(d.procedures.is_empty());
        assert_eq!(d.strategy, None);
    }

    #[test]
    fn vendor_single_dropdown_step_does_not_fall_back() {
        // drop-down found one step: the page is claimed, then discarded
        let doc = ParsedDocument::from_html(
            "one.htm",
            r#"<h1>Close the Fiscal Year</h1>
               <div class="MCDropDown"><a class="MCDropDownHead">Step 1 Run reports</a></div>
               <p>1. Turn on the device.</p><p>2. Wait for the light.</p>"#,
        );
        let d = detect(&doc, Variant::Vendor);
        assert_eq!(d.strategy, Some("drop-down"));
        assert!(d.procedures.is_empty());
        assert_eq!(d.discarded, 1);
    }

    #[test]
    fn every_procedure_is_well_formed() {
        let files = [
            "generic_sections.html",
            "no_lists.html",
            "vendor_dropdown.htm",
            "vendor_step_by_step.html",
            "vendor_numbered.html",
        ];
        for name in files {
            for variant in [Variant::Generic, Variant::Vendor] {
                for p in detect(&fixture(name), variant).procedures {
                    assert!(p.steps().len() >= 2, "{name}: {p:?}");
                    assert!(!p.title().is_empty());
                    assert_eq!(p.title(), p.title().trim());
                    assert!(p.steps().iter().all(|s| !s.trim().is_empty()));
                }
            }
        }
    }

    #[test]
    fn default_extensions() {
        assert_eq!(Variant::Generic.default_extensions(), ["html"]);
        assert_eq!(Variant::Vendor.default_extensions(), ["html", "htm"]);
    }

    #[test]
    fn descendants_excludes_scope() {
        let doc = ParsedDocument::from_html("x.html", "<ol class='steps'><li>a</li><ol><li>b</li></ol></ol>");
        let ol = Selector::parse("ol").unwrap();
        let outer = doc.select(&ol).next().unwrap();
        assert_eq!(descendants(outer, &ol).count(), 1);
    }
}
