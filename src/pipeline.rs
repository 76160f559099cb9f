use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::dedup::dedup_by_title;
use crate::detect::{detect, Detection, Variant};
use crate::error::{DocumentError, DocumentErrorKind};
use crate::loader::{DocumentSource, ParsedDocument, RawDocument};
use crate::procedure::ProcedureStore;

/// Documents read from disk before handing a batch to the worker pool.
const CHUNK_SIZE: usize = 256;

pub struct ExtractReport {
    pub files: usize,
    pub failed: usize,
    /// Documents that produced at least one procedure.
    pub matched: usize,
    /// Procedures before corpus deduplication.
    pub candidates: usize,
    /// Candidates dropped for a blank title or fewer than two steps.
    pub discarded: usize,
    pub store: ProcedureStore,
}

impl ExtractReport {
    pub fn duplicates(&self) -> usize {
        self.candidates - self.store.len()
    }

    pub fn print(&self) {
        println!(
            "Processed {} files ({} failed): {} with procedures, {} candidates, {} duplicates, {} malformed.",
            self.files,
            self.failed,
            self.matched,
            self.candidates,
            self.duplicates(),
            self.discarded,
        );
    }
}

struct DocumentOutcome {
    name: String,
    detection: Detection,
}

/// Detect procedures in every document, then deduplicate by title.
///
/// Documents run in parallel within a chunk; results are merged in file
/// name order so the first-wins rule is reproducible.
pub fn extract_corpus(source: &DocumentSource, variant: Variant) -> Result<ExtractReport> {
    let pb = ProgressBar::new(source.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut report = ExtractReport {
        files: 0,
        failed: 0,
        matched: 0,
        candidates: 0,
        discarded: 0,
        store: ProcedureStore::default(),
    };
    let mut collected = Vec::new();

    let chunks = source.documents().chunks(CHUNK_SIZE);
    for chunk in &chunks {
        let batch: Vec<_> = chunk.collect();
        let size = batch.len();
        let results: Vec<_> = batch
            .into_par_iter()
            .map(|doc| process_document(doc, variant))
            .collect();

        for result in results {
            report.files += 1;
            match result {
                Ok(outcome) => {
                    let found = outcome.detection.procedures.len();
                    debug!(
                        file = %outcome.name,
                        strategy = outcome.detection.strategy.unwrap_or("none"),
                        found,
                        "detected"
                    );
                    if found > 0 {
                        report.matched += 1;
                    }
                    report.discarded += outcome.detection.discarded;
                    collected.extend(outcome.detection.procedures);
                }
                Err(e) => {
                    report.failed += 1;
                    pb.suspend(|| warn!(file = %e.name, error = %e.kind, "skipping document"));
                }
            }
        }
        pb.inc(size as u64);
    }
    pb.finish_and_clear();

    report.candidates = collected.len();
    report.store = ProcedureStore::new(dedup_by_title(collected));
    info!(
        files = report.files,
        failed = report.failed,
        procedures = report.store.len(),
        "extraction finished"
    );
    Ok(report)
}

/// Parse and detect one document; a panic in a strategy is contained here.
fn process_document(
    doc: Result<RawDocument, DocumentError>,
    variant: Variant,
) -> Result<DocumentOutcome, DocumentError> {
    let raw = doc?;
    let name = raw.name.clone();
    let detected = panic::catch_unwind(AssertUnwindSafe(move || {
        let parsed = ParsedDocument::parse(raw);
        detect(&parsed, variant)
    }));
    match detected {
        Ok(detection) => Ok(DocumentOutcome { name, detection }),
        Err(payload) => Err(DocumentError::new(
            name,
            DocumentErrorKind::Panicked(panic_message(payload.as_ref())),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ── Tests ──
