// src/span_builder.rs
// Derives the flat, ordered display-span sequence from base text + revisions.
// The same sequence backs rendering, final-content derivation, and the
// context transcript handed to the rewrite collaborator.

use log::debug;

use crate::models::{Revision, RevisionStatus, SpanKind, TextSpan};
use crate::revision_store::{char_len, slice_chars};

/// Walk the base text left to right and emit one span per contiguous
/// region: `Unchanged` gaps, `Deleted`/`Inserted` overlay pairs for pending
/// revisions, and replacement text re-labeled `Unchanged` for accepted ones
/// (folded text reads as ordinary prose). Rejected revisions are skipped.
///
/// Deterministic given `(base, revisions)`: two calls yield the same kinds,
/// texts, and positions; span ids are fresh each build.
pub fn build_spans(base: &str, revisions: &[Revision]) -> Vec<TextSpan> {
    let mut ordered: Vec<&Revision> = revisions.iter().collect();
    // stable sort: same-start revisions keep insertion order
    ordered.sort_by_key(|r| r.original_span.start);

    let mut spans = Vec::new();
    let mut cursor = 0usize;

    for revision in ordered {
        if revision.status == RevisionStatus::Rejected {
            continue;
        }

        let (start, end) = revision.range();
        if start > cursor {
            spans.push(TextSpan::new(
                SpanKind::Unchanged,
                slice_chars(base, cursor, start),
                cursor,
                start,
            ));
        }

        match revision.status {
            RevisionStatus::Accepted => {
                if let Some(new_span) = &revision.new_span {
                    spans.push(TextSpan::new(
                        SpanKind::Unchanged,
                        new_span.text.clone(),
                        start,
                        end,
                    ));
                }
            }
            _ => {
                if end > start {
                    spans.push(
                        TextSpan::new(
                            SpanKind::Deleted,
                            revision.original_span.text.clone(),
                            start,
                            end,
                        )
                        .owned_by(revision.id),
                    );
                }
                if let Some(new_span) = &revision.new_span {
                    spans.push(
                        TextSpan::new(SpanKind::Inserted, new_span.text.clone(), start, start)
                            .owned_by(revision.id),
                    );
                }
            }
        }

        cursor = end;
    }

    let len = char_len(base);
    if cursor < len {
        spans.push(TextSpan::new(
            SpanKind::Unchanged,
            slice_chars(base, cursor, len),
            cursor,
            len,
        ));
    }

    debug!("built {} spans from {} revisions", spans.len(), revisions.len());
    spans
}
