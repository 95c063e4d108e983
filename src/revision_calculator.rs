// src/revision_calculator.rs
// Derives granular pending revisions from a whole-text rewrite.
// Uses the `similar` crate for word-level text diffing.

use log::debug;
use similar::{ChangeTag, TextDiff};

use crate::error::RevisionError;
use crate::models::Revision;
use crate::revision_store::{char_len, create_revision, slice_chars};

/// A contiguous changed region between base and rewrite, in base char offsets
struct EditRegion {
    start: usize,
    end: usize,
    replacement: String,
}

/// Diff `base` against `modified` and return one pending revision per
/// changed region, anchored into `base`.
///
/// Regions separated by fewer than `coalesce_threshold` unchanged characters
/// are merged into a single revision so that tightly interleaved edits stay
/// reviewable as one accept/reject unit. Accepting every returned revision
/// reproduces `modified` exactly; identical inputs yield no revisions.
pub fn revisions_from_rewrite(
    base: &str,
    modified: &str,
    coalesce_threshold: usize,
) -> Result<Vec<Revision>, RevisionError> {
    let diff = TextDiff::from_words(base, modified);

    let mut regions: Vec<EditRegion> = Vec::new();
    let mut cursor = 0usize;
    let mut current: Option<EditRegion> = None;

    for change in diff.iter_all_changes() {
        let len = char_len(change.value());
        match change.tag() {
            ChangeTag::Equal => {
                if let Some(region) = current.take() {
                    regions.push(region);
                }
                cursor += len;
            }
            ChangeTag::Delete => {
                let region = current.get_or_insert_with(|| EditRegion {
                    start: cursor,
                    end: cursor,
                    replacement: String::new(),
                });
                region.end += len;
                cursor += len;
            }
            ChangeTag::Insert => {
                // insertions consume no base text; the cursor stays put
                let region = current.get_or_insert_with(|| EditRegion {
                    start: cursor,
                    end: cursor,
                    replacement: String::new(),
                });
                region.replacement.push_str(change.value());
            }
        }
    }
    if let Some(region) = current.take() {
        regions.push(region);
    }

    if regions.is_empty() {
        return Ok(Vec::new());
    }

    // Merge regions separated by small unchanged gaps. The gap text exists
    // in both versions, so it joins both the replaced range and the
    // replacement.
    let mut merged: Vec<EditRegion> = Vec::new();
    let mut current = regions.remove(0);
    for next in regions {
        let gap = next.start - current.end;
        if gap < coalesce_threshold {
            let gap_text = slice_chars(base, current.end, next.start);
            current.replacement.push_str(gap_text);
            current.replacement.push_str(&next.replacement);
            current.end = next.end;
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    let revisions = merged
        .iter()
        .map(|r| create_revision(base, r.start, r.end, &r.replacement))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("derived {} revisions from rewrite", revisions.len());
    Ok(revisions)
}
