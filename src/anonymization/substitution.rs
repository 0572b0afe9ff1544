//! Placeholder substitution and restoration
//!
//! Substitution rebuilds the text in a single left-to-right pass over the
//! resolved, non-overlapping detections, so earlier replacements never
//! shift the offsets of later ones.

use crate::anonymization::models::{Detection, MappingEntry};

/// Replace every detection's span with its placeholder
///
/// `detections` must be sorted by start offset and must not overlap; the
/// span merger guarantees both. Text between spans is copied verbatim.
pub fn substitute(text: &str, detections: &[Detection]) -> String {
    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;

    for detection in detections {
        let span = &detection.span;
        if span.start() < cursor || span.end() > text.len() {
            tracing::warn!(
                start = span.start(),
                end = span.end(),
                "Skipping detection outside the substitution window"
            );
            continue;
        }
        output.push_str(&text[cursor..span.start()]);
        output.push_str(&detection.placeholder);
        cursor = span.end();
    }

    output.push_str(&text[cursor..]);
    output
}

/// Undo [`substitute`] using the detections that produced `anonymized`
///
/// Each placeholder occurrence is swapped back for its own span text, which
/// makes the round trip exact even when two spellings share a placeholder.
pub fn restore_detections(anonymized: &str, detections: &[Detection]) -> String {
    let mut output = String::with_capacity(anonymized.len());
    let mut cursor = 0;
    // Offset of the anonymized text relative to the original at `cursor`
    let mut shift: isize = 0;

    for detection in detections {
        let span = &detection.span;
        let out_start = span.start() as isize + shift;
        if out_start < cursor as isize {
            continue;
        }
        let out_start = out_start as usize;
        let out_end = out_start + detection.placeholder.len();

        match anonymized.get(out_start..out_end) {
            Some(found) if found == detection.placeholder => {
                output.push_str(&anonymized[cursor..out_start]);
                output.push_str(span.text());
                cursor = out_end;
                shift += detection.placeholder.len() as isize - span.len() as isize;
            }
            _ => {
                tracing::warn!(
                    placeholder = %detection.placeholder,
                    "Placeholder not found at expected offset, leaving text as is"
                );
                return anonymized.to_string();
            }
        }
    }

    output.push_str(&anonymized[cursor..]);
    output
}

/// Restore a text using only the externally visible mapping
///
/// Every occurrence of a placeholder is replaced by the mapping's
/// representative original. Longer placeholders are replaced first so that
/// `<PERSON_1>` never clobbers the prefix of `<PERSON_10>`.
pub fn restore_with_mapping(text: &str, mapping: &[MappingEntry]) -> String {
    let mut entries: Vec<&MappingEntry> = mapping.iter().collect();
    entries.sort_by(|a, b| b.placeholder.len().cmp(&a.placeholder.len()));

    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while !rest.is_empty() {
        for entry in &entries {
            if !entry.placeholder.is_empty() && rest.starts_with(entry.placeholder.as_str()) {
                output.push_str(&entry.original);
                rest = &rest[entry.placeholder.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            output.push(ch);
        }
        rest = chars.as_str();
    }

    output
}
