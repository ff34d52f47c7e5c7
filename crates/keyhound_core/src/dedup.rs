//! Overlap resolution between competing candidates.

use crate::candidate::{Candidate, Span};

/// Resolves overlapping candidates in place, keeping the best per region.
///
/// Candidates are ranked by confidence tier descending, span length
/// descending within a tier, and rule registration order as the final tie
/// break; a greedy pass then retains each candidate only if its span is
/// disjoint from every already-retained span. Two consequences worth naming:
/// the output is pairwise non-overlapping, and a higher-tier candidate whose
/// span contains a lower-tier candidate's span always wins.
///
/// Surviving candidates are returned in blob order (ascending `byte_start`).
pub fn dedup_candidates(candidates: &mut Vec<Candidate>) {
    if candidates.len() < 2 {
        return;
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| b.span.len().cmp(&a.span.len()))
            .then_with(|| a.rule_order.cmp(&b.rule_order))
    });

    let mut kept_spans: Vec<Span> = Vec::with_capacity(candidates.len());
    candidates.retain(|candidate| {
        if kept_spans.iter().any(|span| span.overlaps(&candidate.span)) {
            return false;
        }
        kept_spans.push(candidate.span);
        true
    });

    candidates.sort_by_key(|candidate| candidate.span.byte_start);
}
