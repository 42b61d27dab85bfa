//! Greenblatt-style composite ranking.
//!
//! Two ordinal sub-rankings are combined: cheapness (ascending EV/EBIT) and
//! capital efficiency (descending ROIC). Only shares with a strictly
//! positive value participate in each sub-ranking, so a share priced off
//! negative earnings or burning capital never receives a composite rank.

use std::cmp::Ordering;

use radar_core::ShareValuation;

/// Assign composite ranks over a freshly derived universe.
///
/// Consumes the unranked collection and returns the annotated one; callers
/// treat the result as read-only. Ordinals start at 1 (best); ties in the
/// combined total are broken by original iteration order, nothing else.
pub fn assign_ranks(mut valuations: Vec<ShareValuation>) -> Vec<ShareValuation> {
    // Every rank comes out of this pass; whatever the input carried is
    // cleared so ineligible shares end up unranked, not stale.
    for share in &mut valuations {
        share.composite_rank = None;
    }

    let cheapness = sub_rank(&valuations, |s| s.ev_ebit, false);
    let efficiency = sub_rank(&valuations, |s| s.roic, true);

    let mut totals: Vec<(usize, u32)> = (0..valuations.len())
        .filter_map(|idx| match (cheapness[idx], efficiency[idx]) {
            (Some(a), Some(b)) => Some((idx, a + b)),
            _ => None,
        })
        .collect();
    // Stable sort: equal totals keep universe order.
    totals.sort_by_key(|&(_, total)| total);

    for (position, &(idx, _)) in totals.iter().enumerate() {
        valuations[idx].composite_rank = Some(position as u32 + 1);
    }
    valuations
}

/// 1-based ordinals over shares whose metric is strictly positive, parallel
/// to the input slice. `descending` ranks the highest value first.
fn sub_rank(
    shares: &[ShareValuation],
    metric: fn(&ShareValuation) -> Option<f64>,
    descending: bool,
) -> Vec<Option<u32>> {
    let mut eligible: Vec<(usize, f64)> = shares
        .iter()
        .enumerate()
        .filter_map(|(idx, share)| metric(share).filter(|v| *v > 0.0).map(|v| (idx, v)))
        .collect();

    eligible.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    let mut ranks = vec![None; shares.len()];
    for (position, &(idx, _)) in eligible.iter().enumerate() {
        ranks[idx] = Some(position as u32 + 1);
    }
    ranks
}
