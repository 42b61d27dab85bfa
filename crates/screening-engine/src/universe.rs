use std::cmp::Ordering;
use std::collections::HashSet;

use radar_core::{RawIndicators, ScreenField, ShareValuation};
use tracing::{debug, info};
use valuation_engine::MarketRisk;

use crate::query::{ScreenRequest, TickerScope};

/// All derived valuations for one market snapshot.
///
/// Construction runs the composite ranking pass once; after that the
/// universe is read-only and every screen is a pure function of it.
#[derive(Debug, Clone)]
pub struct Universe {
    shares: Vec<ShareValuation>,
}

impl Universe {
    /// Annotates already-derived valuations with their composite rank.
    pub fn from_valuations(valuations: Vec<ShareValuation>) -> Self {
        Self {
            shares: composite_rank::assign_ranks(valuations),
        }
    }

    /// Derives valuations from raw indicators and ranks them in one step.
    pub fn from_raw(records: &[RawIndicators], market_risk: MarketRisk) -> Self {
        Self::from_valuations(valuation_engine::derive_universe(records, market_risk))
    }

    pub fn shares(&self) -> &[ShareValuation] {
        &self.shares
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Case-insensitive ticker lookup.
    pub fn get(&self, ticker: &str) -> Option<&ShareValuation> {
        self.shares
            .iter()
            .find(|share| share.ticker.eq_ignore_ascii_case(ticker))
    }

    /// Keeps the shares whose `parameter` field is defined and strictly
    /// beyond `cut_criterion`: above it normally, below it when
    /// `reverse_cut` is set. An unknown parameter matches nothing.
    ///
    /// Order of the result follows the universe. The universe itself is
    /// never modified, so repeated calls always see the same data.
    pub fn filter_by(
        &self,
        parameter: &str,
        cut_criterion: f64,
        reverse_cut: bool,
        scope: &TickerScope,
    ) -> Vec<ShareValuation> {
        self.filter_refs(parameter, cut_criterion, reverse_cut, scope)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Single-criterion top list: filter on one field, sort by that same
    /// field, and cap the result.
    pub fn top_by(
        &self,
        parameter: &str,
        cut_criterion: f64,
        reverse_cut: bool,
        ascending: bool,
        limit: usize,
        scope: &TickerScope,
    ) -> Vec<ShareValuation> {
        let mut picked = self.filter_refs(parameter, cut_criterion, reverse_cut, scope);
        if let Some(field) = ScreenField::from_name(parameter) {
            sort_shares(&mut picked, field, ascending);
        }
        picked.truncate(limit);
        picked.into_iter().cloned().collect()
    }

    /// Full conjunctive screen: every criterion is evaluated independently
    /// and a share must pass all of them. The surviving shares keep the
    /// universe's relative order, are sorted by `sort_by`, and the result
    /// is truncated to `limit`.
    ///
    /// An empty criteria list admits the whole in-scope universe. An
    /// unknown sort parameter leaves the order untouched.
    pub fn screen(&self, request: &ScreenRequest) -> Vec<ShareValuation> {
        info!(
            "🔍 screening {} shares through {} criteria",
            self.shares.len(),
            request.criteria.len()
        );

        let passing: Vec<HashSet<&str>> = request
            .criteria
            .iter()
            .map(|criterion| {
                self.filter_refs(
                    &criterion.parameter,
                    criterion.cut_criterion,
                    criterion.reverse_cut,
                    &request.scope,
                )
                .into_iter()
                .map(|share| share.ticker.as_str())
                .collect()
            })
            .collect();

        // Each pass already honors the scope; the outer check covers the
        // empty-criteria case.
        let mut selected: Vec<&ShareValuation> = self
            .shares
            .iter()
            .filter(|share| request.scope.admits(&share.ticker))
            .filter(|share| passing.iter().all(|set| set.contains(share.ticker.as_str())))
            .collect();

        if let Some(field) = ScreenField::from_name(&request.sort_by.parameter) {
            sort_shares(&mut selected, field, request.sort_by.ascending);
        } else {
            debug!(
                parameter = %request.sort_by.parameter,
                "unknown sort field, keeping universe order"
            );
        }

        let matched = selected.len();
        selected.truncate(request.limit);
        debug!("{} shares passed, returning {}", matched, selected.len());
        selected.into_iter().cloned().collect()
    }

    fn filter_refs(
        &self,
        parameter: &str,
        cut_criterion: f64,
        reverse_cut: bool,
        scope: &TickerScope,
    ) -> Vec<&ShareValuation> {
        let Some(field) = ScreenField::from_name(parameter) else {
            debug!(parameter, "unknown screen field, matching nothing");
            return Vec::new();
        };
        // Flipping the sign of both sides turns "above" into "below" while
        // keeping the comparison strict.
        let direction = if reverse_cut { -1.0 } else { 1.0 };

        self.shares
            .iter()
            .filter(|share| scope.admits(&share.ticker))
            .filter(|share| match field.value(share) {
                Some(value) => direction * value > direction * cut_criterion,
                None => false,
            })
            .collect()
    }
}

/// Sorts by the field in the requested direction. Shares whose field is
/// undefined go last either way.
fn sort_shares(shares: &mut [&ShareValuation], field: ScreenField, ascending: bool) {
    shares.sort_by(|a, b| match (field.value(a), field.value(b)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
