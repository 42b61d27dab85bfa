use serde::{Deserialize, Serialize};

/// One screen criterion: a field name, a threshold, and a direction.
///
/// With `reverse_cut` unset the criterion keeps shares whose field is
/// strictly above `cut_criterion`; set, it keeps shares strictly below.
/// Shares whose field is undefined never pass either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
    pub parameter: String,
    #[serde(default)]
    pub cut_criterion: f64,
    #[serde(default)]
    pub reverse_cut: bool,
}

/// Result ordering for a screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    pub parameter: String,
    pub ascending: bool,
}

impl Default for SortSpec {
    /// Best Graham upside first.
    fn default() -> Self {
        Self {
            parameter: "graham_valuation".to_string(),
            ascending: false,
        }
    }
}

/// Ticker-level scoping applied before any criterion is evaluated.
///
/// `exclude` always wins over `restrict_to`. An empty `restrict_to` means
/// the whole universe is eligible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerScope {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub restrict_to: Vec<String>,
}

impl TickerScope {
    pub fn admits(&self, ticker: &str) -> bool {
        if self.exclude.iter().any(|t| t == ticker) {
            return false;
        }
        self.restrict_to.is_empty() || self.restrict_to.iter().any(|t| t == ticker)
    }
}

/// A complete screen: conjunctive criteria, ordering, and a result cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default)]
    pub sort_by: SortSpec,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub scope: TickerScope,
}

fn default_limit() -> usize {
    50
}

impl Default for ScreenRequest {
    fn default() -> Self {
        Self {
            criteria: Vec::new(),
            sort_by: SortSpec::default(),
            limit: default_limit(),
            scope: TickerScope::default(),
        }
    }
}
