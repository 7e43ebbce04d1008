use serde::Deserialize;
use std::cmp::Ordering;

/// How a new sale price is ordered against the stored one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceComparison {
    /// Plain string ordering of the formatted prices. Only matches numeric order
    /// when both strings have the same number of digits before the decimal point:
    /// "9.5" sorts after "10.5".
    #[default]
    Lexicographic,
    /// Parses both sides as numbers; falls back to string ordering if either
    /// side does not parse.
    Numeric,
}

impl PriceComparison {
    pub fn compare(self, new: &str, stored: &str) -> Ordering {
        match self {
            Self::Lexicographic => new.cmp(stored),
            Self::Numeric => match (new.trim().parse::<f64>(), stored.trim().parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or_else(|| new.cmp(stored)),
                _ => new.cmp(stored),
            },
        }
    }

    /// True when `new` counts as a price drop against `stored`.
    pub fn is_decrease(self, new: &str, stored: &str) -> bool {
        self.compare(new, stored) == Ordering::Less
    }
}
