//! Tiered (block) pricing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::support::errors::{ValidationError, ValidationResult};

/// Unvalidated tier. `threshold_high: None` marks the unbounded top tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTier {
    pub threshold_low: Decimal,
    #[serde(default)]
    pub threshold_high: Option<Decimal>,
    pub price_per_unit: Decimal,
}

impl RawTier {
    pub fn bounded(low: Decimal, high: Decimal, price: Decimal) -> Self {
        Self {
            threshold_low: low,
            threshold_high: Some(high),
            price_per_unit: price,
        }
    }

    pub fn unbounded(low: Decimal, price: Decimal) -> Self {
        Self {
            threshold_low: low,
            threshold_high: None,
            price_per_unit: price,
        }
    }
}

/// Consumption in `[threshold_low, threshold_high)` is priced at `price_per_unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub threshold_low: Decimal,
    pub threshold_high: Option<Decimal>,
    pub price_per_unit: Decimal,
}

impl Tier {
    pub fn label(&self) -> String {
        match self.threshold_high {
            Some(high) => format!("{}-{}", self.threshold_low, high),
            None => format!("{}+", self.threshold_low),
        }
    }
}

/// Contiguous tiers in ascending threshold order, starting at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    pub fn build(raw: Vec<RawTier>) -> ValidationResult<Self> {
        if raw.is_empty() {
            return Err(ValidationError::TierLayout(
                "at least one tier is required".to_string(),
            ));
        }

        let last = raw.len() - 1;
        for (index, tier) in raw.iter().enumerate() {
            let number = index + 1;
            if tier.threshold_low < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: format!("lower threshold of tier {number}"),
                    value: tier.threshold_low,
                });
            }
            if tier.price_per_unit < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: format!("price of tier {number}"),
                    value: tier.price_per_unit,
                });
            }
            match tier.threshold_high {
                Some(high) if high <= tier.threshold_low => {
                    return Err(ValidationError::TierLayout(format!(
                        "tier {number} upper threshold {high} is not above its lower threshold {}",
                        tier.threshold_low
                    )));
                }
                None if index != last => {
                    return Err(ValidationError::TierLayout(format!(
                        "only the last tier may be unbounded, tier {number} is not last"
                    )));
                }
                _ => {}
            }
        }

        if !raw[0].threshold_low.is_zero() {
            return Err(ValidationError::TierLayout(format!(
                "first tier must start at 0, starts at {}",
                raw[0].threshold_low
            )));
        }

        for (index, pair) in raw.windows(2).enumerate() {
            if pair[0].threshold_high != Some(pair[1].threshold_low) {
                return Err(ValidationError::TierLayout(format!(
                    "tier {} starts at {} but tier {} ends at {}",
                    index + 2,
                    pair[1].threshold_low,
                    index + 1,
                    pair[0]
                        .threshold_high
                        .map_or_else(|| "infinity".to_string(), |h| h.to_string())
                )));
            }
        }

        let tiers = raw
            .into_iter()
            .map(|t| Tier {
                threshold_low: t.threshold_low,
                threshold_high: t.threshold_high,
                price_per_unit: t.price_per_unit,
            })
            .collect();
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Upper threshold of the top tier, `None` when it is unbounded.
    pub fn ceiling(&self) -> Option<Decimal> {
        self.tiers.last().and_then(|t| t.threshold_high)
    }

    /// Split a cumulative `total` across the tiers in threshold order.
    ///
    /// Returns the amount falling into each tier, plus whatever exceeds a
    /// bounded top tier.
    pub fn allocate(&self, total: Decimal) -> (Vec<Decimal>, Decimal) {
        let mut remaining = total;
        let amounts = self
            .tiers
            .iter()
            .map(|tier| {
                let amount = match tier.threshold_high {
                    Some(high) => remaining.min(high - tier.threshold_low),
                    None => remaining,
                };
                remaining -= amount;
                amount
            })
            .collect();
        (amounts, remaining)
    }
}
