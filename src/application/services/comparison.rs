//! Comparison service: rank tariffs by the cost of one usage profile

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::rating::RatingEngine;
use crate::domain::{
    validate_and_build_tariff, ComparisonResult, CostBreakdown, RawTariff, TariffDefinition,
    UsageProfile,
};
use crate::support::errors::{CompareResult, ComparisonError};

impl RatingEngine {
    /// Rate every tariff in input order and rank the results.
    ///
    /// Stops at the first tariff that cannot be rated; no partial result is
    /// returned.
    pub fn compare(
        &self,
        profile: &UsageProfile,
        tariffs: &[TariffDefinition],
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> CompareResult<ComparisonResult> {
        check_tariff_set(tariffs)?;

        let breakdowns = tariffs
            .iter()
            .map(|tariff| {
                self.rate(profile, tariff, period_start, period_end)
                    .map_err(|source| ComparisonError::Rating {
                        tariff_id: tariff.id().to_string(),
                        source,
                    })
            })
            .collect::<CompareResult<Vec<_>>>()?;

        Ok(rank(breakdowns))
    }

    /// Validate raw tariff records, then [`compare`](Self::compare) them.
    pub fn compare_raw(
        &self,
        profile: &UsageProfile,
        tariffs: Vec<RawTariff>,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> CompareResult<ComparisonResult> {
        let tariffs = tariffs
            .into_iter()
            .map(|raw| {
                let tariff_id = raw.id.clone();
                validate_and_build_tariff(raw)
                    .map_err(|source| ComparisonError::InvalidTariff { tariff_id, source })
            })
            .collect::<CompareResult<Vec<_>>>()?;

        self.compare(profile, &tariffs, period_start, period_end)
    }

    /// Rate every tariff on the blocking pool and rank the results.
    ///
    /// Reports the same failure [`compare`](Self::compare) would: the first in
    /// input order. A panicking worker counts as a failure of its own tariff.
    /// Once a tariff fails, workers for later tariffs are aborted. Dropping the
    /// returned future aborts all outstanding workers.
    pub async fn compare_parallel(
        &self,
        profile: Arc<UsageProfile>,
        tariffs: Vec<TariffDefinition>,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> CompareResult<ComparisonResult> {
        check_tariff_set(&tariffs)?;

        let count = tariffs.len();
        let mut workers = JoinSet::new();
        let mut handles = Vec::with_capacity(count);
        for (index, tariff) in tariffs.into_iter().enumerate() {
            let engine = self.clone();
            let profile = Arc::clone(&profile);
            handles.push(workers.spawn_blocking(move || {
                let rated = panic::catch_unwind(AssertUnwindSafe(|| {
                    engine.rate(&profile, &tariff, period_start, period_end)
                }));
                let outcome = match rated {
                    Ok(result) => result.map_err(|source| ComparisonError::Rating {
                        tariff_id: tariff.id().to_string(),
                        source,
                    }),
                    Err(_) => Err(ComparisonError::Worker(format!(
                        "rating tariff '{}' panicked",
                        tariff.id()
                    ))),
                };
                (index, outcome)
            }));
        }

        let mut slots: Vec<Option<CostBreakdown>> = vec![None; count];
        let mut failure: Option<(usize, ComparisonError)> = None;
        while let Some(joined) = workers.join_next().await {
            // A join failure has no tariff index; rank it after every tariff.
            let (index, outcome) = match joined {
                Ok(done) => done,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => (count, Err(ComparisonError::Worker(e.to_string()))),
            };
            match outcome {
                Ok(breakdown) => slots[index] = Some(breakdown),
                Err(err) => {
                    if failure.as_ref().map_or(true, |(first, _)| index < *first) {
                        debug!(index, error = %err, "Aborting workers for later tariffs");
                        for handle in handles.iter().skip(index + 1) {
                            handle.abort();
                        }
                        failure = Some((index, err));
                    }
                }
            }
        }

        if let Some((_, err)) = failure {
            warn!(error = %err, "Parallel comparison failed");
            return Err(err);
        }

        let breakdowns = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ComparisonError::Worker("a rating worker produced no result".to_string()))?;
        Ok(rank(breakdowns))
    }

    /// Sequential or parallel comparison, as `parallel_compare` selects.
    pub async fn compare_auto(
        &self,
        profile: Arc<UsageProfile>,
        tariffs: Vec<TariffDefinition>,
        period_start: NaiveDateTime,
        period_end: NaiveDateTime,
    ) -> CompareResult<ComparisonResult> {
        if self.config().parallel_compare {
            self.compare_parallel(profile, tariffs, period_start, period_end)
                .await
        } else {
            self.compare(&profile, &tariffs, period_start, period_end)
        }
    }
}

/// [`RatingEngine::compare`] with the default configuration.
pub fn compare(
    profile: &UsageProfile,
    tariffs: &[TariffDefinition],
    period_start: NaiveDateTime,
    period_end: NaiveDateTime,
) -> CompareResult<ComparisonResult> {
    RatingEngine::default().compare(profile, tariffs, period_start, period_end)
}

/// Non-empty, single currency.
fn check_tariff_set(tariffs: &[TariffDefinition]) -> CompareResult<()> {
    let first = tariffs.first().ok_or(ComparisonError::NoTariffs)?;
    match tariffs.iter().find(|t| t.currency() != first.currency()) {
        Some(other) => Err(ComparisonError::MixedCurrencies {
            tariff_id: other.id().to_string(),
            expected: first.currency().to_string(),
            found: other.currency().to_string(),
        }),
        None => Ok(()),
    }
}

fn rank(breakdowns: Vec<CostBreakdown>) -> ComparisonResult {
    let result = ComparisonResult::from_breakdowns(breakdowns);
    if let Some(cheapest) = result.cheapest() {
        info!(
            tariffs = result.len(),
            cheapest = %cheapest.tariff_id,
            total_cost = %cheapest.total_cost,
            currency = %cheapest.currency,
            "Tariffs compared"
        );
    }
    result
}
