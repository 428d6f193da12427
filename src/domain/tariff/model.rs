//! Tariff domain entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::{RateSchedule, RawRateBand};
use super::tiers::{RawTier, TierTable};
use crate::domain::EnergyUnit;
use crate::support::errors::{ValidationError, ValidationResult};

/// Period a fixed charge (standing or capacity) is quoted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandingChargePeriod {
    Daily,
    Monthly,
}

impl Default for StandingChargePeriod {
    fn default() -> Self {
        Self::Monthly
    }
}

impl std::fmt::Display for StandingChargePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Which pricing structure a tariff declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingKind {
    Flat,
    TimeOfUse,
    Tiered,
}

impl PricingKind {
    fn required_structure(&self) -> &'static str {
        match self {
            Self::Flat => "flat_rate",
            Self::TimeOfUse => "rate_bands",
            Self::Tiered => "tiers",
        }
    }
}

impl std::fmt::Display for PricingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::TimeOfUse => write!(f, "time_of_use"),
            Self::Tiered => write!(f, "tiered"),
        }
    }
}

/// Validated pricing structure
#[derive(Debug, Clone, PartialEq)]
pub enum Pricing {
    /// One price for every unit
    Flat { rate: Decimal },
    /// Price depends on when the unit was consumed
    TimeOfUse(RateSchedule),
    /// Price depends on cumulative consumption in the billing period
    Tiered(TierTable),
}

impl Pricing {
    pub fn kind(&self) -> PricingKind {
        match self {
            Self::Flat { .. } => PricingKind::Flat,
            Self::TimeOfUse(_) => PricingKind::TimeOfUse,
            Self::Tiered(_) => PricingKind::Tiered,
        }
    }
}

/// Per-unit adder charged on every consumed unit (network fees, levies, excise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surcharge {
    pub name: String,
    pub price_per_unit: Decimal,
}

impl Surcharge {
    pub fn new(name: impl Into<String>, price_per_unit: Decimal) -> Self {
        Self {
            name: name.into(),
            price_per_unit,
        }
    }
}

/// Immutable, validated tariff
#[derive(Debug, Clone, PartialEq)]
pub struct TariffDefinition {
    id: String,
    name: Option<String>,
    standing_charge: Decimal,
    standing_charge_period: StandingChargePeriod,
    pricing: Pricing,
    currency: String,
    unit: EnergyUnit,
    surcharges: Vec<Surcharge>,
    capacity_charge: Decimal,
    capacity_charge_period: StandingChargePeriod,
    export_credit_rate: Decimal,
    export_fee: Decimal,
}

impl TariffDefinition {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the identifier
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn standing_charge(&self) -> Decimal {
        self.standing_charge
    }

    pub fn standing_charge_period(&self) -> StandingChargePeriod {
        self.standing_charge_period
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn pricing_kind(&self) -> PricingKind {
        self.pricing.kind()
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn unit(&self) -> EnergyUnit {
        self.unit
    }

    pub fn surcharges(&self) -> &[Surcharge] {
        &self.surcharges
    }

    /// Price per unit of peak demand (kW for kWh tariffs) per capacity period
    pub fn capacity_charge(&self) -> Decimal {
        self.capacity_charge
    }

    pub fn capacity_charge_period(&self) -> StandingChargePeriod {
        self.capacity_charge_period
    }

    /// Credit paid per exported unit
    pub fn export_credit_rate(&self) -> Decimal {
        self.export_credit_rate
    }

    /// Network fee charged per exported unit
    pub fn export_fee(&self) -> Decimal {
        self.export_fee
    }
}

// ── Raw input ──────────────────────────────────────────────────

/// Unvalidated tariff fields as handed over by catalog loaders.
///
/// Exactly one of `flat_rate`, `rate_bands`, `tiers` must be present and it
/// must match `pricing_kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTariff {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub standing_charge: Decimal,
    #[serde(default)]
    pub standing_charge_period: StandingChargePeriod,
    pub pricing_kind: PricingKind,
    #[serde(default)]
    pub flat_rate: Option<Decimal>,
    #[serde(default)]
    pub rate_bands: Option<Vec<RawRateBand>>,
    #[serde(default)]
    pub tiers: Option<Vec<RawTier>>,
    pub currency: String,
    #[serde(default)]
    pub unit: EnergyUnit,
    #[serde(default)]
    pub surcharges: Vec<Surcharge>,
    #[serde(default)]
    pub capacity_charge: Decimal,
    #[serde(default)]
    pub capacity_charge_period: StandingChargePeriod,
    #[serde(default)]
    pub export_credit_rate: Decimal,
    #[serde(default)]
    pub export_fee: Decimal,
}

impl RawTariff {
    fn bare(id: impl Into<String>, currency: impl Into<String>, kind: PricingKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            standing_charge: Decimal::ZERO,
            standing_charge_period: StandingChargePeriod::default(),
            pricing_kind: kind,
            flat_rate: None,
            rate_bands: None,
            tiers: None,
            currency: currency.into(),
            unit: EnergyUnit::default(),
            surcharges: Vec::new(),
            capacity_charge: Decimal::ZERO,
            capacity_charge_period: StandingChargePeriod::default(),
            export_credit_rate: Decimal::ZERO,
            export_fee: Decimal::ZERO,
        }
    }

    pub fn flat(id: impl Into<String>, currency: impl Into<String>, rate: Decimal) -> Self {
        let mut raw = Self::bare(id, currency, PricingKind::Flat);
        raw.flat_rate = Some(rate);
        raw
    }

    pub fn time_of_use(
        id: impl Into<String>,
        currency: impl Into<String>,
        bands: Vec<RawRateBand>,
    ) -> Self {
        let mut raw = Self::bare(id, currency, PricingKind::TimeOfUse);
        raw.rate_bands = Some(bands);
        raw
    }

    pub fn tiered(id: impl Into<String>, currency: impl Into<String>, tiers: Vec<RawTier>) -> Self {
        let mut raw = Self::bare(id, currency, PricingKind::Tiered);
        raw.tiers = Some(tiers);
        raw
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_standing_charge(mut self, amount: Decimal, period: StandingChargePeriod) -> Self {
        self.standing_charge = amount;
        self.standing_charge_period = period;
        self
    }

    pub fn with_unit(mut self, unit: EnergyUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_surcharge(mut self, surcharge: Surcharge) -> Self {
        self.surcharges.push(surcharge);
        self
    }

    pub fn with_capacity_charge(mut self, price: Decimal, period: StandingChargePeriod) -> Self {
        self.capacity_charge = price;
        self.capacity_charge_period = period;
        self
    }

    /// Pay `credit_rate` and charge `fee` per exported unit.
    pub fn with_export(mut self, credit_rate: Decimal, fee: Decimal) -> Self {
        self.export_credit_rate = credit_rate;
        self.export_fee = fee;
        self
    }
}

/// Validate raw tariff fields and build an immutable [`TariffDefinition`].
///
/// All structural checks happen here; rating trusts the result.
pub fn validate_and_build_tariff(raw: RawTariff) -> ValidationResult<TariffDefinition> {
    if raw.id.trim().is_empty() {
        return Err(ValidationError::EmptyIdentifier);
    }
    if raw.currency.trim().is_empty() {
        return Err(ValidationError::EmptyCurrency);
    }
    if raw.standing_charge < Decimal::ZERO {
        return Err(ValidationError::NegativeAmount {
            field: "standing charge".to_string(),
            value: raw.standing_charge,
        });
    }
    for (field, value) in [
        ("capacity charge", raw.capacity_charge),
        ("export credit rate", raw.export_credit_rate),
        ("export fee", raw.export_fee),
    ] {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount {
                field: field.to_string(),
                value,
            });
        }
    }
    if let Some(s) = raw.surcharges.iter().find(|s| s.price_per_unit < Decimal::ZERO) {
        return Err(ValidationError::NegativeAmount {
            field: format!("surcharge '{}'", s.name),
            value: s.price_per_unit,
        });
    }

    let pricing = match (raw.pricing_kind, raw.flat_rate, raw.rate_bands, raw.tiers) {
        (PricingKind::Flat, Some(rate), None, None) => {
            if rate < Decimal::ZERO {
                return Err(ValidationError::NegativeAmount {
                    field: "flat rate".to_string(),
                    value: rate,
                });
            }
            Pricing::Flat { rate }
        }
        (PricingKind::TimeOfUse, None, Some(bands), None) => {
            Pricing::TimeOfUse(RateSchedule::build(bands)?)
        }
        (PricingKind::Tiered, None, None, Some(tiers)) => Pricing::Tiered(TierTable::build(tiers)?),
        (kind, ..) => {
            return Err(ValidationError::PricingMismatch {
                kind,
                expected: kind.required_structure(),
            })
        }
    };

    Ok(TariffDefinition {
        id: raw.id,
        name: raw.name,
        standing_charge: raw.standing_charge,
        standing_charge_period: raw.standing_charge_period,
        pricing,
        currency: raw.currency,
        unit: raw.unit,
        surcharges: raw.surcharges,
        capacity_charge: raw.capacity_charge,
        capacity_charge_period: raw.capacity_charge_period,
        export_credit_rate: raw.export_credit_rate,
        export_fee: raw.export_fee,
    })
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn builds_flat_tariff() {
        let tariff = validate_and_build_tariff(
            RawTariff::flat("fixed", "EUR", dec("0.1187"))
                .with_name("Groene Burgerstroom")
                .with_standing_charge(dec("7.005"), StandingChargePeriod::Monthly)
                .with_surcharge(Surcharge::new("distribution", dec("0.0704386"))),
        )
        .unwrap();

        assert_eq!(tariff.id(), "fixed");
        assert_eq!(tariff.name(), "Groene Burgerstroom");
        assert_eq!(tariff.pricing_kind(), PricingKind::Flat);
        assert_eq!(tariff.pricing(), &Pricing::Flat { rate: dec("0.1187") });
        assert_eq!(tariff.surcharges().len(), 1);
        assert_eq!(tariff.unit(), EnergyUnit::Kwh);
    }

    #[test]
    fn name_falls_back_to_id() {
        let tariff = validate_and_build_tariff(RawTariff::flat("basic", "EUR", dec("0.2"))).unwrap();
        assert_eq!(tariff.name(), "basic");
    }

    #[test]
    fn rejects_kind_structure_mismatch() {
        let mut raw = RawTariff::flat("odd", "EUR", dec("0.2"));
        raw.pricing_kind = PricingKind::Tiered;
        assert_eq!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::PricingMismatch {
                kind: PricingKind::Tiered,
                expected: "tiers"
            }
        );
    }

    #[test]
    fn rejects_two_populated_structures() {
        let mut raw = RawTariff::flat("double", "EUR", dec("0.2"));
        raw.tiers = Some(vec![RawTier::unbounded(dec("0"), dec("0.1"))]);
        assert!(matches!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::PricingMismatch {
                kind: PricingKind::Flat,
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_standing_charge_and_surcharge() {
        let raw = RawTariff::flat("neg", "EUR", dec("0.2"))
            .with_standing_charge(dec("-1"), StandingChargePeriod::Daily);
        assert!(matches!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::NegativeAmount { .. }
        ));

        let raw = RawTariff::flat("neg", "EUR", dec("0.2"))
            .with_surcharge(Surcharge::new("rebate", dec("-0.02")));
        assert_eq!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::NegativeAmount {
                field: "surcharge 'rebate'".to_string(),
                value: dec("-0.02")
            }
        );
    }

    #[test]
    fn carries_capacity_and_export_prices() {
        let tariff = validate_and_build_tariff(
            RawTariff::flat("prosumer", "EUR", dec("0.2"))
                .with_capacity_charge(dec("4.744"), StandingChargePeriod::Monthly)
                .with_export(dec("0.02"), dec("0.001751")),
        )
        .unwrap();
        assert_eq!(tariff.capacity_charge(), dec("4.744"));
        assert_eq!(tariff.capacity_charge_period(), StandingChargePeriod::Monthly);
        assert_eq!(tariff.export_credit_rate(), dec("0.02"));
        assert_eq!(tariff.export_fee(), dec("0.001751"));

        let raw = RawTariff::flat("bad", "EUR", dec("0.2")).with_export(dec("-0.02"), dec("0"));
        assert_eq!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::NegativeAmount {
                field: "export credit rate".to_string(),
                value: dec("-0.02")
            }
        );
    }

    #[test]
    fn rejects_empty_identifier_and_currency() {
        assert_eq!(
            validate_and_build_tariff(RawTariff::flat("  ", "EUR", dec("0.2"))).unwrap_err(),
            ValidationError::EmptyIdentifier
        );
        assert_eq!(
            validate_and_build_tariff(RawTariff::flat("x", "", dec("0.2"))).unwrap_err(),
            ValidationError::EmptyCurrency
        );
    }

    #[test]
    fn band_errors_surface_from_builder() {
        let raw = RawTariff::time_of_use(
            "tou",
            "EUR",
            vec![RawRateBand::daily("day", t(7), t(22), dec("0.3"))],
        );
        assert!(matches!(
            validate_and_build_tariff(raw).unwrap_err(),
            ValidationError::BandPartition(_)
        ));
    }

    #[test]
    fn deserializes_from_json_record() {
        let json = r#"{
            "id": "economy-7",
            "standing_charge": "0.45",
            "standing_charge_period": "daily",
            "pricing_kind": "time_of_use",
            "rate_bands": [
                {"label": "day", "start": "07:00:00", "end": "00:00:00", "price_per_unit": "0.31"},
                {"label": "night", "start": "00:00:00", "end": "07:00:00", "price_per_unit": "0.14"}
            ],
            "currency": "GBP",
            "unit": "kWh"
        }"#;
        let raw: RawTariff = serde_json::from_str(json).unwrap();
        let tariff = validate_and_build_tariff(raw).unwrap();
        assert_eq!(tariff.standing_charge_period(), StandingChargePeriod::Daily);
        match tariff.pricing() {
            Pricing::TimeOfUse(schedule) => assert_eq!(schedule.bands().len(), 2),
            other => panic!("unexpected pricing {other:?}"),
        }
    }
}
