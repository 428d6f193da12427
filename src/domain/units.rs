//! Metered energy units and conversion between them

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unit a usage profile is metered in, or a tariff is priced per.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyUnit {
    #[serde(rename = "Wh")]
    Wh,
    #[serde(rename = "kWh")]
    Kwh,
    #[serde(rename = "MWh")]
    Mwh,
    #[serde(rename = "therm")]
    Therm,
    #[serde(rename = "m3")]
    CubicMetre,
}

impl Default for EnergyUnit {
    fn default() -> Self {
        Self::Kwh
    }
}

impl EnergyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wh => "Wh",
            Self::Kwh => "kWh",
            Self::Mwh => "MWh",
            Self::Therm => "therm",
            Self::CubicMetre => "m3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Wh" | "wh" => Some(Self::Wh),
            "kWh" | "kwh" => Some(Self::Kwh),
            "MWh" | "mwh" => Some(Self::Mwh),
            "therm" => Some(Self::Therm),
            "m3" => Some(Self::CubicMetre),
            _ => None,
        }
    }

    /// Watt-hours per unit for the electrical family; `None` otherwise.
    fn watt_hours(&self) -> Option<Decimal> {
        match self {
            Self::Wh => Some(Decimal::ONE),
            Self::Kwh => Some(Decimal::ONE_THOUSAND),
            Self::Mwh => Some(Decimal::from(1_000_000)),
            Self::Therm | Self::CubicMetre => None,
        }
    }
}

impl std::fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared conversion: one `from` unit equals `factor` `to` units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub from: EnergyUnit,
    pub to: EnergyUnit,
    pub factor: Decimal,
}

/// Multiplier turning a quantity in `from` into a quantity in `to`.
///
/// Units of the electrical family convert with exact factors. Any other pair
/// needs an entry in `declared` (either direction). Declarations with a
/// factor that is not positive are ignored. Returns `None` when no conversion
/// is known; callers must not guess one.
pub fn conversion_factor(
    from: EnergyUnit,
    to: EnergyUnit,
    declared: &[UnitConversion],
) -> Option<Decimal> {
    if from == to {
        return Some(Decimal::ONE);
    }

    if let (Some(from_wh), Some(to_wh)) = (from.watt_hours(), to.watt_hours()) {
        return Some(from_wh / to_wh);
    }

    declared
        .iter()
        .filter(|c| c.factor > Decimal::ZERO)
        .find_map(|c| {
            if c.from == from && c.to == to {
                Some(c.factor)
            } else if c.from == to && c.to == from {
                Some(Decimal::ONE / c.factor)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electrical_units_convert_exactly() {
        assert_eq!(
            conversion_factor(EnergyUnit::Wh, EnergyUnit::Kwh, &[]),
            Some(Decimal::new(1, 3))
        );
        assert_eq!(
            conversion_factor(EnergyUnit::Mwh, EnergyUnit::Kwh, &[]),
            Some(Decimal::ONE_THOUSAND)
        );
        assert_eq!(
            conversion_factor(EnergyUnit::Kwh, EnergyUnit::Kwh, &[]),
            Some(Decimal::ONE)
        );
    }

    #[test]
    fn therm_needs_a_declared_conversion() {
        assert_eq!(conversion_factor(EnergyUnit::Kwh, EnergyUnit::Therm, &[]), None);

        let declared = [UnitConversion {
            from: EnergyUnit::Therm,
            to: EnergyUnit::Kwh,
            factor: "29.3071".parse().unwrap(),
        }];
        assert_eq!(
            conversion_factor(EnergyUnit::Therm, EnergyUnit::Kwh, &declared),
            Some("29.3071".parse().unwrap())
        );
        // reverse direction is derived from the same declaration
        let reverse = conversion_factor(EnergyUnit::Kwh, EnergyUnit::Therm, &declared).unwrap();
        assert_eq!(reverse, Decimal::ONE / "29.3071".parse::<Decimal>().unwrap());
    }

    #[test]
    fn non_positive_declared_factors_are_ignored() {
        let declared = [
            UnitConversion {
                from: EnergyUnit::Therm,
                to: EnergyUnit::Kwh,
                factor: Decimal::ZERO,
            },
            UnitConversion {
                from: EnergyUnit::CubicMetre,
                to: EnergyUnit::Kwh,
                factor: Decimal::NEGATIVE_ONE,
            },
        ];
        assert_eq!(conversion_factor(EnergyUnit::Therm, EnergyUnit::Kwh, &declared), None);
        assert_eq!(conversion_factor(EnergyUnit::Kwh, EnergyUnit::Therm, &declared), None);
        assert_eq!(conversion_factor(EnergyUnit::CubicMetre, EnergyUnit::Kwh, &declared), None);
    }

    #[test]
    fn unit_labels_round_trip() {
        for unit in [
            EnergyUnit::Wh,
            EnergyUnit::Kwh,
            EnergyUnit::Mwh,
            EnergyUnit::Therm,
            EnergyUnit::CubicMetre,
        ] {
            assert_eq!(EnergyUnit::from_str(unit.as_str()), Some(unit));
        }
        assert_eq!(EnergyUnit::from_str("joule"), None);
        assert_eq!(EnergyUnit::Kwh.to_string(), "kWh");
    }
}
