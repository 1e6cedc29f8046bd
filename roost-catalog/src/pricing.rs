use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::listing::{validate_charge_items, ChargeItem};

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("invalid {field}: {reason}")]
    InvalidChargeItem { field: String, reason: String },
}

/// A charge item priced against a concrete stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCharge {
    #[serde(flatten)]
    pub item: ChargeItem,
    pub value: Decimal,
}

/// Immutable snapshot of the payable amount for one booking.
///
/// Amenities are itemized and totalled for reporting but never folded into
/// `amount`. A price change means a new booking with a new receipt, never
/// an edit in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Base rate already multiplied by the number of nights.
    pub basic_premium: Decimal,
    pub total_statutory_premiums: Decimal,
    pub total_loading_amounts: Decimal,
    pub total_discounts_amounts: Decimal,
    pub total_amenities_amounts: Decimal,
    pub applied_discounts: Vec<AppliedCharge>,
    pub applied_amenities: Vec<AppliedCharge>,
    pub amount: Decimal,
}

/// Computes an itemized receipt from a base rate plus statutory charges,
/// loadings, amenities and conditionally eligible discounts.
///
/// Stateless; every computation is a pure function of its inputs, including
/// the `today` date used by the weekend-eligibility check.
#[derive(Debug, Default)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Price a single charge item against the base rate.
    ///
    /// A percentage item is `amount`% of the base rate; a daily item is
    /// multiplied by the number of nights.
    pub fn apply_charge(item: &ChargeItem, base_rate: Decimal, number_of_days: i64) -> Decimal {
        let magnitude = if item.is_amount {
            item.amount
        } else {
            (item.amount * base_rate) / Decimal::ONE_HUNDRED
        };

        if item.is_paid_daily {
            magnitude * Decimal::from(number_of_days)
        } else {
            magnitude
        }
    }

    /// Filter a discount list down to the ones the stay is eligible for.
    ///
    /// A discount applies if it is weekend-only and `today` falls on a
    /// weekend, or if the stay meets its minimum consecutive-nights bar.
    /// A discount matching both predicates is applied once. Eligibility is
    /// checked against the computation date, not the stay dates.
    pub fn applicable_discounts(
        discounts: &[ChargeItem],
        number_of_days: i64,
        today: NaiveDate,
    ) -> Vec<ChargeItem> {
        discounts
            .iter()
            .filter(|discount| {
                let weekend_ok = discount.is_weekend_only
                    && matches!(today.weekday(), Weekday::Sat | Weekday::Sun);
                let days_ok = discount
                    .days
                    .is_some_and(|required| number_of_days >= required);
                weekend_ok || days_ok
            })
            .cloned()
            .collect()
    }

    /// Build the receipt for a stay.
    ///
    /// Every caller-influenced array is validated wholesale before any item
    /// is priced. All matching discounts stack additively; there is no
    /// precedence rule.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_receipt(
        &self,
        base_rate: Decimal,
        number_of_days: i64,
        statutory_premiums: &[ChargeItem],
        loadings: &[ChargeItem],
        discounts: &[ChargeItem],
        amenities: &[ChargeItem],
        today: NaiveDate,
    ) -> Result<Receipt, PricingError> {
        validate_charge_items("statutoryPremiums", statutory_premiums)?;
        validate_charge_items("loadings", loadings)?;
        validate_charge_items("discounts", discounts)?;
        validate_charge_items("amenities", amenities)?;

        let eligible = Self::applicable_discounts(discounts, number_of_days, today);

        let statutory = Self::price_all(statutory_premiums, base_rate, number_of_days);
        let loading = Self::price_all(loadings, base_rate, number_of_days);
        let discount = Self::price_all(&eligible, base_rate, number_of_days);
        let amenity = Self::price_all(amenities, base_rate, number_of_days);

        let basic_premium = base_rate * Decimal::from(number_of_days);
        let amount = basic_premium + total(&statutory) + total(&loading) - total(&discount);

        Ok(Receipt {
            basic_premium,
            total_statutory_premiums: total(&statutory),
            total_loading_amounts: total(&loading),
            total_discounts_amounts: total(&discount),
            total_amenities_amounts: total(&amenity),
            applied_discounts: discount,
            applied_amenities: amenity,
            amount,
        })
    }

    fn price_all(
        items: &[ChargeItem],
        base_rate: Decimal,
        number_of_days: i64,
    ) -> Vec<AppliedCharge> {
        items
            .iter()
            .map(|item| AppliedCharge {
                value: Self::apply_charge(item, base_rate, number_of_days),
                item: item.clone(),
            })
            .collect()
    }
}

fn total(charges: &[AppliedCharge]) -> Decimal {
    charges.iter().map(|c| c.value).sum()
}
