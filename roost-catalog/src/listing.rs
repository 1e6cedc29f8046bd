use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roost_core::OrgScoped;

use crate::pricing::PricingError;

/// A single monetary rule attached to a listing's premium schedule or
/// passed per request (amenities, ad hoc discounts).
///
/// `is_amount` selects a fixed currency amount; otherwise `amount` is a
/// percentage (0–100) of the base rate. `is_weekend_only` and `days` are
/// only meaningful for discounts. Immutable once attached to a persisted
/// listing version; a new value is a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeItem {
    pub name: String,
    pub is_amount: bool,
    pub amount: Decimal,
    #[serde(default)]
    pub is_paid_daily: bool,
    #[serde(default)]
    pub is_weekend_only: bool,
    /// Minimum consecutive nights required for the discount to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<i64>,
}

impl ChargeItem {
    pub fn fixed(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            is_amount: true,
            amount,
            is_paid_daily: false,
            is_weekend_only: false,
            days: None,
        }
    }

    pub fn percentage(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            is_amount: false,
            amount,
            is_paid_daily: false,
            is_weekend_only: false,
            days: None,
        }
    }
}

/// Validate one caller-supplied charge-item array wholesale.
///
/// The whole batch is rejected with an error naming the offending array
/// before any item in it is priced or persisted.
pub fn validate_charge_items(field: &str, items: &[ChargeItem]) -> Result<(), PricingError> {
    for item in items {
        if item.name.trim().is_empty() {
            return Err(PricingError::InvalidChargeItem {
                field: field.to_string(),
                reason: format!("all {} should have name, isAmount and amount fields", field),
            });
        }
        if item.amount < Decimal::ZERO {
            return Err(PricingError::InvalidChargeItem {
                field: field.to_string(),
                reason: format!("{} has a negative amount", item.name),
            });
        }
        if !item.is_amount && item.amount > Decimal::ONE_HUNDRED {
            return Err(PricingError::InvalidChargeItem {
                field: field.to_string(),
                reason: format!("{} is a percentage greater than 100", item.name),
            });
        }
    }
    Ok(())
}

/// The set of statutory premiums, loadings, discounts and amenities used
/// to price a stay on this listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumSchedule {
    pub basic_premium: Decimal,
    #[serde(default)]
    pub statutory_premiums: Vec<ChargeItem>,
    #[serde(default)]
    pub loadings: Vec<ChargeItem>,
    #[serde(default)]
    pub discounts: Vec<ChargeItem>,
    #[serde(default)]
    pub amenities: Vec<ChargeItem>,
}

impl PremiumSchedule {
    pub fn new(basic_premium: Decimal) -> Self {
        Self {
            basic_premium,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PricingError> {
        validate_charge_items("statutoryPremiums", &self.statutory_premiums)?;
        validate_charge_items("loadings", &self.loadings)?;
        validate_charge_items("discounts", &self.discounts)?;
        validate_charge_items("amenities", &self.amenities)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Inactive,
}

/// A bookable unit in the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub organisation_id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub listing_type: String,
    pub longitude: f64,
    pub latitude: f64,
    pub status: ListingStatus,
    pub premium: PremiumSchedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrgScoped for Listing {
    fn organisation_id(&self) -> Option<&str> {
        self.organisation_id.as_deref()
    }

    fn set_organisation_id(&mut self, organisation_id: Option<String>) {
        self.organisation_id = organisation_id;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub name: String,
    pub description: String,
    pub listing_type: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Base nightly rate; becomes the schedule's `basicPremium`.
    pub amount: Decimal,
    #[serde(default)]
    pub statutory_premiums: Vec<ChargeItem>,
    #[serde(default)]
    pub loadings: Vec<ChargeItem>,
    #[serde(default)]
    pub discounts: Vec<ChargeItem>,
    #[serde(default)]
    pub amenities: Vec<ChargeItem>,
}

/// Partial update for a listing. System fields (id, owner, organisation)
/// are not part of the patch and therefore cannot be overwritten.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub listing_type: Option<String>,
    pub amount: Option<Decimal>,
    pub status: Option<ListingStatus>,
    pub statutory_premiums: Option<Vec<ChargeItem>>,
    pub loadings: Option<Vec<ChargeItem>>,
    pub discounts: Option<Vec<ChargeItem>>,
    pub amenities: Option<Vec<ChargeItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_with_unnamed_item_is_rejected_wholesale() {
        let items = vec![
            ChargeItem::fixed("cleaning", Decimal::new(5, 0)),
            ChargeItem::fixed("", Decimal::new(3, 0)),
        ];
        let err = validate_charge_items("loadings", &items).unwrap_err();
        match err {
            PricingError::InvalidChargeItem { field, .. } => assert_eq!(field, "loadings"),
        }
    }

    #[test]
    fn percentage_above_hundred_is_rejected() {
        let items = vec![ChargeItem::percentage("vat", Decimal::new(120, 0))];
        assert!(validate_charge_items("statutoryPremiums", &items).is_err());
    }

    #[test]
    fn valid_batch_passes() {
        let items = vec![
            ChargeItem::percentage("vat", Decimal::new(16, 0)),
            ChargeItem::fixed("levy", Decimal::new(50, 0)),
        ];
        assert!(validate_charge_items("statutoryPremiums", &items).is_ok());
    }
}
