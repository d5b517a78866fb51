use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable line as stored on requests and lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseItem {
    pub article_number: String,
    pub name: String,
    pub supplier: String,
    pub unit: String,
    pub quantity: Decimal,
    /// Unit price excluding VAT.
    pub net_price: Decimal,
    pub vat_percent: Decimal,
}

impl PurchaseItem {
    /// Article number, name and supplier joined by `" - "`, skipping
    /// empty parts. Used to pick items from the catalogue.
    pub fn label(&self) -> String {
        [&self.article_number, &self.name, &self.supplier]
            .into_iter()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" - ")
    }

    /// Quantity × net price.
    pub fn net_total(&self) -> Decimal {
        self.quantity * self.net_price
    }

    /// VAT on [`net_total`](Self::net_total), rounded to cents.
    pub fn vat_amount(&self) -> Decimal {
        (self.net_total() * self.vat_percent / Decimal::ONE_HUNDRED).round_dp(2)
    }

    pub fn gross_total(&self) -> Decimal {
        self.net_total() + self.vat_amount()
    }
}

/// A purchase item as typed into a form: every field is free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseItemInput {
    pub article_number: String,
    pub name: String,
    pub supplier: String,
    pub unit: String,
    pub quantity: String,
    pub net_price: String,
    pub vat_percent: String,
}

/// Parse a form number; anything unparsable counts as zero.
fn parse_number(text: &str) -> Decimal {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .unwrap_or(Decimal::ZERO)
}

impl PurchaseItemInput {
    /// Trim the text fields and parse the numbers.
    pub fn clean(&self) -> PurchaseItem {
        PurchaseItem {
            article_number: self.article_number.trim().to_string(),
            name: self.name.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            unit: self.unit.trim().to_string(),
            quantity: parse_number(&self.quantity),
            net_price: parse_number(&self.net_price),
            vat_percent: parse_number(&self.vat_percent),
        }
    }
}

impl From<&PurchaseItem> for PurchaseItemInput {
    fn from(item: &PurchaseItem) -> Self {
        Self {
            article_number: item.article_number.clone(),
            name: item.name.clone(),
            supplier: item.supplier.clone(),
            unit: item.unit.clone(),
            quantity: item.quantity.normalize().to_string(),
            net_price: item.net_price.normalize().to_string(),
            vat_percent: item.vat_percent.normalize().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn clean_trims_and_parses() {
        let input = PurchaseItemInput {
            article_number: " A-12 ".into(),
            name: "Koffiebonen ".into(),
            supplier: "".into(),
            unit: " kg".into(),
            quantity: "2.5".into(),
            net_price: "abc".into(),
            vat_percent: "".into(),
        };
        let item = input.clean();
        assert_eq!(item.article_number, "A-12");
        assert_eq!(item.name, "Koffiebonen");
        assert_eq!(item.unit, "kg");
        assert_eq!(item.quantity, dec!(2.5));
        assert_eq!(item.net_price, Decimal::ZERO);
        assert_eq!(item.vat_percent, Decimal::ZERO);
    }

    #[test]
    fn label_skips_empty_parts() {
        let item = PurchaseItem {
            name: "Servetten".into(),
            supplier: "Horeca BV".into(),
            ..Default::default()
        };
        assert_eq!(item.label(), "Servetten - Horeca BV");
        assert_eq!(PurchaseItem::default().label(), "");
    }

    #[test]
    fn totals() {
        let item = PurchaseItem {
            quantity: dec!(3),
            net_price: dec!(12.50),
            vat_percent: dec!(21),
            ..Default::default()
        };
        assert_eq!(item.net_total(), dec!(37.50));
        assert_eq!(item.vat_amount(), dec!(7.88));
        assert_eq!(item.gross_total(), dec!(45.38));
    }

    #[test]
    fn stored_numbers_may_be_plain_json_numbers() {
        let item: PurchaseItem =
            serde_json::from_str(r#"{"name": "Zeep", "quantity": 4, "netPrice": 1.25}"#).unwrap();
        assert_eq!(item.quantity, dec!(4));
        assert_eq!(item.net_price, dec!(1.25));
        assert_eq!(item.vat_percent, Decimal::ZERO);
    }

    #[test]
    fn input_round_trips_through_item() {
        let item = PurchaseItem {
            name: "Thee".into(),
            quantity: dec!(2.50),
            ..Default::default()
        };
        let input = PurchaseItemInput::from(&item);
        assert_eq!(input.quantity, "2.5");
        assert_eq!(input.clean(), item);
    }
}
