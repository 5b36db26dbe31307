//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │      Sale       │   │  SaleLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  lines ─────────┼──►│  item_id        │       │
//! │  │  owner_id       │   │  owner_id       │   │  name (frozen)  │       │
//! │  │  size           │   │  state          │   │  size (frozen)  │       │
//! │  │  quantity       │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Size       │   │   SaleState     │   │ PaymentMethod   │       │
//! │  │  XS … XXXL      │   │  Active         │   │  cash, card,    │       │
//! │  └─────────────────┘   │  Voided { at }  │   │  gcash, …       │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every item and sale carries the `owner_id` of the user it belongs to.
//! Lookups are always scoped by owner; nothing in this crate reads an
//! ambient "current user".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Size
// =============================================================================

/// Garment size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Size {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
    Xxxl,
}

impl Size {
    /// Every size, smallest first.
    pub const ALL: [Size; 7] = [
        Size::Xs,
        Size::S,
        Size::M,
        Size::L,
        Size::Xl,
        Size::Xxl,
        Size::Xxxl,
    ];

    /// The label stored in the database and shown on receipts.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Size::Xs => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::Xl => "XL",
            Size::Xxl => "XXL",
            Size::Xxxl => "XXXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Size::ALL
            .into_iter()
            .find(|size| size.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "size".to_string(),
                allowed: Size::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Gcash,
    Paymaya,
    BankTransfer,
    Other,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Gcash => "gcash",
            PaymentMethod::Paymaya => "paymaya",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A garment in an owner's catalog.
///
/// `quantity` is quantity-on-hand and never goes below zero. Only the
/// inventory ledger changes it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// User this item belongs to.
    pub owner_id: String,

    /// Display name, frozen onto sale lines at the time of sale.
    pub name: String,

    pub description: Option<String>,

    pub size: Size,

    /// Selling price in centavos.
    pub price_cents: i64,

    /// Acquisition cost in centavos.
    pub cost_cents: i64,

    /// Quantity on hand.
    pub quantity: i64,

    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Checks if `quantity` units can be taken from stock.
    pub fn can_fulfil(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Payload for registering a new item in an owner's catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewInventoryItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub size: Size,
    pub price_cents: i64,
    pub cost_cents: i64,
    /// Opening stock.
    pub quantity: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line of a sale.
///
/// Uses the snapshot pattern: name and size are copied from the item when
/// the sale is recorded, so the line still reads correctly after the item
/// is renamed or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    /// The inventory item this line was reserved from.
    pub item_id: String,
    /// Item name at time of sale (frozen).
    pub name: String,
    /// Item size at time of sale (frozen). Absent on legacy records.
    pub size: Option<Size>,
    /// Units sold (≥ 1).
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit price.
    pub line_total_cents: i64,
}

impl SaleLineItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Sale State
// =============================================================================

/// Lifecycle of a sale.
///
/// ```text
///   create_sale()            void_sale()
///  ─────────────► Active ─────────────────► Voided { at }   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaleState {
    #[default]
    Active,
    Voided {
        #[ts(as = "String")]
        at: DateTime<Utc>,
    },
}

impl SaleState {
    /// Builds the state from the nullable `voided_at` column.
    pub fn from_voided_at(voided_at: Option<DateTime<Utc>>) -> Self {
        match voided_at {
            Some(at) => SaleState::Voided { at },
            None => SaleState::Active,
        }
    }

    /// The void timestamp, if any.
    pub fn voided_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SaleState::Active => None,
            SaleState::Voided { at } => Some(*at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SaleState::Active)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
///
/// Lines and totals are fixed at creation. The only later change is the
/// `Active → Voided` transition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub owner_id: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub lines: Vec<SaleLineItem>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub notes: Option<String>,
    pub state: SaleState,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Total units across all lines.
    pub fn items_sold(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

// =============================================================================
// Create-Sale Request
// =============================================================================

/// One cart line as submitted by the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Size the client displayed; the item's current size is used when absent.
    #[serde(default)]
    pub size: Option<Size>,
}

/// A proposed sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSaleRequest {
    pub lines: Vec<SaleLineRequest>,
    #[serde(default)]
    pub discount_cents: i64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateSaleRequest {
    /// A cash sale with no discount and no customer details.
    pub fn new(lines: Vec<SaleLineRequest>) -> Self {
        CreateSaleRequest {
            lines,
            discount_cents: 0,
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            customer_contact: None,
            notes: None,
        }
    }

    pub fn with_discount(mut self, discount_cents: i64) -> Self {
        self.discount_cents = discount_cents;
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// Inclusive window over sale dates. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub start: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// No bounds: every sale matches.
    pub fn all() -> Self {
        DateRange::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_size_parsing() {
        assert_eq!("xl".parse::<Size>().unwrap(), Size::Xl);
        assert_eq!(" XXXL ".parse::<Size>().unwrap(), Size::Xxxl);
        assert!("XXXXL".parse::<Size>().is_err());
        assert_eq!(Size::Xxl.to_string(), "XXL");
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_sale_state_roundtrips_void_column() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        let state = SaleState::from_voided_at(Some(at));
        assert_eq!(state, SaleState::Voided { at });
        assert_eq!(state.voided_at(), Some(at));
        assert!(!state.is_active());

        assert!(SaleState::from_voided_at(None).is_active());
    }

    #[test]
    fn test_sale_state_serializes_tagged() {
        let json = serde_json::to_value(SaleState::Active).unwrap();
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_create_sale_request_defaults() {
        let req: CreateSaleRequest = serde_json::from_str(
            r#"{"lines":[{"item_id":"a","quantity":1,"unit_price_cents":100}]}"#,
        )
        .unwrap();
        assert_eq!(req.discount_cents, 0);
        assert_eq!(req.payment_method, PaymentMethod::Cash);
        assert!(req.lines[0].size.is_none());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(1);
        let range = DateRange::between(start, end);

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(end + Duration::seconds(1)));
        assert!(!range.contains(start - Duration::seconds(1)));
        assert!(DateRange::all().contains(start));
    }
}
