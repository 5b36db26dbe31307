//! # Sales Summary
//!
//! Read-only fold over an owner's active sales.
//!
//! ```text
//!   [Sale, Sale, Sale(voided), Sale, ...]
//!        │
//!        ▼  keep Active ∧ sale_date ∈ range
//!   ┌──────────────────────────────────────────────┐
//!   │ sale_count, revenue, items_sold, average     │
//!   │ by_payment_method  (first-seen order)        │
//!   │ daily              (UTC date, ascending)     │
//!   │ top_items          (by quantity, stable, 10) │
//!   └──────────────────────────────────────────────┘
//! ```
//!
//! The fold never mutates anything and never divides by zero: an empty
//! range yields zero counts, zero money and empty groupings.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{DateRange, PaymentMethod, Sale};
use crate::TOP_ITEMS_LIMIT;

/// Revenue and sale count for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentMethodTotal {
    pub method: PaymentMethod,
    pub revenue_cents: i64,
    pub count: usize,
}

/// Sales for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub count: usize,
    pub revenue_cents: i64,
}

/// An item by units sold, keyed by the name frozen on the sale line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopItem {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Aggregates over the active sales in a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub sale_count: usize,
    pub revenue_cents: i64,
    pub items_sold: i64,
    pub average_order_value_cents: i64,
    pub by_payment_method: Vec<PaymentMethodTotal>,
    pub daily: Vec<DailyTotal>,
    pub top_items: Vec<TopItem>,
}

impl SalesSummary {
    /// Folds `sales` into a summary.
    ///
    /// Voided sales and sales outside `range` are skipped here even if the
    /// caller already filtered them.
    ///
    /// ```rust
    /// use stockroom_core::{DateRange, SalesSummary};
    ///
    /// let summary = SalesSummary::from_sales(&[], &DateRange::all());
    /// assert_eq!(summary.sale_count, 0);
    /// assert_eq!(summary.average_order_value_cents, 0);
    /// assert!(summary.top_items.is_empty());
    /// ```
    pub fn from_sales<'a, I>(sales: I, range: &DateRange) -> Self
    where
        I: IntoIterator<Item = &'a Sale>,
    {
        let mut sale_count = 0usize;
        let mut revenue = Money::zero();
        let mut items_sold = 0i64;
        let mut by_payment_method: Vec<PaymentMethodTotal> = Vec::new();
        let mut daily: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();
        let mut top_items: Vec<TopItem> = Vec::new();
        let mut top_index: HashMap<String, usize> = HashMap::new();

        for sale in sales
            .into_iter()
            .filter(|sale| sale.is_active() && range.contains(sale.sale_date))
        {
            sale_count += 1;
            revenue += sale.total();
            items_sold += sale.items_sold();

            match by_payment_method
                .iter_mut()
                .find(|entry| entry.method == sale.payment_method)
            {
                Some(entry) => {
                    entry.revenue_cents += sale.total_cents;
                    entry.count += 1;
                }
                None => by_payment_method.push(PaymentMethodTotal {
                    method: sale.payment_method,
                    revenue_cents: sale.total_cents,
                    count: 1,
                }),
            }

            let date = sale.sale_date.date_naive();
            let day = daily.entry(date).or_insert(DailyTotal {
                date,
                count: 0,
                revenue_cents: 0,
            });
            day.count += 1;
            day.revenue_cents += sale.total_cents;

            for line in &sale.lines {
                let idx = *top_index.entry(line.name.clone()).or_insert_with(|| {
                    top_items.push(TopItem {
                        name: line.name.clone(),
                        quantity: 0,
                        revenue_cents: 0,
                    });
                    top_items.len() - 1
                });
                top_items[idx].quantity += line.quantity;
                top_items[idx].revenue_cents += line.line_total_cents;
            }
        }

        // sort_by is stable: equal quantities keep first-seen order.
        top_items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        top_items.truncate(TOP_ITEMS_LIMIT);

        SalesSummary {
            sale_count,
            revenue_cents: revenue.cents(),
            items_sold,
            average_order_value_cents: revenue.average_over(sale_count).cents(),
            by_payment_method,
            daily: daily.into_values().collect(),
            top_items,
        }
    }

    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }

    pub fn average_order_value(&self) -> Money {
        Money::from_cents(self.average_order_value_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaleLineItem, SaleState};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0).unwrap()
    }

    fn line(name: &str, quantity: i64, unit_price_cents: i64) -> SaleLineItem {
        SaleLineItem {
            item_id: format!("id-{name}"),
            name: name.to_string(),
            size: None,
            quantity,
            unit_price_cents,
            line_total_cents: quantity * unit_price_cents,
        }
    }

    fn sale(
        sale_date: DateTime<Utc>,
        lines: Vec<SaleLineItem>,
        discount_cents: i64,
        payment_method: PaymentMethod,
    ) -> Sale {
        let subtotal_cents: i64 = lines.iter().map(|l| l.line_total_cents).sum();
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: "owner".to_string(),
            sale_date,
            lines,
            subtotal_cents,
            discount_cents,
            total_cents: subtotal_cents - discount_cents,
            payment_method,
            customer_name: None,
            customer_contact: None,
            notes: None,
            state: SaleState::Active,
            created_at: sale_date,
            updated_at: sale_date,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = SalesSummary::from_sales(&[], &DateRange::all());
        assert_eq!(summary, SalesSummary::default());
    }

    #[test]
    fn test_totals_and_average() {
        let sales = vec![
            sale(at(1, 9), vec![line("Shirt", 2, 500)], 0, PaymentMethod::Cash),
            sale(at(1, 15), vec![line("Jeans", 1, 1000)], 0, PaymentMethod::Card),
            sale(at(2, 10), vec![line("Shirt", 1, 500)], 100, PaymentMethod::Cash),
        ];
        let summary = SalesSummary::from_sales(&sales, &DateRange::all());

        assert_eq!(summary.sale_count, 3);
        assert_eq!(summary.revenue_cents, 1000 + 1000 + 400);
        assert_eq!(summary.items_sold, 4);
        // 2400 / 3 = 800
        assert_eq!(summary.average_order_value_cents, 800);
        assert_eq!(summary.revenue().to_string(), "₱24.00");
    }

    #[test]
    fn test_voided_and_out_of_range_sales_are_excluded() {
        let mut voided = sale(at(3, 9), vec![line("Cap", 5, 100)], 0, PaymentMethod::Gcash);
        voided.state = SaleState::Voided { at: at(3, 10) };
        let sales = vec![
            sale(at(1, 9), vec![line("Shirt", 1, 500)], 0, PaymentMethod::Cash),
            voided,
            sale(at(20, 9), vec![line("Shirt", 1, 500)], 0, PaymentMethod::Cash),
        ];

        let range = DateRange::between(at(1, 0), at(10, 0));
        let summary = SalesSummary::from_sales(&sales, &range);

        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.items_sold, 1);
        assert!(summary
            .by_payment_method
            .iter()
            .all(|entry| entry.method != PaymentMethod::Gcash));
    }

    #[test]
    fn test_range_excluding_everything() {
        let sales = vec![sale(at(1, 9), vec![line("Shirt", 1, 500)], 0, PaymentMethod::Cash)];
        let range = DateRange::between(at(5, 0), at(6, 0));
        let summary = SalesSummary::from_sales(&sales, &range);

        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.revenue_cents, 0);
        assert_eq!(summary.average_order_value_cents, 0);
        assert!(summary.by_payment_method.is_empty());
        assert!(summary.daily.is_empty());
        assert!(summary.top_items.is_empty());
    }

    #[test]
    fn test_payment_method_breakdown_keeps_first_seen_order() {
        let sales = vec![
            sale(at(1, 9), vec![line("A", 1, 300)], 0, PaymentMethod::Gcash),
            sale(at(1, 10), vec![line("A", 1, 200)], 0, PaymentMethod::Cash),
            sale(at(1, 11), vec![line("A", 1, 100)], 0, PaymentMethod::Gcash),
        ];
        let summary = SalesSummary::from_sales(&sales, &DateRange::all());

        assert_eq!(
            summary.by_payment_method,
            vec![
                PaymentMethodTotal {
                    method: PaymentMethod::Gcash,
                    revenue_cents: 400,
                    count: 2,
                },
                PaymentMethodTotal {
                    method: PaymentMethod::Cash,
                    revenue_cents: 200,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_daily_buckets_use_utc_dates_ascending() {
        let late = Utc.with_ymd_and_hms(2026, 5, 2, 23, 59, 59).unwrap();
        let sales = vec![
            sale(late + Duration::seconds(1), vec![line("A", 1, 100)], 0, PaymentMethod::Cash),
            sale(late, vec![line("A", 1, 100)], 0, PaymentMethod::Cash),
            sale(at(2, 1), vec![line("A", 1, 100)], 0, PaymentMethod::Cash),
        ];
        let summary = SalesSummary::from_sales(&sales, &DateRange::all());

        let days: Vec<(String, usize)> = summary
            .daily
            .iter()
            .map(|d| (d.date.to_string(), d.count))
            .collect();
        assert_eq!(
            days,
            vec![("2026-05-02".to_string(), 2), ("2026-05-03".to_string(), 1)]
        );
    }

    #[test]
    fn test_top_items_ties_keep_first_seen_order() {
        let sales = vec![
            sale(at(1, 9), vec![line("Beta", 2, 100), line("Alpha", 2, 100)], 0, PaymentMethod::Cash),
            sale(at(1, 10), vec![line("Gamma", 5, 100)], 0, PaymentMethod::Cash),
        ];
        let summary = SalesSummary::from_sales(&sales, &DateRange::all());

        let names: Vec<&str> = summary.top_items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Beta", "Alpha"]);
        assert_eq!(summary.top_items[0].revenue_cents, 500);
    }

    #[test]
    fn test_top_items_are_capped() {
        let lines = (0..15).map(|i| line(&format!("Item {i}"), i + 1, 100)).collect();
        let sales = vec![sale(at(1, 9), lines, 0, PaymentMethod::Cash)];
        let summary = SalesSummary::from_sales(&sales, &DateRange::all());

        assert_eq!(summary.top_items.len(), TOP_ITEMS_LIMIT);
        assert_eq!(summary.top_items[0].name, "Item 14");
        assert_eq!(summary.top_items[0].quantity, 15);
    }
}
