//! # Sale Transaction Coordinator
//!
//! Turns a cart into a recorded sale and voids sales with compensation.
//!
//! ## Create Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_sale(owner, request)                     │
//! │                                                                         │
//! │  1. validate_sale_request   EmptyCart / ValidationError / NegativeTotal │
//! │        │                    (nothing touched yet)                       │
//! │        ▼                                                                │
//! │  2. reserve lines           per ReservationStrategy                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. build lines             name from the item, size from the request   │
//! │        │                    or the item                                 │
//! │        ▼                                                                │
//! │  4. insert_sale             header + lines in one write, state Active   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Void Sale
//! ```text
//!   find_owned_sale ─► still Active? ─► conditional_void ─► release each line
//!        │                  │                 │
//!     SaleNotFound     AlreadyVoided     NotMatched → AlreadyVoided
//! ```
//!
//! The claim comes before the release. Two concurrent voids of one sale
//! both pass the first check, but only one wins the conditional update, and
//! only the winner gives stock back.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use stockroom_core::validation::validate_sale_request;
use stockroom_core::{
    CoreError, CreateSaleRequest, DateRange, Money, Sale, SaleLineItem, SaleState, SaleTotals,
    SalesSummary,
};
use stockroom_db::repository::sale::generate_sale_id;
use stockroom_db::VoidOutcome;

use crate::config::ReservationStrategy;
use crate::error::SalesResult;
use crate::ledger::{InventoryLedger, Reservation};
use crate::store::SaleStore;

/// Runs the create/void workflows over the ledger and the sale store.
#[derive(Clone)]
pub struct SaleCoordinator {
    ledger: InventoryLedger,
    sales: Arc<dyn SaleStore>,
    strategy: ReservationStrategy,
}

impl SaleCoordinator {
    pub fn new(
        ledger: InventoryLedger,
        sales: Arc<dyn SaleStore>,
        strategy: ReservationStrategy,
    ) -> Self {
        SaleCoordinator {
            ledger,
            sales,
            strategy,
        }
    }

    pub fn strategy(&self) -> ReservationStrategy {
        self.strategy
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Records a sale and takes its stock.
    ///
    /// ## Errors
    /// - `EmptyCart`, `Validation`, `NegativeTotal`: rejected before any stock moves
    /// - `ItemNotFound`, `InsufficientStock`: the first line that could not be reserved
    /// - `Storage`: the store failed
    ///
    /// ## Partial Application
    /// Under `BestEffortSequential`, lines reserved before a failing line
    /// stay reserved. Under `TwoPhase` they are released again.
    pub async fn create_sale(
        &self,
        owner_id: &str,
        request: CreateSaleRequest,
    ) -> SalesResult<Sale> {
        let totals = validate_sale_request(&request)?;

        debug!(
            owner_id = %owner_id,
            lines = request.lines.len(),
            strategy = %self.strategy,
            "Creating sale"
        );

        let reservations = match self.strategy {
            ReservationStrategy::BestEffortSequential => {
                self.reserve_sequential(owner_id, &request).await?
            }
            ReservationStrategy::TwoPhase => self.reserve_two_phase(owner_id, &request).await?,
        };

        let sale = build_sale(owner_id, request, totals, &reservations);

        if let Err(e) = self.sales.insert_sale(&sale).await {
            match self.strategy {
                ReservationStrategy::TwoPhase => {
                    self.release_all(owner_id, &reservations).await;
                }
                ReservationStrategy::BestEffortSequential => {
                    warn!(
                        sale_id = %sale.id,
                        reserved = reservations.len(),
                        error = %e,
                        "Sale insert failed; reserved stock was not returned"
                    );
                }
            }
            return Err(e.into());
        }

        info!(
            sale_id = %sale.id,
            owner_id = %owner_id,
            total = %sale.total(),
            items = sale.lines.len(),
            "Sale created"
        );
        Ok(sale)
    }

    /// Reserves lines in submitted order, stopping at the first failure.
    async fn reserve_sequential(
        &self,
        owner_id: &str,
        request: &CreateSaleRequest,
    ) -> SalesResult<Vec<Reservation>> {
        let mut reservations = Vec::with_capacity(request.lines.len());

        for line in &request.lines {
            match self
                .ledger
                .reserve(owner_id, &line.item_id, line.quantity)
                .await
            {
                Ok(reservation) => reservations.push(reservation),
                Err(e) => {
                    if !reservations.is_empty() {
                        warn!(
                            owner_id = %owner_id,
                            item_id = %line.item_id,
                            applied = reservations.len(),
                            error = %e,
                            "Sale aborted mid-cart; earlier lines remain reserved"
                        );
                    }
                    return Err(e);
                }
            }
        }

        Ok(reservations)
    }

    /// Checks the whole cart first, then reserves. A reserve that still
    /// fails releases everything this request already took.
    async fn reserve_two_phase(
        &self,
        owner_id: &str,
        request: &CreateSaleRequest,
    ) -> SalesResult<Vec<Reservation>> {
        // Phase 1: summed demand per distinct item, in first-seen order.
        let mut demand: Vec<(&str, i64)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for line in &request.lines {
            match index.get(line.item_id.as_str()) {
                Some(&i) => demand[i].1 += line.quantity,
                None => {
                    index.insert(line.item_id.as_str(), demand.len());
                    demand.push((line.item_id.as_str(), line.quantity));
                }
            }
        }

        for (item_id, qty) in &demand {
            self.ledger.check_available(owner_id, item_id, *qty).await?;
        }

        // Phase 2
        let mut reservations = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            match self
                .ledger
                .reserve(owner_id, &line.item_id, line.quantity)
                .await
            {
                Ok(reservation) => reservations.push(reservation),
                Err(e) => {
                    self.release_all(owner_id, &reservations).await;
                    return Err(e);
                }
            }
        }

        Ok(reservations)
    }

    /// Gives back every reservation. Failures are logged, not returned.
    async fn release_all(&self, owner_id: &str, reservations: &[Reservation]) {
        for reservation in reservations {
            if let Err(e) = self
                .ledger
                .release(owner_id, &reservation.item_id, reservation.quantity)
                .await
            {
                warn!(
                    owner_id = %owner_id,
                    item_id = %reservation.item_id,
                    qty = reservation.quantity,
                    error = %e,
                    "Failed to release reservation"
                );
            }
        }

        if !reservations.is_empty() {
            debug!(released = reservations.len(), "Released reservations");
        }
    }

    // =========================================================================
    // Void
    // =========================================================================

    /// Voids an active sale and returns its stock.
    ///
    /// ## Errors
    /// - `SaleNotFound`: no such sale for this owner
    /// - `AlreadyVoided`: voided earlier, or by a concurrent caller
    ///
    /// Lines whose item no longer exists are skipped.
    pub async fn void_sale(&self, owner_id: &str, sale_id: &str) -> SalesResult<Sale> {
        let mut sale = self
            .sales
            .find_owned_sale(owner_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        if !sale.is_active() {
            return Err(CoreError::AlreadyVoided(sale_id.to_string()).into());
        }

        let at = Utc::now();
        if let VoidOutcome::NotMatched = self.sales.conditional_void(owner_id, sale_id, at).await? {
            return Err(CoreError::AlreadyVoided(sale_id.to_string()).into());
        }

        let mut released = 0usize;
        for line in &sale.lines {
            match self
                .ledger
                .release(owner_id, &line.item_id, line.quantity)
                .await
            {
                Ok(()) => released += 1,
                Err(e) if e.is_not_found() => {
                    debug!(
                        sale_id = %sale_id,
                        item_id = %line.item_id,
                        "Item no longer exists; skipping stock release"
                    );
                }
                Err(e) => {
                    warn!(
                        sale_id = %sale_id,
                        item_id = %line.item_id,
                        qty = line.quantity,
                        error = %e,
                        "Failed to release stock for voided sale"
                    );
                }
            }
        }

        sale.state = SaleState::Voided { at };
        sale.updated_at = at;

        info!(
            sale_id = %sale_id,
            owner_id = %owner_id,
            released = released,
            lines = sale.lines.len(),
            "Sale voided"
        );
        Ok(sale)
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Gets a sale, filling in missing line sizes from the current items.
    ///
    /// The stored record is not changed.
    pub async fn find_sale(&self, owner_id: &str, sale_id: &str) -> SalesResult<Sale> {
        let mut sale = self
            .sales
            .find_owned_sale(owner_id, sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        for line in sale.lines.iter_mut().filter(|line| line.size.is_none()) {
            if let Some(item) = self.ledger.find_item(owner_id, &line.item_id).await? {
                line.size = Some(item.size);
            }
        }

        Ok(sale)
    }

    /// Totals over the owner's active sales in `range`.
    pub async fn summarize(&self, owner_id: &str, range: &DateRange) -> SalesResult<SalesSummary> {
        let sales = self.sales.query_sales(owner_id, range, true).await?;
        Ok(SalesSummary::from_sales(&sales, range))
    }
}

/// Assembles the sale record from a validated request and its reservations.
fn build_sale(
    owner_id: &str,
    request: CreateSaleRequest,
    totals: SaleTotals,
    reservations: &[Reservation],
) -> Sale {
    let lines = request
        .lines
        .iter()
        .zip(reservations)
        .map(|(line, reservation)| SaleLineItem {
            item_id: reservation.item_id.clone(),
            name: reservation.name.clone(),
            size: Some(line.size.unwrap_or(reservation.size)),
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
            line_total_cents: Money::from_cents(line.unit_price_cents)
                .multiply_quantity(line.quantity)
                .cents(),
        })
        .collect();

    let now = Utc::now();
    Sale {
        id: generate_sale_id(),
        owner_id: owner_id.to_string(),
        sale_date: now,
        lines,
        subtotal_cents: totals.subtotal_cents,
        discount_cents: totals.discount_cents,
        total_cents: totals.total_cents,
        payment_method: request.payment_method,
        customer_name: request.customer_name,
        customer_contact: request.customer_contact,
        notes: request.notes,
        state: SaleState::Active,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
