//! # Report Aggregation
//!
//! Windows and folds for the daily, monthly and yearly sales summaries.
//!
//! ## Windows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Report offset: +07:00 (configurable)                                  │
//! │                                                                         │
//! │  daily(2024-03-05)                                                     │
//! │     local  [2024-03-05 00:00, 2024-03-06 00:00)                        │
//! │     UTC    [2024-03-04 17:00, 2024-03-05 17:00)                        │
//! │                                                                         │
//! │  monthly(2024, 2)  → [Feb 1, Mar 1)                                    │
//! │  yearly(2024)      → [Jan 1 2024, Jan 1 2025)                          │
//! │                                                                         │
//! │  Half-open ranges: identical to "…23:59:59.999 inclusive" at           │
//! │  millisecond precision, without the off-by-one-millisecond trap.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store fetches the sales in a window; everything here is a pure fold
//! over that list. Folds use checked arithmetic and fail with
//! [`CoreError::AmountOverflow`] instead of wrapping. Bucketing uses the same offset as the window so a sale
//! at 23:30 local lands on the local day, not the UTC day.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::SaleWithItems;
use crate::validation::ValidationResult;

// =============================================================================
// Report Window
// =============================================================================

/// A half-open UTC range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// One local calendar day.
    pub fn day(date: NaiveDate, offset: FixedOffset) -> ValidationResult<Self> {
        let next = date.succ_opt().ok_or_else(|| out_of_range("date"))?;
        Self::between(date, next, offset)
    }

    /// One local calendar month.
    pub fn month(year: i32, month: u32, offset: FixedOffset) -> ValidationResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| out_of_range("month"))?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .ok_or_else(|| out_of_range("month"))?;
        Self::between(first, next, offset)
    }

    /// One local calendar year.
    pub fn year(year: i32, offset: FixedOffset) -> ValidationResult<Self> {
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| out_of_range("year"))?;
        let next = NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(|| out_of_range("year"))?;
        Self::between(first, next, offset)
    }

    /// Local midnight of `from` up to local midnight of `until`.
    pub fn between(from: NaiveDate, until: NaiveDate, offset: FixedOffset) -> ValidationResult<Self> {
        Ok(Self {
            start: local_midnight(from, offset)?,
            end: local_midnight(until, offset)?,
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> ValidationResult<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| out_of_range("date"))?;
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| out_of_range("date"))
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "outside the supported calendar".to_string(),
    }
}

// =============================================================================
// Summaries
// =============================================================================

/// Revenue, transaction and item counts for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PeriodTotals {
    pub revenue: Money,
    pub transactions: i64,
    pub items: i64,
}

impl PeriodTotals {
    fn record(&mut self, sale: &SaleWithItems) -> CoreResult<()> {
        let revenue = self.revenue.checked_add(sale.total());
        let transactions = self.transactions.checked_add(1);
        let items = sale
            .item_count()
            .and_then(|count| self.items.checked_add(count));

        match (revenue, transactions, items) {
            (Some(revenue), Some(transactions), Some(items)) => {
                self.revenue = revenue;
                self.transactions = transactions;
                self.items = items;
                Ok(())
            }
            _ => Err(CoreError::AmountOverflow),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySummary {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total_revenue: Money,
    pub total_transactions: i64,
    pub total_items: i64,
    pub sales: Vec<SaleWithItems>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_revenue: Money,
    pub total_transactions: i64,
    pub total_items: i64,
    /// Only days with at least one sale appear.
    pub by_day: BTreeMap<String, PeriodTotals>,
    pub sales: Vec<SaleWithItems>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct YearlySummary {
    pub year: i32,
    pub total_revenue: Money,
    pub total_transactions: i64,
    pub total_items: i64,
    /// `"01"` through `"12"`, always all twelve.
    pub monthly_totals: BTreeMap<String, Money>,
    pub sales: Vec<SaleWithItems>,
}

fn fold_totals(sales: &[SaleWithItems]) -> CoreResult<PeriodTotals> {
    let mut totals = PeriodTotals::default();
    for sale in sales {
        totals.record(sale)?;
    }
    Ok(totals)
}

fn local_date(sale: &SaleWithItems, offset: FixedOffset) -> NaiveDate {
    sale.sale.created_at.with_timezone(&offset).date_naive()
}

/// Folds the sales of one day.
pub fn summarize_daily(date: NaiveDate, sales: Vec<SaleWithItems>) -> CoreResult<DailySummary> {
    let totals = fold_totals(&sales)?;
    Ok(DailySummary {
        date: date.format("%Y-%m-%d").to_string(),
        total_revenue: totals.revenue,
        total_transactions: totals.transactions,
        total_items: totals.items,
        sales,
    })
}

/// Folds the sales of one month, bucketing by local calendar day.
pub fn summarize_monthly(
    year: i32,
    month: u32,
    sales: Vec<SaleWithItems>,
    offset: FixedOffset,
) -> CoreResult<MonthlySummary> {
    let totals = fold_totals(&sales)?;
    let mut by_day: BTreeMap<String, PeriodTotals> = BTreeMap::new();
    for sale in &sales {
        let key = local_date(sale, offset).format("%Y-%m-%d").to_string();
        by_day.entry(key).or_default().record(sale)?;
    }

    Ok(MonthlySummary {
        year,
        month,
        total_revenue: totals.revenue,
        total_transactions: totals.transactions,
        total_items: totals.items,
        by_day,
        sales,
    })
}

/// Folds the sales of one year into zero-filled monthly revenue.
pub fn summarize_yearly(
    year: i32,
    sales: Vec<SaleWithItems>,
    offset: FixedOffset,
) -> CoreResult<YearlySummary> {
    let totals = fold_totals(&sales)?;
    let mut monthly_totals: BTreeMap<String, Money> = (1..=12)
        .map(|month| (format!("{:02}", month), Money::zero()))
        .collect();
    for sale in &sales {
        let key = format!("{:02}", local_date(sale, offset).month());
        let bucket = monthly_totals.entry(key).or_default();
        *bucket = bucket
            .checked_add(sale.total())
            .ok_or(CoreError::AmountOverflow)?;
    }

    Ok(YearlySummary {
        year,
        total_revenue: totals.revenue,
        total_transactions: totals.transactions,
        total_items: totals.items,
        monthly_totals,
        sales,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
