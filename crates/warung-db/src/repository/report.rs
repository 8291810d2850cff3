//! # Report Repository
//!
//! Loads the sales of a report window and folds them with
//! `warung_core::report`.
//!
//! ```text
//! daily_summary(2024-03-05, +07:00)
//!      │
//!      ├── ReportWindow::day  → [2024-03-04T17:00Z, 2024-03-05T17:00Z)
//!      ├── load_sales(created_at >= start AND created_at < end), oldest first
//!      └── summarize_daily(date, sales)
//! ```
//!
//! Every sale in the window counts, whatever its status.

use chrono::{FixedOffset, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::sale::{load_sales, Order};
use warung_core::filter::SalesFilter;
use warung_core::report::{
    self, DailySummary, MonthlySummary, ReportWindow, YearlySummary,
};
use warung_core::SaleWithItems;

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Summary of one local calendar day.
    pub async fn daily_summary(
        &self,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> DbResult<DailySummary> {
        let window = ReportWindow::day(date, offset)?;
        let sales = self.sales_in(&window).await?;
        Ok(report::summarize_daily(date, sales)?)
    }

    /// Summary of one local calendar month, bucketed by day.
    pub async fn monthly_summary(
        &self,
        year: i32,
        month: u32,
        offset: FixedOffset,
    ) -> DbResult<MonthlySummary> {
        let window = ReportWindow::month(year, month, offset)?;
        let sales = self.sales_in(&window).await?;
        Ok(report::summarize_monthly(year, month, sales, offset)?)
    }

    /// Summary of one local calendar year, with all twelve months.
    pub async fn yearly_summary(&self, year: i32, offset: FixedOffset) -> DbResult<YearlySummary> {
        let window = ReportWindow::year(year, offset)?;
        let sales = self.sales_in(&window).await?;
        Ok(report::summarize_yearly(year, sales, offset)?)
    }

    async fn sales_in(&self, window: &ReportWindow) -> DbResult<Vec<SaleWithItems>> {
        debug!(start = %window.start, end = %window.end, "Loading report window");

        let filter = SalesFilter {
            created_from: Some(window.start),
            created_before: Some(window.end),
            ..Default::default()
        };
        load_sales(&self.pool, &filter, Order::OldestFirst).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seed_product, test_db};
    use crate::{Database, DbError};
    use chrono::{DateTime, Utc};
    use warung_core::{CartLine, CoreError, NewSale, SaleStatus, SaleUpdate};

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Records a sale, then moves it to the given instant.
    async fn sale_at(db: &Database, product_id: i64, quantity: i64, at: &str) -> i64 {
        let sale = db
            .sales()
            .create_sale(&NewSale::cash(vec![CartLine {
                product_id,
                quantity,
            }]))
            .await
            .unwrap();

        let at: DateTime<Utc> = DateTime::parse_from_rfc3339(at).unwrap().with_timezone(&Utc);
        sqlx::query("UPDATE sales SET created_at = ?1 WHERE id = ?2")
            .bind(at)
            .bind(sale.sale.id)
            .execute(db.pool())
            .await
            .unwrap();
        sale.sale.id
    }

    #[tokio::test]
    async fn test_daily_summaries_across_days() {
        let db = test_db().await;
        let kopi = seed_product(&db, "Kopi Tubruk", 5_000, 100).await;
        let nasi = seed_product(&db, "Nasi Uduk", 10_000, 100).await;
        let es = seed_product(&db, "Es Jeruk", 7_000, 100).await;

        sale_at(&db, kopi.id, 1, "2024-03-05T07:15:00+07:00").await;
        sale_at(&db, nasi.id, 2, "2024-03-05T12:00:00+07:00").await;
        // last minute of the 5th, local time
        sale_at(&db, kopi.id, 2, "2024-03-05T23:59:00+07:00").await;
        sale_at(&db, es.id, 1, "2024-03-06T00:01:00+07:00").await;

        let fifth = db.reports().daily_summary(date(2024, 3, 5), wib()).await.unwrap();
        assert_eq!(fifth.date, "2024-03-05");
        assert_eq!(fifth.total_revenue.units(), 35_000);
        assert_eq!(fifth.total_transactions, 3);
        assert_eq!(fifth.total_items, 5);
        assert_eq!(fifth.sales.len(), 3);
        assert!(fifth
            .sales
            .windows(2)
            .all(|pair| pair[0].sale.created_at <= pair[1].sale.created_at));

        let sixth = db.reports().daily_summary(date(2024, 3, 6), wib()).await.unwrap();
        assert_eq!(sixth.total_revenue.units(), 7_000);
        assert_eq!(sixth.total_transactions, 1);

        let seventh = db.reports().daily_summary(date(2024, 3, 7), wib()).await.unwrap();
        assert!(seventh.total_revenue.is_zero());
        assert_eq!(seventh.total_transactions, 0);
        assert_eq!(seventh.total_items, 0);
        assert!(seventh.sales.is_empty());
    }

    #[tokio::test]
    async fn test_monthly_summary_buckets_days() {
        let db = test_db().await;
        let teh = seed_product(&db, "Teh Manis", 3_000, 100).await;

        sale_at(&db, teh.id, 2, "2024-02-29T20:00:00+07:00").await;
        sale_at(&db, teh.id, 1, "2024-02-01T00:00:00+07:00").await;
        // 31 Jan 23:59 local belongs to January
        sale_at(&db, teh.id, 5, "2024-01-31T23:59:00+07:00").await;

        let feb = db.reports().monthly_summary(2024, 2, wib()).await.unwrap();
        assert_eq!(feb.total_transactions, 2);
        assert_eq!(feb.total_revenue.units(), 9_000);
        assert_eq!(feb.by_day.len(), 2);
        assert_eq!(feb.by_day["2024-02-29"].items, 2);
        assert_eq!(feb.by_day["2024-02-01"].revenue.units(), 3_000);
        assert!(!feb.by_day.contains_key("2024-02-15"));
    }

    #[tokio::test]
    async fn test_yearly_summary_counts_every_status() {
        let db = test_db().await;
        let gula = seed_product(&db, "Gula Pasir", 15_000, 100).await;

        let cancelled = sale_at(&db, gula.id, 1, "2024-04-10T10:00:00+07:00").await;
        sale_at(&db, gula.id, 2, "2024-11-02T10:00:00+07:00").await;
        sale_at(&db, gula.id, 1, "2023-12-31T23:00:00+07:00").await;

        db.sales()
            .update(
                cancelled,
                &SaleUpdate {
                    status: Some(SaleStatus::Cancelled),
                    notes: None,
                },
            )
            .await
            .unwrap();

        let year = db.reports().yearly_summary(2024, wib()).await.unwrap();
        assert_eq!(year.total_transactions, 2);
        assert_eq!(year.total_revenue.units(), 45_000);
        assert_eq!(year.monthly_totals.len(), 12);
        assert_eq!(year.monthly_totals["04"].units(), 15_000);
        assert_eq!(year.monthly_totals["11"].units(), 30_000);
        assert!(year.monthly_totals["01"].is_zero());
    }

    #[tokio::test]
    async fn test_invalid_month_is_rejected() {
        let db = test_db().await;
        let result = db.reports().monthly_summary(2024, 13, wib()).await;
        assert!(matches!(result, Err(DbError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_revenue_past_i64_is_an_error() {
        let db = test_db().await;
        let emas = seed_product(&db, "Emas Batangan", 5_000_000_000_000_000_000, 2).await;

        sale_at(&db, emas.id, 1, "2024-06-01T09:00:00+07:00").await;
        sale_at(&db, emas.id, 1, "2024-06-01T10:00:00+07:00").await;

        let daily = db.reports().daily_summary(date(2024, 6, 1), wib()).await;
        assert!(matches!(daily, Err(DbError::Domain(CoreError::AmountOverflow))));

        let monthly = db.reports().monthly_summary(2024, 6, wib()).await;
        assert!(matches!(monthly, Err(DbError::Domain(CoreError::AmountOverflow))));

        let yearly = db.reports().yearly_summary(2024, wib()).await;
        assert!(matches!(yearly, Err(DbError::Domain(CoreError::AmountOverflow))));
    }
}
