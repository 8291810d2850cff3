//! # Query Filters
//!
//! Typed filters built from raw query strings. Every field of a raw query is
//! an optional string; [`SalesFilter::from_raw`] and [`ProductQuery::from_raw`]
//! turn them into checked values before anything reaches the store.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::report::ReportWindow;
use crate::types::SaleStatus;
use crate::validation::{non_blank, parse_date, parse_optional_id, parse_pagination, ValidationResult};

// =============================================================================
// Sales Filter
// =============================================================================

/// `GET /sales` query string, unparsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSalesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub customer_id: Option<String>,
}

/// Which sales to list. Date bounds are whole local days, both inclusive,
/// stored as a half-open UTC range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesFilter {
    pub created_from: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
    pub customer_id: Option<i64>,
}

impl SalesFilter {
    pub fn from_raw(raw: &RawSalesQuery, offset: FixedOffset) -> ValidationResult<Self> {
        let start = match non_blank(raw.start_date.as_deref()) {
            Some(s) => Some(parse_date("startDate", Some(s))?),
            None => None,
        };
        let end = match non_blank(raw.end_date.as_deref()) {
            Some(s) => Some(parse_date("endDate", Some(s))?),
            None => None,
        };
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(ValidationError::InvalidFormat {
                    field: "startDate".to_string(),
                    reason: "must not be after endDate".to_string(),
                });
            }
        }

        let status = non_blank(raw.status.as_deref())
            .map(str::parse::<SaleStatus>)
            .transpose()?;

        Ok(Self {
            created_from: start
                .map(|date| ReportWindow::day(date, offset).map(|w| w.start))
                .transpose()?,
            created_before: end
                .map(|date| ReportWindow::day(date, offset).map(|w| w.end))
                .transpose()?,
            status,
            customer_id: parse_optional_id("customerId", raw.customer_id.as_deref())?,
        })
    }
}

// =============================================================================
// Product Query
// =============================================================================

/// `GET /public/products` query string, unparsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A checked product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Exact match.
    pub category: Option<String>,
    /// Substring over name, description and barcode.
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: 1,
            limit: crate::DEFAULT_PAGE_LIMIT,
        }
    }
}

impl ProductQuery {
    pub fn from_raw(raw: &RawProductQuery) -> ValidationResult<Self> {
        let (page, limit) = parse_pagination(raw.page.as_deref(), raw.limit.as_deref())?;
        Ok(Self {
            category: non_blank(raw.category.as_deref()).map(str::to_string),
            search: non_blank(raw.search.as_deref()).map(str::to_string),
            page,
            limit,
        })
    }

    /// Rows to skip for the requested page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_empty_sales_query_matches_everything() {
        let filter = SalesFilter::from_raw(&RawSalesQuery::default(), wib()).unwrap();
        assert_eq!(filter, SalesFilter::default());
    }

    #[test]
    fn test_sales_filter_dates_are_inclusive_days() {
        let raw = RawSalesQuery {
            start_date: Some("2024-03-05".to_string()),
            end_date: Some("2024-03-05".to_string()),
            status: Some("completed".to_string()),
            customer_id: Some("42".to_string()),
        };
        let filter = SalesFilter::from_raw(&raw, wib()).unwrap();
        assert_eq!(
            filter.created_from.unwrap().to_rfc3339(),
            "2024-03-04T17:00:00+00:00"
        );
        assert_eq!(
            filter.created_before.unwrap().to_rfc3339(),
            "2024-03-05T17:00:00+00:00"
        );
        assert_eq!(filter.status, Some(SaleStatus::Completed));
        assert_eq!(filter.customer_id, Some(42));
    }

    #[test]
    fn test_sales_filter_rejects_bad_values() {
        let bad_status = RawSalesQuery {
            status: Some("refunded".to_string()),
            ..Default::default()
        };
        assert!(SalesFilter::from_raw(&bad_status, wib()).is_err());

        let reversed = RawSalesQuery {
            start_date: Some("2024-03-06".to_string()),
            end_date: Some("2024-03-05".to_string()),
            ..Default::default()
        };
        assert!(SalesFilter::from_raw(&reversed, wib()).is_err());

        let bad_customer = RawSalesQuery {
            customer_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(SalesFilter::from_raw(&bad_customer, wib()).is_err());
    }

    #[test]
    fn test_product_query_defaults_and_offset() {
        let query = ProductQuery::from_raw(&RawProductQuery::default()).unwrap();
        assert_eq!(query, ProductQuery::default());
        assert_eq!(query.offset(), 0);

        let raw = RawProductQuery {
            category: Some("  ".to_string()),
            search: Some("kopi".to_string()),
            page: Some("3".to_string()),
            limit: Some("20".to_string()),
        };
        let query = ProductQuery::from_raw(&raw).unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.search.as_deref(), Some("kopi"));
        assert_eq!(query.offset(), 40);
    }
}
