//! # Domain Types
//!
//! Core domain types used throughout the warung backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (INTEGER)   │   │  id (INTEGER)   │   │  sale_id (FK)   │       │
//! │  │  name           │   │  customer_id?   │   │  product_id     │       │
//! │  │  price          │   │  total_amount   │   │  unit_price  ❄  │       │
//! │  │  stock (>= 0)   │   │  status         │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Admin          │   │  Completed      │   │  Cash           │       │
//! │  │  Staff          │   │  Pending        │   │  Transfer       │       │
//! │  └─────────────────┘   │  Cancelled      │   │  EWallet        │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ❄ = snapshot, frozen at sale time                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All wire types serialize with camelCase field names.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name, also snapshotted onto sale items.
    pub name: String,

    /// Price in the smallest currency unit.
    pub price: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Free-form category, may be empty.
    pub category: String,

    pub description: Option<String>,

    pub barcode: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_units(self.price)
    }

    /// Checks if the requested quantity can be taken from stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

/// Partial update for a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl ProductPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.barcode.is_none()
    }
}

/// Pagination metadata returned alongside product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit_i - 1) / limit_i,
        }
    }
}

/// One page of products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// The engine always writes `Completed`; admins may move a sale to
/// `Pending` or `Cancelled` afterwards. No transition restocks products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Paid and finalized.
    Completed,
    /// Awaiting payment confirmation.
    Pending,
    /// Cancelled by an admin.
    Cancelled,
}

impl SaleStatus {
    pub const ALL: [SaleStatus; 3] = [
        SaleStatus::Completed,
        SaleStatus::Pending,
        SaleStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Pending => "pending",
            SaleStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SaleStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: SaleStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Bank transfer.
    Transfer,
    /// E-wallet (QRIS, OVO, GoPay, ...).
    #[serde(rename = "e-wallet")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "e-wallet"))]
    EWallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Transfer,
        PaymentMethod::EWallet,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Transfer => "transfer",
            PaymentMethod::EWallet => "e-wallet",
        }
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.to_string()).collect(),
            })
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// `None` for anonymous walk-in customers.
    pub customer_id: Option<i64>,
    /// Σ item.subtotal, fixed at creation.
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    /// Not a foreign key: the product may since have been deleted.
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at time of sale (frozen).
    pub unit_price: i64,
    /// quantity × unit_price.
    pub subtotal: i64,
}

/// A sale together with its items, in cart order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

impl SaleWithItems {
    /// Total units across all lines, `None` on overflow.
    pub fn item_count(&self) -> Option<i64> {
        self.items
            .iter()
            .try_fold(0i64, |acc, item| acc.checked_add(item.quantity))
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_units(self.sale.total_amount)
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// One cart line as submitted by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// A validated request to record a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub customer_id: Option<i64>,
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

impl NewSale {
    /// A completed cash sale for an anonymous customer.
    pub fn cash(items: Vec<CartLine>) -> Self {
        Self {
            customer_id: None,
            items,
            payment_method: PaymentMethod::Cash,
            notes: None,
        }
    }
}

/// Admin edit of an existing sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleUpdate {
    pub status: Option<SaleStatus>,
    pub notes: Option<String>,
}

impl SaleUpdate {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.notes.is_none()
    }
}

// =============================================================================
// Users
// =============================================================================

/// Access role carried by users and tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["admin".to_string(), "staff".to_string()],
            }),
        }
    }
}

/// A stored user account. Never serialized; see [`PublicUser`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The user view returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::EWallet).unwrap(),
            "\"e-wallet\""
        );
        assert_eq!(
            "e-wallet".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::EWallet
        );
        assert_eq!(
            "transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Transfer
        );
        assert!("card".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_sale_status_parse() {
        assert_eq!(
            "cancelled".parse::<SaleStatus>().unwrap(),
            SaleStatus::Cancelled
        );
        let err = "void".parse::<SaleStatus>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "status must be one of: completed, pending, cancelled"
        );
    }

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(2, 10, 11).total_pages, 2);
    }

    #[test]
    fn test_sale_with_items_serializes_flat() {
        let now = Utc::now();
        let sale = SaleWithItems {
            sale: Sale {
                id: 1,
                customer_id: None,
                total_amount: 6_000,
                payment_method: PaymentMethod::Cash,
                status: SaleStatus::Completed,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            items: vec![SaleItem {
                id: 1,
                sale_id: 1,
                product_id: 7,
                product_name: "Teh Botol".to_string(),
                quantity: 2,
                unit_price: 3_000,
                subtotal: 6_000,
            }],
        };

        let json = serde_json::to_value(&sale).unwrap();
        assert_eq!(json["totalAmount"], 6_000);
        assert_eq!(json["paymentMethod"], "cash");
        assert_eq!(json["items"][0]["unitPrice"], 3_000);
        assert_eq!(sale.item_count(), Some(2));
    }

    #[test]
    fn test_sale_update_is_empty() {
        assert!(SaleUpdate::default().is_empty());
        assert!(!SaleUpdate {
            status: Some(SaleStatus::Cancelled),
            notes: None,
        }
        .is_empty());
        assert!(!SaleUpdate {
            status: None,
            notes: Some(String::new()),
        }
        .is_empty());
    }
}
