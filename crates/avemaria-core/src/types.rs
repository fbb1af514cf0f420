//! # Domain Types
//!
//! Core domain types used throughout the AVEMARÍA backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │   LedgerEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  ref (business) │   │  folio (seq.)   │   │  type (IN/EX)   │       │
//! │  │  stock          │   │  net_profit     │   │  amount         │       │
//! │  │  wholesale/     │   │  status         │   │  sale_id /      │       │
//! │  │  retail price   │   │  channel        │   │  purchase_id    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Purchase     │   │    Customer     │   │   SaleStatus    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  order_number   │   │  name, phone    │   │  Completed      │       │
//! │  │  shipping_cost  │   │  instagram      │   │  PendingPayment │       │
//! │  │  total_cost     │   │  level (derived)│   │  Cancelled      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Sales and products have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (`ref`, `folio`) - human-readable, shown to the owner
//!
//! ## Snapshot Pattern
//! Sale items freeze the wholesale cost at the time of sale (`unit_cost`).
//! Editing a product's price later never rewrites past profits.
//!
//! ## Wire Format
//! Everything here serializes with the camelCase keys and SCREAMING enum
//! values shared with the web and mobile TypeScript clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{FREQUENT_PURCHASE_COUNT, FREQUENT_SPEND_THRESHOLD, VIP_SPEND_THRESHOLD};

// =============================================================================
// Product
// =============================================================================

/// Product category (closed enumeration - jewellery lines sold by the shop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Candongas,
    Topos,
    Grandes,
    Sets,
    Earcuffs,
    Collares,
    Pulseras,
    Otro,
}

/// A product in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Reference code - stable business identifier, unique per product.
    #[serde(rename = "ref")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "ref"))]
    pub reference: String,

    /// Display name shown in the catalog and on sale lines.
    pub name: String,

    /// Product category.
    pub category: Category,

    /// Optional emoji/icon shown by the clients.
    pub icon: Option<String>,

    /// Wholesale unit cost in pesos (what AVEMARÍA charges the shop).
    pub wholesale_price: i64,

    /// Retail unit price in pesos (suggested selling price).
    pub retail_price: i64,

    /// Current stock quantity. Never negative after a committed operation.
    pub stock: i64,

    /// Threshold below which the product shows up as low stock.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether the product is at or below its low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// A recent purchase line shown on the product detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPurchaseLine {
    pub purchase_id: String,
    pub order_number: Option<String>,
    pub quantity: i64,
    pub unit_cost: i64,
    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
}

/// A recent sale line shown on the product detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSaleLine {
    pub sale_id: String,
    pub folio: i64,
    pub quantity: i64,
    pub unit_revenue: i64,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

/// A product with its recent purchase/sale history, for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub recent_purchases: Vec<ProductPurchaseLine>,
    pub recent_sales: Vec<ProductSaleLine>,
}

/// Product identity subset embedded in sale/purchase line read models.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductBrief {
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
    pub icon: Option<String>,
}

// =============================================================================
// Sale Status / Channel / Payment Methods
// =============================================================================

/// The status of a sale.
///
/// `PendingPayment` and `Completed` are both valid inputs to cancellation;
/// `Cancelled` is terminal and triggers the stock restoration + ledger
/// zeroing effect exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    /// Sale has been paid and counted.
    Completed,
    /// Delivered but payment still owed (contra entrega, transfers in flight).
    PendingPayment,
    /// Sale was cancelled; stock restored, ledger entry zeroed.
    Cancelled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

/// Where the sale came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleChannel {
    /// Order taken over WhatsApp direct message.
    Whatsapp,
    /// Order taken over Instagram.
    Instagram,
    /// In-person sale.
    Presencial,
}

impl SaleChannel {
    /// The SCREAMING_SNAKE_CASE name shared with the clients and the store.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            SaleChannel::Whatsapp => "WHATSAPP",
            SaleChannel::Instagram => "INSTAGRAM",
            SaleChannel::Presencial => "PRESENCIAL",
        }
    }
}

/// How a customer paid for a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalePaymentMethod {
    Nequi,
    Daviplata,
    Transferencia,
    Efectivo,
    ContraEntrega,
}

/// How the shop paid AVEMARÍA for a purchase.
/// Narrower than [`SalePaymentMethod`]: supplier orders are never paid
/// cash-on-delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchasePaymentMethod {
    Transferencia,
    Nequi,
    Daviplata,
    Efectivo,
}

// =============================================================================
// Sale
// =============================================================================

/// A customer sale.
///
/// `total_revenue`, `total_cost` and `net_profit` are computed once inside
/// the recording transaction and treated as an immutable snapshot from then
/// on. Cancellation only flips `status`; reports filter by it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    /// Sequential human-readable sale number, distinct from the UUID.
    pub folio: i64,
    pub customer_id: Option<String>,
    pub user_id: String,
    pub channel: SaleChannel,
    pub payment_method: SalePaymentMethod,
    /// sum(quantity * unit_revenue) over the items, in pesos.
    pub total_revenue: i64,
    /// sum(quantity * unit_cost) over the items, in pesos.
    pub total_cost: i64,
    /// total_revenue - total_cost, in pesos.
    pub net_profit: i64,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub sold_at: DateTime<Utc>,
}

/// A line item in a sale.
/// Uses the snapshot pattern to freeze the wholesale cost at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Selling price per unit agreed with the customer (frozen).
    pub unit_revenue: i64,
    /// Wholesale cost per unit at time of sale (frozen).
    pub unit_cost: i64,
    /// unit_revenue - unit_cost (frozen).
    pub unit_profit: i64,
}

/// A sale line joined with the product it references.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetail {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_revenue: i64,
    pub unit_cost: i64,
    pub unit_profit: i64,
    pub product: ProductBrief,
}

/// A sale with its line items and optional customer, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItemDetail>,
    pub customer: Option<Customer>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A supplier order placed with AVEMARÍA. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    /// Supplier order number, free text.
    pub order_number: Option<String>,
    pub user_id: String,
    /// Shipping paid on top of the item costs, in pesos.
    pub shipping_cost: i64,
    /// sum(quantity * unit_cost) + shipping_cost, in pesos.
    pub total_cost: i64,
    pub payment_method: PurchasePaymentMethod,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub purchased_at: DateTime<Utc>,
}

/// A line item in a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: String,
    pub purchase_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Wholesale cost per unit at time of purchase (frozen).
    pub unit_cost: i64,
}

/// A purchase line joined with the product it references.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemDetail {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: i64,
    pub product: ProductBrief,
}

/// A purchase with its line items, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseItemDetail>,
}

// =============================================================================
// Ledger
// =============================================================================

/// Whether a ledger entry adds to or subtracts from the cash position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Income,
    Expense,
}

/// Expense category (closed enumeration).
///
/// Income entries currently collapse to `Otro` - the category axis only
/// matters for the expense breakdown reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseCategory {
    /// Stock purchases from the supplier.
    CompraAvemaria,
    /// Shipping costs.
    Envios,
    /// Packaging materials.
    Empaques,
    /// Advertising spend.
    Publicidad,
    /// Everything else (and the income placeholder).
    Otro,
}

impl ExpenseCategory {
    /// The SCREAMING_SNAKE_CASE name shared with the clients and the store.
    pub const fn wire_name(&self) -> &'static str {
        match self {
            ExpenseCategory::CompraAvemaria => "COMPRA_AVEMARIA",
            ExpenseCategory::Envios => "ENVIOS",
            ExpenseCategory::Empaques => "EMPAQUES",
            ExpenseCategory::Publicidad => "PUBLICIDAD",
            ExpenseCategory::Otro => "OTRO",
        }
    }
}

/// An income or expense row in the financial ledger.
///
/// This is the append-only audit trail driving the accounting reports.
/// Entries created by a sale or purchase carry a back-reference to it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub entry_type: EntryType,
    pub amount: i64,
    pub category: ExpenseCategory,
    pub description: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub user_id: String,
    pub sale_id: Option<String>,
    pub purchase_id: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer of the shop.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Customer level derived from completed-sale history.
///
/// Never stored: it is recomputed from aggregates on every read, so it can
/// never drift out of sync with the sales that justify it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CustomerLevel {
    #[serde(rename = "VIP")]
    Vip,
    Frecuente,
    Regular,
}

/// Derives a customer's level from their completed-sale aggregates.
///
/// ## Rules
/// - VIP: total spent >= $2.000.000
/// - Frecuente: total spent >= $800.000 OR at least 8 completed purchases
/// - Regular: everyone else
pub fn customer_level(total_spent: i64, total_purchases: i64) -> CustomerLevel {
    if total_spent >= VIP_SPEND_THRESHOLD {
        CustomerLevel::Vip
    } else if total_spent >= FREQUENT_SPEND_THRESHOLD || total_purchases >= FREQUENT_PURCHASE_COUNT
    {
        CustomerLevel::Frecuente
    } else {
        CustomerLevel::Regular
    }
}

/// A customer with their completed-sale aggregates and derived level.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    pub total_spent: i64,
    pub total_purchases: i64,
    #[ts(as = "Option<String>")]
    pub last_purchase: Option<DateTime<Utc>>,
    pub level: CustomerLevel,
}

/// A customer with their full sale history, for the detail view.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub sales: Vec<SaleDetail>,
    pub total_spent: i64,
    pub total_purchases: i64,
    pub level: CustomerLevel,
}

// =============================================================================
// Request Types
// =============================================================================
// Deserialized straight from the JSON request bodies and validated by
// `validation` before any repository call.

/// Request body for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
    pub category: Category,
    pub icon: Option<String>,
    pub wholesale_price: i64,
    pub retail_price: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_min_stock")]
    pub min_stock: i64,
}

/// Default low-stock threshold for new products.
fn default_min_stock() -> i64 {
    10
}

/// Request body for a partial product update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub category: Option<Category>,
    pub icon: Option<String>,
    pub wholesale_price: Option<i64>,
    pub retail_price: Option<i64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
}

/// One line of a sale request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
    /// Selling price per unit agreed with the customer, in pesos.
    pub unit_revenue: i64,
}

/// Request body for recording a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_id: Option<String>,
    pub channel: SaleChannel,
    pub payment_method: SalePaymentMethod,
    pub items: Vec<NewSaleItem>,
    pub notes: Option<String>,
}

/// One line of a purchase request.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseItem {
    pub product_id: String,
    pub quantity: i64,
    /// Wholesale cost per unit charged by AVEMARÍA, in pesos.
    pub unit_cost: i64,
}

/// Request body for recording a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub order_number: Option<String>,
    pub items: Vec<NewPurchaseItem>,
    #[serde(default)]
    pub shipping_cost: i64,
    pub payment_method: PurchasePaymentMethod,
    pub notes: Option<String>,
}

/// Request body for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub notes: Option<String>,
}

/// Request body for a partial customer update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub instagram: Option<String>,
    pub notes: Option<String>,
}

/// Request body for registering a manual expense in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub amount: i64,
    pub category: ExpenseCategory,
    pub description: String,
}

/// Request body for updating a sale's status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatusUpdate {
    pub status: SaleStatus,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&SaleChannel::Whatsapp).unwrap(),
            "\"WHATSAPP\""
        );
        assert_eq!(
            serde_json::to_string(&SaleStatus::PendingPayment).unwrap(),
            "\"PENDING_PAYMENT\""
        );
        assert_eq!(
            serde_json::to_string(&SalePaymentMethod::ContraEntrega).unwrap(),
            "\"CONTRA_ENTREGA\""
        );
        assert_eq!(
            serde_json::to_string(&ExpenseCategory::CompraAvemaria).unwrap(),
            "\"COMPRA_AVEMARIA\""
        );
        assert_eq!(
            serde_json::to_string(&CustomerLevel::Vip).unwrap(),
            "\"VIP\""
        );
        assert_eq!(
            serde_json::to_string(&CustomerLevel::Frecuente).unwrap(),
            "\"Frecuente\""
        );
    }

    #[test]
    fn test_new_sale_wire_format() {
        let body = r#"{
            "channel": "INSTAGRAM",
            "paymentMethod": "NEQUI",
            "items": [{"productId": "p1", "quantity": 2, "unitRevenue": 45000}]
        }"#;
        let sale: NewSale = serde_json::from_str(body).unwrap();
        assert_eq!(sale.channel, SaleChannel::Instagram);
        assert_eq!(sale.payment_method, SalePaymentMethod::Nequi);
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.items[0].unit_revenue, 45_000);
        assert!(sale.customer_id.is_none());
    }

    #[test]
    fn test_new_purchase_defaults() {
        let body = r#"{
            "paymentMethod": "TRANSFERENCIA",
            "items": [{"productId": "p1", "quantity": 20, "unitCost": 50000}]
        }"#;
        let purchase: NewPurchase = serde_json::from_str(body).unwrap();
        assert_eq!(purchase.shipping_cost, 0);
        assert!(purchase.order_number.is_none());
    }

    #[test]
    fn test_customer_level_thresholds() {
        assert_eq!(customer_level(2_000_000, 1), CustomerLevel::Vip);
        assert_eq!(customer_level(2_500_000, 0), CustomerLevel::Vip);
        assert_eq!(customer_level(800_000, 1), CustomerLevel::Frecuente);
        assert_eq!(customer_level(100_000, 8), CustomerLevel::Frecuente);
        assert_eq!(customer_level(799_999, 7), CustomerLevel::Regular);
        assert_eq!(customer_level(0, 0), CustomerLevel::Regular);
    }

    #[test]
    fn test_product_low_stock() {
        let product = Product {
            id: "p1".to_string(),
            reference: "CAN-001".to_string(),
            name: "Candongas doradas".to_string(),
            category: Category::Candongas,
            icon: None,
            wholesale_price: 22_000,
            retail_price: 60_000,
            stock: 3,
            min_stock: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_product_ref_key() {
        let body = r#"{
            "ref": "CAN-001",
            "name": "Candongas doradas",
            "category": "CANDONGAS",
            "wholesalePrice": 22000,
            "retailPrice": 60000
        }"#;
        let product: NewProduct = serde_json::from_str(body).unwrap();
        assert_eq!(product.reference, "CAN-001");
        assert_eq!(product.stock, 0);
        assert_eq!(product.min_stock, 10);
    }
}
