//! Dashboard figures computed from sales, products and customers.

use chrono::Datelike;
use tracing::instrument;

use coronda_core::{Money, Product, Sale};
use coronda_platform::store::{DocumentStore, ProductRepository, SaleRepository, UserRepository};

use crate::error::Result;
use crate::models::{DashboardStats, MonthlyRevenue};

/// Short month names in calendar order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Load sales, products and customers concurrently and summarize them.
///
/// # Errors
///
/// Returns an error if any of the three listings fails.
#[instrument(skip(store))]
pub async fn load_stats(store: &dyn DocumentStore) -> Result<DashboardStats> {
    let sales = SaleRepository::new(store);
    let products = ProductRepository::new(store);
    let users = UserRepository::new(store);

    let (sales, products, customers) =
        futures::try_join!(sales.list(), products.list(), users.list_customers())?;

    Ok(compute_stats(&sales, &products, customers.len()))
}

/// Summarize the shop.
///
/// Revenue by month merges all years into twelve buckets and lists only the
/// months that had sales. Sales with an unreadable date still count toward
/// the total revenue but are left out of the monthly series.
#[must_use]
pub fn compute_stats(sales: &[Sale], products: &[Product], customers: usize) -> DashboardStats {
    let mut by_month: [Option<Money>; 12] = [None; 12];
    for sale in sales {
        let Some(date) = sale.parsed_date() else {
            tracing::debug!(sale_id = %sale.id, date = %sale.date, "Sale date unreadable");
            continue;
        };
        let bucket = &mut by_month[date.month0() as usize];
        *bucket = Some(bucket.unwrap_or_default() + sale.total);
    }

    let revenue_by_month = MONTHS
        .into_iter()
        .zip(by_month)
        .filter_map(|(name, total)| total.map(|total| MonthlyRevenue { name, total }))
        .collect();

    DashboardStats {
        total_revenue: sales.iter().map(|s| s.total).sum(),
        sale_count: sales.len(),
        active_products: products.iter().filter(|p| p.in_stock()).count(),
        customers,
        revenue_by_month,
    }
}
