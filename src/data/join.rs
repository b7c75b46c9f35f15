use std::collections::{BTreeSet, HashMap, HashSet};
use std::collections::hash_map::Entry;

use super::model::{
    CategoryTranslation, Customer, EnrichedItem, EnrichedOrder, Order, OrderItem, Product,
    RawDataset, Review,
};

// ---------------------------------------------------------------------------
// Enriched views
// ---------------------------------------------------------------------------

/// Both denormalised views, built once per loaded dataset and read-only after.
#[derive(Debug, Clone, Default)]
pub struct EnrichedViews {
    pub orders: Vec<EnrichedOrder>,
    pub items: Vec<EnrichedItem>,
}

impl EnrichedViews {
    /// Run the join graph in its fixed order: orders first, then items on
    /// top of the enriched orders.
    pub fn build(raw: &RawDataset) -> Self {
        let orders = enrich_orders(&raw.orders, &raw.customers, &raw.reviews);
        let items = enrich_items(
            &raw.order_items,
            &orders,
            &raw.products,
            &raw.category_translations,
        );
        let delivered = orders.iter().filter(|o| o.delivered_at.is_some()).count();
        let late = orders
            .iter()
            .filter(|o| match (o.delivered_at, o.estimated_delivery_at) {
                (Some(delivered), Some(estimated)) => delivered > estimated,
                _ => false,
            })
            .count();
        let products: HashSet<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
        let item_orders: HashSet<&str> = items.iter().map(|i| i.order_id.as_str()).collect();
        log::info!(
            "Built enriched views: {} orders ({delivered} delivered, {late} late), \
             {} item lines across {} orders and {} products",
            orders.len(),
            items.len(),
            item_orders.len(),
            products.len()
        );
        EnrichedViews { orders, items }
    }
}

// ---------------------------------------------------------------------------
// Join helpers
// ---------------------------------------------------------------------------

/// Index the right side of a join by key.  Keys are expected to be unique;
/// on repeats the first row wins and the repeats are reported.
fn index_by<'a, T>(rows: &'a [T], key: impl Fn(&T) -> &str, what: &str) -> HashMap<&'a str, &'a T> {
    let mut index = HashMap::with_capacity(rows.len());
    let mut duplicates = 0usize;
    for row in rows {
        match index.entry(key(row)) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    }
    if duplicates > 0 {
        log::warn!("{what}: ignored {duplicates} rows with a repeated key");
    }
    index
}

/// Order ⋈ Customer (left) ⋈ Review (left).
pub fn enrich_orders(
    orders: &[Order],
    customers: &[Customer],
    reviews: &[Review],
) -> Vec<EnrichedOrder> {
    let customers = index_by(customers, |c| c.customer_id.as_str(), "customers");
    let reviews = index_by(reviews, |r| r.order_id.as_str(), "reviews");

    orders
        .iter()
        .map(|order| EnrichedOrder {
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            purchased_at: order.purchased_at,
            delivered_at: order.delivered_at,
            estimated_delivery_at: order.estimated_delivery_at,
            customer_state: customers
                .get(order.customer_id.as_str())
                .and_then(|c| c.customer_state.clone()),
            review_score: reviews
                .get(order.order_id.as_str())
                .and_then(|r| r.review_score),
        })
        .collect()
}

/// OrderItem ⋈ EnrichedOrder (inner) ⋈ Product (inner) ⋈ CategoryTranslation (left).
pub fn enrich_items(
    items: &[OrderItem],
    orders: &[EnrichedOrder],
    products: &[Product],
    translations: &[CategoryTranslation],
) -> Vec<EnrichedItem> {
    let orders = index_by(orders, |o| o.order_id.as_str(), "orders");
    let products = index_by(products, |p| p.product_id.as_str(), "products");
    let translations = index_by(
        translations,
        |t| t.category_raw.as_str(),
        "category translations",
    );

    let mut without_order = 0usize;
    let mut without_product = 0usize;
    let mut enriched = Vec::with_capacity(items.len());

    for item in items {
        let Some(order) = orders.get(item.order_id.as_str()) else {
            without_order += 1;
            continue;
        };
        let Some(product) = products.get(item.product_id.as_str()) else {
            without_product += 1;
            continue;
        };

        let category = product
            .category_raw
            .as_deref()
            .and_then(|raw| translations.get(raw))
            .and_then(|t| t.category_english.clone());

        enriched.push(EnrichedItem {
            order_id: item.order_id.clone(),
            product_id: item.product_id.clone(),
            revenue: item.price,
            purchased_at: order.purchased_at,
            customer_state: order.customer_state.clone(),
            review_score: order.review_score,
            category_raw: product.category_raw.clone(),
            category,
        });
    }

    let untranslated: BTreeSet<&str> = enriched
        .iter()
        .filter(|i| i.category.is_none())
        .filter_map(|i| i.category_raw.as_deref())
        .collect();
    if !untranslated.is_empty() {
        log::warn!(
            "No English name for categories {untranslated:?}; their lines are grouped as unknown"
        );
    }

    if without_order > 0 || without_product > 0 {
        log::warn!(
            "Dropped item lines: {without_order} without a matching order, \
             {without_product} without a matching product"
        );
    }

    enriched
}
