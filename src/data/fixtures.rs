//! Small in-memory datasets shared by the unit tests.

use super::model::{
    parse_timestamp, CategoryTranslation, Customer, EnrichedItem, Order, OrderItem, Product,
    RawDataset, Review,
};

pub fn order(id: &str, customer: &str, purchased: &str) -> Order {
    Order {
        order_id: id.to_string(),
        customer_id: customer.to_string(),
        purchased_at: parse_timestamp(purchased),
        delivered_at: None,
        estimated_delivery_at: None,
    }
}

pub fn item(order: &str, product: &str, price: f64) -> OrderItem {
    OrderItem {
        order_id: order.to_string(),
        product_id: product.to_string(),
        price: Some(price),
    }
}

pub fn product(id: &str, category: &str) -> Product {
    Product {
        product_id: id.to_string(),
        category_raw: Some(category.to_string()),
    }
}

pub fn translation(raw: &str, english: &str) -> CategoryTranslation {
    CategoryTranslation {
        category_raw: raw.to_string(),
        category_english: Some(english.to_string()),
    }
}

pub fn customer(id: &str, state: &str) -> Customer {
    Customer {
        customer_id: id.to_string(),
        customer_state: Some(state.to_string()),
    }
}

pub fn review(order: &str, score: u8) -> Review {
    Review {
        order_id: order.to_string(),
        review_score: Some(score),
    }
}

/// An item row built directly, bypassing the join layer.
pub fn enriched(category: Option<&str>, price: f64, purchased: &str) -> EnrichedItem {
    EnrichedItem {
        order_id: "o".to_string(),
        product_id: "p".to_string(),
        revenue: Some(price),
        purchased_at: parse_timestamp(purchased),
        customer_state: None,
        review_score: None,
        category_raw: None,
        category: category.map(str::to_string),
    }
}

/// Six orders over 2017–2018 with the awkward cases mixed in:
///
/// * `o5` has an unparseable timestamp and no review
/// * `o6` belongs to a customer that does not exist
/// * `o1` has a second review that must be ignored
/// * `p3` (`pc_gamer`) has no English translation
/// * one item points at a missing order (`o7`), one at a missing product (`p9`)
///
/// After the join there are 10 item lines:
///
/// | order | year | state | score | product | category              | price |
/// |-------|------|-------|-------|---------|-----------------------|-------|
/// | o1    | 2017 | SP    | 5     | p1      | toys                  | 10    |
/// | o1    | 2017 | SP    | 5     | p2      | computers_accessories | 100   |
/// | o2    | 2017 | RJ    | 3     | p1      | toys                  | 20    |
/// | o2    | 2017 | RJ    | 3     | p3      | (none)                | 50    |
/// | o3    | 2018 | MG    | 1     | p4      | health_beauty         | 30    |
/// | o3    | 2018 | MG    | 1     | p1      | toys                  | 15    |
/// | o4    | 2018 | SP    | 4     | p2      | computers_accessories | 200   |
/// | o4    | 2018 | SP    | 4     | p4      | health_beauty         | 25    |
/// | o5    | -    | RJ    | -     | p1      | toys                  | 5     |
/// | o6    | 2018 | -     | 2     | p3      | (none)                | 40    |
pub fn sample_dataset() -> RawDataset {
    RawDataset {
        orders: vec![
            order("o1", "c1", "2017-03-10 09:15:00"),
            order("o2", "c2", "2017-11-05 18:40:12"),
            order("o3", "c3", "2018-01-20 11:00:00"),
            order("o4", "c1", "2018-02-14 20:30:00"),
            order("o5", "c2", "garbage"),
            order("o6", "c9", "2018-05-01 08:00:00"),
        ],
        order_items: vec![
            item("o1", "p1", 10.0),
            item("o1", "p2", 100.0),
            item("o2", "p1", 20.0),
            item("o2", "p3", 50.0),
            item("o3", "p4", 30.0),
            item("o3", "p1", 15.0),
            item("o4", "p2", 200.0),
            item("o4", "p4", 25.0),
            item("o5", "p1", 5.0),
            item("o6", "p3", 40.0),
            item("o7", "p1", 99.0),
            item("o4", "p9", 1.0),
        ],
        products: vec![
            product("p1", "brinquedos"),
            product("p2", "informatica_acessorios"),
            product("p3", "pc_gamer"),
            product("p4", "beleza_saude"),
        ],
        category_translations: vec![
            translation("brinquedos", "toys"),
            translation("informatica_acessorios", "computers_accessories"),
            translation("beleza_saude", "health_beauty"),
        ],
        customers: vec![
            customer("c1", "SP"),
            customer("c2", "RJ"),
            customer("c3", "MG"),
        ],
        reviews: vec![
            review("o1", 5),
            review("o2", 3),
            review("o3", 1),
            review("o4", 4),
            review("o6", 2),
            review("o1", 1),
        ],
    }
}
