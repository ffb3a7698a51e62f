use crate::models::StockSnapshot;

/// Decides whether a stock-snapshot name refers to a purchased product
pub trait ProductMatcher: Send + Sync {
    fn matches(&self, snapshot_name: &str, product: &str) -> bool;
}

/// Every word of the snapshot name must appear among the product's words,
/// after normalisation. "Milk full cream" matches "Coles Full Cream Milk 3L".
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSubsetMatcher;

impl ProductMatcher for TokenSubsetMatcher {
    fn matches(&self, snapshot_name: &str, product: &str) -> bool {
        let wanted = normalize_product_name(snapshot_name);
        if wanted.is_empty() {
            return false;
        }
        let normalized = normalize_product_name(product);
        let product_words: Vec<&str> = normalized.split_whitespace().collect();
        wanted.split_whitespace().all(|w| product_words.contains(&w))
    }
}

/// Lowercases, drops possessives, turns punctuation into spaces and collapses whitespace
pub fn normalize_product_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let without_possessive = lowered
        .replace("''s", "")
        .replace("'s", "")
        .replace("\u{2019}s", "");

    let cleaned: String = without_possessive
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Counted quantity of `product` in the snapshot, first matching entry wins
pub fn lookup_stock(snapshot: &StockSnapshot, product: &str, matcher: &dyn ProductMatcher) -> Option<f64> {
    snapshot
        .items
        .iter()
        .find(|item| matcher.matches(&item.product, product))
        .map(|item| item.quantity)
}
