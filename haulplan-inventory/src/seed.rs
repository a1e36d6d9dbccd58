//! Initial ledger contents.

use crate::StockKey;

const DEMO_ITEMS: [&str; 20] = [
    "BREAD_WHITE",
    "BREAD_WHOLE",
    "MILK_2PCT",
    "MILK_SKIM",
    "EGGS_DOZEN",
    "BUTTER_SALTED",
    "CHEESE_CHEDDAR",
    "YOGURT_VANILLA",
    "APPLES_GALA",
    "BANANAS",
    "CHICKEN_BREAST",
    "GROUND_BEEF",
    "SALMON_FILLET",
    "PASTA_PENNE",
    "RICE_BASMATI",
    "TOMATO_SAUCE",
    "OLIVE_OIL",
    "ONIONS_YELLOW",
    "POTATOES_RUSSET",
    "CARROTS",
];

const DEMO_WAREHOUSES: [&str; 4] = ["WH_NORTH", "WH_WEST", "WH_EAST", "WH_CENTRAL"];

const DEMO_FRANCHISEES: [&str; 5] = ["FRAN_001", "FRAN_002", "FRAN_003", "FRAN_004", "FRAN_005"];

/// Franchisees stock only the first items of the catalogue.
const FRANCHISEE_ITEM_COUNT: usize = 10;

/// Ledger entries loaded when an engine is built.
///
/// # Examples
///
/// ```
/// use haulplan_inventory::{SeedStock, StockKey};
///
/// let seed = SeedStock::demo();
/// assert_eq!(seed.len(), 4 * 20 + 5 * 10);
/// assert!(seed.quantity(&StockKey::warehouse("WH_NORTH", "BREAD_WHITE")) >= 200.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedStock {
    entries: Vec<(StockKey, f64)>,
}

impl SeedStock {
    /// No stock at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Demonstration stock for four warehouses and five franchisees.
    ///
    /// Warehouses hold every catalogue item at a base of 100 units, 200 for
    /// bread and milk, 50 for meat and fish, plus a stable 0..100 offset.
    /// Franchisees hold the first ten items at 10 units plus a stable 0..20
    /// offset.
    #[must_use]
    pub fn demo() -> Self {
        let mut seed = Self::empty();
        for warehouse in DEMO_WAREHOUSES {
            for item in DEMO_ITEMS {
                let offset = stable_offset(warehouse, item, 100);
                seed = seed.with(StockKey::warehouse(warehouse, item), warehouse_base(item) + offset);
            }
        }
        for franchisee in DEMO_FRANCHISEES {
            for item in DEMO_ITEMS.iter().take(FRANCHISEE_ITEM_COUNT) {
                let offset = stable_offset(franchisee, item, 20);
                seed = seed.with(StockKey::franchisee(franchisee, *item), 10.0 + offset);
            }
        }
        seed
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with(mut self, key: StockKey, qty: f64) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = qty,
            None => self.entries.push((key, qty)),
        }
        self
    }

    /// Seeded quantity for `key`, zero when absent.
    #[must_use]
    pub fn quantity(&self, key: &StockKey) -> f64 {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map_or(0.0, |(_, qty)| *qty)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&StockKey, f64)> {
        self.entries.iter().map(|(key, qty)| (key, *qty))
    }
}

fn warehouse_base(item: &str) -> f64 {
    if item.contains("BREAD") || item.contains("MILK") {
        200.0
    } else if item.contains("MEAT") || item.contains("CHICKEN") || item.contains("SALMON") {
        50.0
    } else {
        100.0
    }
}

/// FNV-1a over `site` and `item`, reduced modulo `modulus`.
fn stable_offset(site: &str, item: &str, modulus: u64) -> f64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    let hash = site
        .bytes()
        .chain(std::iter::once(b'_'))
        .chain(item.bytes())
        .fold(OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(PRIME)
        });
    (hash % modulus) as f64
}
