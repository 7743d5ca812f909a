use serde::{Deserialize, Serialize};

use crate::domain::RecordId;

pub const ITEMS_PER_PAGE: usize = 8;
/// The carousel only cycles through the first few dishes.
pub const FEATURED_COUNT: usize = 6;

/// A dish on the menu. Immutable once defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

const IMAGE_PREFIX: &str = "https://images.unsplash.com/photo-";
const IMAGE_SUFFIX: &str = "?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&h=400&q=80";

// (id, name, description, price, unsplash photo key)
const CATALOG: [(u64, &str, &str, f64, &str); 32] = [
    (1, "Margherita Pizza", "Wood-fired pizza with San Marzano tomatoes, fresh mozzarella, and basil leaves", 12.99, "1604068549290-dea0e4a305ca"),
    (2, "Gourmet Burger", "Prime beef patty with aged cheddar, crispy bacon, and truffle aioli on brioche bun", 14.99, "1561758033-d89a9ad46330"),
    (3, "Creamy Truffle Pasta", "Handmade fettuccine with black truffle, wild mushrooms, and parmesan cream sauce", 18.99, "1473093295043-cdd812d0e601"),
    (4, "Caesar Salad", "Organic romaine hearts with homemade dressing, parmesan crisps, and anchovies", 11.99, "1546793665-c74683f339c1"),
    (5, "Chocolate Lava Cake", "Warm chocolate cake with molten center, served with vanilla bean ice cream", 9.99, "1624353365286-3f8d62daad51"),
    (6, "Fresh Juice Blend", "Cold-pressed orange, carrot, and ginger juice with mint and lime", 6.99, "1613478223719-2ab802602423"),
    (7, "Grilled Salmon", "Atlantic salmon with lemon herb butter and roasted vegetables", 19.99, "1467003909585-2f8a72700288"),
    (8, "Sushi Platter", "Assorted fresh sushi with tuna, salmon, and California rolls", 22.99, "1579584425555-c3ce17fd4351"),
    (9, "BBQ Ribs", "Slow-cooked pork ribs with homemade BBQ sauce and coleslaw", 21.99, "1546833999-b9f581a1996d"),
    (10, "Mushroom Risotto", "Creamy arborio rice with wild mushrooms and parmesan", 15.99, "1476124369491-e7addf5db371"),
    (11, "Tiramisu", "Classic Italian dessert with coffee-soaked ladyfingers and mascarpone", 7.99, "1571877227200-a0d98ea607e9"),
    (12, "Craft Cocktails", "Handcrafted signature cocktails with premium spirits", 10.99, "1470337458703-46ad1756a187"),
    (13, "Garlic Bread", "Freshly baked bread with garlic butter and herbs", 5.99, "1573140200114-8636d76cd110"),
    (14, "Chicken Wings", "Crispy chicken wings with buffalo sauce and ranch dip", 12.99, "1567620832903-9fc6debc209f"),
    (15, "Vegetable Stir Fry", "Fresh seasonal vegetables stir-fried in soy-ginger sauce", 13.99, "1512058564366-18510be2db19"),
    (16, "Beef Steak", "Grilled ribeye steak with mashed potatoes and red wine sauce", 24.99, "1600891964092-4316c288032e"),
    (17, "Fish Tacos", "Crispy fish fillets in soft tortillas with slaw and chipotle mayo", 14.99, "1551504734-5ee1c4a1479b"),
    (18, "Mango Smoothie", "Fresh mango blended with yogurt and honey", 6.49, "1570197788417-0e82375c9371"),
    (19, "Cheesecake", "New York style cheesecake with berry compote", 8.99, "1567306301408-9b74779a11af"),
    (20, "Chicken Biryani", "Fragrant basmati rice with spiced chicken and herbs", 16.99, "1631452180519-c014fe946bc7"),
    (21, "Vegetable Soup", "Hearty vegetable soup with fresh herbs and croutons", 7.99, "1547592166-23ac45744acd"),
    (22, "Paneer Tikka", "Grilled cottage cheese cubes with Indian spices", 13.99, "1599487488170-d11ec9c172f0"),
    (23, "Fruit Salad", "Seasonal fresh fruits with honey-lime dressing", 8.99, "1564093497595-593b96d80180"),
    (24, "Iced Coffee", "Cold brew coffee with milk and vanilla syrup", 5.99, "1461023058943-07fcbe16d735"),
    (25, "Butter Chicken", "Tender chicken in rich tomato and butter sauce", 17.99, "1565557623262-b51c2513a641"),
    (26, "Greek Salad", "Fresh vegetables with feta cheese and olive oil dressing", 10.99, "1540420773420-3366772f4999"),
    (27, "Chicken Wrap", "Grilled chicken with fresh veggies in tortilla wrap", 11.99, "1565299624946-b28f40a0ca4b"),
    (28, "Mozzarella Sticks", "Breaded mozzarella sticks with marinara sauce", 8.99, "1563379926898-05f4575a45d8"),
    (29, "Chocolate Milkshake", "Creamy chocolate milkshake with whipped cream", 7.49, "1629453110196-65cc0d035d7d"),
    (30, "Vegetable Pizza", "Pizza loaded with fresh seasonal vegetables", 14.99, "1604068549290-dea0e4a305ca"),
    (31, "French Fries", "Crispy golden fries with sea salt", 5.99, "1573080496219-bb080dd4f877"),
    (32, "Green Tea", "Premium Japanese green tea", 4.99, "1556679343-c7306c1976bc"),
];

/// The built-in menu, used whenever the store has none.
pub fn static_catalog() -> Vec<MenuItem> {
    CATALOG
        .iter()
        .map(|&(id, name, description, price, photo)| MenuItem {
            id: RecordId::from(id),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image: format!("{IMAGE_PREFIX}{photo}{IMAGE_SUFFIX}"),
        })
        .collect()
}

pub fn find_item<'a>(items: &'a [MenuItem], id: &RecordId) -> Option<&'a MenuItem> {
    items.iter().find(|item| &item.id == id)
}

/// Rupee price with two decimals, e.g. `₹12.99`.
pub fn format_price(amount: f64) -> String {
    format!("₹{amount:.2}")
}

/// 1-based page cursor over the menu grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
    current: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(ITEMS_PER_PAGE)
    }
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            current: 1,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total_pages(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.per_page)
    }

    /// Out-of-range pages clamp to the nearest valid one.
    pub fn set_page(&mut self, page: usize, item_count: usize) {
        let last = self.total_pages(item_count).max(1);
        self.current = page.clamp(1, last);
    }

    pub fn page<'a>(&self, items: &'a [MenuItem]) -> &'a [MenuItem] {
        let start = (self.current - 1) * self.per_page;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

/// Featured-dish slider with wrap-around navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    active: usize,
}

impl Carousel {
    pub fn featured(menu_len: usize) -> Self {
        Self {
            len: menu_len.min(FEATURED_COUNT),
            active: 0,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.active = (self.active + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.active = if self.active == 0 { self.len - 1 } else { self.active - 1 };
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.active = index;
        }
    }
}
