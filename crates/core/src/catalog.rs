//! Menu catalog: categories, products and the views built from them.
//!
//! Everything here is a pure transformation from a catalog snapshot to a
//! view description; fetching lives in the client crate.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::notice::Notice;
use crate::types::{CategoryId, Price, ProductId};

/// Products at or below this stock show a "last units" badge.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Product details mention the remaining stock at or below this level.
pub const DETAIL_STOCK_THRESHOLD: u32 = 10;

/// Query value that selects every category.
pub const ALL_CATEGORIES: &str = "todo";

/// Validation errors for catalog forms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Name, price or category missing from a product form.
    #[error("Name, price and category are required")]
    MissingProductFields,

    /// Product price is not positive.
    #[error("Price must be greater than 0")]
    NonPositivePrice,

    /// Name or icon missing from a category form.
    #[error("Name and icon are required")]
    MissingCategoryFields,
}

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub description: String,
    pub active: bool,
    pub display_order: i32,
}

/// The category summary embedded in each product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
}

/// A menu product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub stock: u32,
    pub active: bool,
    pub category: CategoryRef,
}

impl Product {
    /// Whether the product can be ordered right now.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.active && self.stock > 0
    }

    /// Whether the product is available but running out.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= LOW_STOCK_THRESHOLD
    }
}

/// Which products the menu shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(CategoryId),
}

impl CategoryFilter {
    /// Query value sent to the products endpoint, `None` for all products.
    #[must_use]
    pub const fn category_id(&self) -> Option<&CategoryId> {
        match self {
            Self::All => None,
            Self::Category(id) => Some(id),
        }
    }

    /// Whether `product` passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(id) => &product.category.id == id,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ALL_CATEGORIES {
            Ok(Self::All)
        } else {
            Ok(Self::Category(CategoryId::new(s)))
        }
    }
}

// =============================================================================
// Menu view
// =============================================================================

/// One entry of the category bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTab {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

/// A product as shown in the menu grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub available: bool,
    /// "Sold out" overlay or low-stock badge.
    pub badge: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let available = product.is_available();
        let badge = if !available {
            Some("Sold out".to_owned())
        } else if product.is_low_stock() {
            Some(format!("Only {} left!", product.stock))
        } else {
            None
        };

        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: Price::soles(product.price).display(),
            image: product.image.clone(),
            available,
            badge,
        }
    }
}

/// Everything the menu page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuView {
    pub tabs: Vec<CategoryTab>,
    pub cards: Vec<ProductCard>,
    pub empty_message: Option<String>,
}

impl MenuView {
    /// Build the menu for a catalog snapshot.
    ///
    /// The bar always starts with the "all" tab and lists only active
    /// categories, ordered by display order then name.
    #[must_use]
    pub fn build(categories: &[Category], products: &[Product], filter: &CategoryFilter) -> Self {
        let mut active: Vec<&Category> = categories.iter().filter(|c| c.active).collect();
        active.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut tabs = Vec::with_capacity(active.len() + 1);
        tabs.push(CategoryTab {
            key: ALL_CATEGORIES.to_owned(),
            label: "🍽️ All".to_owned(),
            selected: matches!(filter, CategoryFilter::All),
        });
        tabs.extend(active.into_iter().map(|c| CategoryTab {
            key: c.id.to_string(),
            label: format!("{} {}", c.icon, c.name),
            selected: filter.category_id() == Some(&c.id),
        }));

        let cards: Vec<ProductCard> = products
            .iter()
            .filter(|p| filter.matches(p))
            .map(ProductCard::from)
            .collect();

        let empty_message = cards
            .is_empty()
            .then(|| "No products available in this category.".to_owned());

        Self {
            tabs,
            cards,
            empty_message,
        }
    }
}

/// Product detail shown before adding to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub stock_note: Option<String>,
}

impl From<&Product> for ProductDetail {
    fn from(product: &Product) -> Self {
        let stock_note = (product.stock > 0 && product.stock <= DETAIL_STOCK_THRESHOLD)
            .then(|| format!("Stock available: {}", product.stock));
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: Price::soles(product.price).display(),
            image: product.image.clone(),
            stock_note,
        }
    }
}

// =============================================================================
// Admin forms
// =============================================================================

/// Product form contents, before submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub image: String,
    pub category_id: Option<CategoryId>,
    pub stock: u32,
    pub active: bool,
}

impl ProductDraft {
    /// Check the form before sending it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a required field is missing or the
    /// price is not positive.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let Some(price) = self.price else {
            return Err(CatalogError::MissingProductFields);
        };
        if self.name.trim().is_empty() || self.category_id.is_none() {
            return Err(CatalogError::MissingProductFields);
        }
        if price <= Decimal::ZERO {
            return Err(CatalogError::NonPositivePrice);
        }
        Ok(())
    }
}

/// Category form contents, before submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: String,
    pub description: String,
    pub display_order: i32,
    pub active: bool,
}

impl CategoryDraft {
    /// Check the form before sending it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingCategoryFields`] when name or icon is blank.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() || self.icon.trim().is_empty() {
            return Err(CatalogError::MissingCategoryFields);
        }
        Ok(())
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: Some(product.price),
            image: product.image.clone().unwrap_or_default(),
            category_id: Some(product.category.id.clone()),
            stock: product.stock,
            active: product.active,
        }
    }
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            icon: category.icon.clone(),
            description: category.description.clone(),
            display_order: category.display_order,
            active: category.active,
        }
    }
}

// =============================================================================
// Admin filters and dashboard
// =============================================================================

/// Products whose name or description contains `term`, ignoring case.
#[must_use]
pub fn search<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let term = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            term.is_empty()
                || p.name.to_lowercase().contains(&term)
                || p.description.to_lowercase().contains(&term)
        })
        .collect()
}

/// Products belonging to the filter's category.
#[must_use]
pub fn in_category<'a>(products: &'a [Product], filter: &CategoryFilter) -> Vec<&'a Product> {
    products.iter().filter(|p| filter.matches(p)).collect()
}

/// Name and formatted price of a product, for dashboard extremes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedName {
    pub name: String,
    pub price: String,
}

/// Admin dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub active_products: usize,
    pub total_categories: usize,
    /// Active products at or below [`LOW_STOCK_THRESHOLD`].
    pub low_stock_products: usize,
    pub most_expensive: Option<PricedName>,
    pub least_expensive: Option<PricedName>,
}

impl DashboardStats {
    /// Compute the dashboard for a catalog snapshot.
    #[must_use]
    pub fn compute(categories: &[Category], products: &[Product]) -> Self {
        let priced = |p: &Product| PricedName {
            name: p.name.clone(),
            price: Price::soles(p.price).display(),
        };

        // First of the most expensive, last of the cheapest.
        let most_expensive = products
            .iter()
            .reduce(|best, p| if p.price > best.price { p } else { best })
            .map(priced);
        let least_expensive = products
            .iter()
            .reduce(|best, p| if p.price <= best.price { p } else { best })
            .map(priced);

        Self {
            total_products: products.len(),
            active_products: products.iter().filter(|p| p.active).count(),
            total_categories: categories.len(),
            low_stock_products: products
                .iter()
                .filter(|p| p.active && p.stock <= LOW_STOCK_THRESHOLD)
                .count(),
            most_expensive,
            least_expensive,
        }
    }

    /// Warning shown when any active product is low on stock.
    #[must_use]
    pub fn low_stock_notice(&self) -> Option<Notice> {
        (self.low_stock_products > 0).then(|| {
            Notice::warning(format!(
                "{} product(s) low on stock",
                self.low_stock_products
            ))
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(id: &str, name: &str, active: bool, order: i32) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_owned(),
            icon: "🍔".to_owned(),
            description: String::new(),
            active,
            display_order: order,
        }
    }

    pub fn product(id: &str, category: &str, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: format!("Description of {id}"),
            price: Decimal::from(price),
            image: None,
            stock,
            active: true,
            category: CategoryRef {
                id: CategoryId::new(category),
                name: category.to_owned(),
                icon: "🍔".to_owned(),
            },
        }
    }
}
