//! Plain-text rendering of views for the terminal.
//!
//! Every function returns a `String`; printing is the caller's job.

use chrono::{DateTime, Local, Utc};
use comanda_client::CheckoutLookups;
use comanda_client::api::types::LookupOption;
use comanda_core::cart::Cart;
use comanda_core::catalog::{Category, DashboardStats, MenuView, Product, ProductDetail};
use comanda_core::checkout::wizard::FieldFailure;
use comanda_core::checkout::{Progress, Totals};
use comanda_core::confirmation::OrderConfirmation;
use comanda_core::notice::{Notice, NoticeLevel};
use comanda_core::types::{Price, User};
use rust_decimal::Decimal;

fn money(amount: Decimal) -> String {
    Price::soles(amount).display()
}

/// Newline-terminate every line and concatenate.
fn block(lines: impl IntoIterator<Item = String>) -> String {
    lines
        .into_iter()
        .map(|mut line| {
            line.push('\n');
            line
        })
        .collect()
}

pub fn notice(notice: &Notice) -> String {
    let icon = match notice.level {
        NoticeLevel::Success => "✔",
        NoticeLevel::Error => "✖",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Info => "ℹ",
    };
    format!("{icon} {}", notice.message)
}

pub fn user(user: &User) -> String {
    let mut lines = vec![
        format!("{} <{}>", user.name, user.email),
        format!("Role: {}", user.role),
    ];
    lines.extend(user.phone.as_ref().map(|phone| format!("Phone: {phone}")));
    lines.extend(user.address.as_ref().map(|address| format!("Address: {address}")));
    block(lines)
}

// =============================================================================
// Menu and cart
// =============================================================================

pub fn menu(view: &MenuView) -> String {
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|t| {
            if t.selected {
                format!("[{}]", t.label)
            } else {
                t.label.clone()
            }
        })
        .collect();
    let mut lines = vec![tabs.join("  "), String::new()];

    if let Some(message) = &view.empty_message {
        lines.push(message.clone());
        return block(lines);
    }

    for card in &view.cards {
        let badge = card
            .badge
            .as_deref()
            .map(|b| format!("  ({b})"))
            .unwrap_or_default();
        lines.push(format!("#{:<6} {:<30} {:>10}{badge}", card.id, card.name, card.price));
        if !card.description.is_empty() {
            lines.push(format!("        {}", card.description));
        }
    }
    block(lines)
}

pub fn product_detail(detail: &ProductDetail) -> String {
    let mut lines = vec![format!("{}  {}", detail.name, detail.price)];
    if !detail.description.is_empty() {
        lines.push(detail.description.clone());
    }
    lines.extend(detail.stock_note.clone());
    lines.extend(detail.image.as_ref().map(|image| format!("Image: {image}")));
    block(lines)
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.\n".to_string();
    }

    let items = cart.items().iter().map(|item| {
        format!(
            "#{:<6} {:>3} x {:<28} {:>10}",
            item.product_id,
            item.quantity,
            item.name,
            money(item.line_total())
        )
    });
    let summary = format!("{} item(s), total {}", cart.item_count(), money(cart.total()));
    block(items.chain([summary]))
}

// =============================================================================
// Checkout and confirmation
// =============================================================================

pub fn totals(totals: &Totals) -> String {
    let delivery = if totals.delivery_cost.is_zero() {
        "Free".to_string()
    } else {
        money(totals.delivery_cost)
    };
    format!(
        "Subtotal: {}\nDelivery: {delivery}\nTotal:    {}\n",
        money(totals.subtotal),
        money(totals.total)
    )
}

fn option_names(options: &[LookupOption]) -> String {
    options
        .iter()
        .map(|o| o.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn lookups(lookups: &CheckoutLookups) -> String {
    format!(
        "Delivery methods: {}\nPayment methods:  {}\nReceipt types:    {}\n",
        option_names(&lookups.delivery_methods),
        option_names(&lookups.payment_methods),
        option_names(&lookups.receipt_types)
    )
}

pub fn progress(progress: &Progress) -> String {
    format!("{} ({}%)", progress.label, progress.percent)
}

pub fn failures(failures: &[FieldFailure]) -> String {
    block(
        failures
            .iter()
            .map(|f| format!("  - {}: {}", f.field.label(), f.failure)),
    )
}

pub fn confirmation(order: &OrderConfirmation, now: DateTime<Utc>) -> String {
    let estimate = order.delivery_estimate();

    let mut lines = vec![
        order.headline(),
        String::new(),
        format!("Order number: {}", order.order_number),
        format!(
            "Placed: {}",
            order.placed_at.with_timezone(&Local).format("%d/%m/%Y %H:%M")
        ),
        format!("Status: {}", order.status),
        String::new(),
        estimate.message.clone(),
    ];
    lines.extend(estimate.address.as_ref().map(|address| format!("Address: {address}")));
    lines.extend(
        estimate
            .reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(|reference| format!("Reference: {reference}")),
    );
    lines.extend([order.countdown(now), String::new()]);
    lines.extend(order.items.iter().map(|item| {
        format!(
            "{:>3} x {:<28} {:>10}",
            item.quantity,
            item.name,
            money(item.subtotal)
        )
    }));
    lines.push(String::new());

    let mut out = block(lines);
    out.push_str(&totals(&order.totals));
    out
}

// =============================================================================
// Admin
// =============================================================================

pub fn dashboard(stats: &DashboardStats, warning: Option<&Notice>) -> String {
    let mut lines = vec![
        format!("Products:       {}", stats.total_products),
        format!("Active:         {}", stats.active_products),
        format!("Categories:     {}", stats.total_categories),
        format!("Low stock:      {}", stats.low_stock_products),
    ];
    if let Some(p) = &stats.most_expensive {
        lines.push(format!("Most expensive: {} ({})", p.name, p.price));
    }
    if let Some(p) = &stats.least_expensive {
        lines.push(format!("Cheapest:       {} ({})", p.name, p.price));
    }
    if let Some(warning) = warning {
        lines.extend([String::new(), notice(warning)]);
    }
    block(lines)
}

pub fn products(products: &[&Product]) -> String {
    if products.is_empty() {
        return "No products found.\n".to_string();
    }

    block(products.iter().map(|p| {
        let status = if p.active { "active" } else { "inactive" };
        format!(
            "#{:<6} {:<28} {:>10}  stock {:>4}  {:<8}  {}",
            p.id,
            p.name,
            money(p.price),
            p.stock,
            status,
            p.category.name
        )
    }))
}

pub fn categories(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n".to_string();
    }

    block(categories.iter().map(|c| {
        let status = if c.active { "active" } else { "inactive" };
        format!(
            "#{:<6} {} {:<24} order {:>3}  {}",
            c.id, c.icon, c.name, c.display_order, status
        )
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use comanda_core::catalog::{CategoryFilter, CategoryRef};
    use comanda_core::types::{CategoryId, DeliveryMethod, ProductId};

    fn product(id: &str, name: &str, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(1590, 2),
            image: None,
            stock,
            active: true,
            category: CategoryRef {
                id: CategoryId::new("1"),
                name: "Burgers".to_string(),
                icon: "🍔".to_string(),
            },
        }
    }

    #[test]
    fn test_menu_marks_selected_tab_and_badges() {
        let products = [product("1", "Clásica", 3), product("2", "Doble", 0)];
        let view = MenuView::build(&[], &products, &CategoryFilter::All);
        let text = menu(&view);
        assert!(text.starts_with("[🍽️ All]"));
        assert!(text.contains("Only 3 left!"));
        assert!(text.contains("Sold out"));
        assert!(text.contains("S/ 15.90"));
    }

    #[test]
    fn test_empty_menu_message() {
        let view = MenuView::build(&[], &[], &CategoryFilter::All);
        assert!(menu(&view).contains("No products available"));
    }

    #[test]
    fn test_cart_totals() {
        let mut c = Cart::new();
        c.add(&product("1", "Clásica", 10), 2).unwrap();
        let text = cart(&c);
        assert!(text.contains("S/ 31.80"));
        assert!(text.contains("2 item(s)"));
        assert_eq!(cart(&Cart::new()), "Your cart is empty.\n");
    }

    #[test]
    fn test_free_pickup() {
        let t = Totals::compute(Decimal::new(1000, 2), DeliveryMethod::Pickup, Decimal::new(500, 2));
        assert!(totals(&t).contains("Delivery: Free"));
        let t = Totals::compute(Decimal::new(1000, 2), DeliveryMethod::Delivery, Decimal::new(500, 2));
        assert!(totals(&t).contains("Total:    S/ 15.00"));
    }

    #[test]
    fn test_dashboard_lines() {
        let stats = DashboardStats::compute(&[], &[product("1", "Clásica", 3)]);
        let text = dashboard(&stats, Some(&Notice::warning("Stale data")));
        assert_eq!(
            text,
            "Products:       1\n\
             Active:         1\n\
             Categories:     0\n\
             Low stock:      1\n\
             Most expensive: Clásica (S/ 15.90)\n\
             Cheapest:       Clásica (S/ 15.90)\n\
             \n\
             ⚠ Stale data\n"
        );
        assert_eq!(failures(&[]), "");
    }

    #[test]
    fn test_notice_icons() {
        assert_eq!(notice(&Notice::warning("Careful")), "⚠ Careful");
        assert_eq!(notice(&Notice::success("Done")), "✔ Done");
    }
}
