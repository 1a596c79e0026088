//! Catalog administration commands.
//!
//! # Usage
//!
//! ```bash
//! comanda admin dashboard
//! comanda admin product list --search burger --category 2
//! comanda admin product create --name "Clásica" --price 15.90 --category 2 --stock 20
//! comanda admin product update 12 --price 16.50
//! comanda admin product toggle 12
//! comanda admin category create --name Bebidas --icon 🥤
//! comanda admin category delete 3 --yes
//! ```

use clap::{Args, Subcommand};
use comanda_core::catalog::{CategoryDraft, CategoryFilter, ProductDraft};
use comanda_core::types::{CategoryId, ProductId};
use rust_decimal::Decimal;

use super::{CliError, Context, confirm, print};
use crate::render;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Show catalog figures
    Dashboard,
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, including inactive ones
    List {
        /// Match name or description, ignoring case
        #[arg(short, long, default_value = "")]
        search: String,

        /// Category id, or `todo` for every category
        #[arg(short, long, default_value = "todo")]
        category: CategoryFilter,
    },
    /// Create a product
    Create(ProductArgs),
    /// Update a product; omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Activate or deactivate a product
    Toggle { id: String },
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    image: Option<String>,
    /// Category id
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    stock: Option<u32>,
    /// Create or leave the product inactive
    #[arg(long)]
    inactive: bool,
}

impl ProductArgs {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if self.price.is_some() {
            draft.price = self.price;
        }
        if let Some(image) = self.image {
            draft.image = image;
        }
        if let Some(category) = self.category {
            draft.category_id = Some(CategoryId::new(category));
        }
        if let Some(stock) = self.stock {
            draft.stock = stock;
        }
        if self.inactive {
            draft.active = false;
        }
    }
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories, including inactive ones
    List,
    /// Create a category
    Create(CategoryArgs),
    /// Update a category; omitted fields keep their value
    Update {
        id: String,
        #[command(flatten)]
        fields: CategoryArgs,
    },
    /// Delete a category
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Activate or deactivate a category
    Toggle { id: String },
}

#[derive(Args)]
pub struct CategoryArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    order: Option<i32>,
    /// Create or leave the category inactive
    #[arg(long)]
    inactive: bool,
}

impl CategoryArgs {
    fn apply(self, draft: &mut CategoryDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(icon) = self.icon {
            draft.icon = icon;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(order) = self.order {
            draft.display_order = order;
        }
        if self.inactive {
            draft.active = false;
        }
    }
}

pub async fn run(ctx: &Context, action: AdminAction) -> Result<(), CliError> {
    match action {
        AdminAction::Dashboard => {
            let (stats, warning) = ctx.admin().dashboard().await?;
            print(&render::dashboard(&stats, warning.as_ref()))
        }
        AdminAction::Product { action } => product(ctx, action).await,
        AdminAction::Category { action } => category(ctx, action).await,
    }
}

async fn product(ctx: &Context, action: ProductAction) -> Result<(), CliError> {
    let admin = ctx.admin();

    let notice = match action {
        ProductAction::List { search, category } => {
            let snapshot = admin.snapshot().await?;
            return print(&render::products(
                &snapshot.filter_products(&search, &category),
            ));
        }
        ProductAction::Create(fields) => {
            let mut draft = ProductDraft {
                active: true,
                ..ProductDraft::default()
            };
            fields.apply(&mut draft);
            admin.save_product(None, &draft).await?
        }
        ProductAction::Update { id, fields } => {
            let id = ProductId::new(id);
            let snapshot = admin.snapshot().await?;
            let existing = snapshot
                .product(&id)
                .ok_or_else(|| not_found("Product", &id))?;
            let mut draft = ProductDraft::from(existing);
            fields.apply(&mut draft);
            admin.save_product(Some(&id), &draft).await?
        }
        ProductAction::Delete { id, yes } => {
            let id = ProductId::new(id);
            if !yes && !confirm(&format!("Delete product #{id}?"))? {
                return print("Cancelled.");
            }
            admin.delete_product(&id).await?
        }
        ProductAction::Toggle { id } => {
            let id = ProductId::new(id);
            let snapshot = admin.snapshot().await?;
            let existing = snapshot
                .product(&id)
                .ok_or_else(|| not_found("Product", &id))?;
            admin.toggle_product(existing).await?
        }
    };
    print(&render::notice(&notice))
}

async fn category(ctx: &Context, action: CategoryAction) -> Result<(), CliError> {
    let admin = ctx.admin();

    let notice = match action {
        CategoryAction::List => {
            let snapshot = admin.snapshot().await?;
            return print(&render::categories(&snapshot.categories));
        }
        CategoryAction::Create(fields) => {
            let mut draft = CategoryDraft {
                active: true,
                ..CategoryDraft::default()
            };
            fields.apply(&mut draft);
            admin.save_category(None, &draft).await?
        }
        CategoryAction::Update { id, fields } => {
            let id = CategoryId::new(id);
            let snapshot = admin.snapshot().await?;
            let existing = snapshot
                .category(&id)
                .ok_or_else(|| not_found("Category", &id))?;
            let mut draft = CategoryDraft::from(existing);
            fields.apply(&mut draft);
            admin.save_category(Some(&id), &draft).await?
        }
        CategoryAction::Delete { id, yes } => {
            let id = CategoryId::new(id);
            if !yes && !confirm(&format!("Delete category #{id}?"))? {
                return print("Cancelled.");
            }
            admin.delete_category(&id).await?
        }
        CategoryAction::Toggle { id } => {
            let id = CategoryId::new(id);
            let snapshot = admin.snapshot().await?;
            let existing = snapshot
                .category(&id)
                .ok_or_else(|| not_found("Category", &id))?;
            admin.toggle_category(existing).await?
        }
    };
    print(&render::notice(&notice))
}

fn not_found(kind: &str, id: &impl std::fmt::Display) -> CliError {
    CliError::Input(format!("{kind} #{id} was not found."))
}
