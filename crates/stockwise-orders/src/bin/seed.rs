//! # Seed Data Generator
//!
//! Populates the database with suppliers, customers and products for
//! development, then places a few demo orders through the order service.
//!
//! ## Usage
//! ```bash
//! # 200 products, 20 customers (default)
//! cargo run -p stockwise-orders --bin seed
//!
//! # Custom amounts
//! cargo run -p stockwise-orders --bin seed -- --products 1000 --customers 50
//!
//! # Specify database path (otherwise STOCKWISE_DB_PATH or ./stockwise.db)
//! cargo run -p stockwise-orders --bin seed -- --db ./data/stockwise.db
//! ```
//!
//! Each product has:
//! - Name: `{item} {size}`
//! - Price: $1.99 - $9.99 plus a size add-on
//! - Stock: 0 - 100 (some products start sold out)

use std::env;

use stockwise_core::{Money, NewCustomer, NewProduct, NewSupplier};
use stockwise_db::Database;
use stockwise_orders::{init_tracing, AppConfig, OrderService, PlaceOrderRequest};

/// Suppliers and the categories they carry.
const SUPPLIERS: &[(&str, &str, &[&str])] = &[
    (
        "Northwind Traders",
        "beverages",
        &["Cola", "Lemonade", "Iced Tea", "Sparkling Water", "Orange Juice", "Cold Brew"],
    ),
    (
        "Harbor Foods",
        "snacks",
        &["Potato Chips", "Pretzels", "Trail Mix", "Granola Bar", "Popcorn", "Crackers"],
    ),
    (
        "Keystone Hardware",
        "tools",
        &["Hammer", "Screwdriver Set", "Tape Measure", "Utility Knife", "Wrench", "Level"],
    ),
    (
        "Bluebird Office",
        "office",
        &["Notebook", "Ballpoint Pens", "Stapler", "Sticky Notes", "Binder", "Desk Lamp"],
    ),
];

/// Size variants with price add-ons in cents.
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("Family", 350),
    ("Bulk", 500),
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Ken", "Margaret", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson",
    "Hamilton", "Wirth",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load()?;
    init_tracing(&config);

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut product_count: usize = 200;
    let mut customer_count: usize = 20;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--customers" | "-c" => {
                if i + 1 < args.len() {
                    customer_count = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Stockwise Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --products <N>   Number of products to generate (default: 200)");
                println!("  -c, --customers <N>  Number of customers to generate (default: 20)");
                println!("  -d, --db <PATH>      Database file path (default: ./stockwise.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockwise Seed Data Generator");
    println!("================================");
    println!("Database:  {}", config.database_path.display());
    println!("Products:  {}", product_count);
    println!("Customers: {}", customer_count);
    println!();

    // Migrations run below so the seed can report what it applied
    let db = Database::new(config.db_config().skip_migrations()).await?;
    if !db.health_check().await {
        return Err("database did not answer a health check".into());
    }
    println!("✓ Connected to database");

    // A fresh file has no bookkeeping table yet
    let applied_before = db
        .migration_status()
        .await
        .map(|status| status.applied.len())
        .unwrap_or(0);
    db.run_migrations().await?;

    let status = db.migration_status().await?;
    println!(
        "✓ Migrations applied ({} new, {} total)",
        status.applied.len().saturating_sub(applied_before),
        status.applied.len()
    );

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Customers
    let mut customer_ids = Vec::with_capacity(customer_count);
    for seed in 0..customer_count {
        let customer = generate_customer(seed);
        match db.customers().insert(&customer).await {
            Ok(id) => customer_ids.push(id),
            Err(e) => eprintln!("Failed to insert customer {}: {}", customer.email, e),
        }
    }
    println!("✓ Generated {} customers", customer_ids.len());

    // Suppliers and products
    let mut product_ids = Vec::with_capacity(product_count);
    'outer: for (supplier_idx, (supplier_name, category, items)) in SUPPLIERS.iter().enumerate() {
        let supplier_id = db
            .suppliers()
            .insert(&generate_supplier(supplier_name, supplier_idx))
            .await?;

        for (item_idx, item) in items.iter().enumerate() {
            for (size_idx, (size, price_addon)) in SIZES.iter().enumerate() {
                if product_ids.len() >= product_count {
                    break 'outer;
                }

                let seed = supplier_idx * 1000 + item_idx * 20 + size_idx;
                let product =
                    generate_product(supplier_id, category, item, size, *price_addon, seed);

                match db.products().insert(&product).await {
                    Ok(id) => product_ids.push(id),
                    Err(e) => {
                        eprintln!("Failed to insert {}: {}", product.name, e);
                        continue;
                    }
                }

                if product_ids.len() % 50 == 0 {
                    println!("  Generated {} products...", product_ids.len());
                }
            }
        }
    }
    println!("✓ Generated {} products", product_ids.len());

    // Demo orders through the service so stock is decremented properly
    let service = OrderService::from_config(db.clone(), &config);
    let mut placed = 0;
    let mut rejected = 0;

    let in_stock = db.products().list_in_stock(None).await?;
    for (n, customer_id) in customer_ids.iter().enumerate() {
        let Some(product) = in_stock.get((n * 7) % in_stock.len().max(1)) else {
            break;
        };

        let request = PlaceOrderRequest {
            customer_id: Some(*customer_id),
            product_id: Some(product.id),
            quantity: Some(1 + (n % 3) as i64),
            price: Some(product.price().into()),
        };

        match service.place_order(&request).await {
            Ok(_) => placed += 1,
            Err(_) => rejected += 1,
        }
    }

    let elapsed = start.elapsed();
    println!("✓ Placed {} demo orders ({} rejected)", placed, rejected);

    let best_sellers = service.sales_report(Some(3)).await?;
    if !best_sellers.is_empty() {
        println!();
        println!("Best sellers:");
        for row in &best_sellers {
            println!("  {:<28} {:>3} units  ${}", row.name, row.units_sold, row.total_sales());
        }
    }

    println!();
    println!(
        "✓ Seed complete in {:?} ({} customers, {} orders)",
        elapsed,
        db.customers().count().await?,
        db.orders().count().await?
    );

    db.close().await;
    Ok(())
}

fn generate_supplier(name: &str, seed: usize) -> NewSupplier {
    let slug = name.to_lowercase().replace(' ', "");

    NewSupplier {
        name: name.to_string(),
        contact_name: format!("{} Sales", FIRST_NAMES[seed % FIRST_NAMES.len()]),
        contact_email: format!("orders@{}.test", slug),
        contact_phone: format!("555-01{:02}", seed % 100),
    }
}

fn generate_customer(seed: usize) -> NewCustomer {
    let first = FIRST_NAMES[seed % FIRST_NAMES.len()];
    let last = LAST_NAMES[(seed / FIRST_NAMES.len() + seed) % LAST_NAMES.len()];

    NewCustomer {
        name: format!("{} {}", first, last),
        email: format!("{}.{}{}@example.test", first.to_lowercase(), last.to_lowercase(), seed),
        phone: format!("555-02{:02}", seed % 100),
        address: format!("{} Main St", 100 + seed),
    }
}

/// Generates a single product with repeatable data.
fn generate_product(
    supplier_id: i64,
    category: &str,
    item: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    // $1.99 - $9.99 plus the size add-on
    let base_price = 199 + ((seed * 17) % 800) as i64;

    NewProduct {
        supplier_id,
        name: format!("{} {}", item, size),
        description: format!("{} ({})", item, category),
        price: Money::from_cents(base_price + price_addon),
        quantity: (seed % 101) as i64,
        category: category.to_string(),
    }
}
