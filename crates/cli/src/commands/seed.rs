//! Catalog seeding command.
//!
//! Inserts the launch watch collection. Skips silently if the catalog
//! already has products, so it is safe to run on every deploy.

use rust_decimal::Decimal;
use sqlx::PgPool;

use meridian_api::db::products::{NewProduct, ProductRepository};
use meridian_core::Gender;

use super::CommandError;

struct Seed {
    name: &'static str,
    description: &'static str,
    price: i64,
    image: &'static str,
    specs: &'static str,
    product_type: &'static str,
    flavor_notes: &'static str,
}

const CATALOG: &[Seed] = &[
    Seed {
        name: "Silver ROLX",
        description: "High-performance racing watch with tachymeter.",
        price: 950,
        image: "/images/Silver Rolxx.png",
        specs: "Tachymeter • Steel • 43mm",
        product_type: "RACING",
        flavor_notes: "Speed • Precision • Racing",
    },
    Seed {
        name: "Golden Classic",
        description: "Sophisticated dress watch perfect for business and formal occasions.",
        price: 950,
        image: "/images/Golden Classic.png",
        specs: "Quartz • Leather Strap • 38mm",
        product_type: "DRESS",
        flavor_notes: "Sophisticated • Refined • Business",
    },
    Seed {
        name: "Rolex Two-Tone Case with Arabic Numerals Dial",
        description: "Limited edition Rolex watch with gold accents and premium craftsmanship.",
        price: 950,
        image: "/images/Rolex Two-Tone Case with Arabic Numerals Dial.png",
        specs: "Automatic • Two-Tone Case • Arabic Numerals Dial • 40mm",
        product_type: "ELITE",
        flavor_notes: "Exclusive • Premium • Timeless",
    },
    Seed {
        name: "Silver Rolex with Arabic Dial",
        description: "A timeless classic watch with elegant design and premium craftsmanship.",
        price: 950,
        image: "/images/Silver Rolex with Arabic Dial.png",
        specs: "Automatic • Arabic Dial • 40mm",
        product_type: "CLASSIC",
        flavor_notes: "Timeless • Elegant • Precision",
    },
    Seed {
        name: "Bestwin Octagonal black With Arabic dial",
        description: "Professional diving watch built for underwater adventures.",
        price: 960,
        image: "/images/Bestwin Octagonal black With Arabic dial.png",
        specs: "Swiss Movement • Ceramic • 42mm",
        product_type: "DIVER",
        flavor_notes: "Waterproof • Durable • Professional",
    },
    Seed {
        name: "Patek Philippe Blue Dial",
        description: "Dynamic sports chronograph with advanced timing features.",
        price: 800,
        image: "/images/Patek Philippe Blue Dial.png",
        specs: "Chronograph • Steel • 44mm",
        product_type: "SPORT",
        flavor_notes: "Dynamic • Athletic • Performance",
    },
    Seed {
        name: "Patek Philippe Green Dial",
        description: "Classic dual-time zone watch with vintage charm.",
        price: 800,
        image: "/images/Patek Philippe Green Dial.png",
        specs: "Dual Time • Gold Plated • 41mm",
        product_type: "VINTAGE",
        flavor_notes: "Classic • Dual Time • Luxury",
    },
    Seed {
        name: "Patek Philippe black Dial",
        description: "Modern casual watch for everyday wear.",
        price: 800,
        image: "/images/Patek Philippe black Dial.png",
        specs: "Quartz • Nylon Strap • 40mm",
        product_type: "URBAN",
        flavor_notes: "Modern • Casual • Versatile",
    },
    Seed {
        name: "Patek Philippe Brown Leather Strap",
        description: "Luxury watch with moonphase complication and automatic movement.",
        price: 800,
        image: "/images/Patek Philippe Brown Leather.png",
        specs: "Moonphase • Automatic • 42mm",
        product_type: "ELITE",
        flavor_notes: "Luxury • Moonphase • Automatic",
    },
    Seed {
        name: "Patek Philippe Black Leather Strap",
        description: "Luxury Patek Philippe watch with elegant black leather strap and premium craftsmanship.",
        price: 800,
        image: "/images/Patek Philippe Black Leather.png",
        specs: "Automatic • Black Leather Strap • 40mm",
        product_type: "CLASSIC",
        flavor_notes: "Elegant • Premium • Timeless",
    },
    Seed {
        name: "Patek Philippe with Black Leather Strap & White Dial",
        description: "Luxury Patek Philippe watch with white dial and premium craftsmanship.",
        price: 800,
        image: "/images/Patek Philippe with Black Leather Strap and White Dial.png",
        specs: "Automatic • White Dial • 40mm",
        product_type: "MINIMAL",
        flavor_notes: "Luxury • White Dial • Automatic",
    },
    Seed {
        name: "Santos de Cartier",
        description: "Premium luxury watch with diamond accents and premium craftsmanship.",
        price: 750,
        image: "/images/Santos de Cartier.png",
        specs: "Automatic • Diamond • 40mm",
        product_type: "LUXURY",
        flavor_notes: "Premium • Diamond • Exclusive",
    },
];

/// Seed the product catalog.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!(existing, "Catalog already seeded, skipping");
        return Ok(());
    }

    let products = ProductRepository::new(&pool);
    for (index, seed) in CATALOG.iter().enumerate() {
        let position = i32::try_from(index).unwrap_or(i32::MAX) + 1;
        products
            .create(NewProduct {
                name: seed.name.to_owned(),
                description: seed.description.to_owned(),
                price: Decimal::from(seed.price),
                image: seed.image.to_owned(),
                category: "watch".to_owned(),
                gender: Gender::Men,
                specs: seed.specs.to_owned(),
                product_type: seed.product_type.to_owned(),
                flavor_notes: seed.flavor_notes.to_owned(),
                position,
            })
            .await?;
    }

    tracing::info!(count = CATALOG.len(), "Catalog seeded");
    Ok(())
}
