//! Walkthrough of the relation manager
//!
//! Builds the core from `HBNB_*` environment variables (in-memory storage
//! unless told otherwise), then creates a small neighbourhood and tears it
//! down again with a cascading delete.
//!
//! ```sh
//! cargo run --example walkthrough
//! HBNB_REPO_TYPE=in_file HBNB_DATA_DIR=/tmp/hbnb cargo run --example walkthrough
//! ```

use anyhow::Result;
use hbnb::logging::init_tracing;
use hbnb::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("hbnb=debug");

    let config = AppConfig::in_memory().with_env_overrides()?;
    println!("🚀 hbnb walkthrough ({:?} storage)\n", config.storage_backend());

    let hbnb = Hbnb::builder().with_config(config).build().await?;

    let johnny = hbnb
        .users
        .create_user(NewUser::new("Johnny", "Rocker", "johnny@rock.io", "mypassword"))
        .await?;
    let ada = hbnb
        .users
        .create_user(NewUser::new("Ada", "Lovelace", "ada@calc.io", "analytical"))
        .await?;
    println!("👤 Created users {} and {}", johnny.first_name, ada.first_name);

    let loft = hbnb
        .relations
        .create_place_for_user(
            &johnny.id,
            NewPlace::new("Loft by the canal", 95.0, 48.8722, 2.3654)
                .with_description("Two rooms, lots of light"),
        )
        .await?;
    let cabin = hbnb
        .relations
        .create_place_for_user(&johnny.id, NewPlace::new("Forest cabin", 60.0, 45.9, 6.1))
        .await?;
    println!("🏠 {} owns: {}, {}", loft.owner_first_name, loft.title, cabin.title);

    for name in ["Wifi", "Sauna"] {
        let amenity = hbnb
            .relations
            .add_amenity_to_a_place(&loft.id, NewAmenity::new(name))
            .await?;
        println!("✨ Attached {} ({})", amenity.name, amenity.id);
    }
    match hbnb
        .relations
        .add_amenity_to_a_place(&loft.id, NewAmenity::new("Wifi"))
        .await
    {
        Err(e) => println!("⚠️  Second Wifi rejected: {}", e),
        Ok(_) => println!("❌ Second Wifi unexpectedly accepted"),
    }

    let review = hbnb
        .relations
        .create_review_for_place(&loft.id, &ada.id, NewReview::new("Lovely light", 5))
        .await?;
    println!(
        "📝 {} reviewed {}: {}/5",
        review.user_first_name, review.place_name, review.rating
    );

    let logged_in = hbnb.users.authenticate("ada@calc.io", "analytical").await?;
    println!("🔑 Authenticated {}", logged_in.public().email);

    println!("\n🗑️  Deleting {} and everything they own...", johnny.first_name);
    let report = hbnb
        .relations
        .delete_user_and_associated_instances(&johnny.id)
        .await?;
    for deleted in &report.deleted {
        println!("   removed {} {}", deleted.kind, deleted.id);
    }
    for failure in &report.failures {
        println!("   skipped {} {}: {}", failure.kind, failure.id, failure.reason);
    }

    println!(
        "\n📊 Left: {} user(s), {} place(s), {} amenity record(s), {} review(s)",
        hbnb.users.get_all_users().await?.len(),
        hbnb.places.get_all_places().await?.len(),
        hbnb.amenities.get_all_amenities().await?.len(),
        hbnb.reviews.get_all_reviews().await?.len(),
    );

    Ok(())
}
