//! Compose an `Animal` with `Flyable` and `Swimmable`, then query capabilities.
//!
//! Run with `RUST_LOG=debug cargo run --example animal_traits` to see the
//! registry and merge events.

use cim_traits::{having, Registry, TraitError, TypeBuilder};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = Registry::new();

    let animal = TypeBuilder::new("Animal")
        .field("name", "animal")
        .init(|this, args| {
            if let Some(name) = args.first() {
                this.set("name", name.clone())?;
            }
            Ok(())
        })
        .method("speak", |this, _| {
            Ok(json!(format!("{} says hello", this.get_as::<String>("name")?)))
        })
        .build();

    let flyable = TypeBuilder::new("Flyable")
        .static_const("MAX_ALTITUDE", 3000)
        .field("canFly", true)
        .method("fly", |this, _| {
            Ok(json!(format!("{} takes off", this.get_as::<String>("name")?)))
        })
        .build();

    let swimmable = TypeBuilder::new("Swimmable").field("canSwim", true).build();

    let duck = registry.basing(&animal)?.with([&flyable, &swimmable])?;
    let mut donald = duck.construct(&[json!("Donald")])?;

    println!("{}", donald.call("speak", &[])?);
    println!("{}", donald.call("fly", &[])?);
    println!("canFly = {}, canSwim = {}", donald.get("canFly")?, donald.get("canSwim")?);
    println!("MAX_ALTITUDE = {}", duck.get_static("MAX_ALTITUDE")?);
    println!(
        "having Animal: {}, Flyable: {}, Swimmable: {}",
        having(&donald, &animal),
        having(&donald, &flyable),
        having(&donald, &swimmable)
    );

    let loud = TypeBuilder::new("Loud")
        .method("speak", |_, _| Ok(json!("HELLO")))
        .build();
    match registry.basing(&animal)?.with([&loud]) {
        Err(TraitError::MemberConflict { name, scope, contributor }) => {
            println!("rejected {contributor}: {scope} member {name} already exists")
        }
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
