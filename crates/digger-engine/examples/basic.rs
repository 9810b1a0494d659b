//! Example: Basic usage of the digger engine

use digger_engine::{init_logging, Config, Engine, Supplier};
use digger_engine::tree::Draft;

fn main() -> anyhow::Result<()> {
    let config = Config::default();
    init_logging(&config.log_filter)?;

    let engine = Engine::new(config)?;
    println!("digger engine v{} initialized", digger_engine::VERSION);

    let catalogue = Draft::new("folder").with_children([
        Draft::new("product")
            .with_class("onsale")
            .with_attr("name", "Kettle")
            .with_attr("price", 25)
            .with_child(Draft::new("caption").with_class("red")),
        Draft::new("product")
            .with_attr("name", "Fridge")
            .with_attr("price", 400)
            .with_child(Draft::new("caption").with_class("blue")),
    ]);

    // Same data, two backends
    let mut memory = engine.memory_supplier();
    let mut nested = engine.nestedset_supplier();
    memory.append(None, vec![catalogue.clone()])?;
    nested.append(None, vec![catalogue])?;

    for selector in ["product.onsale", "product[price<100] > caption", "folder/caption.blue"] {
        for supplier in [&memory as &dyn Supplier, &nested as &dyn Supplier] {
            let found = engine.select_str(supplier, selector, &[])?;
            println!("[{}] {} -> {} match(es)", supplier.name(), selector, found.len());
            for skeleton in &found {
                println!("    {} {} [{} .. {}]", skeleton.tag, skeleton.diggerid, skeleton.left, skeleton.right);
            }
        }
    }

    Ok(())
}
