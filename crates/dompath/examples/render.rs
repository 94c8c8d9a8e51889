//! Example: build a page from markup, change it, render incrementally

use std::rc::Rc;
use std::cell::Cell;

use dompath::{AttributeChange, DomTree, Options, RenderEngine};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
    <div id="card">
      <h1 title="Heading" class="heading"><!-- title --></h1>
      <h3 class="sub title"></h3>
      <button name="ok">OK</button>
    </div>"#;

fn main() -> anyhow::Result<()> {
    // RUST_LOG=dompath=debug shows index and render summaries
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut engine = RenderEngine::from_html(PAGE, Options::default())?;
    engine.set_element(DomTree::with_root_element("main"))?;

    println!("Paths:");
    for (path, _) in engine.working().refs().iter() {
        println!("  {path}");
    }
    println!("Aliases: {:?}", engine.working().aliases().names().collect::<Vec<_>>());

    let clicks = Rc::new(Cell::new(0));
    let counter = Rc::clone(&clicks);
    engine.on("click", move |event| {
        counter.set(counter.get() + 1);
        println!("click on {:?}", event.target);
    })?;

    engine.render()?;
    println!("\nFirst render:\n{}", engine.live().map(|l| l.html()).unwrap_or_default());

    engine.alias("subtitle", ":0:1")?;
    engine.data(":0", "Hello", Some("card"), false)?;
    engine.data("subtitle", "from <em>dompath</em>", None, false)?;

    let changes = AttributeChange::list_from_json(
        r#"[{"op": "remove", "path": ":0:1", "name": "class", "val": "sub"},
            {"op": "add", "path": "card", "name": "class", "val": "active"}]"#,
    )?;
    engine.set_attributes(&changes)?;

    println!("\nDirty: {:?}", engine.dirty_paths().collect::<Vec<_>>());
    engine.render()?;
    println!("\nAfter update:\n{}", engine.live().map(|l| l.html()).unwrap_or_default());

    engine.dispatch(Some("ok"), "click")?;
    println!("\n{} click(s) handled", clicks.get());

    Ok(())
}
