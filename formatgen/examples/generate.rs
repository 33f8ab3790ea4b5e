//! Generates formatters for a type manifest.
//!
//! Run with: `cargo run --example generate -- [manifest.xml] [Root.Type] [output-dir]`
//!
//! Without arguments a built-in manifest is used and files are written to a
//! directory under the system temp dir.

use anyhow::Context;
use formatgen::codegen::render_type;
use formatgen::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEMO_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog>
    <type name="Player" namespace="Game" kind="class">
        <field name="id" type="int"/>
        <field name="name" type="string"/>
        <field name="tags" type="System.Collections.Generic.List`1[string]"/>
        <field name="inventory" type="Game.Player+Slot[]"/>
        <field name="joined" type="System.DateTime"/>
        <field name="Count" type="int" static="true"/>
        <field name="cache" type="Game.Cache" nonSerialized="true"/>
    </type>
    <type name="Slot" namespace="Game" declaringType="Player" kind="struct">
        <field name="item" type="Game.Item"/>
        <field name="color" type="Game.Color"/>
        <field name="stats" type="System.Collections.Generic.Dictionary`2[string,System.Collections.Generic.List`1[float]]"/>
    </type>
    <type name="Item" namespace="Game">
        <field name="name" type="string"/>
        <field name="owner" type="Game.Player"/>
    </type>
    <type name="Cache" namespace="Game"/>
    <enum name="Color" namespace="Game"/>
</catalog>"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let catalog = match args.next() {
        Some(path) => {
            parse_catalog_file(path.as_ref()).with_context(|| format!("loading {path}"))?
        }
        None => parse_catalog(DEMO_MANIFEST).context("parsing built-in manifest")?,
    };
    let root = TypeRef::named(args.next().unwrap_or_else(|| "Game.Player".to_string()));
    let output_root = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("formatgen-demo"));

    let config = GeneratorConfig::builder().output_root(&output_root).build()?;
    let (host, events) = ChannelHost::new(HostMode::Interactive);
    let session = GenerationSession::new(config, Arc::new(catalog), Arc::new(host))?;
    session.validate()?;

    println!("Catalog: {} types", session.catalog().len());
    println!("Providers: {}", session.registry().resolver_names().join(" -> "));

    let outcome = session.request_generation(&root)?;
    println!("Requested {root}: {} type(s) pending", session.pending().len());
    for ty in &outcome.enqueued {
        println!("  + {ty}");
    }
    for container in session.uncovered_containers() {
        println!("  ! no provider covers {container}");
    }

    if let Some(first) = outcome.enqueued.first() {
        let preview = render_type(session.catalog(), first, session.config().namespace())?;
        println!("\n--- preview of {first} ---");
        for line in preview.lines().take(12) {
            println!("{line}");
        }
        println!("...\n");
    }

    // Host event loop: run deferred flushes until the host goes quiet.
    while let Some(signal) = events.recv_timeout(Duration::from_millis(100)) {
        match signal {
            HostSignal::ScheduleFlush => {
                for path in session.on_idle()? {
                    println!("Wrote {}", path.display());
                }
            }
            HostSignal::RefreshFileIndex => println!("[host] refresh file index"),
            HostSignal::ReloadCompiledCode => println!("[host] reload compiled code"),
        }
    }

    println!("State: {:?}, output in {}", session.state(), output_root.display());
    Ok(())
}
