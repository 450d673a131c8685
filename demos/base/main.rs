//! Builds the default heart base onto analytic ventricle rows and prints a
//! summary of the nodes and elements created.
//!
//! Usage:
//! ```text
//! cargo run --example base
//! RUST_LOG=heartbase=debug cargo run --example base   # per element logs
//! ```

use heartbase::landmarks::SyntheticVentricles;
use heartbase::mesh::MeshStore;
use heartbase::operations::GenerateBase;
use heartbase::options::MeshOptions;

fn main() -> heartbase::Result<()> {
    // Default: WARN for everything, INFO for heartbase.
    // Override with RUST_LOG env var (e.g. RUST_LOG=heartbase=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("heartbase=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let options = MeshOptions {
        refine: true,
        ..MeshOptions::default()
    };
    let params = options.resolve();
    let mut store = MeshStore::new();
    let ventricles = SyntheticVentricles::build(&mut store, &params);
    let upstream = store.node_count();
    let base = GenerateBase::new(&params).execute(&mut store, &ventricles)?;

    let layout = &base.atria.layout;
    println!(
        "nodes: {} ({} new from {})",
        store.node_count(),
        store.node_count() - upstream,
        base.first_node
    );
    println!(
        "crux left angle: {:.5} rad after {} Newton steps",
        layout.crux_left.angle, layout.crux_left.iterations
    );
    println!(
        "atrial edges: septal {:.5}, transition {:.5}, free wall {:.5}",
        layout.edges.septal, layout.edges.transition, layout.edges.free_wall
    );
    println!("crest nodes: {} {}", base.crest.inner, base.crest.outer);
    for (id, element) in store.elements() {
        let template = store.element_template(id)?;
        let centre = store.evaluate(id, [0.5, 0.5, 0.5])?;
        println!(
            "element {id:>2} {:<22} {:?} nodes {:?} centre ({:.4}, {:.4}, {:.4})",
            template.name(),
            template.class(),
            element.nodes.iter().map(|n| n.get()).collect::<Vec<_>>(),
            centre.x,
            centre.y,
            centre.z
        );
    }
    if let Some(plan) = &base.refinement {
        println!(
            "refinement: {} cubes into {} elements",
            plan.cubes().len(),
            plan.refined_element_count()
        );
    }
    Ok(())
}
