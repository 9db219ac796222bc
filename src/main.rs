use anyhow::Context;

use levelgen_core::logging;
use levelgen_core::{GeneratorConfig, LevelGenerator, RuleAsset};

const DEFAULT_OUTPUT: &str = "level_debug.png";

/// Usage: levelgen [config.ron|config.json] [rules.ron] [output.png]
fn main() -> anyhow::Result<()> {
    logging::init_tracing_default();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GeneratorConfig::load(&path)
            .with_context(|| format!("loading generator config from {path}"))?,
        None => GeneratorConfig::default(),
    };
    let rules = match args.next() {
        Some(path) => {
            RuleAsset::load(&path).with_context(|| format!("loading rule asset from {path}"))?
        }
        None => RuleAsset::default(),
    };
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let mut generator = LevelGenerator::new(config, rules).context("creating level generator")?;
    let outcome = generator.generate_all();

    let connection = generator.connection();
    tracing::info!(
        seed = generator.seed().seed,
        stage = ?generator.stage(),
        outcome = ?outcome,
        regions = generator.regions().len(),
        corridors = connection.map_or(0, |c| c.corridors.len()),
        complete = connection.map_or(false, |c| c.complete),
        vertices = generator.mesh().map_or(0, |m| m.vertex_count()),
        "level generated"
    );

    if let Some(bitmap) = generator.debug_bitmap() {
        bitmap
            .save_png(&output)
            .with_context(|| format!("writing debug bitmap to {output}"))?;
    }
    Ok(())
}
