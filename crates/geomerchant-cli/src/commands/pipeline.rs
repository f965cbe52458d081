//! Pipeline command implementations (parse, cluster, resolve, run, explain)

use anyhow::{Context, Result};
use geomerchant_core::{MerchantPipeline, PlaceSearchClient};

pub fn cmd_parse(pipeline: &MerchantPipeline) -> Result<()> {
    println!("🔤 Parsing new transaction descriptions...");

    let summary = pipeline
        .parse_new_transactions()
        .context("Failed to parse descriptions")?;

    if summary.descriptions == 0 {
        println!("   Nothing new to parse.");
        return Ok(());
    }

    println!("   Descriptions: {}", summary.descriptions);
    if summary.skipped_numeric > 0 {
        println!("   Skipped (numeric only): {}", summary.skipped_numeric);
    }
    println!("   Tokens counted: {}", summary.tokens_counted);
    println!("   Names predicted: {}", summary.fingerprints);
    Ok(())
}

pub fn cmd_cluster(pipeline: &MerchantPipeline) -> Result<()> {
    println!("🧩 Clustering predicted names...");

    let summary = pipeline
        .canonicalize()
        .context("Failed to cluster predicted names")?;

    println!("   Fingerprints: {}", summary.fingerprints);
    println!("   With derivatives: {}", summary.clustered);
    Ok(())
}

pub async fn cmd_resolve(pipeline: &MerchantPipeline, search: &PlaceSearchClient) -> Result<()> {
    println!("🌍 Matching transactions to places...");

    let summary = pipeline
        .resolve_transactions(search)
        .await
        .context("Failed to resolve transactions")?;

    if summary.processed == 0 {
        println!("   All transactions already resolved.");
        return Ok(());
    }

    println!("   Processed: {}", summary.processed);
    println!("   📍 Matched to a place: {}", summary.placed);
    println!("   🏢 Predefined company: {}", summary.predefined);
    println!("   ∅  No match: {}", summary.blank);
    if summary.failed > 0 {
        println!();
        println!(
            "⚠️  {} transactions have no visited locations on their day and were left unresolved.",
            summary.failed
        );
        println!("   Import locations with 'geomerchant locations import' and run again.");
    }
    Ok(())
}

pub async fn cmd_run(pipeline: &MerchantPipeline, search: &PlaceSearchClient) -> Result<()> {
    cmd_parse(pipeline)?;
    println!();
    cmd_cluster(pipeline)?;
    println!();
    cmd_resolve(pipeline, search).await
}

pub fn cmd_explain(pipeline: &MerchantPipeline, description: &str, json: bool) -> Result<()> {
    let explanation = pipeline.explain(description).with_context(|| {
        format!(
            "Failed to explain '{}' (tokens must be counted first: import and run 'geomerchant parse')",
            description
        )
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
        return Ok(());
    }

    println!();
    println!("🔎 {}", explanation.description);
    println!(
        "   Statistics snapshot: {} token observations",
        explanation.snapshot_version
    );

    if explanation.numeric_only {
        println!("   Numeric-only description, no name predicted.");
        return Ok(());
    }

    if !explanation.decisions.is_empty() {
        println!("   Inclusion threshold: {:.2}", explanation.threshold);
        println!();
        println!("   token            dict emb vc  freq_z  phon_z  pos   len  score  kept");
        println!("   ──────────────────────────────────────────────────────────────────────");
        for d in &explanation.decisions {
            let kept = if d.included { "✓" } else { "·" };
            match (&d.features, d.score) {
                (Some(f), Some(score)) => println!(
                    "   {:<16} {:>4} {:>3} {:>3} {:>7.2} {:>7.2}  {:<5} {:>3} {:>6.2}  {}",
                    super::truncate(&d.token, 16),
                    f.dictionary_hit(),
                    u8::from(f.embedded_word()),
                    u8::from(f.vowel_consonant_ok()),
                    f.frequency_z(),
                    f.phonetic_z(),
                    f.part_of_speech().unwrap_or("-"),
                    f.length_bonus(),
                    score,
                    kept
                ),
                _ => println!(
                    "   {:<16} {:>62}  {}",
                    super::truncate(&d.token, 16),
                    "connector",
                    kept
                ),
            }
        }
    }

    println!();
    println!(
        "   Predicted name: {}",
        explanation.predicted_name.as_deref().unwrap_or("")
    );
    Ok(())
}
