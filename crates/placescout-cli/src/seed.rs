//! Seed command: load activities from a YAML file into the local store.

use std::path::Path;

use anyhow::Context;

use placescout_db::NewActivity;

pub async fn run(file: &Path) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("reading seed file {}", file.display()))?;
    let activities: Vec<NewActivity> =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {}", file.display()))?;

    if activities.is_empty() {
        tracing::warn!(file = %file.display(), "seed file contains no activities");
        return Ok(());
    }

    let pool = placescout_db::connect_pool_from_env()
        .await
        .context("connecting to the database")?;
    placescout_db::run_migrations(&pool)
        .await
        .context("running migrations")?;

    let seeded = placescout_db::seed_activities(&pool, &activities)
        .await
        .context("seeding activities")?;
    tracing::info!(count = seeded, file = %file.display(), "seeded activities");

    Ok(())
}
