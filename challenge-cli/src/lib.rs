//! Native tooling around `challenge-core`: session replay, offline stroke
//! scoring and PNG snapshots of grid boards.

pub mod snapshot;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use challenge_core::ChallengeResult;
use challenge_core::circle::{Breakdown, Point, ScoringProfile, score_stroke};
use challenge_core::session::replay_json;
use serde::Deserialize;

use crate::snapshot::{Raster, render_session};

/// Stroke files may hold `{"x":..,"y":..}` objects or bare `[x, y]` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum StrokeFile {
    Objects(Vec<Point>),
    Pairs(Vec<[f64; 2]>),
}

impl StrokeFile {
    fn into_points(self) -> Vec<Point> {
        match self {
            StrokeFile::Objects(points) => points,
            StrokeFile::Pairs(pairs) => pairs.into_iter().map(|[x, y]| Point { x, y }).collect(),
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn replay_file(path: &Path) -> Result<Option<ChallengeResult>> {
    let text = read(path)?;
    let result = replay_json(&text).with_context(|| format!("replaying {}", path.display()))?;
    match &result {
        Some(r) => tracing::info!(success = r.success, score = r.score, time = r.time_spent, "session finished"),
        None => tracing::info!("session ended without a result"),
    }
    Ok(result)
}

pub fn parse_stroke(text: &str) -> Result<Vec<Point>> {
    let stroke: StrokeFile = serde_json::from_str(text).context("stroke is not a point list")?;
    Ok(stroke.into_points())
}

pub fn score_file(path: &Path, profile: &str) -> Result<Breakdown> {
    let profile =
        ScoringProfile::by_name(profile).ok_or_else(|| anyhow!("unknown profile {profile:?}"))?;
    let points = parse_stroke(&read(path)?)?;
    tracing::debug!(points = points.len(), "scoring stroke");
    Ok(score_stroke(&points, &profile))
}

pub fn snapshot_file(session: &Path, out: &Path, cell: u32) -> Result<Raster> {
    let raster = render_session(&read(session)?, cell)?;
    let bytes = raster.encode_png().context("png encoding failed")?;
    fs::write(out, bytes).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(width = raster.width, height = raster.height, out = %out.display(), "snapshot written");
    Ok(raster)
}
