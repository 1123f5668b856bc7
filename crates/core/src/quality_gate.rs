//! Quality-gate scoring and decision vocabulary.
//!
//! The pipeline's visual-consistency checker scores each generated
//! scene in `[0, 1]` against the avatar's reference identity. When the
//! worker pauses at the gate (`awaiting_approval`), the user reviews
//! those scores and picks a decision; this module computes outliers
//! and builds the payload forwarded to the worker. Forwarding itself
//! lives in `reelforge-worker`; nothing here touches the store.

use serde::{Deserialize, Serialize};

/// Scores below this threshold mark a scene as an outlier.
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 0.75;

/// A worker-computed consistency score for one scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyScore {
    /// 1-based scene number.
    pub scene: i32,
    /// Consistency in `[0, 1]`; higher is more faithful.
    pub score: f64,
}

/// A user decision at the quality gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Continue the pipeline regardless of scores.
    Approve,
    /// Regenerate only the outlier scenes (computed server-side).
    RegenerateOutliers,
    /// Regenerate every scene.
    RegenerateAll,
    /// Provide additional reference images and regenerate.
    AddReferences,
}

impl GateDecision {
    /// The wire name forwarded to the generation worker.
    pub fn as_str(self) -> &'static str {
        match self {
            GateDecision::Approve => "approve",
            GateDecision::RegenerateOutliers => "regenerate_outliers",
            GateDecision::RegenerateAll => "regenerate_all",
            GateDecision::AddReferences => "add_references",
        }
    }
}

/// Scene numbers whose score falls below `threshold`, in input order.
pub fn outlier_scenes(scores: &[ConsistencyScore], threshold: f64) -> Vec<i32> {
    scores
        .iter()
        .filter(|s| s.score < threshold)
        .map(|s| s.scene)
        .collect()
}

/// Arithmetic mean of the scores; `0.0` for an empty list.
pub fn average_score(scores: &[ConsistencyScore]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64
}

/// The payload forwarded to the generation worker for a gate decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionForward {
    pub decision: GateDecision,
    pub scene_numbers: Vec<i32>,
    pub additional_images: Vec<String>,
}

/// Build the forward payload for a decision.
///
/// For `RegenerateOutliers` the scene numbers are always recomputed
/// from the stored scores the user was shown; a client-submitted list
/// is ignored for that decision. Other decisions pass the caller's
/// scene numbers and images through unchanged.
pub fn build_forward(
    decision: GateDecision,
    stored_scores: &[ConsistencyScore],
    client_scene_numbers: Vec<i32>,
    additional_images: Vec<String>,
) -> DecisionForward {
    let scene_numbers = match decision {
        GateDecision::RegenerateOutliers => {
            outlier_scenes(stored_scores, DEFAULT_CONSISTENCY_THRESHOLD)
        }
        _ => client_scene_numbers,
    };

    DecisionForward {
        decision,
        scene_numbers,
        additional_images,
    }
}
