//! The fixed, totally ordered pipeline step vocabulary.
//!
//! The generation worker walks these steps in order. Step columns on
//! the job row are stored as TEXT because the worker also reports
//! auxiliary step names for artifact updates (e.g. `audio`,
//! `assembly`) that are not part of the ordered vocabulary; this enum
//! provides parsing and ordering for the vocabulary proper.

use serde::{Deserialize, Serialize};

/// One named stage in the fixed generation sequence.
///
/// Variant order *is* pipeline order; `Ord` is derived so steps can be
/// compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    ScriptGeneration,
    ScenePrompts,
    Storyboard,
    StoryboardReview,
    VideoGeneration,
    VideoExtension,
    AudioGeneration,
    PostProduction,
    QualityCheck,
    Complete,
}

/// All vocabulary steps in pipeline order.
pub const ALL_STEPS: [PipelineStep; 10] = [
    PipelineStep::ScriptGeneration,
    PipelineStep::ScenePrompts,
    PipelineStep::Storyboard,
    PipelineStep::StoryboardReview,
    PipelineStep::VideoGeneration,
    PipelineStep::VideoExtension,
    PipelineStep::AudioGeneration,
    PipelineStep::PostProduction,
    PipelineStep::QualityCheck,
    PipelineStep::Complete,
];

impl PipelineStep {
    /// The snake_case wire name for this step.
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStep::ScriptGeneration => "script_generation",
            PipelineStep::ScenePrompts => "scene_prompts",
            PipelineStep::Storyboard => "storyboard",
            PipelineStep::StoryboardReview => "storyboard_review",
            PipelineStep::VideoGeneration => "video_generation",
            PipelineStep::VideoExtension => "video_extension",
            PipelineStep::AudioGeneration => "audio_generation",
            PipelineStep::PostProduction => "post_production",
            PipelineStep::QualityCheck => "quality_check",
            PipelineStep::Complete => "complete",
        }
    }

    /// Parse a wire name into a vocabulary step.
    ///
    /// Returns `None` for auxiliary or unknown step names; callers that
    /// accept free-form worker steps keep the raw string instead.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_STEPS.iter().copied().find(|step| step.as_str() == s)
    }

    /// Zero-based position of this step in pipeline order.
    pub fn order_index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
