//! Storyboard payload normalization.
//!
//! The generation worker emits storyboards in one of two shapes:
//!
//! - nested: `{"scenes": [{"variants": [...], "selected_variant": 2}]}`
//!   where each scene carries candidate images and a 1-based selected
//!   variant index (defaulting to the first variant), or
//! - flat: `[{"image_url": "...", "scene_number": 1}, ...]`.
//!
//! Both shapes also vary key spelling (`image_url`/`imageUrl`/`url`,
//! `scene_number`/`sceneNumber`). [`normalize_storyboard`] is the only
//! place that knows about this; everything downstream sees
//! [`StoryboardScene`].

use serde::{Deserialize, Serialize};

/// One scene of a normalized storyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryboardScene {
    /// 1-based scene number.
    pub scene_number: i32,
    /// URL of the image chosen for this scene.
    pub image_url: String,
}

/// Read an image URL from a scene/variant object, tolerating the
/// `image_url`, `imageUrl`, and `url` key names.
fn image_url_of(obj: &serde_json::Value) -> Option<&str> {
    obj.get("image_url")
        .or_else(|| obj.get("imageUrl"))
        .or_else(|| obj.get("url"))
        .and_then(|v| v.as_str())
}

/// Read a scene number, tolerating both `scene_number` and
/// `sceneNumber`; falls back to the given 1-based position.
fn scene_number_of(obj: &serde_json::Value, position: usize) -> i32 {
    obj.get("scene_number")
        .or_else(|| obj.get("sceneNumber"))
        .and_then(|v| v.as_i64())
        .map(|n| n as i32)
        .unwrap_or(position as i32 + 1)
}

/// Normalize a raw worker storyboard payload into a canonical scene list.
///
/// Entries without a usable image URL are dropped. An unrecognized
/// payload shape yields an empty list, which callers treat the same as
/// "no storyboard yet".
pub fn normalize_storyboard(payload: &serde_json::Value) -> Vec<StoryboardScene> {
    // Nested shape: {"scenes": [{variants, selected_variant}, ...]}.
    if let Some(scenes) = payload.get("scenes").and_then(|s| s.as_array()) {
        return scenes
            .iter()
            .enumerate()
            .filter_map(|(i, scene)| {
                let url = selected_variant_url(scene).or_else(|| image_url_of(scene))?;
                Some(StoryboardScene {
                    scene_number: scene_number_of(scene, i),
                    image_url: url.to_string(),
                })
            })
            .collect();
    }

    // Flat shape: [{"image_url": ...}, ...].
    if let Some(entries) = payload.as_array() {
        return entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let url = image_url_of(entry)?;
                Some(StoryboardScene {
                    scene_number: scene_number_of(entry, i),
                    image_url: url.to_string(),
                })
            })
            .collect();
    }

    Vec::new()
}

/// Resolve the selected variant's URL for a nested-shape scene.
///
/// `selected_variant` is 1-based; missing or out-of-range indices fall
/// back to the first variant.
fn selected_variant_url(scene: &serde_json::Value) -> Option<&str> {
    let variants = scene.get("variants").and_then(|v| v.as_array())?;
    if variants.is_empty() {
        return None;
    }

    let selected = scene
        .get("selected_variant")
        .or_else(|| scene.get("selectedVariant"))
        .and_then(|v| v.as_i64())
        .unwrap_or(1);

    let index = if selected >= 1 && (selected as usize) <= variants.len() {
        selected as usize - 1
    } else {
        0
    };

    image_url_of(&variants[index])
}
