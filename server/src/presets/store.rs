//! In-memory preset storage, keyed by owning user.

use std::cmp::Ordering;

use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use lc_common::convo::Preset;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PresetStore {
    presets: DashMap<String, Vec<Preset>>,
}

/// `order` ascending with unordered presets first, then most recently
/// updated first.
fn listing_order(a: &Preset, b: &Preset) -> Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
}

impl PresetStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a preset owned by `user_id`.
    ///
    /// Assigns a `presetId` when missing and stamps timestamps. Saving a
    /// default preset clears the flag on the user's other presets.
    pub fn save(&self, user_id: &str, mut preset: Preset) -> Preset {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let preset_id = preset
            .preset_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        preset.fields.user = Some(user_id.to_string());
        preset.updated_at = Some(now.clone());

        let mut presets = self.presets.entry(user_id.to_string()).or_default();
        if preset.is_default() {
            for other in presets.iter_mut() {
                other.default_preset = None;
            }
        }

        match presets
            .iter_mut()
            .find(|p| p.preset_id.as_deref() == Some(preset_id.as_str()))
        {
            Some(existing) => {
                preset.created_at = existing.created_at.take().or(Some(now));
                *existing = preset.clone();
            }
            None => {
                preset.created_at.get_or_insert(now);
                presets.push(preset.clone());
            }
        }

        tracing::debug!(user_id, preset_id = %preset_id, "Preset saved");
        preset
    }

    /// The user's presets in listing order.
    #[must_use]
    pub fn list(&self, user_id: &str) -> Vec<Preset> {
        let mut presets = self
            .presets
            .get(user_id)
            .map(|p| p.clone())
            .unwrap_or_default();
        presets.sort_by(listing_order);
        presets
    }

    /// Delete one preset, or all of the user's presets when `preset_id` is
    /// `None`. Returns the number removed.
    pub fn delete(&self, user_id: &str, preset_id: Option<&str>) -> usize {
        let Some(mut presets) = self.presets.get_mut(user_id) else {
            return 0;
        };
        let before = presets.len();
        match preset_id {
            Some(id) => presets.retain(|p| p.preset_id.as_deref() != Some(id)),
            None => presets.clear(),
        }
        before - presets.len()
    }
}
