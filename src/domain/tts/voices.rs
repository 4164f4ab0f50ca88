use std::collections::BTreeMap;

use super::model::{EngineTier, VoiceProfile};

/// Requested voice is not in the registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown voice '{name}'. Available: {}", .available.join(", "))]
pub struct UnknownVoiceError {
    pub name: String,
    /// Every registered name, sorted alphabetically
    pub available: Vec<String>,
}

/// Read-only table of voice profiles keyed by lowercase display name.
///
/// Built once at startup and shared by reference; lookups never mutate it,
/// so it can be read from any number of tasks without locking.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    voices: BTreeMap<String, VoiceProfile>,
}

impl VoiceRegistry {
    pub fn new(profiles: impl IntoIterator<Item = VoiceProfile>) -> Self {
        let voices = profiles
            .into_iter()
            .map(|profile| (profile.display_name.to_lowercase(), profile))
            .collect();

        Self { voices }
    }

    /// The voices shipped with the tool
    pub fn builtin() -> Self {
        use EngineTier::{Neural, Standard};

        Self::new([
            // English (US)
            VoiceProfile::new("Joanna", "Joanna", "en-US", Neural),
            VoiceProfile::new("Matthew", "Matthew", "en-US", Neural),
            // German
            VoiceProfile::new("Marlene", "Marlene", "de-DE", Neural),
            VoiceProfile::new("Hans", "Hans", "de-DE", Neural),
            VoiceProfile::new("Vicki", "Vicki", "de-DE", Standard),
            VoiceProfile::new("Daniel", "Daniel", "de-DE", Standard),
            // Russian
            VoiceProfile::new("Tatyana", "Tatyana", "ru-RU", Standard),
            VoiceProfile::new("Maxim", "Maxim", "ru-RU", Standard),
            // Korean
            VoiceProfile::new("Seoyeon", "Seoyeon", "ko-KR", Neural),
        ])
    }

    /// Add or replace profiles, matching on lowercase display name
    #[must_use]
    pub fn with_overrides(mut self, profiles: impl IntoIterator<Item = VoiceProfile>) -> Self {
        for profile in profiles {
            self.voices
                .insert(profile.display_name.to_lowercase(), profile);
        }
        self
    }

    /// Case-insensitive lookup
    pub fn resolve(&self, name: &str) -> Result<&VoiceProfile, UnknownVoiceError> {
        self.voices
            .get(&name.to_lowercase())
            .ok_or_else(|| UnknownVoiceError {
                name: name.to_string(),
                available: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&str> {
        self.voices.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VoiceProfile)> {
        self.voices.iter().map(|(name, profile)| (name.as_str(), profile))
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
