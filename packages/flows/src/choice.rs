/// An answer picked from a fixed option set, with a free-text fallback.
///
/// Picking a preset clears the custom text and typing clears the preset, so at most
/// one of the two is ever set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Choice {
    preset: Option<String>,
    custom: String,
}

impl Choice {
    /// Longest custom text accepted.
    pub const MAX_CUSTOM_LEN: usize = 50;

    pub fn with_preset(value: impl Into<String>) -> Self {
        Self {
            preset: Some(value.into()),
            custom: String::new(),
        }
    }

    pub fn pick(&mut self, value: impl Into<String>) {
        self.preset = Some(value.into());
        self.custom.clear();
    }

    pub fn type_custom(&mut self, text: &str) {
        self.custom = text.chars().take(Self::MAX_CUSTOM_LEN).collect();
        self.preset = None;
    }

    pub fn clear(&mut self) {
        self.preset = None;
        self.custom.clear();
    }

    pub fn selected(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn custom(&self) -> &str {
        &self.custom
    }

    /// Preset if chosen, else trimmed custom text, else nothing.
    pub fn value(&self) -> Option<String> {
        if let Some(preset) = &self.preset {
            return Some(preset.clone());
        }
        let custom = self.custom.trim();
        (!custom.is_empty()).then(|| custom.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_wins_over_custom() {
        let mut choice = Choice::default();
        choice.type_custom("Kiwi");
        choice.pick("Peanuts");
        assert_eq!(choice.value().as_deref(), Some("Peanuts"));
        assert_eq!(choice.custom(), "");
    }

    #[test]
    fn test_custom_clears_preset() {
        let mut choice = Choice::with_preset("Peanuts");
        choice.type_custom("  Kiwi ");
        assert_eq!(choice.selected(), None);
        assert_eq!(choice.value().as_deref(), Some("Kiwi"));
    }

    #[test]
    fn test_blank_custom_is_empty() {
        let mut choice = Choice::default();
        choice.type_custom("   ");
        assert!(choice.is_empty());
    }

    #[test]
    fn test_custom_is_capped() {
        let mut choice = Choice::default();
        choice.type_custom(&"x".repeat(80));
        assert_eq!(choice.custom().len(), Choice::MAX_CUSTOM_LEN);
    }
}
