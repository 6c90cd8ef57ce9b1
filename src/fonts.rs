use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_FONT: &str = "Arial";

const BUILTIN_FONTS: &[(&str, &str)] = &[
    ("VNI-Times", "Times New Roman"),
    ("VNI-Arial", "Arial"),
    ("VNI-Helve", "Helvetica"),
    ("VNI-Hobo", "Hobo Std"),
    (".VnTime", "Times New Roman"),
    (".VnTimeH", "Times New Roman"),
    (".VnArial", "Arial"),
    (".VnHelve", "Helvetica"),
];

/// Legacy font name to Unicode-capable replacement.
#[derive(Debug, Clone)]
pub struct FontMap {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
    default_font: String,
}

impl Default for FontMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FontMap {
    pub fn builtin() -> Self {
        let mut map = Self {
            exact: HashMap::new(),
            folded: HashMap::new(),
            default_font: DEFAULT_FONT.to_string(),
        };
        for (legacy, modern) in BUILTIN_FONTS {
            map.insert(legacy, modern);
        }
        map
    }

    /// Built-in table plus `overrides`, which replace built-in entries with
    /// the same name.
    pub fn with_overrides(overrides: &BTreeMap<String, String>, default_font: &str) -> Self {
        let mut map = Self::builtin();
        for (legacy, modern) in overrides {
            map.insert(legacy, modern);
        }
        if !default_font.trim().is_empty() {
            map.default_font = default_font.trim().to_string();
        }
        map
    }

    fn insert(&mut self, legacy: &str, modern: &str) {
        self.exact.insert(legacy.to_string(), modern.to_string());
        self.folded
            .insert(legacy.to_ascii_lowercase(), modern.to_string());
    }

    pub fn lookup(&self, legacy: &str) -> Option<&str> {
        self.exact
            .get(legacy)
            .or_else(|| self.folded.get(&legacy.to_ascii_lowercase()))
            .map(String::as_str)
    }

    /// Replacement for a decoded run: the mapped font, or the default.
    pub fn resolve(&self, legacy: &str) -> &str {
        self.lookup(legacy).unwrap_or(&self.default_font)
    }

    pub fn default_font(&self) -> &str {
        &self.default_font
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let map = FontMap::builtin();
        assert_eq!(map.lookup("VNI-Times"), Some("Times New Roman"));
        assert_eq!(map.lookup(".vntimeh"), Some("Times New Roman"));
        assert_eq!(map.lookup("Calibri"), None);
        assert_eq!(map.resolve("Calibri"), DEFAULT_FONT);
    }

    #[test]
    fn overrides_replace_builtins_and_default() {
        let mut overrides = BTreeMap::new();
        overrides.insert("VNI-Times".to_string(), "Noto Serif".to_string());
        overrides.insert("VNI-Brush".to_string(), "Segoe Script".to_string());
        let map = FontMap::with_overrides(&overrides, "Tahoma");
        assert_eq!(map.resolve("VNI-Times"), "Noto Serif");
        assert_eq!(map.resolve("VNI-Brush"), "Segoe Script");
        assert_eq!(map.resolve("VNI-Unknown"), "Tahoma");
        assert_eq!(map.resolve(".VnTime"), "Times New Roman");
    }
}
