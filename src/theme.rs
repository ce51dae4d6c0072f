use crate::core::settings::SettingKey;
use crate::core::value::SettingValue;

/// One default-settings rule, keyed by class name and theme tags.
#[derive(Debug, Clone)]
pub struct ThemeRule {
    pub class_name: String,
    pub tags: Vec<String>,
    pub settings: Vec<(SettingKey, SettingValue)>,
}

/// Table of default settings consulted when a node is created.
///
/// Theme defaults seed initial state only: they never mark a key dirty and
/// explicit user settings always override them.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    rules: Vec<ThemeRule>,
}

impl Theme {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(
        &mut self,
        class_name: &str,
        tags: &[&str],
        settings: impl IntoIterator<Item = (SettingKey, SettingValue)>,
    ) {
        self.rules.push(ThemeRule {
            class_name: class_name.to_owned(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            settings: settings.into_iter().collect(),
        });
    }

    /// Settings from rules matching `class_name` whose tags are all present
    /// in `tags`, in rule order (later rules win on conflicts since seeding
    /// overwrites).
    pub fn matching<'a>(
        &'a self,
        class_name: &'a str,
        tags: &'a [String],
    ) -> impl Iterator<Item = &'a (SettingKey, SettingValue)> {
        self.rules
            .iter()
            .filter(move |rule| {
                rule.class_name == class_name
                    && rule.tags.iter().all(|required| tags.contains(required))
            })
            .flat_map(|rule| rule.settings.iter())
    }
}
