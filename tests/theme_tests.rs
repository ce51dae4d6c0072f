use chart_scene::core::{Color, SettingKey, SettingValue};
use chart_scene::scene::Root;
use chart_scene::theme::Theme;

fn dark_theme() -> Theme {
    let mut theme = Theme::new();
    theme.add_rule(
        "Label",
        &[],
        [
            (SettingKey::FontSize, SettingValue::Float(12.0)),
            (
                SettingKey::Fill,
                SettingValue::Color(Color::rgb(0.9, 0.9, 0.9)),
            ),
        ],
    );
    theme.add_rule(
        "Label",
        &["axis"],
        [(SettingKey::FontSize, SettingValue::Float(10.0))],
    );
    theme
}

#[test]
fn theme_seeds_defaults_for_matching_class() {
    let mut root = Root::new();
    root.push_theme(dark_theme());

    let label = root.new_label("hi");
    root.push_child(root.container(), label);

    assert_eq!(root.settings(label).float(&SettingKey::FontSize), Some(12.0));
    assert_eq!(
        root.settings(label).color(&SettingKey::Fill),
        Some(Color::rgb(0.9, 0.9, 0.9))
    );
    // Seeding never marks keys dirty.
    assert!(!root.is_dirty(label, &SettingKey::FontSize));
}

#[test]
fn tagged_rules_apply_only_with_matching_tags() {
    let mut root = Root::new();
    root.push_theme(dark_theme());

    let plain = root.new_label("plain");
    root.push_child(root.container(), plain);
    assert_eq!(root.settings(plain).float(&SettingKey::FontSize), Some(12.0));

    let tagged = root.new_label("axis label");
    root.push_child(root.container(), tagged);
    root.apply_theme_tags(tagged, &["axis"]);
    assert_eq!(root.settings(tagged).float(&SettingKey::FontSize), Some(10.0));
}

#[test]
fn explicit_sets_override_theme_defaults() {
    let mut root = Root::new();
    root.push_theme(dark_theme());

    let label = root.new_label("hi");
    root.push_child(root.container(), label);
    root.set(label, SettingKey::FontSize, 20.0);

    assert_eq!(root.settings(label).float(&SettingKey::FontSize), Some(20.0));
}

#[test]
fn theme_does_not_touch_other_classes() {
    let mut root = Root::new();
    root.push_theme(dark_theme());

    let graphics = root.new_graphics();
    root.push_child(root.container(), graphics);
    assert_eq!(root.settings(graphics).float(&SettingKey::FontSize), None);
}
