//! Tests for config file persistence and legacy migration.

use tempfile::TempDir;

use super::{Config, ConfigStore, HistorySettings};
use crate::payload::Tier;

fn store() -> (TempDir, ConfigStore) {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join(".trmnl"));
    (dir, store)
}

mod load {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let (_dir, store) = store();

        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json {{{").unwrap();

        assert_eq!(store.load(), Config::default());
    }

    fn write_config(store: &ConfigStore, content: &str) {
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), content).unwrap();
    }

    #[test]
    fn unknown_tier_falls_back_to_free() {
        let (_dir, store) = store();
        write_config(&store, r#"{"tier": "gold"}"#);

        assert_eq!(store.load().tier, Tier::Free);
    }

    #[test]
    fn null_tier_keeps_plugins() {
        let (_dir, store) = store();
        write_config(
            &store,
            r#"{"plugins":{"home":{"url":"https://x/a"}},"defaultPlugin":"home","tier":null}"#,
        );

        let config = store.load();

        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.plugins["home"].url, "https://x/a");
        assert_eq!(config.default_plugin.as_deref(), Some("home"));
        assert_eq!(config.tier, Tier::Free);
    }

    #[test]
    fn wrong_typed_fields_reset_individually() {
        let (_dir, store) = store();
        write_config(
            &store,
            r#"{"plugins":{"home":{"url":"https://x/a"}},"tier":"plus","history":null,"defaultPlugin":7}"#,
        );

        let config = store.load();

        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.tier, Tier::Plus);
        assert_eq!(config.history, HistorySettings::default());
        assert!(config.default_plugin.is_none());
    }

    #[test]
    fn null_plugins_keep_other_fields() {
        let (_dir, store) = store();
        write_config(&store, r#"{"plugins":null,"tier":"plus"}"#);

        let config = store.load();

        assert!(config.plugins.is_empty());
        assert_eq!(config.tier, Tier::Plus);
    }

    #[test]
    fn update_after_bad_field_preserves_plugins() {
        let (_dir, store) = store();
        write_config(
            &store,
            r#"{"plugins":{"home":{"url":"https://x/a"}},"defaultPlugin":"home","tier":null}"#,
        );

        store.update(|config| config.tier = Tier::Plus).unwrap();

        let config = store.load();
        assert_eq!(config.tier, Tier::Plus);
        assert!(config.plugins.contains_key("home"));
    }

    #[test]
    fn reads_file_written_by_save() {
        let (_dir, store) = store();
        let mut config = Config::default();
        config.set_plugin("home", "https://example.com/home", Some("Living room".into()));
        config.tier = Tier::Plus;

        store.save(&config).unwrap();

        assert_eq!(store.load(), config);
    }
}

mod save {
    use super::*;

    #[test]
    fn creates_directory_and_pretty_json() {
        let (_dir, store) = store();

        store.save(&Config::default()).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\n  \"tier\": \"free\""));
    }

    #[test]
    fn leaves_no_temp_file() {
        let (_dir, store) = store();

        store.save(&Config::default()).unwrap();

        let temp = store.path().with_file_name("config.json.tmp");
        assert!(!temp.exists());
    }

    #[test]
    fn update_persists_mutation_and_returns_value() {
        let (_dir, store) = store();

        let added = store
            .update(|config| {
                config.set_plugin("home", "https://example.com", None);
                config.plugins.len()
            })
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.load().default_plugin.as_deref(), Some("home"));
    }

    #[test]
    fn last_writer_wins() {
        let (_dir, store) = store();
        let mut first = Config::default();
        first.set_plugin("a", "https://a", None);
        let mut second = Config::default();
        second.set_plugin("b", "https://b", None);

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let loaded = store.load();
        assert!(loaded.plugins.get("a").is_none());
        assert!(loaded.plugins.get("b").is_some());
    }
}

mod migration {
    use super::*;

    fn write_legacy(store: &ConfigStore, content: &str) -> std::path::PathBuf {
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let path = store.path().with_file_name("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn legacy_url_becomes_default_plugin() {
        let (_dir, store) = store();
        let legacy = write_legacy(
            &store,
            "[webhook]\nurl = \"https://usetrmnl.com/api/custom_plugins/abc\"\n",
        );

        let config = store.load();

        let plugin = config.plugins.get("default").unwrap();
        assert_eq!(plugin.url, "https://usetrmnl.com/api/custom_plugins/abc");
        assert_eq!(config.default_plugin.as_deref(), Some("default"));
        assert!(!legacy.exists());
        assert!(store.path().exists());
    }

    #[test]
    fn legacy_tier_is_carried_over() {
        let (_dir, store) = store();
        write_legacy(&store, "[webhook]\nurl = \"https://a\"\ntier = \"plus\"\n");

        assert_eq!(store.load().tier, Tier::Plus);
    }

    #[test]
    fn migration_happens_once() {
        let (_dir, store) = store();
        write_legacy(&store, "[webhook]\nurl = \"https://a\"\n");

        let first = store.load();
        store
            .update(|config| config.set_plugin("extra", "https://b", None))
            .unwrap();
        let second = store.load();

        assert_eq!(first.plugins.len(), 1);
        assert_eq!(second.plugins.len(), 2);
    }

    #[test]
    fn unparseable_legacy_file_is_left_alone() {
        let (_dir, store) = store();
        let legacy = write_legacy(&store, "this is = = not toml");

        assert_eq!(store.load(), Config::default());
        assert!(legacy.exists());
    }
}
