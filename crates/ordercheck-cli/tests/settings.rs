use std::fs;
use std::path::PathBuf;

use ordercheck_cli::settings::{
    ClientSettings, Overrides, load_settings_from, save_settings_to,
};

fn temp_settings_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("ordercheck_settings_{stamp}"));
    dir
}

#[test]
fn saved_settings_load_back() {
    let dir = temp_settings_dir();
    let path = dir.join("nested").join("settings.toml");
    let settings = ClientSettings {
        base_url: "http://specs.internal:8080".to_string(),
        request_timeout_secs: Some(45),
        template_rows: 10,
    };

    save_settings_to(&settings, &path).unwrap();
    assert_eq!(load_settings_from(&path), settings);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_or_invalid_file_falls_back_to_defaults() {
    let dir = temp_settings_dir();
    assert_eq!(
        load_settings_from(&dir.join("absent.toml")),
        ClientSettings::default()
    );

    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.toml");
    fs::write(&path, "base_url = [not toml").unwrap();
    assert_eq!(load_settings_from(&path), ClientSettings::default());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn flag_timeout_overrides_file() {
    let settings = ClientSettings {
        request_timeout_secs: Some(10),
        ..ClientSettings::default()
    }
    .with_overrides(Overrides {
        timeout_secs: Some(3),
        ..Overrides::default()
    });
    assert_eq!(settings.request_timeout_secs, Some(3));
    assert_eq!(settings.client_config().base_url, "http://127.0.0.1:5000");
}
