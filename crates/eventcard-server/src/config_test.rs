use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, ServerConfig::default());
}

#[test]
fn parses_all_variables() {
    let config = ServerConfig::from_lookup(lookup(&[
        ("PORT", "8080"),
        ("FONT_DIR", "/srv/fonts"),
        ("CLOUDINARY_CLOUD_NAME", "demo"),
        ("CLOUDINARY_UPLOAD_PRESET", "cards"),
        ("UPLOAD_TIMEOUT_SECS", "5"),
        ("PHOTO_FETCH_TIMEOUT_SECS", "2"),
        ("RESEND_API_KEY", "re_123"),
        ("PUBLIC_EVENT_URL", "https://example.com/"),
    ]))
    .unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.font_dir, Some(PathBuf::from("/srv/fonts")));
    assert_eq!(
        config.cloudinary,
        Some(CloudinaryConfig { cloud_name: "demo".into(), upload_preset: "cards".into() })
    );
    assert_eq!(config.upload_timeout, Duration::from_secs(5));
    assert_eq!(config.photo_fetch_timeout, Duration::from_secs(2));
    assert_eq!(config.resend_api_key.as_deref(), Some("re_123"));
    assert_eq!(config.public_event_url, "https://example.com");
}

#[test]
fn delivery_base_is_scoped_to_the_cloud() {
    let cloudinary = CloudinaryConfig { cloud_name: "demo".into(), upload_preset: "cards".into() };
    assert_eq!(cloudinary.delivery_base(), "https://res.cloudinary.com/demo/");
}

#[test]
fn half_configured_cloudinary_is_absent() {
    let config = ServerConfig::from_lookup(lookup(&[("CLOUDINARY_CLOUD_NAME", "demo")])).unwrap();
    assert!(config.cloudinary.is_none());
}

#[test]
fn blank_values_count_as_unset() {
    let config = ServerConfig::from_lookup(lookup(&[("RESEND_API_KEY", "  "), ("PORT", "")])).unwrap();
    assert!(config.resend_api_key.is_none());
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn invalid_number_is_an_error() {
    let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "eighty".into() });
}
