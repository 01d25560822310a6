use certsend_lib::{
    config::{detect_format, load_config, parse_config_str},
    data::{load_attendees, Attendee, CsvOptions},
    smtp::{process_body, Encryption, SmtpSettings, DEFAULT_SMTP_HOST},
};

fn fixtures(kind: &str) -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(kind)
}

#[test]
fn test_all_config_formats_load() {
    for name in ["data.json", "data.yaml", "data.toml"] {
        let config = load_config(&fixtures("config").join(name))
            .unwrap_or_else(|e| panic!("failed to load {name}: {e}"));
        assert_eq!(
            config.email.sender_credentials.email, "workshops@example.com",
            "wrong sender in {name}"
        );
        assert!(
            config.email.body.contains("$fullname"),
            "body placeholder missing in {name}"
        );
    }
}

#[test]
fn test_config_roundtrips_through_yaml() {
    let path = fixtures("config").join("data.json");
    let original = load_config(&path).unwrap();
    let serialized = serde_yaml::to_string(&original).unwrap();
    let mut reparsed = parse_config_str(
        &serialized,
        &detect_format(std::path::Path::new("x.yaml")).unwrap(),
        &path,
    )
    .unwrap();
    reparsed.base_dir = original.base_dir.clone();
    assert_eq!(original, reparsed);
}

#[test]
fn test_smtp_settings_from_fixtures() {
    let json = load_config(&fixtures("config").join("data.json")).unwrap();
    let settings = SmtpSettings::from_sender(&json.email.sender_credentials);
    assert_eq!(settings.host, DEFAULT_SMTP_HOST);
    assert_eq!((settings.port, settings.encryption), (465, Encryption::Tls));

    let yaml = load_config(&fixtures("config").join("data.yaml")).unwrap();
    let settings = SmtpSettings::from_sender(&yaml.email.sender_credentials);
    assert_eq!(settings.host, "mail.example.com");
    assert_eq!((settings.port, settings.encryption), (587, Encryption::StartTls));

    let toml = load_config(&fixtures("config").join("data.toml")).unwrap();
    let settings = SmtpSettings::from_sender(&toml.email.sender_credentials);
    assert_eq!((settings.port, settings.encryption), (465, Encryption::Tls));
}

#[test]
fn test_attendees_feed_body_substitution() {
    let attendees = load_attendees(
        &fixtures("attendees").join("comma.csv"),
        &CsvOptions::default(),
    )
    .unwrap();
    let config = load_config(&fixtures("config").join("data.yaml")).unwrap();

    for attendee in &attendees {
        let body = process_body(attendee, &config.email.body);
        assert!(!body.contains("$fullname") && !body.contains("$email"));
        assert!(body.contains(&attendee.fullname));
        assert!(body.contains(&attendee.email));
    }
    assert_eq!(
        attendees[1],
        Attendee::new("Bob Stone", "bob@example.com")
    );
}
