use verdant::CareConfig;
use verdant::notifications::NotificationChannel;

#[test]
fn config_survives_save_and_reload() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("verdant").join("config.toml");

    let config = CareConfig {
        notifications_enabled: true,
        reminder_hour: 7,
        horizon_days: 60,
        channel: NotificationChannel::Care,
    };
    config.save_to_file(&path).expect("save config");

    let raw = std::fs::read_to_string(&path).expect("read config");
    assert!(raw.contains("reminder_hour = 7"));

    let loaded = CareConfig::from_file(&path).expect("load config");
    assert_eq!(loaded, config);
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = CareConfig::from_file(&temp.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.code(), "IO_ERROR");
}

#[test]
fn unknown_channel_is_a_config_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "channel = \"carrier-pigeon\"\n").expect("write config");
    let err = CareConfig::from_file(&path).unwrap_err();
    assert_eq!(err.code(), "CONFIG_INVALID");
}
