use figment::Jail;
use skiff_config::SkiffConfig;

#[test]
fn external_overrides_fill_config_values() {
    Jail::expect_with(|_jail| {
        let overrides = vec![(
            "SKIFF_API__BASE_URL".to_string(),
            "https://api.staging.skiff.dev".to_string(),
        )];

        let config = SkiffConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert_eq!(config.api.base_url, "https://api.staging.skiff.dev");
        Ok(())
    });
}

#[test]
fn numeric_overrides_are_typed() {
    Jail::expect_with(|_jail| {
        let overrides = vec![(
            "SKIFF_AUTH__CALLBACK_TIMEOUT_SECS".to_string(),
            "45".to_string(),
        )];

        let config = SkiffConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert_eq!(config.auth.callback_timeout_secs, 45);
        Ok(())
    });
}

#[test]
fn process_env_beats_external_overrides() {
    Jail::expect_with(|jail| {
        jail.set_env("SKIFF_API__BASE_URL", "https://api.from-env.dev");
        let overrides = vec![(
            "SKIFF_API__BASE_URL".to_string(),
            "https://api.from-external.dev".to_string(),
        )];

        let config = SkiffConfig::load_with_env_overrides(&overrides).expect("config loads");
        assert_eq!(config.api.base_url, "https://api.from-env.dev");
        Ok(())
    });
}

#[test]
fn invalid_login_url_is_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("SKIFF_API__LOGIN_URL", "not a url");

        let err = SkiffConfig::load().expect_err("invalid URL must fail");
        assert!(err.to_string().contains("api.login_url"));
        Ok(())
    });
}
