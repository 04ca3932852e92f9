use clap::Parser;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_use_memory_backend_and_fallback() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(matches!(settings.backend, BackendSettings::Memory));
    assert_eq!(settings.server.public_addr.port(), DEFAULT_PUBLIC_PORT);
    assert_eq!(settings.server.admin_addr.port(), DEFAULT_ADMIN_PORT);
    assert!(settings.cache.enabled);
    assert!(settings.sections.fallback_to_defaults);
}

#[test]
fn hosted_backend_requires_anon_key() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("https://project.supabase.co".to_string());

    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "backend.anon_key"),
        other => panic!("expected invalid anon key, got {other:?}"),
    }
}

#[test]
fn hosted_backend_via_cli() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        backend_url: Some(" https://project.supabase.co ".to_string()),
        backend_anon_key: Some("anon".to_string()),
        backend_request_timeout_seconds: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    match settings.backend {
        BackendSettings::Hosted {
            url,
            anon_key,
            request_timeout,
        } => {
            assert_eq!(url, "https://project.supabase.co");
            assert_eq!(anon_key, "anon");
            assert_eq!(request_timeout, Some(Duration::from_secs(5)));
        }
        BackendSettings::Memory => panic!("expected hosted backend"),
    }
}

#[test]
fn rejects_non_http_backend_url() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("postgres://localhost".to_string());
    raw.backend.anon_key = Some("anon".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "backend.url",
            ..
        })
    ));
}

#[test]
fn rejects_shared_listener_address() {
    let mut raw = RawSettings::default();
    raw.server.admin_port = Some(DEFAULT_PUBLIC_PORT);

    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn admin_emails_drop_blanks() {
    let mut raw = RawSettings::default();
    raw.auth.admin_emails = vec![" owner@example.com ".to_string(), "  ".to_string()];

    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.auth.admin_emails, vec!["owner@example.com"]);
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["knoxs"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "knoxs",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--cache-enabled",
        "false",
        "--sections-fallback-to-defaults",
        "no",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(serve.overrides.cache_enabled, Some(false));
            assert_eq!(serve.overrides.sections_fallback_to_defaults, Some(false));
        }
    }
}
