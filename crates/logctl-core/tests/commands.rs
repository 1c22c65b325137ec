//! End-to-end command runs against the in-process registry.

use logctl_config::AppConfig;
use logctl_core::lister::list_contexts;
use logctl_core::{Command, Level, MemoryRegistry, RegistryError};
use logctl_test_utils::{TestConfigBuilder, TestSession, init_test_tracing};
use pretty_assertions::assert_eq;

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test_log::test]
fn test_wildcard_listing_and_set() {
    let mut session = TestSession::scenario();

    let snapshot = list_contexts(&session.registry, Some("network*")).unwrap();
    assert_eq!(snapshot.names(), vec!["network", "network.wifi"]);

    let (ok, out) = session.run(
        Command::Set {
            pattern: "network*".into(),
            level: "info".into(),
        },
        false,
    );
    assert!(ok);
    assert_eq!(
        out.stdout(),
        "logctl: Setting context level for 'network'.\n\
         logctl: Setting context level for 'network.wifi'.\n"
    );
    assert_eq!(session.registry.level_of("network"), Some(Level::Info));
    assert_eq!(session.registry.level_of("network.wifi"), Some(Level::Info));
    assert_eq!(session.registry.level_of("ui"), Some(Level::Critical));
}

#[test]
fn test_listing_is_idempotent() {
    let session = TestSession::scenario();
    let first = list_contexts(&session.registry, None).unwrap();
    let second = list_contexts(&session.registry, None).unwrap();
    assert_eq!(first.names(), second.names());
    assert_eq!(first.len(), 4);
}

#[test]
fn test_not_found_and_no_match_messages() {
    let mut session = TestSession::scenario();

    let (ok, out) = session.run(
        Command::Set {
            pattern: "audio".into(),
            level: "err".into(),
        },
        false,
    );
    assert!(!ok);
    assert_eq!(out.stderr(), "logctl: Context 'audio' not found.\n");

    let (ok, out) = session.run(
        Command::Set {
            pattern: "audio*".into(),
            level: "err".into(),
        },
        false,
    );
    assert!(!ok);
    assert_eq!(out.stderr(), "logctl: No contexts matched 'audio*'.\n");
}

#[test]
fn test_embedded_star_degrades_to_prefix() {
    let mut session = TestSession::scenario();
    let (ok, out) = session.run(
        Command::Show {
            pattern: Some("net*zzz*".into()),
        },
        false,
    );
    assert!(ok);
    assert_eq!(
        out.stdout(),
        "logctl: Context 'network' = err\n\
         logctl: Context 'network.wifi' = notice\n"
    );
}

#[test]
fn test_silent_session_prints_nothing_on_success() {
    let mut session = TestSession::scenario();
    let (ok, out) = session.run(Command::Show { pattern: None }, true);
    assert!(ok);
    assert_eq!(out.stdout(), "");
    assert_eq!(out.stderr(), "");
}

#[test_log::test]
fn test_logkv_record_from_config_session() {
    let config = TestConfigBuilder::new()
        .context("network", Some("err"))
        .build();
    let mut session = TestSession::from_config(config);

    let (ok, _) = session.run(
        Command::LogKv {
            args: words(&[
                "network",
                "warning",
                "LINK_DOWN",
                "iface=\"wlan0\"",
                "retries=3",
                "link lost",
            ]),
        },
        false,
    );
    assert!(ok);
    let record = session.registry.records().last().unwrap();
    assert_eq!(record.context, "network");
    assert_eq!(record.level, Level::Warning);
    assert_eq!(record.msg_id(), Some("LINK_DOWN"));
    assert_eq!(record.data(), Some(r#"{"iface":"wlan0","retries":3}"#));
    assert_eq!(record.text(), Some("link lost"));
}

#[test]
fn test_malformed_pair_reports_token() {
    let mut session = TestSession::scenario();
    let (ok, out) = session.run(
        Command::LogKv {
            args: words(&["ui", "err", "ID", "nokey", "text"]),
        },
        false,
    );
    assert!(!ok);
    assert_eq!(out.stderr(), "logctl: key and value pair is wrong : nokey\n");
    assert!(session.registry.records().is_empty());
}

#[test]
fn test_truncate_policy_from_toml() {
    init_test_tracing();
    let mut session = TestSession::with_toml(
        r#"
            [[registry.contexts]]
            name = "ui"

            [logkv]
            capacity = 10
            overflow = "truncate"
        "#,
    );
    let (ok, out) = session.run(
        Command::LogKv {
            args: words(&["ui", "info", "ID", "a=1", "b=2", "done"]),
        },
        false,
    );
    assert!(ok);
    assert_eq!(
        session.registry.records().last().unwrap().data(),
        Some(r#"{"a":1,"b""#)
    );
    assert_eq!(out.stderr(), "logctl: Structured data truncated to 10 bytes.\n");
}

#[test]
fn test_klog_uses_configured_device_and_level() {
    let config = TestConfigBuilder::new().build();
    let mut session = TestSession::from_config(config);

    let (ok, _) = session.run(
        Command::KLog {
            level: None,
            facility: None,
            message: "first".into(),
        },
        false,
    );
    assert!(ok);
    let (ok, _) = session.run(
        Command::KLog {
            level: Some("none".into()),
            facility: None,
            message: "bare".into(),
        },
        false,
    );
    assert!(ok);
    assert_eq!(session.kmsg_contents(), "<5>first\nbare\n");
}

#[test]
fn test_def_then_show_and_log() {
    let config = TestConfigBuilder::new().default_level("warning").build();
    let mut session = TestSession::from_config(config);

    let (ok, _) = session.run(
        Command::Def {
            context: "camera".into(),
            level: None,
        },
        false,
    );
    assert!(ok);

    let (ok, out) = session.run(
        Command::Show {
            pattern: Some("camera".into()),
        },
        false,
    );
    assert!(ok);
    assert_eq!(out.stdout(), "logctl: Context 'camera' = warning\n");

    let (ok, _) = session.run(
        Command::Log {
            args: words(&["camera", "err", "lens cap on"]),
        },
        false,
    );
    assert!(ok);
    assert_eq!(
        session.registry.records().last().unwrap().text(),
        Some("lens cap on")
    );
}

#[test]
fn test_custom_global_name_alias() {
    let config = TestConfigBuilder::new().global_context("<root>").build();
    let mut session = TestSession::from_config(config);

    let (ok, out) = session.run(
        Command::Show {
            pattern: Some(".".into()),
        },
        false,
    );
    assert!(ok);
    assert_eq!(out.stdout(), "logctl: Context '<root>' = info\n");

    let (ok, _) = session.run(Command::Reconf, false);
    assert!(ok);
    assert_eq!(session.registry.records().last().unwrap().context, "<root>");
}

#[test]
fn test_global_alias_agrees_across_show_and_set_at_name_limit() {
    let limit = "<global>".len();
    let config = TestConfigBuilder::new().max_name_len(limit).build();
    assert!(config.validate().is_ok());
    let mut session = TestSession::from_config(config);

    let (ok_show, out) = session.run(
        Command::Show {
            pattern: Some(".".into()),
        },
        false,
    );
    assert!(ok_show);
    assert_eq!(out.stdout(), "logctl: Context '<global>' = info\n");

    let (_, out) = session.run(Command::Show { pattern: None }, false);
    assert_eq!(out.stdout(), "logctl: Context '<global>' = info\n");

    let (ok_set, out) = session.run(
        Command::Set {
            pattern: ".".into(),
            level: "debug".into(),
        },
        false,
    );
    assert_eq!(ok_show, ok_set);
    assert_eq!(
        out.stdout(),
        "logctl: Setting context level for '<global>'.\n"
    );
    assert_eq!(session.registry.level_of("<global>"), Some(Level::Debug));
}

#[test]
fn test_global_name_longer_than_limit_is_rejected() {
    let err = AppConfig::parse("[registry]\nmax_name_len = 4\n").unwrap_err();
    assert!(err.to_string().contains("registry.global_context"), "{err}");

    let config = TestConfigBuilder::new().max_name_len(4).build();
    assert_eq!(
        MemoryRegistry::from_config(&config).unwrap_err(),
        RegistryError::InvalidContextName
    );
}

#[test]
fn test_flush_creates_flush_context() {
    let mut session = TestSession::scenario();
    assert_eq!(session.registry.level_of("logctl"), None);

    let (ok, _) = session.run(Command::Flush, false);
    assert!(ok);
    assert_eq!(session.registry.level_of("logctl"), Some(Level::Info));
    let record = session.registry.records().last().unwrap();
    assert_eq!(record.msg_id(), Some("FLUSH_BUFFER"));
    assert_eq!(record.text(), Some("Manually Flushing Buffers"));
}

#[test]
fn test_help_is_a_failure() {
    let mut session = TestSession::scenario();
    let (ok, out) = session.run(Command::Help, false);
    assert!(!ok);
    assert!(out.stdout().contains("The global context can be specified as '.'"));
}
