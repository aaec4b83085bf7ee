// tests/config_env.rs
// These tests mutate process env, so they run under #[serial].

use std::{env, fs, path::PathBuf};

use serial_test::serial;

use tone_risk::config::{AppConfig, ENV_API_KEY, ENV_CONFIG_PATH, ENV_HOST, ENV_PORT};

/// Snapshot & restore env vars around a test.
struct EnvSnapshot {
    saved: Vec<(String, Option<String>)>,
}
impl EnvSnapshot {
    fn set(pairs: &[(&str, Option<&str>)]) -> Self {
        let mut saved = Vec::with_capacity(pairs.len());
        for (k, v) in pairs {
            saved.push((k.to_string(), env::var(k).ok()));
            match v {
                Some(val) => env::set_var(k, val),
                None => env::remove_var(k),
            }
        }
        Self { saved }
    }
}
impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (k, maybe_v) in self.saved.drain(..) {
            match maybe_v {
                Some(v) => env::set_var(&k, v),
                None => env::remove_var(&k),
            }
        }
    }
}

fn temp_config(name: &str, body: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("tone_risk_{}_{name}.toml", std::process::id()));
    fs::write(&path, body).expect("write temp config");
    path
}

#[test]
#[serial]
fn missing_file_falls_back_to_defaults() {
    let _env = EnvSnapshot::set(&[
        (ENV_CONFIG_PATH, Some("/definitely/not/here/tone_risk.toml")),
        (ENV_HOST, None),
        (ENV_PORT, None),
        (ENV_API_KEY, None),
    ]);
    let cfg = AppConfig::load().expect("load");
    assert_eq!(cfg.bind_addr(), "127.0.0.1:8000");
    assert!(!cfg.provider.enabled);
    assert!(cfg.provider.api_key.is_empty());
}

#[test]
#[serial]
fn env_overrides_file_values() {
    let path = temp_config(
        "override",
        r#"
        [server]
        host = "10.0.0.1"
        port = 9100

        [provider]
        enabled = true
        kind = "openai"
        "#,
    );
    let path_str = path.to_string_lossy().to_string();
    let _env = EnvSnapshot::set(&[
        (ENV_CONFIG_PATH, Some(path_str.as_str())),
        (ENV_HOST, Some("  0.0.0.0 ")),
        (ENV_PORT, Some("8443")),
        (ENV_API_KEY, Some("sk-test")),
    ]);

    let cfg = AppConfig::load().expect("load");
    let _ = fs::remove_file(&path);

    assert_eq!(cfg.bind_addr(), "0.0.0.0:8443");
    assert_eq!(cfg.provider.kind, "openai");
    assert_eq!(cfg.provider.api_key, "sk-test");
}

#[test]
#[serial]
fn unparsable_port_keeps_file_value() {
    let path = temp_config("badport", "[server]\nport = 9200\n");
    let path_str = path.to_string_lossy().to_string();
    let _env = EnvSnapshot::set(&[
        (ENV_CONFIG_PATH, Some(path_str.as_str())),
        (ENV_HOST, Some("   ")),
        (ENV_PORT, Some("not-a-port")),
    ]);

    let cfg = AppConfig::load().expect("load");
    let _ = fs::remove_file(&path);

    assert_eq!(cfg.server.port, 9200);
    assert_eq!(cfg.server.host, "127.0.0.1");
}

#[test]
#[serial]
fn malformed_file_is_reported() {
    let path = temp_config("broken", "[server\nport = ");
    let path_str = path.to_string_lossy().to_string();
    let _env = EnvSnapshot::set(&[(ENV_CONFIG_PATH, Some(path_str.as_str()))]);

    let err = AppConfig::load().expect_err("broken toml must fail");
    let _ = fs::remove_file(&path);
    assert!(format!("{err:#}").contains("parse config"));
}

#[test]
#[serial]
fn shipped_sample_config_parses() {
    let cfg = AppConfig::load_from_file("config/tone_risk.toml").expect("sample config");
    assert!(cfg.server.port > 0);
    assert!(cfg.store.capacity > 0);
}
