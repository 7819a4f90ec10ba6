use std::path::PathBuf;

use webman::config::Config;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:8080");
    assert_eq!(cfg.server.header_buffer_bytes, 64 * 1024);
    assert_eq!(cfg.server.max_body_bytes, 50 * 1024 * 1024);
    assert_eq!(cfg.server.close_grace_ms, 50);
    assert_eq!(cfg.storage.default_dir, PathBuf::from("/data"));
    assert_eq!(cfg.storage.system_mount, PathBuf::from("/system"));
    assert_eq!(cfg.storage.max_upload_bytes, 100 * 1024 * 1024);
    assert_eq!(cfg.telemetry.ram_total_bytes, 16 * 1024 * 1024 * 1024);
}

#[test]
fn test_config_listen_env_override() {
    // The only test in this binary that touches LISTEN
    unsafe {
        std::env::remove_var("LISTEN");
    }
    assert_eq!(Config::load().server.listen_addr, "0.0.0.0:8080");

    unsafe {
        std::env::set_var("LISTEN", "127.0.0.1:3000");
    }
    assert_eq!(Config::load().server.listen_addr, "127.0.0.1:3000");

    unsafe {
        std::env::remove_var("LISTEN");
    }
}

#[test]
fn test_config_partial_yaml_keeps_defaults() {
    let cfg = Config::from_yaml(
        "server:\n  close_grace_ms: 0\nstorage:\n  default_dir: /mnt/usb0\n",
    )
    .unwrap();

    assert_eq!(cfg.server.close_grace_ms, 0);
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:8080");
    assert_eq!(cfg.storage.default_dir, PathBuf::from("/mnt/usb0"));
    assert_eq!(cfg.storage.data_mount, PathBuf::from("/data"));
}

#[test]
fn test_config_empty_yaml_is_default() {
    let cfg = Config::from_yaml("  \n").unwrap();
    assert_eq!(cfg.server.chunk_size, 64 * 1024);
}

#[test]
fn test_config_invalid_yaml_is_error() {
    assert!(Config::from_yaml("server: [not, a, map]").is_err());
}

#[test]
fn test_config_from_missing_file_is_error() {
    assert!(Config::from_file("/definitely/missing/webman.yaml").is_err());
}

#[test]
fn test_config_clone() {
    let cfg1 = Config::default();
    let cfg2 = cfg1.clone();
    assert_eq!(cfg1.server.listen_addr, cfg2.server.listen_addr);
}
