//! Integration tests for config

#[cfg(test)]
mod tests {
    use distro_config::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var("DISTRO_MAX_CONCURRENT");
        std::env::remove_var("DISTRO_TEMP_DIR");
        std::env::remove_var("DISTRO_CONNECT_TIMEOUT");
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[transfer]
max_concurrent = 3

[cleanup]
temp_dir = "/var/tmp/distro"
stale_after_secs = 60

[install]
install_command = ["pm", "install", "{{file}}"]
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.transfer.max_concurrent, 3);
        // untouched fields keep their defaults
        assert_eq!(config.transfer.quick_link_max_concurrent, 5);
        assert_eq!(config.temp_dir(), PathBuf::from("/var/tmp/distro"));
        assert_eq!(config.cleanup.stale_after_secs, 60);
        assert_eq!(config.cleanup.artifact_prefix, "temp_");
        assert_eq!(config.install.install_command, vec!["pm", "install", "{file}"]);
        assert_eq!(config.install.uninstall_command[0], "adb");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/distro.toml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[transfer\nmax_concurrent = ").unwrap();
        let err = Config::load_from_file(temp_file.path()).await.unwrap_err();
        assert!(err.to_string().contains("parse error"));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.transfer.max_concurrent = 7;
        config.save_to_file(&path).await.unwrap();

        let loaded = Config::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.transfer.max_concurrent, 7);
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("DISTRO_MAX_CONCURRENT", "2");
        std::env::set_var("DISTRO_TEMP_DIR", "/tmp/distro-env");
        std::env::set_var("DISTRO_CONNECT_TIMEOUT", "5");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.transfer.max_concurrent, 2);
        assert_eq!(config.temp_dir(), PathBuf::from("/tmp/distro-env"));
        assert_eq!(config.network.connect_timeout, 5);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("DISTRO_MAX_CONCURRENT", "many");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_env_zero_cap_fails_validation() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("DISTRO_MAX_CONCURRENT", "0");
        let mut config = Config::default();
        config.merge_env().unwrap();
        assert!(config.validate().is_err());

        clear_env();
    }
}
