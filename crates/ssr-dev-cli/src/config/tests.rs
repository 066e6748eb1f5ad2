#[cfg(test)]
mod tests {
    use crate::config::loading::camel_case_key;
    use crate::config::*;
    use crate::error::ConfigError;
    use figment::Jail;
    use serial_test::serial;
    use std::path::{Path, PathBuf};

    fn runnable() -> SsrDevConfig {
        let command = |name: &str| vec!["npm".to_string(), "run".to_string(), format!("build:{name}")];
        SsrDevConfig {
            client: PipelineSection {
                command: command("client"),
                ..default_client_pipeline()
            },
            server: PipelineSection {
                command: command("server"),
                ..default_server_pipeline()
            },
            error: PipelineSection {
                command: command("error"),
                ..default_error_pipeline()
            },
            ..SsrDevConfig::default_config()
        }
    }

    #[test]
    fn test_serialization() {
        let config = runnable();
        let json_val = serde_json::to_value(&config).unwrap();

        // camelCase field names
        assert!(json_val.get("outputDir").is_some());
        assert!(json_val.get("hmrPath").is_some());
        assert!(json_val["client"].get("publicPath").is_some());
        assert!(json_val["artifacts"].get("clientManifest").is_some());
        assert!(json_val.get("output_dir").is_none());
        assert!(json_val.get("cwd").is_none());

        let back: SsrDevConfig = serde_json::from_value(json_val).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: SsrDevConfig = serde_json::from_str(r#"{"port": 3000}"#).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.template, PathBuf::from("src/index.template.html"));
        assert_eq!(config.heartbeat_ms, 5000);
        assert_eq!(config.hmr_path, "/__ssr_dev_hmr");
        assert_eq!(config.client.public_path, "/dist/");
        assert_eq!(config.ignore, vec!["node_modules", ".git", "dist", "*.log"]);
    }

    #[test]
    fn test_validation() {
        assert!(runnable().validate().is_ok());

        // Default pipelines have no command
        let err = SsrDevConfig::default_config().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field, .. } if field == "client.command"));

        let mut config = runnable();
        config.server.entry.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { ref field, .. }) if field == "server.entry"
        ));

        let mut config = runnable();
        config.client.public_path = "dist".to_string();
        assert!(config.validate().is_err());

        let mut config = runnable();
        config.hmr_path = "/dist/__hmr".to_string();
        assert!(config.validate().is_err());

        let mut config = runnable();
        config.hmr_path = "/distribution/__hmr".to_string();
        assert!(config.validate().is_ok());

        let mut config = runnable();
        config.heartbeat_ms = 0;
        assert!(config.validate().is_err());

        let mut config = runnable();
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_root_public_path_is_valid() {
        let mut config = runnable();
        config.client.public_path = "/".to_string();
        config.server.public_path = "/".to_string();
        config.error.public_path = "/".to_string();
        assert!(config.validate().is_ok());

        config.hmr_path = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_verify_paths() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = runnable();

        let err = config.verify_paths(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound { ref field, .. } if field == "template"));

        std::fs::create_dir_all(temp.path().join("src")).unwrap();
        std::fs::write(temp.path().join("src/index.template.html"), "<html></html>").unwrap();
        assert!(config.verify_paths(temp.path()).is_ok());

        let mut config = runnable();
        config.error.watch = vec![PathBuf::from("error-pages")];
        let err = config.verify_paths(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::PathNotFound { ref field, .. } if field == "error.watch"));
    }

    #[test]
    fn test_camel_case_key() {
        assert_eq!(camel_case_key("PORT"), "port");
        assert_eq!(camel_case_key("OUTPUT_DIR"), "outputDir");
        assert_eq!(camel_case_key("CLIENT.PUBLIC_PATH"), "client.publicPath");
        assert_eq!(camel_case_key("heartbeat_ms"), "heartbeatMs");
    }

    #[test]
    fn test_client_compiler_is_hot() {
        let config = runnable();
        let cwd = Path::new("/project");

        let client = config.command_compiler(PipelineKind::Client, cwd);
        assert!(client.pipeline().is_hot());
        assert_eq!(client.pipeline().output_filename, "[name].js");
        assert!(client.pipeline().entry[0].starts_with(ssr_dev::HOT_CLIENT_ENTRY));
        assert!(client.pipeline().entry[0].contains("/__ssr_dev_hmr"));
        assert_eq!(client.spec().program, "npm");
        assert_eq!(client.spec().args, vec!["run", "build:client"]);
        assert_eq!(client.spec().watch, vec![PathBuf::from("/project/src")]);

        let server = config.command_compiler(PipelineKind::Server, cwd);
        assert!(!server.pipeline().is_hot());
        assert_eq!(server.pipeline().entry, vec!["src/entry-server.js"]);
    }

    #[test]
    #[serial]
    fn test_layering_file_env_cli() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "ssr-dev.config.json",
                r#"{
                    "port": 4000,
                    "host": "localhost",
                    "template": "app/index.html",
                    "client": { "command": ["make", "client"] }
                }"#,
            )?;

            let config = SsrDevConfig::load(None, &CliOverrides::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(config.port, 4000);
            assert_eq!(config.template, PathBuf::from("app/index.html"));
            assert_eq!(config.client.command, vec!["make", "client"]);
            // Nested defaults survive a partial section
            assert_eq!(config.client.entry, vec!["src/entry-client.js"]);

            jail.set_env("SSR_DEV_PORT", "5000");
            jail.set_env("SSR_DEV_OUTPUT_DIR", "build");
            jail.set_env("SSR_DEV_CLIENT__PUBLIC_PATH", "/assets/");
            let config = SsrDevConfig::load(None, &CliOverrides::default())
                .map_err(|e| e.to_string())?;
            assert_eq!(config.port, 5000);
            assert_eq!(config.output_dir, PathBuf::from("build"));
            assert_eq!(config.client.public_path, "/assets/");

            let overrides = CliOverrides {
                port: Some(6000),
                host: Some("0.0.0.0".to_string()),
            };
            let config = SsrDevConfig::load(None, &overrides).map_err(|e| e.to_string())?;
            assert_eq!(config.port, 6000);
            assert_eq!(config.host, "0.0.0.0");

            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_explicit_missing_config_is_an_error() {
        Jail::expect_with(|_jail| {
            let err = SsrDevConfig::load(Some(Path::new("missing.json")), &CliOverrides::default())
                .unwrap_err();
            assert!(err.to_string().contains("Config file not found"));
            Ok(())
        });
    }

    #[test]
    #[serial]
    fn test_invalid_json_reported() {
        Jail::expect_with(|jail| {
            jail.create_file("ssr-dev.config.json", r#"{ "port": "not a number" }"#)?;
            let err = SsrDevConfig::load(None, &CliOverrides::default()).unwrap_err();
            assert!(err.to_string().contains("Invalid configuration"));
            Ok(())
        });
    }
}
