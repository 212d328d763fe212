use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use tempfile::TempDir;

const ALL_VARS: &[&str] = &[
    "ARTIFY_PORT",
    "ARTIFY_BIND_ADDR",
    "ARTIFY_STORAGE_PATH",
    "ARTIFY_MODEL_PATH",
    "ARTIFY_REQUIRE_MODEL",
    "ARTIFY_REFERENCE_IMAGES",
    "ARTIFY_REFERENCE_DIR",
    "ARTIFY_EMBEDDING_DIM",
    "ARTIFY_IMAGE_SIZE",
    "ARTIFY_MAX_IMAGE_BYTES",
    "ARTIFY_NORMALIZE_EMBEDDINGS",
    "ARTIFY_THRESHOLD",
    "ARTIFY_TOP_K",
    "ARTIFY_EMBEDDING_PREVIEW_LEN",
    "ARTIFY_FALLBACK_SCORE_MIN",
    "ARTIFY_FALLBACK_SCORE_MAX",
    "ARTIFY_SIGNER_KEY",
    "ARTIFY_WEB3STORAGE_TOKEN",
    "ARTIFY_UPLOAD_URL",
    "ARTIFY_RECORDS_PATH",
    "ARTIFY_CORS_ORIGINS",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_artify_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8000);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.storage_path, PathBuf::from("./.data"));
    assert!(config.model_path.is_none());
    assert!(!config.require_model);
    assert!(config.reference_images.is_none());
    assert_eq!(config.embedding_dim, 512);
    assert_eq!(config.max_image_bytes, 5_000_000);
    assert!(!config.normalize_embeddings);
    assert_eq!(config.scoring, ScoringConfig::default());
    assert_eq!(config.upload_url, "https://api.web3.storage/upload");
    assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8000");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_derived_paths_and_limits() {
    let config = Config {
        storage_path: PathBuf::from("/var/artify"),
        ..Default::default()
    };

    assert_eq!(config.content_root(), PathBuf::from("/var/artify/content"));
    assert_eq!(
        config.records_path(),
        PathBuf::from("/var/artify/records.jsonl")
    );
    assert_eq!(config.body_limit(), 5_000_000 + 64 * 1024);

    let config = Config {
        records_path: Some(PathBuf::from("/tmp/r.jsonl")),
        ..config
    };
    assert_eq!(config.records_path(), PathBuf::from("/tmp/r.jsonl"));
}

#[test]
fn test_extractor_config_mirrors_fields() {
    let config = Config {
        model_path: Some(PathBuf::from("/models/clip")),
        require_model: true,
        normalize_embeddings: true,
        max_image_bytes: 1024,
        ..Default::default()
    };

    let extractor = config.extractor_config();
    assert_eq!(extractor.model_path, Some(PathBuf::from("/models/clip")));
    assert!(extractor.require_model);
    assert!(extractor.normalize);
    assert_eq!(extractor.max_image_bytes, 1024);
    assert_eq!(extractor.embedding_dim, 512);
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_artify_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8000);
    assert_eq!(config.scoring.threshold, 0.85);
    assert_eq!(config.scoring.top_k, 2);
    assert!(config.signer_key.is_none());
}

#[test]
#[serial]
fn test_from_env_custom_port_and_addr() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_PORT", "3000"), ("ARTIFY_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse");
        assert_eq!(config.port, 3000);
        assert_eq!(
            config.bind_addr,
            IpAddr::V6(std::net::Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    });
}

#[test]
#[serial]
fn test_from_env_full() {
    clear_artify_env();

    with_env_vars(
        &[
            ("ARTIFY_STORAGE_PATH", "/mnt/artify"),
            ("ARTIFY_MODEL_PATH", "/models/clip-vit-base-patch32"),
            ("ARTIFY_REQUIRE_MODEL", "true"),
            ("ARTIFY_REFERENCE_IMAGES", "/refs/a.jpg, /refs/b.png,"),
            ("ARTIFY_REFERENCE_DIR", "/refs/more"),
            ("ARTIFY_NORMALIZE_EMBEDDINGS", "1"),
            ("ARTIFY_THRESHOLD", "0.9"),
            ("ARTIFY_TOP_K", "5"),
            ("ARTIFY_EMBEDDING_PREVIEW_LEN", "64"),
            ("ARTIFY_FALLBACK_SCORE_MIN", "40"),
            ("ARTIFY_FALLBACK_SCORE_MAX", "50"),
            ("ARTIFY_SIGNER_KEY", "  abcd  "),
            ("ARTIFY_WEB3STORAGE_TOKEN", "token"),
            ("ARTIFY_UPLOAD_URL", "http://uploads.local/upload"),
            ("ARTIFY_RECORDS_PATH", "/mnt/artify/db.jsonl"),
            (
                "ARTIFY_CORS_ORIGINS",
                "http://localhost:3000,https://artify.example",
            ),
        ],
        || {
            let config = Config::from_env().expect("should parse full config");

            assert_eq!(config.storage_path, PathBuf::from("/mnt/artify"));
            assert_eq!(
                config.model_path,
                Some(PathBuf::from("/models/clip-vit-base-patch32"))
            );
            assert!(config.require_model);
            assert_eq!(
                config.reference_images,
                Some(vec![PathBuf::from("/refs/a.jpg"), PathBuf::from("/refs/b.png")])
            );
            assert_eq!(config.reference_dir, Some(PathBuf::from("/refs/more")));
            assert!(config.normalize_embeddings);
            assert_eq!(config.scoring.threshold, 0.9);
            assert_eq!(config.scoring.top_k, 5);
            assert_eq!(config.scoring.embedding_preview_len, 64);
            assert_eq!(config.scoring.fallback_score_min, 40);
            assert_eq!(config.scoring.fallback_score_max, 50);
            assert_eq!(config.signer_key.as_deref(), Some("abcd"));
            assert_eq!(config.web3storage_token.as_deref(), Some("token"));
            assert_eq!(config.upload_url, "http://uploads.local/upload");
            assert_eq!(
                config.records_path(),
                PathBuf::from("/mnt/artify/db.jsonl")
            );
            assert_eq!(config.cors_origins.len(), 2);
        },
    );
}

#[test]
#[serial]
fn test_blank_values_are_unset() {
    clear_artify_env();

    with_env_vars(
        &[("ARTIFY_SIGNER_KEY", "   "), ("ARTIFY_CORS_ORIGINS", " , ")],
        || {
            let config = Config::from_env().expect("should parse");
            assert!(config.signer_key.is_none());
            assert_eq!(config.cors_origins, vec![DEFAULT_CORS_ORIGIN.to_string()]);
        },
    );
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_threshold_names_variable() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_THRESHOLD", "high")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "ARTIFY_THRESHOLD",
                ..
            }
        ));
        assert!(err.to_string().contains("high"));
    });
}

#[test]
#[serial]
fn test_invalid_bool() {
    clear_artify_env();

    with_env_vars(&[("ARTIFY_REQUIRE_MODEL", "maybe")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
    });
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_missing_model_is_allowed() {
    let config = Config {
        model_path: Some(PathBuf::from("/nonexistent/model.safetensors")),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_require_model_without_path() {
    let config = Config {
        require_model: true,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingEnvVar {
            name: "ARTIFY_MODEL_PATH"
        })
    ));
}

#[test]
fn test_validate_storage_path_is_file() {
    let config = Config {
        storage_path: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml"),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_explicit_reference_images() {
    let missing = Config {
        reference_images: Some(vec![PathBuf::from("/nonexistent/ref.jpg")]),
        ..Default::default()
    };
    assert!(matches!(
        missing.validate(),
        Err(ConfigError::PathNotFound { .. })
    ));

    let directory = Config {
        reference_images: Some(vec![PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src")]),
        ..Default::default()
    };
    assert!(matches!(
        directory.validate(),
        Err(ConfigError::NotAFile { .. })
    ));
}

#[test]
fn test_validate_reference_dir_is_file() {
    let config = Config {
        reference_dir: Some(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_scoring() {
    let config = Config {
        scoring: ScoringConfig::default().with_top_k(0),
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Scoring(_))));
}

#[test]
fn test_reference_sources_order() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("explicit.jpg");
    std::fs::write(&explicit, b"x").unwrap();
    let refs = dir.path().join("refs");
    std::fs::create_dir(&refs).unwrap();
    std::fs::write(refs.join("b.png"), b"x").unwrap();
    std::fs::write(refs.join("a.webp"), b"x").unwrap();

    let config = Config {
        reference_images: Some(vec![explicit.clone()]),
        reference_dir: Some(refs.clone()),
        ..Default::default()
    };

    assert_eq!(
        config.reference_sources().unwrap(),
        vec![
            ReferenceSource::Path(explicit),
            ReferenceSource::Path(refs.join("a.webp")),
            ReferenceSource::Path(refs.join("b.png")),
        ]
    );
}

#[test]
fn test_default_reference_images_skipped_when_absent() {
    let config = Config::default();
    let sources = config.reference_sources().unwrap();
    assert!(sources.iter().all(|source| match source {
        ReferenceSource::Path(path) => path.is_file(),
        ReferenceSource::Bytes { .. } => false,
    }));
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/some/path"),
    };
    assert!(err.to_string().contains("/some/path"));

    let err = ConfigError::MissingEnvVar {
        name: "ARTIFY_MODEL_PATH",
    };
    assert!(err.to_string().contains("ARTIFY_MODEL_PATH"));
}
