use axum::Router;
use axum::extract::Multipart;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::hashing::content_id;

async fn spawn_upload_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/upload")
}

mod local_tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_artifact_and_report() {
        let dir = TempDir::new().unwrap();
        let store = LocalContentStore::new(dir.path());

        let cid = store
            .put("art.png", b"png-bytes".to_vec(), b"{\"score\":82}".to_vec())
            .await
            .unwrap();

        assert_eq!(cid, content_id(b"png-bytes", b"{\"score\":82}"));
        let stored = dir.path().join(&cid);
        assert_eq!(std::fs::read(stored.join("art.png")).unwrap(), b"png-bytes");
        assert_eq!(
            std::fs::read(stored.join("report.json")).unwrap(),
            b"{\"score\":82}"
        );
    }

    #[tokio::test]
    async fn test_identical_uploads_share_identifier() {
        let dir = TempDir::new().unwrap();
        let store = LocalContentStore::new(dir.path());

        let a = store.put("a.png", vec![1, 2], vec![3]).await.unwrap();
        let b = store.put("a.png", vec![1, 2], vec![3]).await.unwrap();
        let c = store.put("a.png", vec![1, 2], vec![4]).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn test_filename_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let store = LocalContentStore::new(dir.path());

        let cid = store
            .put("../../etc/evil.png", vec![9], vec![0])
            .await
            .unwrap();

        assert!(dir.path().join(&cid).join("evil.png").exists());
    }

    #[tokio::test]
    async fn test_report_filename_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let store = LocalContentStore::new(dir.path());

        let cid = store.put("report.json", vec![7], vec![8]).await.unwrap();

        let stored = dir.path().join(&cid);
        assert_eq!(std::fs::read(stored.join("upload.bin")).unwrap(), vec![7]);
        assert_eq!(std::fs::read(stored.join("report.json")).unwrap(), vec![8]);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let store = LocalContentStore::new(&blocker);

        assert!(matches!(
            store.put("a.png", vec![1], vec![2]).await,
            Err(UploadError::Io { .. })
        ));
    }
}

mod web3_tests {
    use super::*;

    async fn accept(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, axum::Json<serde_json::Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if auth != "Bearer test-token" {
            return (StatusCode::UNAUTHORIZED, axum::Json(json!({"message": "bad token"})));
        }

        let mut names = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            names.push(field.file_name().unwrap_or_default().to_string());
        }
        assert_eq!(names, vec!["art.png", "report.json"]);

        (StatusCode::OK, axum::Json(json!({"cid": "bafytestcid"})))
    }

    #[tokio::test]
    async fn test_upload_returns_cid() {
        let url = spawn_upload_server(Router::new().route("/upload", post(accept))).await;
        let store = Web3StorageStore::new(url, "test-token");

        let cid = store
            .put("art.png", vec![1, 2, 3], b"{}".to_vec())
            .await
            .unwrap();
        assert_eq!(cid, "bafytestcid");
    }

    #[tokio::test]
    async fn test_rejected_upload_is_error() {
        let url = spawn_upload_server(Router::new().route("/upload", post(accept))).await;
        let store = Web3StorageStore::new(url, "wrong-token");

        let err = store.put("art.png", vec![1], vec![2]).await.unwrap_err();
        match err {
            UploadError::UploadFailed { reason } => assert!(reason.contains("401")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_cid_is_error() {
        let app = Router::new().route("/upload", post(|| async { axum::Json(json!({"ok": true})) }));
        let url = spawn_upload_server(app).await;
        let store = Web3StorageStore::new(url, "test-token");

        assert!(matches!(
            store.put("art.png", vec![1], vec![2]).await,
            Err(UploadError::UploadFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_is_error() {
        let store = Web3StorageStore::new("http://127.0.0.1:9/upload", "test-token");
        assert!(store.put("art.png", vec![1], vec![2]).await.is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = Web3StorageStore::new(DEFAULT_UPLOAD_URL, "secret-token");
        assert!(!format!("{store:?}").contains("secret-token"));
    }
}

mod selection_tests {
    use super::*;

    #[test]
    fn test_placeholder_tokens() {
        assert!(is_placeholder_token(None));
        assert!(is_placeholder_token(Some("")));
        assert!(is_placeholder_token(Some("   ")));
        assert!(is_placeholder_token(Some("your_web3storage_token")));
        assert!(is_placeholder_token(Some("YOUR_TOKEN")));
        assert!(!is_placeholder_token(Some("eyJhbGciOi")));
    }

    #[test]
    fn test_store_from_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            store_from_config(None, DEFAULT_UPLOAD_URL, dir.path()).name(),
            "local"
        );
        assert_eq!(
            store_from_config(Some("your_token"), DEFAULT_UPLOAD_URL, dir.path()).name(),
            "local"
        );
        assert_eq!(
            store_from_config(Some("real"), DEFAULT_UPLOAD_URL, dir.path()).name(),
            "web3.storage"
        );
    }
}
