//! Integration tests for session artifact reuse

use gramscope::session::{SessionError, SessionManager};

fn artifact_json(schema_version: &str) -> String {
    format!(
        r#"{{
  "schema_version": "{schema_version}",
  "username": "archivist",
  "user_agent": "test-agent/1.0",
  "csrf_token": "csrf-abc",
  "session_token": "sess-xyz",
  "created_at": 1750000000,
  "updated_at": 1750000000
}}"#
    )
}

#[tokio::test]
async fn test_existing_artifact_is_reused_without_network() {
    let dir = tempfile::tempdir().unwrap();
    // Unroutable origin: any network attempt would fail loudly.
    let manager = SessionManager::new(dir.path()).with_base_url("http://127.0.0.1:9");

    std::fs::write(manager.artifact_path("archivist"), artifact_json("1.0.0")).unwrap();

    let session = manager
        .acquire(Some("archivist"), Some("ignored-password"))
        .await
        .unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.username.as_deref(), Some("archivist"));
    assert_eq!(session.user_agent, "test-agent/1.0");
    assert_eq!(session.session_token.as_deref(), Some("sess-xyz"));
}

#[tokio::test]
async fn test_schema_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(dir.path()).with_base_url("http://127.0.0.1:9");

    std::fs::write(manager.artifact_path("archivist"), artifact_json("9.9.9")).unwrap();

    let err = manager
        .acquire(Some("archivist"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::SchemaVersionMismatch { .. }));
}

#[tokio::test]
async fn test_corrupt_artifact_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(dir.path()).with_base_url("http://127.0.0.1:9");

    std::fs::write(manager.artifact_path("archivist"), "{not json").unwrap();

    let err = manager
        .acquire(Some("archivist"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Corrupt(_)));
}

#[tokio::test]
async fn test_no_credentials_yields_anonymous_session() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(dir.path()).with_base_url("http://127.0.0.1:9");

    let session = manager.acquire(None, None).await.unwrap();
    assert!(!session.is_authenticated());
    assert!(session.username.is_none());
}

#[tokio::test]
async fn test_username_without_password_or_artifact_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    let manager = SessionManager::new(dir.path()).with_base_url("http://127.0.0.1:9");

    let session = manager.acquire(Some("archivist"), None).await.unwrap();
    assert!(!session.is_authenticated());
}
