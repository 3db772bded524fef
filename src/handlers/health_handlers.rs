//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks DB connectivity and blob-dir I/O

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tokio::fs;
use uuid::Uuid;

#[derive(Serialize)]
struct CheckStatus {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    sqlite: CheckStatus,
    disk: CheckStatus,
}

/// `GET /healthz`
///
/// Liveness probe - always 200, never performs I/O.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /readyz`
///
/// Readiness probe: a `SELECT 1` against SQLite plus a write/read/delete
/// round trip under the blob storage dir. 200 when both pass, 503 otherwise.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let sqlite = sqlite_check(&state).await;
    let disk = disk_check(&state).await;

    let ok = sqlite.ok && disk.ok;
    let body = ReadyResponse {
        status: if ok { "ok" } else { "error" },
        sqlite,
        disk,
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

async fn sqlite_check(state: &AppState) -> CheckStatus {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&*state.db)
        .await
    {
        Ok(1) => CheckStatus {
            ok: true,
            error: None,
        },
        Ok(v) => CheckStatus {
            ok: false,
            error: Some(format!("unexpected result: {}", v)),
        },
        Err(e) => CheckStatus {
            ok: false,
            error: Some(e.to_string()),
        },
    }
}

async fn disk_check(state: &AppState) -> CheckStatus {
    let tmp_path = state
        .storage_dir
        .join(format!(".readyz-{}", Uuid::new_v4()));

    let outcome = async {
        fs::write(&tmp_path, b"readyz").await?;
        let bytes = fs::read(&tmp_path).await?;
        fs::remove_file(&tmp_path).await?;
        if bytes == b"readyz" {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "file content mismatch",
            ))
        }
    }
    .await;

    match outcome {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => {
            let _ = fs::remove_file(&tmp_path).await;
            CheckStatus {
                ok: false,
                error: Some(e.to_string()),
            }
        }
    }
}
