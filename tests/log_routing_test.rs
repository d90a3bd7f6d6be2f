use anyhow::Result;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use small_calc::utils::logger::{self, LogLevels};
use small_calc::{AppState, MemoryStore, OperationArchive};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

// 全域 subscriber 只能安裝一次，所以此檔案只放一個測試

fn read_log(dir: &Path, file_name: &str) -> Result<String> {
    Ok(std::fs::read_to_string(dir.join(file_name))?)
}

#[tokio::test]
async fn test_raised_levels_reach_log_files() -> Result<()> {
    let temp_dir = tempdir()?;
    let log_dir = temp_dir.path().to_string_lossy().to_string();

    let levels = LogLevels::new();
    logger::init_service_logger(&log_dir, false, &levels)?;

    let archive = OperationArchive::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()));
    let state = AppState::new(archive, levels.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let base_url = format!("http://{}", listener.local_addr()?);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async {
            let _ = shutdown_rx.await;
        };
        let _ = small_calc::app::serve(listener, state, shutdown).await;
    });

    let client = Client::new();
    let size_url = format!("{}/calculator/stack/size", base_url);
    let level_url = format!("{}/logs/level", base_url);

    // #1: stack-logger 仍在 INFO
    client.get(&size_url).send().await?;

    // #2
    let response = client
        .put(&level_url)
        .query(&[("logger-name", "stack-logger"), ("logger-level", "DEBUG")])
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await?, json!("DEBUG"));

    // #3: 同一個 callsite，這次應該寫出 DEBUG
    client.get(&size_url).send().await?;

    let stack_log = read_log(temp_dir.path(), "stack.log")?;
    assert!(stack_log.contains("INFO: Stack size is 0 | request #1"));
    assert!(stack_log.contains("DEBUG: Stack content (first == top): [] | request #3"));
    assert!(!stack_log.contains("DEBUG: Stack content (first == top): [] | request #1"));

    // #4
    client
        .put(&level_url)
        .query(&[("logger-name", "request-logger"), ("logger-level", "debug")])
        .send()
        .await?;

    // #5: 中介層的耗時紀錄在第一個請求時就已經跑過
    client.get(format!("{}/calculator/health", base_url)).send().await?;

    let request_log = read_log(temp_dir.path(), "requests.log")?;
    assert!(request_log.contains("Incoming request | #1 | resource: /calculator/stack/size"));
    assert!(!request_log.contains("request #1 duration"));
    assert!(request_log.contains("request #5 duration"));

    // 降低等級同樣立即生效
    levels.set("stack-logger", "ERROR");
    client.get(&size_url).send().await?;
    let stack_log = read_log(temp_dir.path(), "stack.log")?;
    assert!(!stack_log.contains("request #6"));

    let _ = shutdown_tx.send(());
    Ok(())
}
