use goldrate::core::config::{API_KEY_ENV, AppConfig};
use goldrate::core::{DocumentKey, RateError, SnapshotStore};
use goldrate::store::MemoryStore;
use goldrate::{App, AppCommand};
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(status: u16, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/latest"))
            .and(query_param("base", "INR"))
            .and(query_param("currencies", "XAU"))
            .respond_with(ResponseTemplate::new(status).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn config_for(dir: &TempDir, base_url: &str, api_key: Option<&str>) -> AppConfig {
    let api_key_line = api_key
        .map(|key| format!("  api_key: \"{key}\"\n"))
        .unwrap_or_default();
    let config_content = format!(
        r#"
provider:
  base_url: "{base_url}/v1"
{api_key_line}  timeout_secs: 5
snapshot:
  collection: "goldRates"
  document: "india"
data_path: "{}"
"#,
        dir.path().join("data").display()
    );

    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, config_content).expect("Failed to write config file");
    AppConfig::load_from_path(&config_path).expect("Failed to load config file")
}

fn india() -> DocumentKey {
    DocumentKey::new("goldRates", "india")
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[test_log::test(tokio::test)]
async fn test_full_run_with_mock_provider() {
    let mock_server =
        test_utils::create_mock_server(200, r#"{"success": true, "rates": {"XAU": 0.00035}}"#)
            .await;
    let dir = TempDir::new().unwrap();
    let app = App::new(config_for(&dir, &mock_server.uri(), Some("integration-key"))).unwrap();

    app.execute(AppCommand::Run).await.unwrap();

    let snapshot = app
        .store()
        .get(&india())
        .await
        .unwrap()
        .expect("snapshot should be stored");
    assert_eq!(snapshot.rates.gold_24k, dec("91.86"));
    assert_eq!(snapshot.rates.gold_22k, dec("84.14"));
    assert_eq!(snapshot.rates.gold_18k, dec("68.89"));
    assert_eq!(snapshot.rates.gold_14k, dec("53.74"));
    assert_eq!(snapshot.unit, "INR/gram");
    assert_eq!(snapshot.source, "metalpriceapi");

    app.execute(AppCommand::Show).await.unwrap();
    app.execute(AppCommand::Next(3)).await.unwrap();
}

#[test_log::test(tokio::test)]
async fn test_run_command_from_config_file() {
    let mock_server =
        test_utils::create_mock_server(200, r#"{"rates": {"XAU": 0.00035}}"#).await;
    let dir = TempDir::new().unwrap();
    config_for(&dir, &mock_server.uri(), Some("integration-key"));
    let config_path = dir.path().join("config.yaml");

    let result = goldrate::run_command(AppCommand::Run, Some(config_path.to_str().unwrap())).await;
    assert!(result.is_ok(), "Run failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_failed_runs_keep_prior_snapshot() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());

    let good_server =
        test_utils::create_mock_server(200, r#"{"rates": {"XAU": 0.00035}}"#).await;
    let app = App::with_store(
        config_for(&dir, &good_server.uri(), Some("integration-key")),
        store.clone(),
    );
    let prior = app.job().unwrap().execute().await.unwrap();

    let cases = [
        (200, r#"{"rates": {"XAG": 0.03}}"#, "InvalidResponseShape"),
        (200, r#"{"rates": {"XAU": 0}}"#, "InvalidRate"),
        (200, r#"{"rates": {"XAU": -0.00035}}"#, "InvalidRate"),
        (500, "", "UpstreamUnavailable"),
    ];
    for (status, body, expected_kind) in cases {
        let server = test_utils::create_mock_server(status, body).await;
        let app = App::with_store(
            config_for(&dir, &server.uri(), Some("integration-key")),
            store.clone(),
        );
        let job = app.job().unwrap();

        let err = job.execute().await.unwrap_err();
        assert_eq!(err.kind(), expected_kind, "{body}: {err}");
        assert!(job.run().await.is_none());
        assert_eq!(store.get(&india()).await.unwrap(), Some(prior.clone()));
    }
}

#[test_log::test(tokio::test)]
async fn test_unreachable_provider() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let app = App::with_store(
        config_for(&dir, "http://127.0.0.1:9", Some("integration-key")),
        store.clone(),
    );

    let err = app.job().unwrap().execute().await.unwrap_err();
    assert!(matches!(err, RateError::UpstreamUnavailable(_)));
    assert!(store.get(&india()).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_missing_api_key_is_configuration_error() {
    if std::env::var(API_KEY_ENV).is_ok() {
        return;
    }
    let mock_server =
        test_utils::create_mock_server(200, r#"{"rates": {"XAU": 0.00035}}"#).await;
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
    let app = App::with_store(config_for(&dir, &mock_server.uri(), None), store.clone());

    let err = app.execute(AppCommand::Run).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RateError>(),
        Some(RateError::Configuration(_))
    ));
    assert!(store.get(&india()).await.unwrap().is_none());
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
