use httpmock::prelude::*;
use std::path::Path;
use tempfile::TempDir;
use vitibrasil_etl::parsers::{parse_bilateral_csv, parse_item_csv, parse_item_table};
use vitibrasil_etl::{
    Dataset, DatasetRequest, EtlEngine, EtlError, ExportCategory, ProcessingCategory, Records,
    SourceResolver, TomlConfig,
};

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn config_for(server: &MockServer, data_dir: &Path) -> TomlConfig {
    let toml_content = format!(
        "[source]\nbase_url = \"{}\"\ntimeout_seconds = 2\n\n[fallback]\ndata_dir = \"{}\"\n",
        server.url("/index.php"),
        data_dir.display()
    );
    TomlConfig::from_toml_str(&toml_content).unwrap()
}

fn copy_fixture(name: &str, dir: &TempDir) {
    std::fs::copy(fixture_path(name), dir.path().join(name)).unwrap();
}

#[tokio::test]
async fn test_scraped_page_is_used_when_site_responds() {
    let server = MockServer::start();
    let html = std::fs::read_to_string(fixture_path("general_parser_item_subitem.html")).unwrap();

    let page_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/index.php")
            .query_param("opcao", "opt_02")
            .query_param("ano", "2023");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(html.clone());
    });

    // 空目錄：若走了 CSV 就會失敗
    let data_dir = TempDir::new().unwrap();
    let resolver = SourceResolver::from_config(&config_for(&server, data_dir.path())).unwrap();

    let records = resolver.production_data(2023).await.unwrap();

    page_mock.assert();
    let expected = parse_item_table(&html, 2023, &Dataset::Production.metadata()).unwrap();
    assert_eq!(records, expected);
    assert_eq!(records[0].sub_items.len(), 2);
}

#[tokio::test]
async fn test_server_error_falls_back_to_item_csv() {
    let server = MockServer::start();
    let page_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/index.php")
            .query_param("subopcao", "subopt_03")
            .query_param("opcao", "opt_03");
        then.status(500);
    });

    let data_dir = TempDir::new().unwrap();
    copy_fixture("processamento-uva-de-mesa.csv", &data_dir);
    let resolver = SourceResolver::from_config(&config_for(&server, data_dir.path())).unwrap();

    let records = resolver
        .processing_data(2023, ProcessingCategory::UvaDeMesa)
        .await
        .unwrap();

    page_mock.assert();
    let dataset = Dataset::Processing(ProcessingCategory::UvaDeMesa);
    let data = std::fs::read(fixture_path("processamento-uva-de-mesa.csv")).unwrap();
    let expected =
        parse_item_csv(&data, 2023, "cultivar", dataset.csv_delimiter(), &dataset.metadata()).unwrap();
    assert_eq!(records, expected);
    assert_eq!(records[0].item, "TINTAS");
}

#[tokio::test]
async fn test_unreachable_site_falls_back_to_bilateral_csv() {
    // 沒有任何 mock，伺服器回 404
    let server = MockServer::start();

    let data_dir = TempDir::new().unwrap();
    copy_fixture("exportacao-vinhos-de-mesa.csv", &data_dir);
    let resolver = SourceResolver::from_config(&config_for(&server, data_dir.path())).unwrap();

    let records = resolver
        .export_data(2023, ExportCategory::VinhosDeMesa)
        .await
        .unwrap();

    let dataset = Dataset::Export(ExportCategory::VinhosDeMesa);
    let data = std::fs::read(fixture_path("exportacao-vinhos-de-mesa.csv")).unwrap();
    let expected = parse_bilateral_csv(&data, 2023, b'\t', &dataset.metadata()).unwrap();
    assert_eq!(records, expected);
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].amount, 1783);
    assert_eq!(
        records[1].metadata.get("category"),
        Some(&serde_json::json!("vinhos-de-mesa"))
    );
}

#[tokio::test]
async fn test_missing_fallback_file_surfaces_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/index.php");
        then.status(503);
    });

    let data_dir = TempDir::new().unwrap();
    let resolver = SourceResolver::from_config(&config_for(&server, data_dir.path())).unwrap();

    let err = resolver.commercialization_data(2022).await.unwrap_err();

    match err {
        EtlError::FallbackFileError { path, .. } => assert!(path.ends_with("comercializacao.csv")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_engine_run_returns_tagged_records() {
    let server = MockServer::start();
    let html = std::fs::read_to_string(fixture_path("import_export_table.html")).unwrap();
    server.mock(|when, then| {
        when.method(GET)
            .path("/index.php")
            .query_param("subopcao", "subopt_01")
            .query_param("opcao", "opt_06")
            .query_param("ano", "2023");
        then.status(200).body(html.clone());
    });

    let data_dir = TempDir::new().unwrap();
    let resolver = SourceResolver::from_config(&config_for(&server, data_dir.path())).unwrap();
    let engine = EtlEngine::new(resolver);

    let request = DatasetRequest::new(Dataset::Export(ExportCategory::VinhosDeMesa), 2023);
    let records = engine.run(&request).await.unwrap();

    match &records {
        Records::Bilateral(rows) => {
            assert_eq!(rows.len(), 3);
            assert_eq!(rows[2].country, "Alemanha, República Democrática");
        }
        other => panic!("unexpected records: {other:?}"),
    }

    let value = serde_json::to_value(&records).unwrap();
    assert_eq!(value[0]["category"], serde_json::json!("vinhos-de-mesa"));
    assert_eq!(value[1]["quantity"], serde_json::json!(103));
}
