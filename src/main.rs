use anyhow::Context;
use clap::Parser;
use vitibrasil_etl::config::toml_config::TomlConfig;
use vitibrasil_etl::core::ConfigProvider;
use vitibrasil_etl::domain::dataset::RecordForm;
use vitibrasil_etl::utils::error::ErrorSeverity;
use vitibrasil_etl::utils::{logger, validation::Validate};
use vitibrasil_etl::{
    CliConfig, Dataset, DatasetRequest, EtlEngine, EtlError, Records, SourceResolver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置 (TOML + 命令列覆蓋)
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(&config.logging.level, config.logging.verbose);
    } else {
        logger::init_cli_logger(&config.logging.level, config.logging.verbose);
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = cli.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let Some(request) = cli.command.request() else {
        list_datasets(&config)?;
        return Ok(());
    };

    if cli.dry_run {
        perform_dry_run(&config, &request)?;
        return Ok(());
    }

    let resolver = match SourceResolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => exit_with(e),
    };
    let engine = EtlEngine::new(resolver);

    let records = match engine.run(&request).await {
        Ok(records) => records,
        Err(e) => exit_with(e),
    };

    write_output(&records, cli.output.as_deref(), cli.pretty)
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 依嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn write_output(records: &Records, output: Option<&str>, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path))?;
            tracing::info!("📁 Output saved to: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn list_datasets(config: &TomlConfig) -> anyhow::Result<()> {
    let base_url = url::Url::parse(config.base_url()).context("parsing source.base_url")?;

    println!("📋 Datasets:");
    for dataset in Dataset::all() {
        let (min, max) = dataset.year_range();
        println!("  {}", dataset);
        println!("    Years: {}-{} (default {})", min, max, dataset.default_year());
        println!("    Page: {}", dataset.url(&base_url, dataset.default_year()));
        println!(
            "    CSV: {} (delimiter {:?})",
            dataset.csv_file(),
            dataset.csv_delimiter() as char
        );
        match dataset.form() {
            RecordForm::Item { key_column } => println!("    Form: item (key column {})", key_column),
            RecordForm::Bilateral => println!("    Form: bilateral"),
        }
    }
    Ok(())
}

fn perform_dry_run(config: &TomlConfig, request: &DatasetRequest) -> anyhow::Result<()> {
    let base_url = url::Url::parse(config.base_url()).context("parsing source.base_url")?;
    let fallback = std::path::Path::new(config.data_dir()).join(request.dataset.csv_file());

    println!("🔍 Dry Run Analysis:");
    println!("  Dataset: {} ({})", request.dataset, request.year);
    println!("  Page: {}", request.dataset.url(&base_url, request.year));
    println!("  Timeout: {:?}", config.timeout());
    println!(
        "  Fallback: {} (delimiter {:?}, exists: {})",
        fallback.display(),
        request.dataset.csv_delimiter() as char,
        fallback.exists()
    );
    Ok(())
}
