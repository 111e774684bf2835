use clap::Parser;
use harbor_provider::config::{Command, LogFormat};
use harbor_provider::utils::error::ErrorSeverity;
use harbor_provider::utils::logger;
use harbor_provider::{CliConfig, HarborConfig, PluginServer, Provider, ProviderError, TomlConfig};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 載入設定檔（若有指定）
    let file_config = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => TomlConfig::default(),
    };

    // 初始化日誌，CLI 參數優先於設定檔
    let log_format = cli
        .log_format
        .or(file_config.log_format())
        .unwrap_or_default();
    match log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose, file_config.log_level()),
        LogFormat::Json => logger::init_json_logger(cli.verbose, file_config.log_level()),
    }

    tracing::info!("Starting harbor-provider {}", env!("CARGO_PKG_VERSION"));
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let base_config = HarborConfig::from_env().merge(file_config.harbor.clone());
    let mut provider = Provider::new(base_config);

    let outcome = match cli.command {
        Command::Serve => {
            let mut server = PluginServer::new(provider);
            server
                .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                .await
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&provider.schema())?);
            Ok(())
        }
        Command::Read { type_name, input } => read_once(&mut provider, &type_name, &input).await,
    };

    if let Err(e) = outcome {
        report_and_exit(e);
    }

    Ok(())
}

/// 單次讀取 data source，方便在沒有 host 的情況下除錯
async fn read_once(provider: &mut Provider, type_name: &str, input: &str) -> harbor_provider::Result<()> {
    let config: serde_json::Value = serde_json::from_str(input)?;

    for warning in provider.configure(&serde_json::Value::Null)? {
        tracing::warn!("⚠️ {}", warning.summary);
    }

    let state = provider.read_data_source(type_name, &config).await?;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

fn report_and_exit(e: ProviderError) -> ! {
    tracing::error!(
        "❌ harbor-provider failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 輸入、設定或查無資料
        ErrorSeverity::Critical => 3, // 系統錯誤
    };

    std::process::exit(exit_code)
}
