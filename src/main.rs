use clap::Parser;
use elegance::config::{Cli, Commands};
use elegance::core::ConfigProvider;
use elegance::utils::error::EleganceError;
use elegance::utils::{logger, validation::Validate};
use elegance::{Controller, LocalFrameStore, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.monitoring.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting elegance");

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }
    if config.monitoring.enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    if let Err(e) = execute(&cli.command, config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn execute(command: &Commands, config: TomlConfig) -> Result<(), EleganceError> {
    if *command == Commands::ShowConfig {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let store = LocalFrameStore::new(config.data_root());
    tracing::info!("📁 Data root: {}", store.root().display());
    let controller = Controller::new(store, config);

    match command {
        Commands::Generate => {
            let report = controller.generate().await?;
            println!("✅ Generated {} raw frames", report.frames);
            println!("📁 Ground truth saved to: {}", report.ground_truth.display());
        }
        Commands::Prerender { only } => {
            let reports = match only {
                Some(kind) => vec![controller.prerender(*kind).await?],
                None => controller.prerender_all().await?,
            };
            for report in reports {
                println!(
                    "✅ {}: {} frames ({:.2} fps)",
                    report.kind, report.frames_rendered, report.fps
                );
            }
        }
        Commands::Heatmap => {
            let report = controller.build_heatmaps().await?;
            println!(
                "✅ Heat maps built from {} points ({} frames rendered)",
                report.summary.total_points, report.frames_rendered
            );
            for path in report.outputs {
                println!("📁 {}", path.display());
            }
        }
        Commands::Animate { output } => {
            let path = match output {
                Some(output) => controller.animate_to(output).await?,
                None => controller.animate().await?,
            };
            println!("✅ Animation saved to: {}", path.display());
        }
        Commands::Run => {
            let summary = controller.run_all().await?;
            for report in &summary.passes {
                println!(
                    "✅ {}: {} frames ({:.2} fps)",
                    report.kind, report.frames_rendered, report.fps
                );
            }
            println!(
                "✅ Heat maps built from {} points",
                summary.heatmap.summary.total_points
            );
            println!("📁 Animation saved to: {}", summary.animation.display());
        }
        Commands::ShowConfig => {}
    }

    Ok(())
}
