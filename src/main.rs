use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use webnovel_client::app::{error_report, App, Command};
use webnovel_client::{logger, Config};

/// 网络小说平台命令行客户端
#[derive(Parser)]
#[command(name = "webnovel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML 配置文件，环境变量会覆盖其中的值
    #[arg(long, short, env = "WEBNOVEL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// 显示详细日志
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let report = error_report(&err);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("{:#}", err),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 加载配置
    let config = Config::load(cli.config.as_deref())?;

    // 初始化日志
    logger::init(cli.verbose || config.verbose_logging);

    let app = App::initialize(config)?;
    let output = app.run(cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
