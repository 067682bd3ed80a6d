use anyhow::Result;
use page_capture::utils::logging;
use page_capture::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_args();

    // 初始化日志
    logging::init(config.production);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
