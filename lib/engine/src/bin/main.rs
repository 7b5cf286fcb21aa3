use engine::engine::EscampeEngine;
use engine::search::SearchConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // 日志写到 stderr，stdout 只留给协议
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    EscampeEngine::new(SearchConfig::default())?.start()
}
