use mcp_gateway::catalog::Catalog;
use mcp_gateway::config::GatewayConfig;
use mcp_gateway::dispatch::Dispatcher;
use mcp_gateway::registry::ToolRegistry;
use mcp_gateway::server::GatewayServer;
use mcp_gateway::session::SessionManager;
use mcp_gateway::{logging, plugins};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::load()?;
    logging::init_logging(&config.server.log_level, config.server.log_json)?;

    let catalog = Arc::new(Catalog::builtin());
    let mut registry = ToolRegistry::new();
    let loaded = plugins::load_builtin(&mut registry, &config, &catalog);
    info!(
        plugins = loaded,
        tools = registry.len(),
        "Plugin loading complete"
    );

    let sessions = Arc::new(SessionManager::new(config.session.clone()));
    let _sweeper = sessions.spawn_sweeper();

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(registry),
        sessions,
        catalog,
        config.invoke.max_concurrent,
    ));

    let server = GatewayServer::new(dispatcher, config.stream.clone());
    server.serve(&config.server.bind_addr).await?;

    Ok(())
}
