//! Route command - resolve an identifier against a routing config

use anyhow::Result;
use caipgate_lib::config::{GatewayConfig, RouteConfig};
use caipgate_lib::routing::{AdapterRouter, RouterBuilder};
use caipgate_lib::Identifier;
use std::path::Path;

use crate::ui;

/// Load the config from `path`, or from `CAIPGATE_CONFIG` when absent.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let config = match path {
        Some(path) => {
            GatewayConfig::from_file(path)?.with_env_overrides(|key| std::env::var(key).ok())
        }
        None => GatewayConfig::from_env()?,
    };
    Ok(config)
}

/// Route table over the config's routes.
pub fn build_router(config: &GatewayConfig) -> Result<AdapterRouter<RouteConfig>> {
    let mut builder = RouterBuilder::new();
    for route in &config.routes {
        builder.add_route(&route.path, route.wildcard, route.clone())?;
    }
    Ok(builder.build())
}

pub async fn resolve(config_path: Option<&Path>, identifier: &str, verbose: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let router = build_router(&config)?;

    if verbose {
        ui::header("Routes");
        if config.routes.is_empty() {
            ui::info("No routes configured");
        }
        for (path, wildcard) in router.paths() {
            ui::key_value(&path, if wildcard { "wildcard" } else { "exact" });
        }
    }

    let id = Identifier::parse_with(identifier, &config.validation_options())?;
    let chain = id.chain_id_string()?;
    tracing::debug!(%chain, "resolving route");
    let route = router.resolve(&chain)?;

    ui::header("Resolved");
    ui::key_value("Chain", &chain);
    ui::key_value("Route", &route.path);
    ui::key_value("Adapter", &route.adapter);
    ui::key_value("Node", &config.node_for(route).base_url);
    Ok(())
}
