//! Built-in tool plugins and the manifest that loads them.
//!
//! Plugins are an explicit, fixed manifest rather than a scanned
//! directory: each module exposes a pure `register` function called once
//! at startup. The manifest is iterated in lexical name order, so tool
//! id assignment is deterministic and stable across restarts for an
//! unchanged plugin set.

pub mod calculator;
pub mod company;
pub mod echo;
pub mod file_search;
pub mod openai_chat;
pub mod weather;

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::ToolRegistry;
use std::sync::Arc;
use tracing::{info, warn};

type RegisterFn = fn(&mut ToolRegistry, &GatewayConfig, &Arc<Catalog>) -> Result<()>;

/// Lexical order; ids depend on it.
const MANIFEST: &[(&str, RegisterFn)] = &[
    ("calculator", calculator::register),
    ("company", company::register),
    ("echo", echo::register),
    ("file_search", file_search::register),
    ("openai_chat", openai_chat::register),
    ("weather", weather::register),
];

/// Run every manifest entry, skipping disabled plugins and logging (not
/// propagating) registration failures. Returns how many plugins loaded.
pub fn load_builtin(
    registry: &mut ToolRegistry,
    config: &GatewayConfig,
    catalog: &Arc<Catalog>,
) -> usize {
    load_manifest(MANIFEST, registry, config, catalog)
}

fn load_manifest(
    manifest: &[(&str, RegisterFn)],
    registry: &mut ToolRegistry,
    config: &GatewayConfig,
    catalog: &Arc<Catalog>,
) -> usize {
    let mut loaded = 0;
    for (name, register) in manifest {
        if config.plugins.disabled.iter().any(|d| d == name) {
            info!(plugin = name, "Plugin disabled by configuration");
            continue;
        }
        match register(registry, config, catalog) {
            Ok(()) => {
                info!(plugin = name, "Loaded plugin");
                loaded += 1;
            }
            Err(e) => {
                warn!(plugin = name, error = %e, "Skipping plugin that failed to load");
            }
        }
    }
    loaded
}
