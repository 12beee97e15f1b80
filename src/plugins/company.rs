//! The `company.search` tool: lookup over a static sample company dataset.

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

struct Company {
    id: u32,
    name: &'static str,
    industry: &'static str,
    employees: u32,
}

const COMPANIES: &[Company] = &[
    Company {
        id: 1,
        name: "Acme Corp",
        industry: "Manufacturing",
        employees: 250,
    },
    Company {
        id: 2,
        name: "Globex Inc",
        industry: "Technology",
        employees: 500,
    },
    Company {
        id: 3,
        name: "Soylent Corp",
        industry: "Food",
        employees: 300,
    },
];

pub fn register(
    registry: &mut ToolRegistry,
    _config: &GatewayConfig,
    _catalog: &Arc<Catalog>,
) -> Result<()> {
    registry.register(
        "company.search",
        "Search the sample company database",
        vec![ToolParam::required(
            "query",
            ParamType::String,
            "Name or industry",
        )],
        Arc::new(CompanySearchHandler),
    )?;
    Ok(())
}

struct CompanySearchHandler;

#[async_trait]
impl ToolHandler for CompanySearchHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        let term = args["query"].as_str().unwrap_or_default().to_lowercase();
        let results: Vec<Value> = COMPANIES
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&term)
                    || c.industry.to_lowercase().contains(&term)
            })
            .map(|c| {
                json!({
                    "id": c.id,
                    "name": c.name,
                    "industry": c.industry,
                    "employees": c.employees,
                })
            })
            .collect();
        Ok(json!({ "results": results }))
    }
}
