// File: waylink/src/config.rs
// Purpose: Linking configuration parsing from waylink.toml

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use waylink_router::{ParamType, Params, Presentation, RoutePattern, RouteTable};

use crate::adapter::StateAdapter;
use crate::state::NavigationNode;
use crate::store::NavigationStore;

/// Linking configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkingConfig {
    /// URL prefixes stripped before parsing (e.g. "https://app.example.com")
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Root seeded when a link only names overlay routes
    #[serde(default)]
    pub initial_route: Option<String>,

    /// Whether literal segments compare case-insensitively (default: false)
    #[serde(default = "default_false")]
    pub case_insensitive: bool,

    #[serde(default)]
    pub subscription: SubscriptionConfig,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// One `[[routes]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub name: String,

    /// Path template, e.g. "/r/:id"
    pub template: String,

    #[serde(default)]
    pub presentation: Presentation,

    /// Parameter types by name (untyped parameters are strings)
    #[serde(default)]
    pub params: BTreeMap<String, ParamType>,

    /// Declared query parameter names
    #[serde(default)]
    pub query: Vec<String>,
}

/// Link subscription settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Queued links per subscriber above which a backlog warning is logged
    ///
    /// Links are never dropped for a slow subscriber.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Same path delivered again within this window is dropped (0 disables)
    #[serde(default = "default_dedup_window_ms")]
    pub dedup_window_ms: u64,
}

// Default values
fn default_capacity() -> usize {
    64
}

fn default_dedup_window_ms() -> u64 {
    500
}

fn default_false() -> bool {
    false
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            dedup_window_ms: default_dedup_window_ms(),
        }
    }
}

impl SubscriptionConfig {
    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }
}

impl RouteConfig {
    /// Builds the route pattern, applying declared types and query names
    pub fn to_pattern(&self) -> Result<RoutePattern> {
        let mut template = self.template.clone();
        if !self.query.is_empty() {
            template.push(if template.contains('?') { '&' } else { '?' });
            template.push_str(&self.query.join("&"));
        }

        let mut pattern = RoutePattern::parse(self.name.clone(), &template)
            .with_context(|| format!("Invalid template for route `{}`", self.name))?
            .with_presentation(self.presentation);

        for (param, ty) in &self.params {
            if !pattern.param_types.contains_key(param) {
                bail!(
                    "Route `{}` types parameter `{}` which its template does not declare",
                    self.name,
                    param
                );
            }
            pattern = pattern.with_param_type(param, ty.clone());
        }

        Ok(pattern)
    }
}

impl LinkingConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from default path (./waylink.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("waylink.toml")
    }

    /// Route table in declaration order
    pub fn build_table(&self) -> Result<RouteTable> {
        let patterns = self
            .routes
            .iter()
            .map(RouteConfig::to_pattern)
            .collect::<Result<Vec<_>>>()?;

        let table = RouteTable::new()
            .with_case_sensitivity(self.case_insensitive)
            .with_patterns(patterns);

        for shadowed in table.shadowed() {
            warn!(
                "Route `{}` is shadowed by `{}` and will never match",
                shadowed.shadowed, shadowed.by
            );
        }

        info!(routes = table.patterns().len(), "route table built");
        Ok(table)
    }

    /// State adapter honoring `initial_route`
    pub fn build_adapter(&self, table: &RouteTable) -> Result<StateAdapter> {
        let Some(name) = &self.initial_route else {
            return Ok(StateAdapter::new());
        };

        let Some(pattern) = table.pattern(name) else {
            bail!("Initial route `{}` is not a declared route", name);
        };
        if pattern.is_overlay() {
            bail!("Initial route `{}` must be a screen route", name);
        }
        if pattern.render_path(&Params::new()).is_none() {
            bail!("Initial route `{}` requires path parameters", name);
        }

        Ok(StateAdapter::new().with_initial_route(NavigationNode::new(name.clone(), Params::new())))
    }

    /// Navigation store over this configuration's routes
    pub fn build_store(&self) -> Result<NavigationStore> {
        let table = self.build_table()?;
        let adapter = self.build_adapter(&table)?;
        Ok(NavigationStore::new(table)
            .with_prefixes(self.prefixes.iter().cloned())
            .with_adapter(adapter))
    }
}
