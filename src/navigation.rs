//! Which dashboard tab is active, persisted between sessions

use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::NavigationConfig;
use crate::types::{DeskError, DeskResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Leads,
    Customers,
    Accounting,
    Reports,
    Invoicing,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Dashboard,
        Tab::Leads,
        Tab::Customers,
        Tab::Accounting,
        Tab::Reports,
        Tab::Invoicing,
    ];

    /// Parse a stored tab name, ignoring case
    pub fn parse(name: &str) -> Option<Tab> {
        let name = name.trim().to_ascii_lowercase();
        Tab::ALL.into_iter().find(|tab| tab.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Leads => "leads",
            Tab::Customers => "customers",
            Tab::Accounting => "accounting",
            Tab::Reports => "reports",
            Tab::Invoicing => "invoicing",
        }
    }
}

// Unknown names fall back to the dashboard instead of failing the load
impl<'de> Deserialize<'de> for Tab {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Tab::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    #[serde(default)]
    pub active_tab: Tab,
}

/// Persistence for the navigation state
pub trait NavigationStore: Send + Sync {
    /// Stored state, or the default when nothing was saved
    fn load(&self) -> DeskResult<NavigationState>;

    fn save(&self, state: &NavigationState) -> DeskResult<()>;
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileNavigationStore {
    path: PathBuf,
}

impl FileNavigationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the configured `navigation.state_path`
    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.state_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NavigationStore for FileNavigationStore {
    fn load(&self) -> DeskResult<NavigationState> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(NavigationState::default())
            }
            Err(e) => return Err(DeskError::Navigation(e.to_string())),
        };
        // A corrupt file is treated like a missing one
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn save(&self, state: &NavigationState) -> DeskResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DeskError::Navigation(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(state).map_err(|e| DeskError::Navigation(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| DeskError::Navigation(e.to_string()))
    }
}

/// In-memory store; clones share state
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigationStore {
    state: Arc<Mutex<NavigationState>>,
}

impl MemoryNavigationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NavigationStore for MemoryNavigationStore {
    fn load(&self) -> DeskResult<NavigationState> {
        self.state
            .lock()
            .map(|s| *s)
            .map_err(|e| DeskError::Navigation(e.to_string()))
    }

    fn save(&self, state: &NavigationState) -> DeskResult<()> {
        let mut stored = self
            .state
            .lock()
            .map_err(|e| DeskError::Navigation(e.to_string()))?;
        *stored = *state;
        Ok(())
    }
}

/// Switch tabs and persist the choice
pub fn select_tab(store: &dyn NavigationStore, tab: Tab) -> DeskResult<NavigationState> {
    let state = NavigationState { active_tab: tab };
    store.save(&state)?;
    Ok(state)
}
