//! Run configuration file definitions.

use cs_inventory::Overrides;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub version: u32,
    pub name: String,
    pub geometry: GeometryDef,
    /// Process count the run will be started with, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nproc: Option<u32>,
    /// Raw overrides keyed by component name or facility.
    #[serde(default)]
    pub components: BTreeMap<String, Overrides>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GeometryDef {
    Full,
    Regional,
}

impl RunConfig {
    pub fn new(name: impl Into<String>, geometry: GeometryDef) -> Self {
        Self {
            version: crate::validate::LATEST_VERSION,
            name: name.into(),
            geometry,
            nproc: None,
            components: BTreeMap::new(),
        }
    }

    /// Overrides for a component, looked up by name and then by facility.
    ///
    /// Entries under the name and under the facility are merged; the name
    /// entry wins on conflicting keys.
    pub fn overrides_for(&self, name: &str, facility: &str) -> Overrides {
        let mut merged = self.components.get(facility).cloned().unwrap_or_default();
        if let Some(by_name) = self.components.get(name).filter(|_| name != facility) {
            merged.extend(by_name.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }
}
