//! JSON report output

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::configurations::ConfigurationSet;
use crate::error::Result;
use crate::stats::{IdentifierValues, MeasureRecord};
use crate::tree::TreeNode;

/// Everything one check produced, as a single document.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub root: &'a Path,
    pub measures: BTreeMap<String, &'a IdentifierValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurations: Option<&'a ConfigurationSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<&'a TreeNode>,
}

impl<'a> Report<'a> {
    pub fn new(root: &'a Path, record: &'a MeasureRecord) -> Self {
        let measures = record
            .measures
            .iter()
            .filter_map(|m| record.get(*m).map(|values| (m.name().to_string(), values)))
            .collect();
        Self {
            root,
            measures,
            configurations: None,
            tree: None,
        }
    }

    pub fn with_configurations(mut self, configurations: &'a ConfigurationSet) -> Self {
        self.configurations = Some(configurations);
        self
    }

    pub fn with_tree(mut self, tree: &'a TreeNode) -> Self {
        self.tree = Some(tree);
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
