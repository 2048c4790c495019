//! Group types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::normalize;

/// A local group, unique by its normalized name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Diacritic-folded, lower-cased copy used for uniqueness and lookup.
    pub normalized_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
}

impl NewGroup {
    /// Marker description for groups auto-created from directory membership.
    pub fn directory_sourced(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some("Imported from the directory".to_string()),
        }
    }

    pub fn into_group(self) -> Group {
        let normalized_name = normalize(&self.name);
        Group {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            normalized_name,
            description: self.description,
            created_at: Utc::now(),
        }
    }
}
