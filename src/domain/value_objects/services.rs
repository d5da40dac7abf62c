use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::services::ServiceEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceModel {
    pub id: i32,
    pub name: String,
    pub domain: Option<String>,
    pub image_url: Option<String>,
    pub is_predefined: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceEntity> for ServiceModel {
    fn from(entity: ServiceEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            domain: entity.domain,
            image_url: entity.image_url,
            is_predefined: entity.is_predefined,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListServicesFilter {
    pub search: Option<String>,
}

/// Case-insensitive name search, ordered by name.
pub fn filter_services(services: Vec<ServiceModel>, filter: &ListServicesFilter) -> Vec<ServiceModel> {
    let needle = filter
        .search
        .as_deref()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());

    let mut services: Vec<ServiceModel> = services
        .into_iter()
        .filter(|service| match needle.as_deref() {
            Some(needle) => service.name.to_lowercase().contains(needle),
            None => true,
        })
        .collect();

    services.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
    services
}
