use serde::{Deserialize, Serialize};

use super::EntityRef;
use crate::database::repository::Document;

/// Name of the reference field pointing at the owning user
pub const OWNER: &str = "owner";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<EntityRef>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            owner: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.id.as_str())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id() == Some(user_id)
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";
    const SORTABLE: &'static [&'static str] = &["id", "name"];
    const REFERENCES: &'static [&'static str] = &[OWNER];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Merge-patch body for a product. A null `owner` leaves the owner unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub owner: Option<EntityRef>,
}

impl ProductPatch {
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = Some(name.clone());
        }
        if let Some(owner) = &self.owner {
            product.owner = Some(owner.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn owner_is_serialized_as_reference() {
        let product = Product {
            owner: Some(EntityRef::new("u1")),
            ..Product::new("name1").with_id("p1")
        };
        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            json!({ "id": "p1", "name": "name1", "owner": { "id": "u1" } })
        );
    }

    #[test]
    fn patch_keeps_owner_when_null() {
        let mut product = Product {
            owner: Some(EntityRef::new("u1")),
            ..Product::new("old").with_id("p1")
        };
        let patch: ProductPatch =
            serde_json::from_value(json!({ "id": "p1", "name": "new", "owner": null })).unwrap();

        patch.apply(&mut product);
        assert_eq!(product.name.as_deref(), Some("new"));
        assert_eq!(product.owner_id(), Some("u1"));
    }
}
