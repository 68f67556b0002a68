use serde::{Deserialize, Serialize};

use super::EntityRef;
use crate::database::repository::Document;

/// A stored user. Owned products are not part of the document; they are
/// found through each product's `owner` reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const SORTABLE: &'static [&'static str] = &["id", "name", "email"];

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Merge-patch body for a user: absent or null fields leave the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub products: Option<Vec<EntityRef>>,
}

impl UserPatch {
    /// Overwrite the scalar fields that were supplied. `products` is handled
    /// by the ownership service since it lives on the products.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_without_products_or_missing_id() {
        let user = User::new("name1", "email1");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({ "name": "name1", "email": "email1" })
        );
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut user = User::new("AAAAAAAAAA", "AAAAAAAAAA").with_id("id1");
        let patch: UserPatch =
            serde_json::from_value(json!({ "id": "id1", "email": "BBBBBBBBBB", "name": null })).unwrap();

        patch.apply(&mut user);
        assert_eq!(user.name, "AAAAAAAAAA");
        assert_eq!(user.email, "BBBBBBBBBB");
        assert_eq!(user.id.as_deref(), Some("id1"));
    }

    #[test]
    fn derived_eq_compares_field_values() {
        let user1 = User::new("name1", "email1").with_id("id1");
        let user2 = User::new("name2", "email2").with_id("id1");
        assert_ne!(user1, user2);
        assert_eq!(user1.clone(), user1);
    }
}
