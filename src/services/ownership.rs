use futures::future::try_join_all;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::database::models::product::OWNER;
use crate::database::models::{EntityRef, Product};
use crate::database::repository::Repository;

#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Loaded products and who owns them.
///
/// `Product::owner` is the only stored side of the relationship; a user's
/// products are always computed from it, so the two directions cannot drift.
/// Mutations are tracked so that only touched products get written back.
#[derive(Debug, Default)]
pub struct ProductOwnership {
    products: BTreeMap<String, Product>,
    changed: BTreeSet<String>,
}

impl ProductOwnership {
    /// Products without an id are ignored; they cannot be referenced.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .filter_map(|p| p.id.clone().map(|id| (id, p)))
            .collect();
        Self {
            products,
            changed: BTreeSet::new(),
        }
    }

    pub fn get(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Set or clear a product's owner. Moving a product to a new owner drops
    /// it from the previous owner's products.
    pub fn set_owner(&mut self, product_id: &str, owner: Option<&str>) -> Result<(), OwnershipError> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| OwnershipError::UnknownProduct(product_id.to_string()))?;

        if product.owner_id() != owner {
            product.owner = owner.map(EntityRef::new);
            self.changed.insert(product_id.to_string());
        }
        Ok(())
    }

    pub fn add_product(&mut self, user_id: &str, product_id: &str) -> Result<(), OwnershipError> {
        self.set_owner(product_id, Some(user_id))
    }

    /// Clear the owner, but only when it is `user_id`.
    pub fn remove_product(&mut self, user_id: &str, product_id: &str) -> Result<(), OwnershipError> {
        let owned = self
            .get(product_id)
            .ok_or_else(|| OwnershipError::UnknownProduct(product_id.to_string()))?
            .is_owned_by(user_id);
        if owned {
            self.set_owner(product_id, None)?;
        }
        Ok(())
    }

    /// Make `product_ids` exactly the set of products owned by `user_id`.
    pub fn set_products(&mut self, user_id: &str, product_ids: &[String]) -> Result<(), OwnershipError> {
        if let Some(unknown) = product_ids.iter().find(|id| !self.products.contains_key(id.as_str())) {
            return Err(OwnershipError::UnknownProduct(unknown.clone()));
        }

        let released: Vec<String> = self
            .products
            .values()
            .filter(|p| p.is_owned_by(user_id))
            .filter_map(|p| p.id.clone())
            .filter(|id| !product_ids.contains(id))
            .collect();
        for id in released {
            self.set_owner(&id, None)?;
        }
        for id in product_ids {
            self.add_product(user_id, id)?;
        }
        Ok(())
    }

    /// The derived back-reference: every loaded product owned by `user_id`.
    pub fn products_of(&self, user_id: &str) -> Vec<&Product> {
        self.products.values().filter(|p| p.is_owned_by(user_id)).collect()
    }

    pub fn changed(&self) -> Vec<&Product> {
        self.changed.iter().filter_map(|id| self.products.get(id)).collect()
    }
}

/// Load what a user's product set touches: everything `user_id` owns now,
/// plus every requested product. Fails before any write if a requested id is unknown.
pub async fn load_for_user(
    products: &dyn Repository<Product>,
    user_id: Option<&str>,
    requested: Option<&[String]>,
) -> Result<ProductOwnership, OwnershipError> {
    let mut loaded = match user_id {
        Some(id) => products.find_all_by_reference(OWNER, id).await?,
        None => vec![],
    };

    for id in requested.unwrap_or_default() {
        if loaded.iter().any(|p| p.id.as_deref() == Some(id.as_str())) {
            continue;
        }
        match products.find_by_id(id).await? {
            Some(product) => loaded.push(product),
            None => return Err(OwnershipError::UnknownProduct(id.clone())),
        }
    }

    Ok(ProductOwnership::new(loaded))
}

/// Save every product whose owner changed.
pub async fn persist_changed(
    products: &dyn Repository<Product>,
    ownership: &ProductOwnership,
) -> Result<(), DatabaseError> {
    let writes = ownership
        .changed()
        .into_iter()
        .map(|product| products.save(product.clone()));
    try_join_all(writes).await?;
    Ok(())
}
