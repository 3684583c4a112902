//! Generic CRUD over one collection endpoint.

use std::marker::PhantomData;
use std::sync::Arc;

use clipper_domain::shop::{
    Appointment, AppointmentUpdate, CatalogItem, CatalogItemUpdate, Customer, CustomerUpdate,
    NewAppointment, NewCatalogItem, NewCustomer, NewStaffMember, StaffMember, StaffUpdate,
};
use clipper_domain::EntityId;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{cached_get, invalidate};
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::ports::DataCache;

/// Customers.
pub type CustomerApi = ResourceApi<Customer, NewCustomer, CustomerUpdate>;
/// Staff accounts.
pub type StaffApi = ResourceApi<StaffMember, NewStaffMember, StaffUpdate>;
/// Services and products.
pub type CatalogApi = ResourceApi<CatalogItem, NewCatalogItem, CatalogItemUpdate>;
/// Appointments and sales.
pub type AppointmentApi = ResourceApi<Appointment, NewAppointment, AppointmentUpdate>;

/// CRUD wrapper for a collection at `path`.
///
/// `T` is the record, `N` the creation body and `U` the partial update.
pub struct ResourceApi<T, N, U> {
    client: Arc<ApiClient>,
    cache: Option<Arc<dyn DataCache>>,
    path: &'static str,
    dependents: &'static [&'static str],
    _types: PhantomData<fn() -> (T, N, U)>,
}

impl<T, N, U> ResourceApi<T, N, U>
where
    T: DeserializeOwned,
    N: Serialize + Sync,
    U: Serialize + Sync,
{
    /// Creates a wrapper for `path`, e.g. `/customers`.
    #[must_use]
    pub fn new(
        client: Arc<ApiClient>,
        cache: Option<Arc<dyn DataCache>>,
        path: &'static str,
    ) -> Self {
        Self {
            client,
            cache,
            path,
            dependents: &[],
            _types: PhantomData,
        }
    }

    /// Other cache prefixes that a write to this collection makes stale.
    #[must_use]
    pub const fn also_invalidates(mut self, prefixes: &'static [&'static str]) -> Self {
        self.dependents = prefixes;
        self
    }

    /// Collection path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Lists every record.
    ///
    /// # Errors
    ///
    /// Returns the client error, or [`crate::ApiError::Rejected`] when the
    /// server reports a failure.
    pub async fn list(&self) -> ApiResult<Vec<T>> {
        cached_get(&self.client, self.cache.as_deref(), self.path).await
    }

    /// Fetches one record.
    ///
    /// # Errors
    ///
    /// See [`ResourceApi::list`].
    pub async fn get(&self, id: &EntityId) -> ApiResult<T> {
        cached_get(&self.client, self.cache.as_deref(), &self.item_path(id)).await
    }

    /// Creates a record and returns it as stored.
    ///
    /// # Errors
    ///
    /// See [`ResourceApi::list`].
    pub async fn create(&self, input: &N) -> ApiResult<T> {
        let created = self.client.post::<T, N>(self.path, input).await?.into_data()?;
        self.invalidate().await;
        Ok(created)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// See [`ResourceApi::list`].
    pub async fn update(&self, id: &EntityId, changes: &U) -> ApiResult<T> {
        let updated = self
            .client
            .patch::<T, U>(&self.item_path(id), changes)
            .await?
            .into_data()?;
        self.invalidate().await;
        Ok(updated)
    }

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// See [`ResourceApi::list`].
    pub async fn remove(&self, id: &EntityId) -> ApiResult<()> {
        self.client
            .delete::<Value>(&self.item_path(id))
            .await?
            .into_data()?;
        self.invalidate().await;
        Ok(())
    }

    fn item_path(&self, id: &EntityId) -> String {
        format!("{}/{id}", self.path)
    }

    async fn invalidate(&self) {
        debug!(path = self.path, "invalidating cached reads");
        invalidate(self.cache.as_deref(), &[self.path]).await;
        invalidate(self.cache.as_deref(), self.dependents).await;
    }
}

impl<T, N, U> Clone for ResourceApi<T, N, U> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            cache: self.cache.clone(),
            path: self.path,
            dependents: self.dependents,
            _types: PhantomData,
        }
    }
}

impl<T, N, U> std::fmt::Debug for ResourceApi<T, N, U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceApi")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
