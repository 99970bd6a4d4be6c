use std::sync::Arc;

use crate::error::AppError;
use crate::users::store::{NewUser, UserRecord, UserStore};

/// Pure façade over the user store: one-to-one forwarding, no validation and
/// no business rules. Exists so handlers depend on the capability trait.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn verify_login(&self, username: &str, password: &str) -> Result<bool, AppError> {
        self.store.verify_login(username, password).await
    }

    pub async fn register(&self, new: &NewUser) -> Result<i32, AppError> {
        self.store.register(new).await
    }

    pub async fn is_admin(&self, username: &str) -> Result<bool, AppError> {
        self.store.is_admin(username).await
    }

    pub async fn user_id(&self, username: &str) -> Result<Option<i32>, AppError> {
        self.store.user_id(username).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<UserRecord>, AppError> {
        self.store.get_user(id).await
    }
}
