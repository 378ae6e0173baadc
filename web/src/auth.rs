use gloo::storage::{LocalStorage, Storage};

/// Storage key the sign-in page writes the bearer token to.
pub const TOKEN_KEY: &str = "accessToken";

/// Access to the bearer token kept in local storage.
///
/// The token is stored as a raw string, not JSON, so it is read through the
/// raw storage handle.
#[derive(Copy, Clone, Debug, Default)]
pub struct TokenStore;

impl TokenStore {
    pub fn get(&self) -> Option<String> {
        LocalStorage::raw()
            .get_item(TOKEN_KEY)
            .ok()
            .flatten()
            .filter(|token| !token.is_empty())
    }

    pub fn set(&self, token: &str) {
        if LocalStorage::raw().set_item(TOKEN_KEY, token).is_err() {
            log::warn!("Could not store the access token");
        }
    }

    pub fn clear(&self) {
        LocalStorage::delete(TOKEN_KEY);
    }

    pub fn is_signed_in(&self) -> bool {
        self.get().is_some()
    }
}
