//! Typed accessors over the store. Each repository owns one key and the
//! shape of its collection; every mutation is a full-collection
//! read-modify-write cycle held under the store's process-wide lock.

mod complaints;
mod messages;
mod users;

pub use complaints::{ComplaintsRepository, NewComplaint};
pub use messages::MessagesRepository;
pub use users::{SignUpError, UsersRepository, hash_password, verify_password};

use crate::store::{Store, StoreError};

/// Absent keys and malformed contents both read as the empty collection;
/// neither is an error the caller ever sees.
fn load_collection<T: serde::de::DeserializeOwned>(store: &Store, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            tracing::warn!("failed to read collection {key}: {err}");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!("malformed collection {key}, treating as empty: {err}");
            Vec::new()
        }
    }
}

fn save_collection<T: serde::Serialize>(
    store: &Store,
    key: &str,
    records: &[T],
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(records).expect("serialize collection");
    store.set(key, &raw)
}
