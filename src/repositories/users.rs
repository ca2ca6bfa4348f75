use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::records::User;
use crate::store::{Store, StoreError};

pub(crate) const USERS_KEY: &str = "users";

#[derive(Clone)]
pub struct UsersRepository {
    store: Store,
}

#[derive(Debug)]
pub enum SignUpError {
    UserExists,
    Storage(StoreError),
}

impl std::fmt::Display for SignUpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignUpError::UserExists => f.write_str("user already exists"),
            SignUpError::Storage(err) => write!(f, "failed to persist account: {err}"),
        }
    }
}

impl UsersRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn load_all(&self) -> Vec<User> {
        super::load_collection(&self.store, USERS_KEY)
    }

    pub fn save_all(&self, users: &[User]) -> Result<(), StoreError> {
        super::save_collection(&self.store, USERS_KEY, users)
    }

    /// Appends a new account unless the name is already taken. Uniqueness is
    /// a linear scan at sign-up time, not a storage-level constraint; the
    /// scan and the write share one lock cycle.
    pub fn sign_up(&self, name: &str, password: &str) -> Result<User, SignUpError> {
        let _guard = self.store.lock();
        let mut users = self.load_all();
        if users.iter().any(|user| user.name == name) {
            return Err(SignUpError::UserExists);
        }
        let user = User {
            name: name.to_string(),
            password_hash: hash_password(password),
        };
        users.push(user.clone());
        self.save_all(&users).map_err(SignUpError::Storage)?;
        Ok(user)
    }

    /// One `None` for unknown names and wrong passwords alike, so callers
    /// cannot distinguish the two.
    pub fn verify_login(&self, name: &str, password: &str) -> Option<User> {
        let user = self.load_all().into_iter().find(|user| user.name == name)?;
        verify_password(password, &user.password_hash).then_some(user)
    }
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hash password")
        .to_string()
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn sign_up__should_persist_account() {
        // Given
        let root = create_temp_root("signup");
        let users = UsersRepository::new(Store::open(&root).expect("open store"));

        // When
        let user = users.sign_up("Alice", "secret").expect("sign up");

        // Then
        assert_eq!(user.name, "Alice");
        let stored = users.load_all();
        assert_eq!(stored.len(), 1);
        assert_ne!(stored[0].password_hash, "secret");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn sign_up__should_reject_duplicate_name_and_keep_length() {
        // Given
        let root = create_temp_root("signup-duplicate");
        let users = UsersRepository::new(Store::open(&root).expect("open store"));
        users.sign_up("Bob", "first").expect("sign up");

        // When
        let err = users.sign_up("Bob", "second").expect_err("should fail");

        // Then
        assert!(matches!(err, SignUpError::UserExists));
        assert_eq!(users.load_all().len(), 1);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn sign_up__should_treat_names_case_sensitively() {
        // Given
        let root = create_temp_root("signup-case");
        let users = UsersRepository::new(Store::open(&root).expect("open store"));
        users.sign_up("Bob", "secret").expect("sign up");

        // When
        users.sign_up("bob", "secret").expect("distinct name");

        // Then
        assert_eq!(users.load_all().len(), 2);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn verify_login__should_accept_correct_password() {
        // Given
        let root = create_temp_root("login-ok");
        let users = UsersRepository::new(Store::open(&root).expect("open store"));
        users.sign_up("Alice", "secret").expect("sign up");

        // When
        let user = users.verify_login("Alice", "secret");

        // Then
        assert_eq!(user.expect("user").name, "Alice");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn verify_login__should_not_distinguish_unknown_user_from_wrong_password() {
        // Given
        let root = create_temp_root("login-generic");
        let users = UsersRepository::new(Store::open(&root).expect("open store"));
        users.sign_up("Alice", "secret").expect("sign up");

        // When / Then
        assert!(users.verify_login("Alice", "wrong").is_none());
        assert!(users.verify_login("Mallory", "secret").is_none());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn load_all__should_return_empty_for_malformed_collection() {
        // Given
        let root = create_temp_root("malformed");
        let store = Store::open(&root).expect("open store");
        store.set(USERS_KEY, "{not json").expect("set");

        // When
        let users = UsersRepository::new(store).load_all();

        // Then
        assert!(users.is_empty());

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    fn create_temp_root(test_name: &str) -> PathBuf {
        let mut root = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        root.push(format!("complaintdesk-users-{}-{}", test_name, nanos));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
