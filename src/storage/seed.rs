// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! First-run seeding of operator and doorlock identities.

use chrono::Utc;
use tracing::info;

use super::{Credential, DoorlockUser, GatewayStore, StoreError, StoreResult};
use crate::auth::Argon2Verifier;

/// Demo doorlock users: (name, access_id, door_id, pin, active).
const DEMO_DOORLOCK_USERS: &[(&str, &str, &str, &str, bool)] = &[
    ("Budi", "A001", "D01", "1234", true),
    ("Citra", "A002", "D01", "5678", true),
    ("Dewi", "A003", "D02", "1111", true),
    ("Eka", "A004", "D02", "2222", true),
    ("Fajar", "A005", "D01", "9999", false),
];

#[derive(Debug, Clone, Default)]
pub struct SeedOptions {
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub demo_data: bool,
}

/// Seed the store. Safe to run on every start.
///
/// The admin credential is created only while the credential table is
/// empty. Demo doorlock users that already exist are left untouched.
pub fn seed_store(
    store: &dyn GatewayStore,
    hasher: &Argon2Verifier,
    options: &SeedOptions,
) -> StoreResult<()> {
    if let (Some(username), Some(password)) = (&options.admin_username, &options.admin_password) {
        if store.count_credentials()? == 0 {
            store.insert_credential(&Credential {
                username: username.clone(),
                password_hash: hasher.hash(password).map_err(|e| StoreError::Seed(e.to_string()))?,
                role: "admin".to_string(),
                is_active: true,
                created_at: Utc::now(),
            })?;
            info!(username = %username, "seeded admin credential");
        }
    }

    if options.demo_data {
        let mut created = 0;
        for (name, access_id, door_id, pin, active) in DEMO_DOORLOCK_USERS {
            if store.find_doorlock_user(access_id)?.is_some() {
                continue;
            }
            store.insert_doorlock_user(&DoorlockUser {
                name: name.to_string(),
                access_id: access_id.to_string(),
                door_id: door_id.to_string(),
                pin_hash: hasher.hash(pin).map_err(|e| StoreError::Seed(e.to_string()))?,
                is_active: *active,
                created_at: Utc::now(),
            })?;
            created += 1;
        }
        info!(created, "seeded demo doorlock users");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialVerifier;
    use crate::storage::RedbStore;
    use tempfile::TempDir;

    fn setup() -> (RedbStore, Argon2Verifier, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RedbStore::open(&dir.path().join("gw.redb")).unwrap();
        (store, Argon2Verifier::with_params(8, 1, 1).unwrap(), dir)
    }

    fn admin_options() -> SeedOptions {
        SeedOptions {
            admin_username: Some("admin".into()),
            admin_password: Some("admin123".into()),
            demo_data: false,
        }
    }

    #[test]
    fn seeds_admin_into_empty_store() {
        let (store, hasher, _dir) = setup();
        seed_store(&store, &hasher, &admin_options()).unwrap();

        let admin = store.find_credential("admin").unwrap().unwrap();
        assert!(admin.is_active);
        assert!(hasher.verify("admin123", &admin.password_hash));
    }

    #[test]
    fn reseeding_is_idempotent() {
        let (store, hasher, _dir) = setup();
        let options = SeedOptions {
            demo_data: true,
            ..admin_options()
        };
        seed_store(&store, &hasher, &options).unwrap();
        seed_store(&store, &hasher, &options).unwrap();

        assert_eq!(store.count_credentials().unwrap(), 1);
        let fajar = store.find_doorlock_user("A005").unwrap().unwrap();
        assert!(!fajar.is_active);
        assert_eq!(store.find_doorlock_user("A001").unwrap().unwrap().name, "Budi");
    }

    #[test]
    fn nothing_seeded_without_options() {
        let (store, hasher, _dir) = setup();
        seed_store(&store, &hasher, &SeedOptions::default()).unwrap();
        assert_eq!(store.count_credentials().unwrap(), 0);
        assert!(store.find_doorlock_user("A001").unwrap().is_none());
    }
}
