//! The encrypted vault store: the sole holder of vault plaintext.
//! Concurrent mutation (`save`, `rotate`) is serialized against readers
//! via an `RwLock` plus a waiting-writer counter: once a writer queues
//! up, new readers park until it has acquired and released the lock, so
//! a steady stream of readers can't starve a passphrase rotation. Callers
//! of `get_data` are never exposed to an intermediate, half-rotated
//! state.

use crate::{
    crypto_at_rest::{decrypt_vault, encrypt_vault, try_parse_record, VaultRecord},
    error::VaultError,
    path,
    policy::{AccessPolicy, RateLimiter},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};
use zeroize::Zeroizing;

struct VaultState {
    plaintext: Value,
    cache: HashMap<String, Option<Value>>,
    passphrase: Zeroizing<String>,
}

pub struct EncryptedVaultStore {
    file_path: PathBuf,
    iterations: u32,
    key_length: usize,
    policy: AccessPolicy,
    rate_limiter: RateLimiter,
    cache_enabled: bool,
    state: RwLock<VaultState>,
    waiting_writers: AtomicUsize,
}

impl EncryptedVaultStore {
    /// Block while a writer is queued, then take the read lock. New
    /// readers arriving after a writer has registered its intent park
    /// here instead of continuing to pile onto the `RwLock`, so the
    /// queued writer isn't pushed further back by a busy readership.
    fn read_state(&self) -> RwLockReadGuard<'_, VaultState> {
        while self.waiting_writers.load(Ordering::Acquire) > 0 {
            std::thread::yield_now();
        }
        self.state.read().expect("vault lock poisoned")
    }

    /// Register intent to write before blocking on the `RwLock` itself,
    /// so [`Self::read_state`] can see the queued writer and stop
    /// admitting new readers ahead of it.
    fn write_state(&self) -> RwLockWriteGuard<'_, VaultState> {
        self.waiting_writers.fetch_add(1, Ordering::AcqRel);
        let guard = self.state.write().expect("vault lock poisoned");
        self.waiting_writers.fetch_sub(1, Ordering::AcqRel);
        guard
    }
}

impl EncryptedVaultStore {
    /// Open a vault file. If its contents don't parse as the structured
    /// encrypted record, they're treated as a plaintext mapping and,
    /// when `migrate_plaintext` is `true`, immediately re-saved encrypted.
    /// With `migrate_plaintext: false` a plaintext file is rejected
    /// outright — silent migration would be surprising for an at-rest
    /// security primitive, so callers must opt in explicitly.
    ///
    /// `cache_enabled` controls whether `get_data` memoizes resolved
    /// paths; deployments that mutate the backing file out of band (or
    /// that simply don't want the memory overhead) can disable it.
    pub fn open(
        file_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
        iterations: u32,
        key_length: usize,
        policy: AccessPolicy,
        migrate_plaintext: bool,
        cache_enabled: bool,
    ) -> Result<Self, VaultError> {
        let file_path = file_path.into();
        let passphrase = Zeroizing::new(passphrase.into());
        let contents = fs::read_to_string(&file_path)?;

        let plaintext = match try_parse_record(&contents) {
            Some(record) => decrypt_vault(&record, &passphrase)?,
            None => {
                if !migrate_plaintext {
                    return Err(VaultError::Malformed(
                        "vault file is plaintext and migrate_plaintext is false".to_string(),
                    ));
                }
                serde_json::from_str(&contents).map_err(|e| VaultError::Malformed(e.to_string()))?
            }
        };

        let store = Self {
            file_path,
            iterations,
            key_length,
            policy,
            rate_limiter: RateLimiter::new(),
            cache_enabled,
            state: RwLock::new(VaultState {
                plaintext,
                cache: HashMap::new(),
                passphrase,
            }),
            waiting_writers: AtomicUsize::new(0),
        };

        if try_parse_record(&contents).is_none() {
            log::info!("migrating plaintext vault at {:?} to encrypted form", store.file_path);
            store.save()?;
        }

        Ok(store)
    }

    /// Create a fresh encrypted vault file at `file_path` seeded with
    /// `initial_data`, overwriting nothing that already exists. See
    /// [`Self::open`] for `cache_enabled`.
    pub fn create(
        file_path: impl AsRef<Path>,
        passphrase: impl Into<String>,
        iterations: u32,
        key_length: usize,
        policy: AccessPolicy,
        initial_data: Value,
        cache_enabled: bool,
    ) -> Result<Self, VaultError> {
        let file_path = file_path.as_ref().to_path_buf();
        let passphrase = Zeroizing::new(passphrase.into());
        let record = encrypt_vault(&initial_data, &passphrase, iterations, key_length)?;
        write_record_atomically(&file_path, &record)?;

        Ok(Self {
            file_path,
            iterations,
            key_length,
            policy,
            rate_limiter: RateLimiter::new(),
            cache_enabled,
            state: RwLock::new(VaultState {
                plaintext: initial_data,
                cache: HashMap::new(),
                passphrase,
            }),
            waiting_writers: AtomicUsize::new(0),
        })
    }

    /// Resolve `path`. Missing data is `None`, not a fault. When
    /// `cache_enabled` is `true`, the result is memoized so repeated
    /// lookups of the same path skip the JSON walk.
    pub fn get_data(&self, dotted_path: &str) -> Option<Value> {
        if !self.cache_enabled {
            let state = self.read_state();
            return path::get_path(&state.plaintext, dotted_path).cloned();
        }

        {
            let state = self.read_state();
            if let Some(cached) = state.cache.get(dotted_path) {
                return cached.clone();
            }
        }

        let mut state = self.write_state();
        // Re-check after acquiring the write lock in case another writer
        // populated it first.
        if let Some(cached) = state.cache.get(dotted_path) {
            return cached.clone();
        }
        let resolved = path::get_path(&state.plaintext, dotted_path).cloned();
        state.cache.insert(dotted_path.to_string(), resolved.clone());
        resolved
    }

    pub fn has_data(&self, dotted_path: &str) -> bool {
        self.get_data(dotted_path).is_some()
    }

    /// Rate limit first, then access policy (`spec.md` §4.4).
    pub fn validate_data_access(&self, dotted_path: &str, requester: &str) -> bool {
        let rate_config = self.policy.rate_limits.get(requester);
        if !self.rate_limiter.check_and_record(requester, rate_config) {
            return false;
        }
        self.policy.path_allowed(dotted_path, requester)
    }

    /// Re-encrypt the current plaintext under the existing passphrase and
    /// write it atomically, invalidating the cache.
    pub fn save(&self) -> Result<(), VaultError> {
        let mut state = self.write_state();
        let record = encrypt_vault(
            &state.plaintext,
            &state.passphrase,
            self.iterations,
            self.key_length,
        )?;
        write_record_atomically(&self.file_path, &record)?;
        state.cache.clear();
        Ok(())
    }

    /// Re-encrypt under `new_passphrase` with a fresh salt and IV,
    /// atomically replacing the on-disk record. Readers never observe an
    /// intermediate: the write lock spans derivation, encryption, and
    /// the rename.
    pub fn rotate(&self, new_passphrase: impl Into<String>) -> Result<(), VaultError> {
        let mut state = self.write_state();
        let new_passphrase = Zeroizing::new(new_passphrase.into());
        let record = encrypt_vault(
            &state.plaintext,
            &new_passphrase,
            self.iterations,
            self.key_length,
        )?;
        write_record_atomically(&self.file_path, &record)?;
        state.passphrase = new_passphrase;
        state.cache.clear();
        Ok(())
    }

    /// The last-saved record's metadata, for `vqp vault inspect`.
    pub fn inspect(&self) -> Result<VaultRecord, VaultError> {
        let contents = fs::read_to_string(&self.file_path)?;
        try_parse_record(&contents)
            .ok_or_else(|| VaultError::Malformed("vault file is not an encrypted record".into()))
    }
}

fn write_record_atomically(file_path: &Path, record: &VaultRecord) -> Result<(), VaultError> {
    let dir = file_path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    use std::io::Write;
    serde_json::to_writer_pretty(&mut tmp, record)
        .map_err(|e| VaultError::Malformed(e.to_string()))?;
    tmp.flush()?;
    tmp.persist(file_path)
        .map_err(|e| VaultError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultPolicy;
    use serde_json::json;
    use tempfile::tempdir;

    fn allow_all_policy() -> AccessPolicy {
        AccessPolicy {
            default_policy: DefaultPolicy::Allow,
            ..AccessPolicy::default()
        }
    }

    #[test]
    fn create_then_reopen_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let initial = json!({"personal": {"age": 25}});
        {
            let store = EncryptedVaultStore::create(
                &path,
                "pass",
                100_000,
                32,
                allow_all_policy(),
                initial.clone(),
                true,
            )
            .unwrap();
            assert_eq!(store.get_data("personal.age"), Some(json!(25)));
        }

        let reopened =
            EncryptedVaultStore::open(&path, "pass", 100_000, 32, allow_all_policy(), false, true)
                .unwrap();
        assert_eq!(reopened.get_data("personal.age"), Some(json!(25)));
    }

    #[test]
    fn missing_path_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let store = EncryptedVaultStore::create(
            &path,
            "pass",
            100_000,
            32,
            allow_all_policy(),
            json!({}),
            true,
        )
        .unwrap();
        assert_eq!(store.get_data("nonexistent.path"), None);
        assert!(!store.has_data("nonexistent.path"));
    }

    #[test]
    fn plaintext_file_is_migrated_when_opted_in() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, serde_json::to_string(&json!({"x": 1})).unwrap()).unwrap();

        let store =
            EncryptedVaultStore::open(&path, "pass", 100_000, 32, allow_all_policy(), true, true)
                .unwrap();
        assert_eq!(store.get_data("x"), Some(json!(1)));

        // The file on disk is now the structured encrypted record, not
        // the original plaintext.
        let contents = fs::read_to_string(&path).unwrap();
        assert!(try_parse_record(&contents).is_some());
    }

    #[test]
    fn plaintext_file_is_rejected_when_migration_is_not_opted_in() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        fs::write(&path, serde_json::to_string(&json!({"x": 1})).unwrap()).unwrap();

        let result =
            EncryptedVaultStore::open(&path, "pass", 100_000, 32, allow_all_policy(), false, true);
        assert!(result.is_err());
    }

    #[test]
    fn rotate_changes_passphrase_and_preserves_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let store = EncryptedVaultStore::create(
            &path,
            "old-pass",
            100_000,
            32,
            allow_all_policy(),
            json!({"x": 1}),
            true,
        )
        .unwrap();

        store.rotate("new-pass").unwrap();
        assert_eq!(store.get_data("x"), Some(json!(1)));

        assert!(EncryptedVaultStore::open(
            &path,
            "old-pass",
            100_000,
            32,
            allow_all_policy(),
            false,
            true
        )
        .is_err());
        assert!(EncryptedVaultStore::open(
            &path,
            "new-pass",
            100_000,
            32,
            allow_all_policy(),
            false,
            true
        )
        .is_ok());
    }

    #[test]
    fn validate_data_access_checks_rate_limit_before_policy() {
        use crate::policy::RateLimitConfig;

        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let mut policy = allow_all_policy();
        policy.rate_limits.insert(
            "did:example:alice".to_string(),
            RateLimitConfig {
                requests_per_minute: 1,
                requests_per_hour: 1000,
            },
        );
        let store =
            EncryptedVaultStore::create(&path, "pass", 100_000, 32, policy, json!({"x": 1}), true)
                .unwrap();

        assert!(store.validate_data_access("x", "did:example:alice"));
        assert!(!store.validate_data_access("x", "did:example:alice"));
    }

    #[test]
    fn disabled_cache_still_resolves_but_never_populates_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault.json");
        let store = EncryptedVaultStore::create(
            &path,
            "pass",
            100_000,
            32,
            allow_all_policy(),
            json!({"x": 1}),
            false,
        )
        .unwrap();

        assert_eq!(store.get_data("x"), Some(json!(1)));
        assert!(store.read_state().cache.is_empty());
    }
}
