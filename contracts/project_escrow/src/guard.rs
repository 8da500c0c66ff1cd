//! Scoped reentrancy lock.
//!
//! Held by every entry point that moves tokens. The flag lives in temporary
//! storage and is cleared when the guard drops.

use soroban_sdk::Env;

use crate::storage::DataKey;
use crate::Error;

pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    /// Take the lock, or fail with [`Error::Reentrant`] if it is already held.
    pub fn enter(env: &Env) -> Result<Self, Error> {
        let storage = env.storage().temporary();
        if storage.has(&DataKey::Lock) {
            return Err(Error::Reentrant);
        }
        storage.set(&DataKey::Lock, &true);
        Ok(Self { env: env.clone() })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().temporary().remove(&DataKey::Lock);
    }
}
