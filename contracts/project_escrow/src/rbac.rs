//! # Role-Based Access Control
//!
//! Two roles gate the privileged entry points:
//!
//! | Role       | May                                                    |
//! |------------|--------------------------------------------------------|
//! | `Admin`    | manage verifiers, release milestones, cancel projects  |
//! | `Verifier` | release milestones                                     |
//!
//! Exactly one address holds `Admin`; it is set by `init` and cannot be
//! revoked. Creating projects and donating need no role.
//!
//! Role changes are published as `("role_set", target)` and
//! `("role_del", target)` with the acting admin as data.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::storage::bump_instance;
use crate::Error;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Verifier,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RbacKey {
    /// The single admin address (Instance).
    Admin,
    /// Role held by an address (Persistent).
    Role(Address),
}

/// Record `admin` as the contract admin. Fails if an admin already exists.
pub fn init_admin(env: &Env, admin: &Address) -> Result<(), Error> {
    if env.storage().instance().has(&RbacKey::Admin) {
        return Err(Error::AlreadyInitialized);
    }
    env.storage().instance().set(&RbacKey::Admin, admin);
    env.storage()
        .persistent()
        .set(&RbacKey::Role(admin.clone()), &Role::Admin);
    bump_instance(env);
    Ok(())
}

pub fn admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&RbacKey::Admin)
}

pub fn role_of(env: &Env, address: &Address) -> Option<Role> {
    env.storage()
        .persistent()
        .get(&RbacKey::Role(address.clone()))
}

pub fn has_role(env: &Env, address: &Address, role: Role) -> bool {
    role_of(env, address) == Some(role)
}

pub fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    if has_role(env, caller, Role::Admin) {
        Ok(())
    } else {
        Err(Error::NotAuthorized)
    }
}

/// Admins and verifiers may release milestone funds.
pub fn require_can_release(env: &Env, caller: &Address) -> Result<(), Error> {
    match role_of(env, caller) {
        Some(Role::Admin) | Some(Role::Verifier) => Ok(()),
        None => Err(Error::NotAuthorized),
    }
}

/// Grant `Verifier` to `target`. `caller` must be the admin.
pub fn grant_verifier(env: &Env, caller: &Address, target: &Address) -> Result<(), Error> {
    require_admin(env, caller)?;
    if has_role(env, target, Role::Admin) {
        return Err(Error::NotAuthorized);
    }
    env.storage()
        .persistent()
        .set(&RbacKey::Role(target.clone()), &Role::Verifier);
    env.events()
        .publish((symbol_short!("role_set"), target.clone()), caller.clone());
    Ok(())
}

/// Remove the role held by `target`. The admin role cannot be revoked.
pub fn revoke_role(env: &Env, caller: &Address, target: &Address) -> Result<(), Error> {
    require_admin(env, caller)?;
    match role_of(env, target) {
        Some(Role::Admin) => Err(Error::NotAuthorized),
        Some(Role::Verifier) => {
            env.storage()
                .persistent()
                .remove(&RbacKey::Role(target.clone()));
            env.events()
                .publish((symbol_short!("role_del"), target.clone()), caller.clone());
            Ok(())
        }
        None => Err(Error::RoleNotFound),
    }
}
