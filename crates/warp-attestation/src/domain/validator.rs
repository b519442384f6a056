//! Validator rosters and canonical validator sets
//!
//! A roster is what the coordinating chain reports: node identities mapped
//! to a registered key and stake. A [`ValidatorSet`] is the canonical form
//! the protocol operates on: unique keys, summed weights, deterministic
//! order. The canonical position of an entry is its signer-bitmap index, so
//! ordering must be a pure function of the public keys.

use std::collections::{BTreeMap, HashMap};

use shared_crypto::{BlsPublicKey, PUBLIC_KEY_LEN};
use shared_types::{NodeId, Weight};

use crate::error::{AttestationError, WarpResult};

/// A validator as registered on the coordinating chain.
///
/// The key is optional: stake can be registered before a usable BLS key is,
/// and such entries can never sign.
#[derive(Clone, Debug)]
pub struct RegisteredValidator {
    /// Registered BLS key, if any.
    pub public_key: Option<BlsPublicKey>,
    /// Registered stake.
    pub weight: Weight,
}

impl RegisteredValidator {
    /// Registration with a usable signing key.
    pub fn new(public_key: BlsPublicKey, weight: Weight) -> Self {
        Self {
            public_key: Some(public_key),
            weight,
        }
    }

    /// Registration whose key is still absent.
    pub fn without_key(weight: Weight) -> Self {
        Self {
            public_key: None,
            weight,
        }
    }
}

/// One canonical validator entry: a unique BLS key, the summed weight of
/// every registration sharing it, and the node identities behind it.
#[derive(Clone, Debug)]
pub struct Validator {
    /// The shared signing key.
    pub public_key: BlsPublicKey,
    /// Summed weight of all identities signing with this key.
    pub weight: Weight,
    /// Node identities sharing the key, ascending.
    pub node_ids: Vec<NodeId>,
}

/// Canonically ordered validator set for one (domain, height) snapshot.
///
/// Derived fresh for every aggregation or verification call; never cached
/// here.
#[derive(Clone, Debug, Default)]
pub struct ValidatorSet {
    validators: Vec<Validator>,
    total_weight: Weight,
}

impl ValidatorSet {
    /// Collapse a roster into canonical form.
    ///
    /// Registrations sharing a key merge into one weight-summed entry (one
    /// signature covers all of them). Entries sort ascending by compressed
    /// key bytes. Registrations without a key contribute weight to the
    /// total but produce no entry: their stake raises the quorum bar even
    /// though it can never sign.
    pub fn canonicalize(roster: &HashMap<NodeId, RegisteredValidator>) -> WarpResult<Self> {
        let mut total_weight: Weight = 0;
        let mut by_key: BTreeMap<[u8; PUBLIC_KEY_LEN], Validator> = BTreeMap::new();

        for (node_id, registered) in roster {
            total_weight = total_weight.saturating_add(registered.weight);
            let Some(public_key) = &registered.public_key else {
                continue;
            };
            let entry = by_key
                .entry(public_key.to_bytes())
                .or_insert_with(|| Validator {
                    public_key: public_key.clone(),
                    weight: 0,
                    node_ids: Vec::new(),
                });
            entry.weight = entry.weight.saturating_add(registered.weight);
            entry.node_ids.push(*node_id);
        }

        let mut validators: Vec<Validator> = by_key.into_values().collect();
        for validator in &mut validators {
            validator.node_ids.sort();
        }

        if validators.is_empty() || total_weight == 0 {
            return Err(AttestationError::NoValidators);
        }

        Ok(Self {
            validators,
            total_weight,
        })
    }

    /// Canonical entries, index position = bitmap index.
    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    /// Entry at a canonical index.
    pub fn get(&self, index: usize) -> Option<&Validator> {
        self.validators.get(index)
    }

    /// Total roster weight, including key-less registrations.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    /// Number of canonical entries.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the set has no canonical entries.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Canonical index of a key, if present.
    pub fn index_of(&self, public_key: &BlsPublicKey) -> Option<usize> {
        self.validators
            .binary_search_by(|v| v.public_key.to_bytes().cmp(&public_key.to_bytes()))
            .ok()
    }
}
