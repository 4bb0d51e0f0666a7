//! Read-side interface to a blockchain node, and an in-memory mockup of it
//!
//! [`ChainReader`] is the seam between the codec and whatever client fetches
//! contract storage and big-map entries. Implementors only supply the raw,
//! untyped fetches; typed access through [`Decode`] is provided on top.
//!
//! [`MockupChain`] implements the trait over in-memory tables, for tests of
//! generated bindings that should not require a running node. Its clock and
//! chain identifier live in an explicitly owned [`MockupConfig`], so that
//! independent mockups never share state.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::conv::{Decode, DecodeError, Encode, Typed};
use crate::error::{ValidationError, ValidationResult};
use crate::micheline::{Micheline, MichelineType};
use crate::pack::{pack, PackError};
use crate::value::{Address, ChainId, Duration, Nat};

/// Chain identifier reported by an Octez mockup node
pub const MOCKUP_CHAIN_ID: &str = "NetXynUjJNZm7wi";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// No contract is originated at the address
    UnknownContract(Address),
    /// No big-map is allocated with the identifier
    UnknownBigMap(Nat),
    /// Big-map key was given at a type other than the key type of the big-map
    KeyTypeMismatch {
        expected: MichelineType,
        found: MichelineType,
    },
    /// Big-map key could not be packed
    Pack(PackError),
    /// Fetched value could not be decoded at the requested type
    Decode(DecodeError),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::UnknownContract(addr) => write!(f, "no contract found at `{addr}`"),
            ChainError::UnknownBigMap(id) => write!(f, "no big-map found with id {id}"),
            ChainError::KeyTypeMismatch { expected, found } => {
                write!(f, "big-map has key type `{expected}`, lookup used `{found}`")
            }
            ChainError::Pack(err) => write!(f, "cannot pack big-map key: {err}"),
            ChainError::Decode(err) => write!(f, "cannot decode fetched value: {err}"),
        }
    }
}

impl std::error::Error for ChainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainError::Pack(err) => Some(err),
            ChainError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PackError> for ChainError {
    fn from(err: PackError) -> Self {
        Self::Pack(err)
    }
}

impl From<DecodeError> for ChainError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Untyped storage and big-map fetches, with typed access provided on top
pub trait ChainReader {
    /// Fetches the current storage of a contract
    fn get_raw_storage(&self, contract: &Address) -> ChainResult<Micheline>;

    /// Fetches the value bound to `key` in a big-map, or `None` if unbound
    ///
    /// The key type is needed by the node to hash the key, and must be the
    /// key type the big-map was declared with.
    fn get_big_map_value(
        &self,
        id: &Nat,
        key: &Micheline,
        key_type: &MichelineType,
    ) -> ChainResult<Option<Micheline>>;

    /// Fetches and decodes the current storage of a contract
    fn get_storage<T: Decode>(&self, contract: &Address) -> ChainResult<T>
    where
        Self: Sized,
    {
        let raw = self.get_raw_storage(contract)?;
        Ok(T::decode(&raw)?)
    }

    /// Fetches and decodes a big-map value, encoding and typing the key from
    /// its Rust type
    fn get_big_map_typed<K, V>(&self, id: &Nat, key: &K) -> ChainResult<Option<V>>
    where
        Self: Sized,
        K: Encode + Typed,
        V: Decode,
    {
        match self.get_big_map_value(id, &key.encode(), &K::mich_type())? {
            Some(raw) => Ok(Some(V::decode(&raw)?)),
            None => Ok(None),
        }
    }
}

/// Clock and identity of a [`MockupChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockupConfig {
    now: DateTime<Utc>,
    chain_id: ChainId,
}

impl MockupConfig {
    pub fn new(now: DateTime<Utc>, chain_id: ChainId) -> Self {
        Self {
            now: truncate_to_seconds(now),
            chain_id,
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    /// Sets the mockup clock, truncated to whole seconds as the node keeps it
    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = truncate_to_seconds(now);
    }

    /// Advances (or, for negative durations, rewinds) the mockup clock
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::OutOfRange`] if the resulting time is
    /// not representable, in which case the clock is left unchanged.
    pub fn delay_now_by(&mut self, delay: &Duration) -> ValidationResult<()> {
        let later = delay
            .to_chrono()
            .and_then(|d| self.now.checked_add_signed(d))
            .ok_or_else(|| ValidationError::OutOfRange {
                what: "timestamp",
                value: format!("{} + {delay}", self.now),
            })?;
        log::debug!("mockup clock moved from {} to {later}", self.now);
        self.now = later;
        Ok(())
    }
}

impl Default for MockupConfig {
    fn default() -> Self {
        Self::new(Utc::now(), ChainId::new(MOCKUP_CHAIN_ID))
    }
}

fn truncate_to_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(t.timestamp(), 0).single().unwrap_or(t)
}

#[derive(Debug, Clone)]
struct BigMap {
    key_type: MichelineType,
    entries: HashMap<Vec<u8>, Micheline>,
}

/// In-memory chain holding contract storages and big-maps
#[derive(Debug, Clone, Default)]
pub struct MockupChain {
    config: MockupConfig,
    storages: HashMap<Address, Micheline>,
    big_maps: HashMap<Nat, BigMap>,
}

impl MockupChain {
    pub fn new(config: MockupConfig) -> Self {
        Self {
            config,
            storages: HashMap::new(),
            big_maps: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MockupConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut MockupConfig {
        &mut self.config
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.config.now()
    }

    #[must_use]
    pub fn chain_id(&self) -> &ChainId {
        self.config.chain_id()
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.config.set_now(now)
    }

    pub fn delay_now_by(&mut self, delay: &Duration) -> ValidationResult<()> {
        self.config.delay_now_by(delay)
    }

    /// Sets the storage of the contract at `contract`, replacing any previous storage
    pub fn set_storage(&mut self, contract: Address, storage: Micheline) {
        self.storages.insert(contract, storage);
    }

    /// Allocates an empty big-map and returns its identifier
    pub fn alloc_big_map(&mut self, key_type: MichelineType) -> Nat {
        let id = Nat::from(self.big_maps.len() as u64);
        self.big_maps.insert(
            id.clone(),
            BigMap {
                key_type,
                entries: HashMap::new(),
            },
        );
        id
    }

    /// Binds `key` to `value` in a big-map, or removes the binding if
    /// `value` is `None`
    pub fn update_big_map(
        &mut self,
        id: &Nat,
        key: &Micheline,
        value: Option<Micheline>,
    ) -> ChainResult<()> {
        let big_map = self
            .big_maps
            .get_mut(id)
            .ok_or_else(|| ChainError::UnknownBigMap(id.clone()))?;
        let packed = pack(key)?;
        match value {
            Some(val) => big_map.entries.insert(packed, val),
            None => big_map.entries.remove(&packed),
        };
        Ok(())
    }
}

impl ChainReader for MockupChain {
    fn get_raw_storage(&self, contract: &Address) -> ChainResult<Micheline> {
        self.storages
            .get(contract)
            .cloned()
            .ok_or_else(|| ChainError::UnknownContract(contract.clone()))
    }

    fn get_big_map_value(
        &self,
        id: &Nat,
        key: &Micheline,
        key_type: &MichelineType,
    ) -> ChainResult<Option<Micheline>> {
        let big_map = self
            .big_maps
            .get(id)
            .ok_or_else(|| ChainError::UnknownBigMap(id.clone()))?;
        if !big_map.key_type.eq_modulo_annots(key_type) {
            return Err(ChainError::KeyTypeMismatch {
                expected: big_map.key_type.clone(),
                found: key_type.clone(),
            });
        }
        Ok(big_map.entries.get(&pack(key)?).cloned())
    }
}
