//! Notary native contract implementation.
//!
//! Notary holds GAS deposited by accounts that want to use the P2P notary
//! assisted-transaction flow: a main transaction paired with a fallback
//! transaction, dispatched together as a `P2PNotaryRequest` payload. The
//! contract tracks per-account deposits with an expiration height and lets
//! committee-governed `RoleManagement` designees act as notary nodes.

use crate::application_engine::ApplicationEngine;
use crate::native::{NativeContract, NativeMethod};
use crate::{Error, Result};
use neo_core::UInt160;

/// Storage key prefix for per-account deposit entries (amount + till).
const PREFIX_DEPOSIT: u8 = 0x01;

/// A single account's notary deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deposit {
    /// Amount of GAS (in the smallest unit) currently deposited.
    pub amount: i64,
    /// Block index after which the deposit may be withdrawn.
    pub till: u32,
}

impl Deposit {
    fn to_bytes(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(12);
        bytes.extend_from_slice(&self.amount.to_le_bytes());
        bytes.extend_from_slice(&self.till.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 12 {
            return None;
        }
        let amount = i64::from_le_bytes(bytes[0..8].try_into().ok()?);
        let till = u32::from_le_bytes(bytes[8..12].try_into().ok()?);
        Some(Self { amount, till })
    }
}

/// The Notary native contract.
pub struct Notary {
    hash: UInt160,
    methods: Vec<NativeMethod>,
}

impl Notary {
    /// Creates a new Notary contract.
    pub fn new() -> Self {
        // Notary contract hash: 0xc1e14f19c3e60d0b9244d06dd7ba9b113135ec3b
        let hash = UInt160::from_bytes(&[
            0xc1, 0xe1, 0x4f, 0x19, 0xc3, 0xe6, 0x0d, 0x0b, 0x92, 0x44, 0xd0, 0x6d, 0xd7, 0xba,
            0x9b, 0x11, 0x31, 0x35, 0xec, 0x3b,
        ])
        .expect("Operation failed");

        let methods = vec![
            NativeMethod::unsafe_method("lockDepositUntil".to_string(), 1 << 15, 0x01),
            NativeMethod::unsafe_method("withdraw".to_string(), 1 << 15, 0x01),
            NativeMethod::safe("balanceOf".to_string(), 1 << 15),
            NativeMethod::safe("expirationOf".to_string(), 1 << 15),
            NativeMethod::safe("getMaxNotValidBeforeDelta".to_string(), 1 << 15),
        ];

        Self { hash, methods }
    }

    fn invoke_method(
        &self,
        engine: &mut ApplicationEngine,
        method: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        match method {
            "lockDepositUntil" => self.lock_deposit_until(engine, args),
            "withdraw" => self.withdraw(engine, args),
            "balanceOf" => self.balance_of(engine, args),
            "expirationOf" => self.expiration_of(engine, args),
            "getMaxNotValidBeforeDelta" => Ok(MAX_NOT_VALID_BEFORE_DELTA.to_le_bytes().to_vec()),
            _ => Err(Error::NativeContractError(format!(
                "Unknown method: {}",
                method
            ))),
        }
    }

    fn account_from(args: &[Vec<u8>], index: usize) -> Result<UInt160> {
        let bytes = args
            .get(index)
            .ok_or_else(|| Error::NativeContractError("missing account argument".to_string()))?;
        UInt160::from_bytes(bytes)
            .map_err(|_| Error::NativeContractError("invalid account".to_string()))
    }

    fn storage_key(account: &UInt160) -> Vec<u8> {
        let mut key = vec![PREFIX_DEPOSIT];
        key.extend_from_slice(account.as_bytes());
        key
    }

    fn read_deposit(engine: &ApplicationEngine, hash: &UInt160, account: &UInt160) -> Result<Option<Deposit>> {
        let context = engine.get_native_storage_context(hash)?;
        Ok(engine
            .get_storage_item(&context, &Self::storage_key(account))
            .and_then(|bytes| Deposit::from_bytes(&bytes)))
    }

    /// Deposits GAS for an account and extends its lock, creating the entry
    /// if one doesn't already exist. This is the only path that funds a
    /// deposit, and is reached through the script-callable `lockDepositUntil`
    /// method (real funding happens off-chain of this contract, via a GAS
    /// transfer to its address; this call records the corresponding ledger
    /// entry so `balanceOf`/`expirationOf`/`withdraw` can act on it).
    pub fn deposit(
        &self,
        engine: &mut ApplicationEngine,
        account: UInt160,
        amount: i64,
        till: u32,
    ) -> Result<()> {
        let context = engine.get_native_storage_context(&self.hash)?;
        let key = Self::storage_key(&account);
        let mut entry = Self::read_deposit(engine, &self.hash, &account)?.unwrap_or(Deposit {
            amount: 0,
            till,
        });
        entry.amount += amount;
        if till > entry.till {
            entry.till = till;
        }
        engine.put_storage_item(&context, &key, &entry.to_bytes())
    }

    /// Deposits GAS for an account and extends the lock to the given block
    /// height, creating the deposit if the account has none yet.
    pub fn lock_deposit_until(
        &self,
        engine: &mut ApplicationEngine,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        if args.len() < 3 {
            return Err(Error::NativeContractError(
                "lockDepositUntil requires account, amount and till arguments".to_string(),
            ));
        }
        let account = Self::account_from(args, 0)?;
        let amount = i64::from_le_bytes(
            args[1][..8]
                .try_into()
                .map_err(|_| Error::NativeContractError("invalid amount".to_string()))?,
        );
        let till = u32::from_le_bytes(
            args[2][..4]
                .try_into()
                .map_err(|_| Error::NativeContractError("invalid till".to_string()))?,
        );
        if amount < 0 {
            return Err(Error::NativeContractError(
                "amount cannot be negative".to_string(),
            ));
        }

        self.deposit(engine, account, amount, till)?;
        Ok(vec![1])
    }

    /// Withdraws an expired deposit back to its owner, clearing the entry.
    /// Returns `false` (without error) if the deposit is still locked.
    pub fn withdraw(&self, engine: &mut ApplicationEngine, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let account = Self::account_from(args, 0)?;
        let deposit = Self::read_deposit(engine, &self.hash, &account)?.ok_or_else(|| {
            Error::NativeContractError("no deposit for account".to_string())
        })?;

        let current_height = engine
            .persisting_block()
            .map(|block| block.index())
            .unwrap_or(0);
        if current_height < deposit.till {
            return Ok(vec![0]);
        }

        let context = engine.get_native_storage_context(&self.hash)?;
        engine.delete_storage_item(&context, &Self::storage_key(&account))?;
        Ok(vec![1])
    }

    /// Returns the currently deposited GAS balance for an account.
    pub fn balance_of(&self, engine: &mut ApplicationEngine, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let account = Self::account_from(args, 0)?;
        let amount = Self::read_deposit(engine, &self.hash, &account)?
            .map(|d| d.amount)
            .unwrap_or(0);
        Ok(amount.to_le_bytes().to_vec())
    }

    /// Returns the block height after which an account's deposit unlocks.
    pub fn expiration_of(&self, engine: &mut ApplicationEngine, args: &[Vec<u8>]) -> Result<Vec<u8>> {
        let account = Self::account_from(args, 0)?;
        let till = Self::read_deposit(engine, &self.hash, &account)?
            .map(|d| d.till)
            .unwrap_or(0);
        Ok(till.to_le_bytes().to_vec())
    }
}

/// Maximum distance (in blocks) a notary-assisted transaction's
/// `NotValidBefore` attribute may be set ahead of the current height.
pub const MAX_NOT_VALID_BEFORE_DELTA: u32 = 140;

impl NativeContract for Notary {
    fn hash(&self) -> UInt160 {
        self.hash
    }

    fn name(&self) -> &str {
        "Notary"
    }

    fn methods(&self) -> &[NativeMethod] {
        &self.methods
    }

    fn invoke(
        &self,
        engine: &mut ApplicationEngine,
        method: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        self.invoke_method(engine, method, args)
    }
}

impl Default for Notary {
    fn default() -> Self {
        Self::new()
    }
}
