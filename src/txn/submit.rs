//! Submit a signed transaction to the miners and wait for a sharder confirmation.

use tracing::{debug, info, warn};

use crate::client::{ApiClient, FAUCET_SC_ADDRESS, HTTP_OK, STORAGE_SC_ADDRESS};
use crate::model::{
    AllocationBlobbers, Confirmation, ProviderType, StorageNode, TransactionData, TxStatus, UpdateAllocationRequest,
    Wallet,
};
use crate::txn::builder::Transaction;
use crate::txn::TxError;
use crate::utils::metrics::{TX_CONFIRMED, TX_SUBMITTED};
use crate::utils::tokenomics::tokens_to_units;
use crate::utils::{poll_until, PollPolicy, METRICS};

/// Transaction helper bound to one API client and confirmation policy.
#[derive(Clone, Copy)]
pub struct TransactionHelper<'a> {
    api: &'a ApiClient,
    confirm: PollPolicy,
}

impl<'a> TransactionHelper<'a> {
    pub fn new(api: &'a ApiClient, confirm: PollPolicy) -> Self {
        Self { api, confirm }
    }

    /// Build, sign, submit and confirm one smart-contract call.
    ///
    /// The wallet's nonce stays locked for the whole sequence and advances
    /// only once a terminal confirmation was seen, whatever its status.
    pub async fn submit_and_confirm(
        &self,
        wallet: &Wallet,
        to_client_id: &str,
        data: TransactionData,
        value: i64,
        required: TxStatus,
    ) -> Result<Confirmation, TxError> {
        let mut nonce = wallet.lock_nonce().await;
        let signed = Transaction::new(wallet, to_client_id, &data, nonce.next())?
            .value(value)
            .hash()
            .sign(wallet.keys())?;
        let hash = signed.hash_hex().to_string();

        let put = self.api.v1_transaction_put(signed.request(), HTTP_OK).await?;
        METRICS.inc_counter(TX_SUBMITTED);
        if !put.entity.hash.is_empty() && put.entity.hash != hash {
            warn!(local = %hash, remote = %put.entity.hash, "miners echoed a different hash");
        }
        info!(%hash, name = %data.name, nonce = nonce.next(), "transaction submitted");

        let confirmation = self.confirm(&hash).await?;
        nonce.advance();
        METRICS.inc_counter(TX_CONFIRMED);

        if confirmation.status != required.code() {
            return Err(TxError::UnexpectedStatus {
                hash,
                expected: required,
                actual: confirmation.status,
                output: confirmation.output().unwrap_or_default().to_string(),
            });
        }
        Ok(confirmation)
    }

    /// Poll sharders until one terminal confirmation is visible.
    pub async fn confirm(&self, hash: &str) -> Result<Confirmation, TxError> {
        let api = self.api;
        poll_until(self.confirm, move || async move {
            match api.v1_transaction_get_confirmation(hash).await {
                Ok(c) if c.tx_status().is_some() => Some(c),
                Ok(c) => {
                    debug!(%hash, status = c.status, "confirmation not terminal yet");
                    None
                }
                Err(e) => {
                    debug!(%hash, error = %e, "confirmation not available yet");
                    None
                }
            }
        })
        .await
        .map_err(|source| TxError::ConfirmationTimeout { hash: hash.to_string(), source })
    }

    pub async fn faucet(&self, wallet: &Wallet, tokens: f64, required: TxStatus) -> Result<Confirmation, TxError> {
        self.submit_and_confirm(wallet, FAUCET_SC_ADDRESS, TransactionData::faucet(), tokens_to_units(tokens), required)
            .await
    }

    /// Returns the allocation id, which is the creating transaction's hash.
    pub async fn create_allocation(
        &self,
        wallet: &Wallet,
        blobbers: &AllocationBlobbers,
        required: TxStatus,
    ) -> Result<String, TxError> {
        let input = serde_json::to_value(blobbers)?;
        let c = self
            .submit_and_confirm(
                wallet,
                STORAGE_SC_ADDRESS,
                TransactionData::new_allocation(input),
                tokens_to_units(0.1),
                required,
            )
            .await?;
        Ok(c.hash)
    }

    pub async fn update_allocation_blobbers(
        &self,
        wallet: &Wallet,
        allocation_id: &str,
        new_blobber_id: &str,
        old_blobber_id: &str,
        required: TxStatus,
    ) -> Result<Confirmation, TxError> {
        let req = UpdateAllocationRequest {
            id: allocation_id.to_string(),
            add_blobber_id: new_blobber_id.to_string(),
            remove_blobber_id: old_blobber_id.to_string(),
            ..Default::default()
        };
        let input = serde_json::to_value(&req)?;
        self.submit_and_confirm(
            wallet,
            STORAGE_SC_ADDRESS,
            TransactionData::update_allocation(input),
            tokens_to_units(0.1),
            required,
        )
        .await
    }

    pub async fn update_blobber(
        &self,
        wallet: &Wallet,
        blobber: &StorageNode,
        required: TxStatus,
    ) -> Result<Confirmation, TxError> {
        let input = serde_json::to_value(blobber)?;
        self.submit_and_confirm(
            wallet,
            STORAGE_SC_ADDRESS,
            TransactionData::update_blobber_settings(input),
            tokens_to_units(0.1),
            required,
        )
        .await
    }

    /// Lock one token into `provider_id`'s stake pool; returns the transaction hash.
    pub async fn create_stake_pool(
        &self,
        wallet: &Wallet,
        provider_type: ProviderType,
        provider_id: &str,
        required: TxStatus,
    ) -> Result<String, TxError> {
        let c = self
            .submit_and_confirm(
                wallet,
                STORAGE_SC_ADDRESS,
                TransactionData::stake_pool_lock(provider_id, provider_type),
                tokens_to_units(1.0),
                required,
            )
            .await?;
        Ok(c.hash)
    }

    pub async fn collect_rewards(
        &self,
        wallet: &Wallet,
        provider_id: &str,
        provider_type: ProviderType,
        required: TxStatus,
    ) -> Result<Confirmation, TxError> {
        self.submit_and_confirm(
            wallet,
            STORAGE_SC_ADDRESS,
            TransactionData::collect_reward(provider_id, provider_type),
            0,
            required,
        )
        .await
    }
}
