//! JSON-RPC ledger client
//!
//! [`RpcLedgerClient`] implements [`LedgerClient`] against an EVM-style
//! JSON-RPC endpoint using an alloy HTTP provider. The signing credential
//! is installed as a wallet filler at construction time, so `submit` only
//! has to shape the transfer: recipient, value in wei, fixed gas limit,
//! legacy gas price, and the explicitly assigned nonce.

use crate::ledger::client::{LedgerClient, LedgerError};
use crate::types::{FeePrice, SequenceNumber, TransferRecord};
use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{
        utils::{format_units, parse_units},
        Address, TxHash, U256,
    },
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use url::Url;

/// Gas limit attached to every plain value transfer
pub const TRANSFER_GAS_LIMIT: u64 = 21_001;

/// Ledger client backed by an alloy JSON-RPC provider
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    /// HTTP provider with the signing wallet installed
    provider: DynProvider,

    /// Address derived from the funding credential
    funding_address: Address,
}

impl RpcLedgerClient {
    /// Connect to `endpoint` with the given funding credential
    pub fn connect(endpoint: Url, signer: PrivateKeySigner) -> Self {
        let funding_address = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(endpoint)
            .erased();

        Self {
            provider,
            funding_address,
        }
    }

    /// Address of the funding account derived from the credential
    pub fn funding_address(&self) -> Address {
        self.funding_address
    }

    /// Chain id of the connected network, for startup diagnostics
    pub async fn chain_id(&self) -> Result<u64, LedgerError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| LedgerError::Network {
                message: e.to_string(),
            })
    }
}

/// Convert a native-unit amount to wei
fn to_wei(amount: Decimal) -> Result<U256, LedgerError> {
    parse_units(&amount.to_string(), "ether")
        .map(|parsed| parsed.get_absolute())
        .map_err(|e| LedgerError::InvalidAmount {
            amount,
            message: e.to_string(),
        })
}

/// Convert a wei balance to native units
fn from_wei(balance: U256) -> Result<Decimal, LedgerError> {
    let formatted = format_units(balance, "ether").map_err(|e| LedgerError::Network {
        message: format!("unrepresentable balance: {e}"),
    })?;

    Decimal::from_str(&formatted).map_err(|e| LedgerError::Network {
        message: format!("unrepresentable balance: {e}"),
    })
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn sequence_number(&self, account: Address) -> Result<SequenceNumber, LedgerError> {
        self.provider
            .get_transaction_count(account)
            .await
            .map_err(|e| LedgerError::Network {
                message: e.to_string(),
            })
    }

    async fn balance(&self, account: Address) -> Result<Decimal, LedgerError> {
        let wei = self
            .provider
            .get_balance(account)
            .await
            .map_err(|e| LedgerError::Network {
                message: e.to_string(),
            })?;

        from_wei(wei)
    }

    async fn recommended_fee_price(&self) -> Result<FeePrice, LedgerError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| LedgerError::Network {
                message: e.to_string(),
            })
    }

    async fn submit(
        &self,
        transfer: &TransferRecord,
        fee_price: FeePrice,
        sequence: SequenceNumber,
    ) -> Result<TxHash, LedgerError> {
        let request = TransactionRequest::default()
            .with_to(transfer.recipient)
            .with_value(to_wei(transfer.amount)?)
            .with_gas_limit(TRANSFER_GAS_LIMIT)
            .with_gas_price(fee_price)
            .with_nonce(sequence);

        let pending = self
            .provider
            .send_transaction(request)
            .await
            .map_err(|e| LedgerError::Submission {
                message: e.to_string(),
            })?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::Submission {
                message: e.to_string(),
            })?;

        Ok(receipt.transaction_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::one_unit("1", "1000000000000000000")]
    #[case::fractional("1.5", "1500000000000000000")]
    #[case::small("0.000000001", "1000000000")]
    #[case::zero("0", "0")]
    fn test_to_wei(#[case] amount: &str, #[case] expected_wei: &str) {
        let amount = Decimal::from_str(amount).unwrap();
        let expected = U256::from_str(expected_wei).unwrap();

        assert_eq!(to_wei(amount).unwrap(), expected);
    }

    #[rstest]
    #[case::one_unit("1000000000000000000", "1")]
    #[case::fractional("1500000000000000000", "1.5")]
    #[case::zero("0", "0")]
    fn test_from_wei(#[case] wei: &str, #[case] expected: &str) {
        let wei = U256::from_str(wei).unwrap();
        let expected = Decimal::from_str(expected).unwrap();

        assert_eq!(from_wei(wei).unwrap(), expected);
    }
}
