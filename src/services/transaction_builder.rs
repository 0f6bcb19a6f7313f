use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use tracing::info;

use crate::blockchain::contracts::{ILendingPool, IERC20};
use crate::error::AppError;
use crate::models::{AssetRegistry, PrepareTransactionRequest, UnsignedTransaction};
use crate::security::{parse_address, require_amount};
use crate::utils::fixed_point::parse_units;

const REFERRAL_CODE: u16 = 0;
const STABLE_RATE_MODE: u64 = 1;
const VARIABLE_RATE_MODE: u64 = 2;
/// Flash-loan mode 0: repay within the same transaction, no debt opened.
const NO_DEBT_MODE: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Approve,
    Deposit,
    Borrow,
    Repay,
    Withdraw,
    FlashLoan,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Approve => "approve",
            TransactionAction::Deposit => "deposit",
            TransactionAction::Borrow => "borrow",
            TransactionAction::Repay => "repay",
            TransactionAction::Withdraw => "withdraw",
            TransactionAction::FlashLoan => "flash-loan",
        }
    }

    /// Whether `"max"` is accepted as the amount.
    pub fn allows_max_amount(&self) -> bool {
        matches!(
            self,
            TransactionAction::Approve | TransactionAction::Repay | TransactionAction::Withdraw
        )
    }

    pub fn prepared_message(&self) -> &'static str {
        match self {
            TransactionAction::Approve => "Approval transaction prepared. Sign with your wallet to execute.",
            TransactionAction::Deposit => "Deposit transaction prepared. Sign with your wallet to execute.",
            TransactionAction::Borrow => "Borrow transaction prepared. Sign with your wallet to execute.",
            TransactionAction::Repay => "Repay transaction prepared. Sign with your wallet to execute.",
            TransactionAction::Withdraw => "Withdraw transaction prepared. Sign with your wallet to execute.",
            TransactionAction::FlashLoan => "Flash loan transaction prepared. Sign with your wallet to execute.",
        }
    }
}

impl FromStr for TransactionAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(TransactionAction::Approve),
            "deposit" => Ok(TransactionAction::Deposit),
            "borrow" => Ok(TransactionAction::Borrow),
            "repay" => Ok(TransactionAction::Repay),
            "withdraw" => Ok(TransactionAction::Withdraw),
            "flash-loan" => Ok(TransactionAction::FlashLoan),
            other => Err(AppError::NotFound(format!("Unknown transaction action: {}", other))),
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates requests and encodes lending-pool calls. Nothing is signed or
/// sent; balances and allowances are not checked.
pub struct TransactionBuilder {
    pool: Address,
    chain_id: u64,
    registry: Arc<AssetRegistry>,
}

impl TransactionBuilder {
    pub fn new(pool: Address, chain_id: u64, registry: Arc<AssetRegistry>) -> Self {
        Self {
            pool,
            chain_id,
            registry,
        }
    }

    pub fn pool(&self) -> Address {
        self.pool
    }

    pub fn prepare(
        &self,
        action: TransactionAction,
        request: &PrepareTransactionRequest,
    ) -> Result<UnsignedTransaction, AppError> {
        let user = parse_address("userAddress", request.user_address.as_deref())?;
        let token = parse_address("tokenAddress", request.token_address.as_deref())?;
        let asset = self.registry.require(&token)?;
        let callback = request
            .callback_address
            .as_deref()
            .map(|candidate| parse_address("callbackAddress", Some(candidate)))
            .transpose()?;
        let amount = parse_amount(action, require_amount(request.amount.as_deref())?, asset.decimals)?;

        let (to, data) = match action {
            TransactionAction::Approve => (
                token,
                encode(IERC20::approveCall {
                    spender: self.pool,
                    amount,
                }),
            ),
            TransactionAction::Deposit => (
                self.pool,
                encode(ILendingPool::depositCall {
                    asset: token,
                    amount,
                    onBehalfOf: user,
                    referralCode: REFERRAL_CODE,
                }),
            ),
            TransactionAction::Borrow => {
                let mode = rate_mode(request.interest_rate_mode, None)?;
                (
                    self.pool,
                    encode(ILendingPool::borrowCall {
                        asset: token,
                        amount,
                        interestRateMode: mode,
                        referralCode: REFERRAL_CODE,
                        onBehalfOf: user,
                    }),
                )
            }
            TransactionAction::Repay => {
                let mode = rate_mode(request.interest_rate_mode, Some(VARIABLE_RATE_MODE))?;
                (
                    self.pool,
                    encode(ILendingPool::repayCall {
                        asset: token,
                        amount,
                        rateMode: mode,
                        onBehalfOf: user,
                    }),
                )
            }
            TransactionAction::Withdraw => (
                self.pool,
                encode(ILendingPool::withdrawCall {
                    asset: token,
                    amount,
                    to: user,
                }),
            ),
            TransactionAction::FlashLoan => (
                self.pool,
                encode(ILendingPool::flashLoanCall {
                    receiverAddress: callback.unwrap_or(user),
                    assets: vec![token],
                    amounts: vec![amount],
                    modes: vec![U256::from(NO_DEBT_MODE)],
                    onBehalfOf: user,
                    params: Bytes::from((user, amount).abi_encode_params()),
                    referralCode: REFERRAL_CODE,
                }),
            ),
        };

        info!(action = %action, user = %user, asset = %asset.symbol, "Prepared transaction");

        Ok(UnsignedTransaction {
            from: user,
            to,
            data,
            value: U256::ZERO,
            chain_id: self.chain_id,
        })
    }
}

fn encode<C: SolCall>(call: C) -> Bytes {
    Bytes::from(call.abi_encode())
}

fn parse_amount(action: TransactionAction, amount: &str, decimals: u8) -> Result<U256, AppError> {
    if amount.eq_ignore_ascii_case("max") {
        if action.allows_max_amount() {
            return Ok(U256::MAX);
        }
        return Err(AppError::ValidationError(format!(
            "\"max\" is not a valid amount for {}",
            action
        )));
    }

    let parsed = parse_units(amount, decimals)?;
    if parsed.is_zero() {
        return Err(AppError::ValidationError("Amount must be greater than zero".to_string()));
    }
    Ok(parsed)
}

fn rate_mode(requested: Option<u64>, default: Option<u64>) -> Result<U256, AppError> {
    match requested.or(default) {
        Some(mode @ (STABLE_RATE_MODE | VARIABLE_RATE_MODE)) => Ok(U256::from(mode)),
        Some(other) => Err(AppError::ValidationError(format!(
            "Invalid interestRateMode {}: expected 1 (stable) or 2 (variable)",
            other
        ))),
        None => Err(AppError::ValidationError("Missing required field: interestRateMode".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const POOL: Address = address!("7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9");
    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const USER: Address = address!("742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8");

    fn builder() -> TransactionBuilder {
        TransactionBuilder::new(POOL, 1, Arc::new(AssetRegistry::mainnet()))
    }

    fn request(amount: &str) -> PrepareTransactionRequest {
        PrepareTransactionRequest {
            user_address: Some(USER.to_string()),
            token_address: Some(USDC.to_string()),
            amount: Some(amount.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_action_from_path() {
        assert_eq!("flash-loan".parse::<TransactionAction>().unwrap(), TransactionAction::FlashLoan);
        assert!(matches!("liquidate".parse::<TransactionAction>(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_approve_targets_token_with_pool_as_spender() {
        let tx = builder().prepare(TransactionAction::Approve, &request("max")).unwrap();
        assert_eq!(tx.to, USDC);
        assert_eq!(tx.from, USER);
        assert_eq!(tx.value, U256::ZERO);

        let call = IERC20::approveCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.spender, POOL);
        assert_eq!(call.amount, U256::MAX);
    }

    #[test]
    fn test_deposit_uses_registry_decimals() {
        let tx = builder().prepare(TransactionAction::Deposit, &request("1.5")).unwrap();
        assert_eq!(tx.to, POOL);
        assert_eq!(tx.chain_id, 1);

        let call = ILendingPool::depositCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.asset, USDC);
        assert_eq!(call.amount, U256::from(1_500_000u64));
        assert_eq!(call.onBehalfOf, USER);
        assert_eq!(call.referralCode, 0);
    }

    #[test]
    fn test_borrow_requires_valid_rate_mode() {
        let mut req = request("100");
        assert!(matches!(
            builder().prepare(TransactionAction::Borrow, &req),
            Err(AppError::ValidationError(_))
        ));

        req.interest_rate_mode = Some(3);
        assert!(builder().prepare(TransactionAction::Borrow, &req).is_err());

        req.interest_rate_mode = Some(1);
        let tx = builder().prepare(TransactionAction::Borrow, &req).unwrap();
        let call = ILendingPool::borrowCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.interestRateMode, U256::from(1u64));
        assert_eq!(call.onBehalfOf, USER);
    }

    #[test]
    fn test_repay_defaults_to_variable_rate() {
        let tx = builder().prepare(TransactionAction::Repay, &request("max")).unwrap();
        let call = ILendingPool::repayCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.rateMode, U256::from(2u64));
        assert_eq!(call.amount, U256::MAX);
    }

    #[test]
    fn test_withdraw_sends_to_user() {
        let tx = builder().prepare(TransactionAction::Withdraw, &request("10")).unwrap();
        let call = ILendingPool::withdrawCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.to, USER);
        assert_eq!(call.amount, U256::from(10_000_000u64));
    }

    #[test]
    fn test_flash_loan_receiver_defaults_to_user() {
        let tx = builder().prepare(TransactionAction::FlashLoan, &request("1000")).unwrap();
        let call = ILendingPool::flashLoanCall::abi_decode(&tx.data, true).unwrap();

        let amount = U256::from(1_000_000_000u64);
        assert_eq!(call.receiverAddress, USER);
        assert_eq!(call.assets, vec![USDC]);
        assert_eq!(call.amounts, vec![amount]);
        assert_eq!(call.modes, vec![U256::ZERO]);
        assert_eq!(call.params.to_vec(), (USER, amount).abi_encode_params());
    }

    #[test]
    fn test_flash_loan_uses_callback_receiver() {
        let receiver = address!("1111111111111111111111111111111111111111");
        let mut req = request("1");
        req.callback_address = Some(receiver.to_string());

        let tx = builder().prepare(TransactionAction::FlashLoan, &req).unwrap();
        let call = ILendingPool::flashLoanCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(call.receiverAddress, receiver);
    }

    #[test]
    fn test_rejections_happen_before_encoding() {
        let mut req = request("1");
        req.token_address = Some("0x0000000000000000000000000000000000000001".to_string());
        assert!(matches!(
            builder().prepare(TransactionAction::Deposit, &req),
            Err(AppError::ValidationError(_))
        ));

        assert!(builder().prepare(TransactionAction::Deposit, &request("max")).is_err());
        assert!(builder().prepare(TransactionAction::Deposit, &request("0")).is_err());
        assert!(builder().prepare(TransactionAction::Deposit, &request("")).is_err());

        let mut req = request("1");
        req.callback_address = Some("0xnope".to_string());
        assert!(builder().prepare(TransactionAction::FlashLoan, &req).is_err());
    }
}
