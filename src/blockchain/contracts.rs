use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ILendingPool {
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralETH,
            uint256 totalDebtETH,
            uint256 availableBorrowsETH,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );

        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;

        function withdraw(address asset, uint256 amount, address to) external returns (uint256);

        function borrow(
            address asset,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode,
            address onBehalfOf
        ) external;

        function repay(address asset, uint256 amount, uint256 rateMode, address onBehalfOf) external returns (uint256);

        function flashLoan(
            address receiverAddress,
            address[] calldata assets,
            uint256[] calldata amounts,
            uint256[] calldata modes,
            address onBehalfOf,
            bytes calldata params,
            uint16 referralCode
        ) external;
    }

    // lastUpdateTimestamp is a uint40 on-chain; it decodes from the same word.
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IProtocolDataProvider {
        function getReserveData(address asset) external view returns (
            uint256 availableLiquidity,
            uint256 totalStableDebt,
            uint256 totalVariableDebt,
            uint256 liquidityRate,
            uint256 variableBorrowRate,
            uint256 stableBorrowRate,
            uint256 averageStableBorrowRate,
            uint256 liquidityIndex,
            uint256 variableBorrowIndex,
            uint256 lastUpdateTimestamp
        );
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function decimals() external view returns (uint8);
    }
}
