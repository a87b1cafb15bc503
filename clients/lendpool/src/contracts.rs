//! Contract interfaces generated via alloy's sol! macro.

use alloy::sol;

sol! {
    // Faucet-style router that mints testnet tokens to any account
    #[sol(rpc)]
    interface IMintRouter {
        function mint(address _asset, address _account, uint256 _amount) external;
    }

    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    // Lending pool router. borrow is only declared to cross-check the manual calldata encoding.
    #[sol(rpc)]
    interface ILendingPool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256 amountWithdrawn);
        function borrow(address asset, uint256 amount, uint256 interestRateMode, uint16 referralCode, address onBehalfOf) external;
    }
}
