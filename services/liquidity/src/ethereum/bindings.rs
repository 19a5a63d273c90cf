//! Contract bindings generated from human-readable ABIs
//!
//! Each binding lives in its own module so generated type names cannot collide.

pub mod router {
    use ethers::prelude::abigen;

    abigen!(
        IUniswapV2Router02,
        r#"[
            function WETH() external pure returns (address)
            function addLiquidity(address tokenA, address tokenB, uint256 amountADesired, uint256 amountBDesired, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB, uint256 liquidity)
            function addLiquidityETH(address token, uint256 amountTokenDesired, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity)
            function removeLiquidity(address tokenA, address tokenB, uint256 liquidity, uint256 amountAMin, uint256 amountBMin, address to, uint256 deadline) external returns (uint256 amountA, uint256 amountB)
            function removeLiquidityETH(address token, uint256 liquidity, uint256 amountTokenMin, uint256 amountETHMin, address to, uint256 deadline) external returns (uint256 amountToken, uint256 amountETH)
        ]"#
    );
}

pub mod factory {
    use ethers::prelude::abigen;

    abigen!(
        IUniswapV2Factory,
        r#"[
            function getPair(address tokenA, address tokenB) external view returns (address pair)
        ]"#
    );
}

pub mod erc20 {
    use ethers::prelude::abigen;

    // approve is declared without a return value: tokens such as USDT return nothing
    abigen!(
        IERC20,
        r#"[
            function approve(address spender, uint256 amount) external
            function balanceOf(address owner) external view returns (uint256)
        ]"#
    );
}

pub use erc20::IERC20;
pub use factory::IUniswapV2Factory;
pub use router::IUniswapV2Router02;
