use alloy::sol;

// Published interfaces of the on-chain collaborators. The factory and the
// tokens it instantiates are external black boxes; this is the entire
// surface the core touches.
sol! {
    struct TokenParams {
        string name;
        string symbol;
        uint8 decimals;
        uint256 initialSupply;
        uint256 maxSupply;
        bool burnable;
        bool mintable;
        bool transferFees;
        bool holderRedistribution;
        uint256 buyFee;
        uint256 sellFee;
        address feeRecipient;
    }

    struct VestingParams {
        uint256 percentage;
        uint256 startTime;
        uint256 duration;
        bool enabled;
    }

    #[sol(rpc)]
    interface ITokenFactory {
        function createToken(TokenParams calldata config, VestingParams[] calldata vesting) external payable returns (address token);
        function getUserTokens(address user) external view returns (address[] memory tokens);
        function deploymentFee() external view returns (uint256 fee);

        event TokenCreated(address indexed tokenAddress, address indexed creator, string name, string symbol, uint256 initialSupply);
    }

    #[sol(rpc)]
    interface IManagedToken {
        function name() external view returns (string memory tokenName);
        function symbol() external view returns (string memory tokenSymbol);
        function decimals() external view returns (uint8 tokenDecimals);
        function totalSupply() external view returns (uint256 supply);
        function balanceOf(address holder) external view returns (uint256 balance);
        function owner() external view returns (address tokenOwner);
    }
}
