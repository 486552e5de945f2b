//! Solidity ABI surface of the relay-auth contract.
//!
//! Routing on the ledger side and calldata construction off-ledger both go through these
//! definitions, so selectors and encodings cannot drift apart.

use alloy_sol_types::sol;

sol! {
    /// Signed intent. Field order and names must match `META_TRANSACTION_TYPE`.
    #[derive(Debug, PartialEq, Eq)]
    struct MetaTransaction {
        uint256 nonce;
        address from;
        bytes functionData;
    }

    interface IOwnable {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }

    interface IInitializable {
        function initialize(string name, string version) external;
    }

    interface IReplayProtection {
        function getContractIndex() external view returns (uint256);
        function bumpContractIndex() external;
        function verifyContractIndex(uint256 index) external view;

        function getSignerIndex(address signer) external view returns (uint256);
        function bumpSignerIndex() external;
        function verifySignerIndex(address signer, uint256 index) external view;

        function getAssetIndex(address asset, uint256 id, address signer) external view returns (uint256);
        function bumpAssetIndex(address asset, uint256 id) external;
        function verifyAssetIndex(address asset, uint256 id, address signer, uint256 index) external view;
    }

    interface INativeMetaTransaction {
        function executeMetaTransaction(address userAddress, bytes functionData, bytes signature)
            external
            payable
            returns (bytes returnData);
        function getNonce(address user) external view returns (uint256);
        function verifyNonce(address user, uint256 nonce) external view;
        function getDomainSeparator() external view returns (bytes32);
        function getDomainNameHash() external view returns (bytes32);
        function getDomainVersionHash() external view returns (bytes32);
        function getChainId() external view returns (uint256);
    }
}
