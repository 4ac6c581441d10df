//! Wire DTOs shared by the client, transaction helper and reward audits.

pub mod network;
pub mod node;
pub mod rewards;
pub mod storage;
pub mod transaction;
pub mod wallet;

pub use network::{HealthyServiceProviders, MinerStats, NetworkDetails, NodeRole, ScState, SharderStats};
pub use node::{DelegatePool, Node, NodeList, NodeSettings, SimpleNode, StakePool};
pub use rewards::{BlockSummary, BlockTransaction, DelegateReward, ProviderReward, RewardType};
pub use storage::{
    Allocation, AllocationBlobbers, BlobberAuth, BlobberRequirements, Challenge, FileRefPath, FileRefs, HashNode,
    OpenChallenges, PriceRange, StakePoolStat, StorageNode, StorageNodes, UpdateAllocationRequest,
};
pub use transaction::{
    Balance, Confirmation, ProviderType, TransactionData, TransactionEntity, TransactionPutRequest,
    TransactionPutResponse, TxStatus,
};
pub use wallet::{NonceGuard, Wallet, WalletRegistration};
