pub mod chain_reader;
pub mod contracts;
pub mod ethereum_client;

pub use chain_reader::{AlloyChainReader, ChainReader};
pub use ethereum_client::EthereumClient;
