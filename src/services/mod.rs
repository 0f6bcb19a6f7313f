pub mod protocol_data;
pub mod reserve_aggregator;
pub mod transaction_builder;
pub mod tvl_series;

pub use protocol_data::ProtocolDataService;
pub use reserve_aggregator::ReserveAggregator;
pub use transaction_builder::{TransactionAction, TransactionBuilder};
