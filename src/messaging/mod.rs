pub mod hub;
pub mod redpanda;

pub use hub::HubGateway;
pub use redpanda::RedpandaHubGateway;
