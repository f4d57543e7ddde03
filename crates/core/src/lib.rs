pub mod bridge;
pub mod campaign;
pub mod checkout;
pub mod db;
pub mod fee;
pub mod link;
pub mod render;
pub mod secrets;
pub mod settlement;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, Collaborators};
pub use checkout::CheckoutDecorator;
pub use db::FundlinkDb;
pub use link::{AccountLinker, HandshakeOutcome, LinkSettings};
pub use secrets::SecretStore;
pub use settlement::SettlementResolver;
pub use workspace::init_workspace;
