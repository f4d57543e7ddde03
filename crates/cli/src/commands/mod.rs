pub mod campaign;
pub mod checkout;
pub mod configure;
pub mod link;
pub mod seed;
