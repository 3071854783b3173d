//! Domain types and rules, free of any transport or provider concerns.

pub mod amount;
pub mod intent;
pub mod payment;
pub mod ports;
pub mod tax_id;
