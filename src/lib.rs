pub mod allocation;
pub mod amount;
pub mod api;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod money;
pub mod session;
pub mod validation;

pub use amount::Amount;
pub use config::Config;
pub use model::{Allocation, Invoice, Payment, PaymentMode};
pub use money::MoneyValue;
pub use session::{PaymentSession, SessionError};
