//! Wire types exchanged with the payment provider.

pub mod checkout;
pub mod extract;
pub mod notification;
pub mod status;

pub use checkout::{CheckoutRequest, CheckoutSession, Customer};
pub use notification::{CallbackHeaders, PaymentNotification};
pub use status::{TransactionStatus, TransactionStatusReport};
