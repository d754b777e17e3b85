//! Processors behind the HTTP surface.
//!
//! - `KioskTrigger`: Receives `NotifyKiosk`, calls the print kiosk once
//! - `CallbackProcessor`: Receives `InboundNotification`, `BrowserReturn` or
//!   `ManualTrigger`, decides whether the payment is settled and drives
//!   `KioskTrigger`

pub mod callback;
pub mod kiosk;

pub use callback::{
    BrowserReturn, CallbackProcessor, CallbackVerdict, InboundNotification, ManualTrigger,
    ManualTriggerError, NotificationReceipt, RejectReason, ReturnOutcome, Settlement,
    TriggerReport,
};
pub use kiosk::{KIOSK_TIMEOUT, KioskError, KioskOutcome, KioskTrigger, NotifyKiosk};
