//! Row model variants shown by the console tables

pub mod check_in;
pub mod tracking;
pub mod transfer;

pub use check_in::CheckInRow;
pub use tracking::TrackingRow;
pub use transfer::TransferRow;
