pub mod data;
pub mod mask;

pub use data::{timestamp_email, DataHelper};
pub use mask::{mask_text, MASK};
