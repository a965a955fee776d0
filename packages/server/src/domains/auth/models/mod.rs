pub mod one_time_code;
pub mod platform_contact;

pub use one_time_code::OneTimeCode;
pub use platform_contact::{ContactUpsert, PlatformContact};
