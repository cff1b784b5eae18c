pub mod elapsed;
pub mod reminder;
