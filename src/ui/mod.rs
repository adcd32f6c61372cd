pub mod display;
pub mod layout;
