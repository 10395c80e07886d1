pub mod failure;
pub mod windows_helpers;
