// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.

pub mod constants;
pub mod types;
pub mod helpers;
pub mod methods;

pub use constants::*;
pub use types::*;
pub use helpers::*;
