pub mod cell_key;
pub mod reconstruct;
pub mod validator;

pub use cell_key::CellKey;
pub use reconstruct::reconstruct;
pub use validator::{validate, ValidationResult};
