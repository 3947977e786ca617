pub mod applicator;
pub mod catalog;
pub mod schema;
pub mod settings;

pub use applicator::{
    apply_patch, apply_patches, check_patch, check_patches, ApplicationError, PatchResult,
};
pub use catalog::{builtin_patches, PACKAGE};
pub use schema::{PatchSpec, ValidationError, ValidationIssue};
pub use settings::{LocatorSettings, RootSource};
