//! External collaborators consumed by the form controller

mod traits;

pub use traits::{InitialValueBundle, InitialValueResolver, KeyTranslator, Translator};

#[cfg(test)]
pub use traits::{MockInitialValueResolver, MockTranslator};
