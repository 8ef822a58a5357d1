pub mod actions;
pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{question_text, MessageAssertion};
#[allow(unused_imports)]
pub use mocks::{FixedUsernameGenerator, MockConnectionManager};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder, GUEST_NAME};
