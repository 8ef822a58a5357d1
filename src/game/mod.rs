// Public API
pub use errors::GameError;
pub use scoring::points_for_answer;
pub use service::{AnswerOutcome, GameService, GameSettings, RoomSnapshot};
pub use timer::QuestionTimer;
pub use usernames::{PetNameUsernameGenerator, UsernameGenerator};

// Internal modules
mod errors;
mod scoring;
mod service;
mod timer;
mod usernames;
