use crate::game::GameError;

pub const MAX_USERNAME_LEN: usize = 32;

/// Trait for generating usernames
pub trait UsernameGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Pet name-based username generator, used when a client joins without a name
pub struct PetNameUsernameGenerator;

impl PetNameUsernameGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PetNameUsernameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UsernameGenerator for PetNameUsernameGenerator {
    fn generate(&self) -> String {
        petname::Petnames::default().generate_one(2, "-")
    }
}

/// Trims the requested name, substituting a generated one when it is missing
/// or blank
pub fn resolve_username(
    requested: Option<&str>,
    generator: &dyn UsernameGenerator,
) -> Result<String, GameError> {
    let username = match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => generator.generate(),
    };

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(GameError::InvalidUsername(format!(
            "must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    Ok(username)
}
