//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod character_source;

#[cfg(test)]
pub use character_source::MockCharacterSource;
pub use character_source::{
    CharacterSource, CharacterSourceError, FixtureCharacterSource, FixtureSourceError,
};
