use crate::error::BoxError;

/// Custom text parsing for a type, taking precedence over the built-in
/// primitive and duration parsers.
///
/// Wire it into [`Reflect::text_hook`](crate::Reflect::text_hook) with
/// `#[reflect(text)]`, or generate it from `FromStr` with
/// `#[reflect(from_str)]`.
pub trait TextParsable {
    fn parse_text(&mut self, text: &str) -> Result<(), BoxError>;
}

/// Text parsing through a shared reference, for handles with interior
/// mutability. Checked before [`TextParsable`] on the same value.
pub trait SharedTextParsable {
    fn parse_text_shared(&self, text: &str) -> Result<(), BoxError>;
}
