//! Property definition traits.

use crate::context::Context;
use crate::error::PropertyError;

/// A property body, run once per iteration against the shared context
pub trait Property {
    /// Test the property, drawing whatever values it needs from `ctx`
    fn test(&mut self, ctx: &mut Context) -> Result<(), PropertyError>;
}

/// What a property closure may return
pub trait PropertyOutcome {
    fn into_result(self) -> Result<(), PropertyError>;
}

impl PropertyOutcome for () {
    fn into_result(self) -> Result<(), PropertyError> {
        Ok(())
    }
}

impl PropertyOutcome for bool {
    fn into_result(self) -> Result<(), PropertyError> {
        if self {
            Ok(())
        } else {
            Err(PropertyError::property_failed("property returned false"))
        }
    }
}

impl<E: Into<PropertyError>> PropertyOutcome for Result<(), E> {
    fn into_result(self) -> Result<(), PropertyError> {
        self.map_err(Into::into)
    }
}

impl<F, R> Property for F
where
    F: FnMut(&mut Context) -> R,
    R: PropertyOutcome,
{
    fn test(&mut self, ctx: &mut Context) -> Result<(), PropertyError> {
        self(ctx).into_result()
    }
}
