//! Turning caught panics into structured detail for error responses.
//!
//! `HandlerUncaught` and `InitUncaught` carry the panic message as debug
//! detail without taking the daemon down: handlers run inside
//! `catch_unwind`, and the payload is converted here.

use std::any::Any;
use std::borrow::Cow;

pub const NON_STRING_PANIC_PAYLOAD: &str = "<non-string panic payload>";

/// Debug-only detail describing a caught panic, suitable for inclusion in a
/// `HandlerUncaught`/`InitUncaught`/`BacklogFailure` error's debug field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicDetail {
    pub message: String,
}

#[inline]
fn panic_payload_to_str(payload: &(dyn Any + Send)) -> Cow<'_, str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return Cow::Borrowed(message);
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return Cow::Borrowed(message.as_str());
    }
    Cow::Borrowed(NON_STRING_PANIC_PAYLOAD)
}

pub fn describe_panic(payload: &(dyn Any + Send)) -> PanicDetail {
    PanicDetail {
        message: panic_payload_to_str(payload).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom".to_string());
        assert_eq!(describe_panic(payload.as_ref()).message, "boom");
    }

    #[test]
    fn describes_non_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42i32);
        assert_eq!(describe_panic(payload.as_ref()).message, NON_STRING_PANIC_PAYLOAD);
    }
}
