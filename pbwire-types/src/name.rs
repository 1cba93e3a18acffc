//! Fully-qualified message names.

use pbwire_codec::Message;

/// Associates a message type with its Protocol Buffers name.
///
/// The type URL is the full name prefixed with `/`, which is how
/// [`Any`](crate::Any) identifies packed messages.
pub trait Name: Message {
    /// Message name, without the package.
    const NAME: &'static str;
    /// Package the message is declared in.
    const PACKAGE: &'static str;

    fn full_name() -> String {
        format!("{}.{}", Self::PACKAGE, Self::NAME)
    }

    fn type_url() -> String {
        format!("/{}", Self::full_name())
    }
}

/// Returns the full message name a type URL refers to: everything after the
/// last `/`.
pub(crate) fn full_name_of(type_url: &str) -> Option<&str> {
    type_url
        .rsplit_once('/')
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty())
}
