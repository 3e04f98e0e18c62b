//! Wire format of the echo endpoint.
//!
//! Frames carry opaque UTF-8 text. Every inbound text frame is answered with
//! exactly one outbound text frame built by [`format_reply`].

/// Literal prepended to every echoed frame
pub const REPLY_PREFIX: &str = "Message received: ";

/// Build the reply for one inbound text frame. The input is copied verbatim.
pub fn format_reply(text: &str) -> String {
    let mut reply = String::with_capacity(REPLY_PREFIX.len() + text.len());
    reply.push_str(REPLY_PREFIX);
    reply.push_str(text);
    reply
}
