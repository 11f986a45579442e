//! Wire contract shared by the console and the transport.
//!
//! Messages are plain text, at most [`MSG_MAX_LEN`] bytes, normally ending
//! in a newline. The two-character line `"!\n"` is reserved: whichever
//! pipeline it travels through shuts down after delivering it.

/// Longest message either collaborator will hand over, in bytes.
pub const MSG_MAX_LEN: usize = 512;

/// The reserved hang-up message.
pub const SHUTDOWN_SENTINEL: &str = "!\n";

/// True for the exact sentinel line, nothing looser.
pub fn is_sentinel(message: &str) -> bool {
    message == SHUTDOWN_SENTINEL
}

/// Clamps a console line to [`MSG_MAX_LEN`] bytes, cutting on a character
/// boundary. Short lines pass through untouched, newline and all.
pub fn clamp_line(mut line: String) -> String {
    if line.len() > MSG_MAX_LEN {
        let mut cut = MSG_MAX_LEN;
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
    }
    line
}

/// Turns a received datagram into an owned message, keeping at most
/// [`MSG_MAX_LEN`] bytes and replacing invalid UTF-8 rather than failing.
pub fn decode_datagram(payload: &[u8]) -> String {
    let len = payload.len().min(MSG_MAX_LEN);
    String::from_utf8_lossy(&payload[..len]).into_owned()
}
