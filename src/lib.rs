//! Bidirectional UDP chat built on an arena-backed list engine.
//!
//! Two copies of this program, pointed at each other's UDP ports, form a
//! minimal chat session: lines typed on one side appear on the other side's
//! screen. Typing `!` on a line of its own hangs up both ends.
//!
//! Each module focuses on a concrete responsibility:
//!
//! - [`arena`] hands out list headers and nodes from two fixed-capacity
//!   pools, with slot handles instead of raw pointers.
//! - [`list`] is a doubly linked list with a tri-state traversal cursor;
//!   every mutation and search is defined relative to the cursor.
//! - [`queue`] wraps one list into a blocking FIFO hand-off between a
//!   producer task and a consumer task.
//! - [`shutdown`] is the watch-channel termination signal every task
//!   observes at its suspension points.
//! - [`message`] holds the wire contract: the maximum message length, the
//!   hang-up sentinel, and truncation helpers.
//! - [`session`] wires the four worker tasks (keyboard reader, network
//!   sender, network receiver, screen printer) to two queues and a socket.
//! - [`cli`] parses the command-line interface.
//!
//! Integration tests use this crate directly to exercise the list engine,
//! the queues, and a full in-process session over loopback UDP.

pub mod arena;
pub mod cli;
pub mod list;
pub mod message;
pub mod queue;
pub mod session;
pub mod shutdown;
