//! Protocol constants for the supervisory frame exchange.
//!
//! These values are fixed by the wire format and MUST NOT be changed.

use std::time::Duration;

// =============================================================================
// FRAME DELIMITING
// =============================================================================

/// Reserved delimiter byte marking both ends of a frame.
pub const FLAG: u8 = 0x7E;

/// Length of every supervisory frame on the wire:
/// `FLAG | ADDRESS | CONTROL | BCC | FLAG`.
pub const SUPERVISORY_FRAME_LEN: usize = 5;

// =============================================================================
// ADDRESS FIELD
// =============================================================================

/// Address carried by commands sent by the initiator and by replies sent by
/// the responder.
pub const ADDR_INITIATOR_COMMAND: u8 = 0x03;

/// Address carried by commands sent by the responder and by replies sent by
/// the initiator.
pub const ADDR_RESPONDER_COMMAND: u8 = 0x01;

// =============================================================================
// CONTROL FIELD
// =============================================================================

/// Set up the connection.
pub const CTRL_SET: u8 = 0x03;

/// Unnumbered acknowledgment.
pub const CTRL_UA: u8 = 0x07;

/// Disconnect.
pub const CTRL_DISC: u8 = 0x0B;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default line rate.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default time to wait for an acknowledgment before retransmitting.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default number of retransmissions after the first send.
pub const DEFAULT_MAX_RETRANSMISSIONS: u32 = 3;

/// Line rates accepted by common UART drivers.
pub const STANDARD_BAUD_RATES: &[u32] = &[
    1200, 1800, 2400, 4800, 9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600,
];
