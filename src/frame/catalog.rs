//! Frame Catalog: wire encodings of every supervisory frame.
//!
//! Wire format (5 bytes):
//! ```text
//! +------+---------+---------+-----------------+------+
//! | FLAG | ADDRESS | CONTROL | ADDRESS^CONTROL | FLAG |
//! | 0x7E |   (1)   |   (1)   |       (1)       | 0x7E |
//! +------+---------+---------+-----------------+------+
//! ```
//!
//! Addresses follow the HDLC command/response convention: a reply carries the
//! address of the command it answers.

use std::fmt;

use crate::core::{
    ADDR_INITIATOR_COMMAND, ADDR_RESPONDER_COMMAND, CTRL_DISC, CTRL_SET, CTRL_UA, FLAG,
    SUPERVISORY_FRAME_LEN,
};

/// Control field of a supervisory frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Control {
    /// Connection setup.
    Set = CTRL_SET,
    /// Unnumbered acknowledgment.
    Ua = CTRL_UA,
    /// Disconnect.
    Disc = CTRL_DISC,
}

impl Control {
    /// Parse a control field from a byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CTRL_SET => Some(Self::Set),
            CTRL_UA => Some(Self::Ua),
            CTRL_DISC => Some(Self::Disc),
            _ => None,
        }
    }

    /// Convert to the wire byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Fixed header of one supervisory frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SupervisoryFrame {
    /// Address field.
    pub address: u8,
    /// Control field.
    pub control: u8,
}

impl SupervisoryFrame {
    /// Create a descriptor from raw address and control bytes.
    pub const fn new(address: u8, control: u8) -> Self {
        Self { address, control }
    }

    /// Header check byte: `address XOR control`.
    pub const fn bcc(&self) -> u8 {
        self.address ^ self.control
    }

    /// Encode the full frame including both delimiters.
    pub const fn encode(&self) -> [u8; SUPERVISORY_FRAME_LEN] {
        [FLAG, self.address, self.control, self.bcc(), FLAG]
    }

    /// Parse an exact 5-byte frame, checking delimiters and BCC.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match *bytes {
            [FLAG, address, control, bcc, FLAG] if bcc == address ^ control => {
                Some(Self { address, control })
            }
            _ => None,
        }
    }
}

/// The five supervisory frames the protocol can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// SET, sent by the initiator to open the link.
    Set,
    /// UA sent by the initiator, answering the responder's DISC.
    UaFromInitiator,
    /// UA sent by the responder, answering SET.
    UaFromResponder,
    /// DISC sent by the initiator to start teardown.
    DiscFromInitiator,
    /// DISC sent by the responder, answering the initiator's DISC.
    DiscFromResponder,
}

impl FrameKind {
    /// All kinds, in catalog order.
    pub const ALL: [FrameKind; 5] = [
        Self::Set,
        Self::UaFromInitiator,
        Self::UaFromResponder,
        Self::DiscFromInitiator,
        Self::DiscFromResponder,
    ];

    /// Header of this frame kind.
    pub const fn descriptor(self) -> SupervisoryFrame {
        match self {
            Self::Set => SupervisoryFrame::new(ADDR_INITIATOR_COMMAND, CTRL_SET),
            Self::UaFromInitiator => SupervisoryFrame::new(ADDR_RESPONDER_COMMAND, CTRL_UA),
            Self::UaFromResponder => SupervisoryFrame::new(ADDR_INITIATOR_COMMAND, CTRL_UA),
            Self::DiscFromInitiator => SupervisoryFrame::new(ADDR_INITIATOR_COMMAND, CTRL_DISC),
            Self::DiscFromResponder => SupervisoryFrame::new(ADDR_RESPONDER_COMMAND, CTRL_DISC),
        }
    }

    /// Precomputed wire bytes for this frame kind.
    pub fn bytes(self) -> &'static [u8; SUPERVISORY_FRAME_LEN] {
        &CATALOG[self as usize]
    }

    /// Identify the kind of an encoded frame.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let frame = SupervisoryFrame::decode(bytes)?;
        Self::ALL.into_iter().find(|kind| kind.descriptor() == frame)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match Control::from_byte(self.descriptor().control) {
            Some(Control::Set) => "SET",
            Some(Control::Ua) => "UA",
            Some(Control::Disc) => "DISC",
            None => "?",
        };
        match self {
            Self::Set => f.write_str(name),
            Self::UaFromInitiator | Self::DiscFromInitiator => write!(f, "{name}(initiator)"),
            Self::UaFromResponder | Self::DiscFromResponder => write!(f, "{name}(responder)"),
        }
    }
}

const CATALOG: [[u8; SUPERVISORY_FRAME_LEN]; 5] = [
    FrameKind::Set.descriptor().encode(),
    FrameKind::UaFromInitiator.descriptor().encode(),
    FrameKind::UaFromResponder.descriptor().encode(),
    FrameKind::DiscFromInitiator.descriptor().encode(),
    FrameKind::DiscFromResponder.descriptor().encode(),
];

// A BCC equal to FLAG would make the synchronizer ambiguous.
const _: () = {
    let mut i = 0;
    while i < CATALOG.len() {
        assert!(CATALOG[i][3] != FLAG);
        assert!(CATALOG[i][1] != FLAG && CATALOG[i][2] != FLAG);
        i += 1;
    }
};
