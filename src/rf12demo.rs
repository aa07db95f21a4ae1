//! Parser for the text lines printed by the RF12demo receiver sketch.
//!
//! A packet received from a room node looks like:
//!
//! ```text
//! OK 2 3 156 149 213 0
//!    ^ ^ -------------
//!    | |   data bytes
//!    | kind byte:   [reserved:1][kind:7]
//!    header byte:   [CTL][DST][ACK][node id:5]
//! ```

use std::str::FromStr;

use thiserror::Error;

use crate::node::NodeKind;

const NODE_ID_MASK: u8 = 0x1f;
const RESERVED_BIT: u8 = 0x80;
const KIND_MASK: u8 = 0x7f;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("garbage received: {0:?}")]
    Garbage(String),

    #[error("reserved bit set in kind byte from node {node_id}")]
    ReservedBit { node_id: u8 },

    #[error("invalid byte {0:?}")]
    InvalidByte(String),
}

/// One decoded radio packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub node_id: u8,
    pub kind: NodeKind,
    pub payload: Vec<u8>,
}

impl FromStr for Packet {
    type Err = LineError;

    fn from_str(line: &str) -> Result<Self, LineError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            ["OK", header, kind, data @ ..] if !data.is_empty() => {
                let node_id = parse_byte(header)? & NODE_ID_MASK;

                let kind = parse_byte(kind)?;
                if kind & RESERVED_BIT != 0 {
                    return Err(LineError::ReservedBit { node_id });
                }

                let payload = data
                    .iter()
                    .map(|token| parse_byte(token))
                    .collect::<Result<Vec<u8>, _>>()?;

                Ok(Packet {
                    node_id,
                    kind: NodeKind::from(kind & KIND_MASK),
                    payload,
                })
            }
            _ => Err(LineError::Garbage(line.trim().to_owned())),
        }
    }
}

fn parse_byte(token: &str) -> Result<u8, LineError> {
    token
        .parse()
        .map_err(|_| LineError::InvalidByte(token.to_owned()))
}
