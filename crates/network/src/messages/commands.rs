//! Message command and flag identifiers (mirrors `Neo.Network.P2P.MessageCommand`).

use crate::NetworkError;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Neo message command (single-byte discriminator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageCommand {
    Version,
    Verack,
    GetAddr,
    Addr,
    Ping,
    Pong,
    GetHeaders,
    Headers,
    GetBlocks,
    Mempool,
    Inv,
    GetData,
    GetBlockByIndex,
    NotFound,
    Transaction,
    Block,
    Extensible,
    Reject,
    FilterLoad,
    FilterAdd,
    FilterClear,
    MerkleBlock,
    Alert,
    /// Command value that is not recognised by this implementation.
    Unknown(u8),
}

#[allow(non_upper_case_globals)]
impl MessageCommand {
    // SCREAMING_SNAKE_CASE aliases used by the wire-protocol dispatch code
    // (`protocol.rs`, `network.rs`), which matches each command against a
    // `MessageCommand` value rather than pattern-matching variants directly.
    pub const VERSION: Self = Self::Version;
    pub const VERACK: Self = Self::Verack;
    pub const GETADDR: Self = Self::GetAddr;
    pub const ADDR: Self = Self::Addr;
    pub const PING: Self = Self::Ping;
    pub const PONG: Self = Self::Pong;
    pub const GETHEADERS: Self = Self::GetHeaders;
    pub const HEADERS: Self = Self::Headers;
    pub const GETBLOCKS: Self = Self::GetBlocks;
    pub const MEMPOOL: Self = Self::Mempool;
    pub const INV: Self = Self::Inv;
    pub const GETDATA: Self = Self::GetData;
    pub const GETBLOCKS_BY_INDEX: Self = Self::GetBlockByIndex;
    pub const TX: Self = Self::Transaction;
    pub const BLOCK: Self = Self::Block;
    pub const NOTFOUND: Self = Self::NotFound;
    pub const REJECT: Self = Self::Reject;
    pub const FILTERLOAD: Self = Self::FilterLoad;
    pub const FILTERADD: Self = Self::FilterAdd;
    pub const FILTERCLEAR: Self = Self::FilterClear;
    pub const MERKLEBLOCK: Self = Self::MerkleBlock;
    pub const ALERT: Self = Self::Alert;

    /// Returns the wire-format byte associated with the command.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Version => 0x00,
            Self::Verack => 0x01,
            Self::GetAddr => 0x10,
            Self::Addr => 0x11,
            Self::Ping => 0x18,
            Self::Pong => 0x19,
            Self::GetHeaders => 0x20,
            Self::Headers => 0x21,
            Self::GetBlocks => 0x24,
            Self::Mempool => 0x25,
            Self::Inv => 0x27,
            Self::GetData => 0x28,
            Self::GetBlockByIndex => 0x29,
            Self::NotFound => 0x2a,
            Self::Transaction => 0x2b,
            Self::Block => 0x2c,
            Self::Extensible => 0x2e,
            Self::Reject => 0x2f,
            Self::FilterLoad => 0x30,
            Self::FilterAdd => 0x31,
            Self::FilterClear => 0x32,
            Self::MerkleBlock => 0x38,
            Self::Alert => 0x40,
            Self::Unknown(value) => value,
        }
    }

    /// Alias for [`to_byte`]; retained for backward compatibility.
    pub fn as_byte(self) -> u8 {
        self.to_byte()
    }

    /// Creates a command value from its byte representation.
    pub fn from_byte(byte: u8) -> Result<Self, NetworkError> {
        Ok(match byte {
            0x00 => Self::Version,
            0x01 => Self::Verack,
            0x10 => Self::GetAddr,
            0x11 => Self::Addr,
            0x18 => Self::Ping,
            0x19 => Self::Pong,
            0x20 => Self::GetHeaders,
            0x21 => Self::Headers,
            0x24 => Self::GetBlocks,
            0x25 => Self::Mempool,
            0x27 => Self::Inv,
            0x28 => Self::GetData,
            0x29 => Self::GetBlockByIndex,
            0x2a => Self::NotFound,
            0x2b => Self::Transaction,
            0x2c => Self::Block,
            0x2e => Self::Extensible,
            0x2f => Self::Reject,
            0x30 => Self::FilterLoad,
            0x31 => Self::FilterAdd,
            0x32 => Self::FilterClear,
            0x38 => Self::MerkleBlock,
            0x40 => Self::Alert,
            other => Self::Unknown(other),
        })
    }

    /// Returns the canonical string representation used by the Neo protocol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Verack => "verack",
            Self::GetAddr => "getaddr",
            Self::Addr => "addr",
            Self::Ping => "ping",
            Self::Pong => "pong",
            Self::GetHeaders => "getheaders",
            Self::Headers => "headers",
            Self::GetBlocks => "getblocks",
            Self::Mempool => "mempool",
            Self::Inv => "inv",
            Self::GetData => "getdata",
            Self::GetBlockByIndex => "getblkbyidx",
            Self::NotFound => "notfound",
            Self::Transaction => "tx",
            Self::Block => "block",
            Self::Extensible => "extensible",
            Self::Reject => "reject",
            Self::FilterLoad => "filterload",
            Self::FilterAdd => "filteradd",
            Self::FilterClear => "filterclear",
            Self::MerkleBlock => "merkleblock",
            Self::Alert => "alert",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Parses a command from its textual form.
    pub fn parse_str(s: &str) -> Result<Self, NetworkError> {
        match s {
            "version" => Ok(Self::Version),
            "verack" => Ok(Self::Verack),
            "getaddr" => Ok(Self::GetAddr),
            "addr" => Ok(Self::Addr),
            "ping" => Ok(Self::Ping),
            "pong" => Ok(Self::Pong),
            "getheaders" => Ok(Self::GetHeaders),
            "headers" => Ok(Self::Headers),
            "getblocks" => Ok(Self::GetBlocks),
            "mempool" => Ok(Self::Mempool),
            "inv" => Ok(Self::Inv),
            "getdata" => Ok(Self::GetData),
            "getblkbyidx" => Ok(Self::GetBlockByIndex),
            "notfound" => Ok(Self::NotFound),
            "tx" => Ok(Self::Transaction),
            "block" => Ok(Self::Block),
            "extensible" => Ok(Self::Extensible),
            "reject" => Ok(Self::Reject),
            "filterload" => Ok(Self::FilterLoad),
            "filteradd" => Ok(Self::FilterAdd),
            "filterclear" => Ok(Self::FilterClear),
            "merkleblock" => Ok(Self::MerkleBlock),
            "alert" => Ok(Self::Alert),
            "unknown" => Ok(Self::Unknown(0xff)),
            other => Err(NetworkError::ProtocolViolation {
                peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                violation: format!("Unknown message command: {}", other),
            }),
        }
    }

    /// Parses a command from its textual form, falling back to `Unknown(0xff)`
    /// for any string not recognised by the Neo protocol.
    pub fn new(s: &str) -> Self {
        Self::parse_str(s).unwrap_or(Self::Unknown(0xff))
    }

    /// Returns `true` when the command is part of the official Neo enumeration.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Encodes the command as a 12-byte, zero-padded ASCII field (wire header format).
    pub fn as_bytes(&self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        let name = self.as_str().as_bytes();
        let len = name.len().min(12);
        bytes[..len].copy_from_slice(&name[..len]);
        bytes
    }
}

impl fmt::Display for MessageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageCommand {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageCommand::parse_str(s)
    }
}

impl Serialize for MessageCommand {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.to_byte())
    }
}

impl<'de> Deserialize<'de> for MessageCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        MessageCommand::from_byte(value).map_err(D::Error::custom)
    }
}

/// Per-message wire flags (matches C# `Neo.Network.P2P.MessageFlags`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageFlags {
    None,
    Compressed,
}

impl MessageFlags {
    pub fn to_byte(self) -> u8 {
        match self {
            Self::None => 0x00,
            Self::Compressed => 0x01,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self, NetworkError> {
        match byte {
            0x00 => Ok(Self::None),
            0x01 => Ok(Self::Compressed),
            other => Err(NetworkError::ProtocolViolation {
                peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                violation: format!("Unknown message flags: {:#x}", other),
            }),
        }
    }

    pub fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed)
    }
}

/// Helper functions for variable-length encoding used in Neo 3
pub mod varlen {
    use crate::NetworkError;

    /// Encodes a length value using Neo variable-length encoding.
    pub fn encode_length(len: usize) -> Vec<u8> {
        if len <= 0xfc {
            vec![len as u8]
        } else if len <= 0xffff {
            let mut bytes = vec![0xfd];
            bytes.extend_from_slice(&(len as u16).to_le_bytes());
            bytes
        } else if len <= 0xffffffff {
            let mut bytes = vec![0xfe];
            bytes.extend_from_slice(&(len as u32).to_le_bytes());
            bytes
        } else {
            let mut bytes = vec![0xff];
            bytes.extend_from_slice(&(len as u64).to_le_bytes());
            bytes
        }
    }

    /// Decodes a length value from Neo variable-length encoding.
    pub fn decode_length(bytes: &[u8]) -> Result<(usize, usize), NetworkError> {
        if bytes.is_empty() {
            return Err(NetworkError::ProtocolViolation {
                peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                violation: "Empty length data".to_string(),
            });
        }

        match bytes[0] {
            value @ 0..=252 => Ok((value as usize, 1)),
            0xfd => {
                if bytes.len() < 3 {
                    return Err(NetworkError::ProtocolViolation {
                        peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                        violation: "Insufficient data for 2-byte length".to_string(),
                    });
                }
                let len = u16::from_le_bytes([bytes[1], bytes[2]]) as usize;
                Ok((len, 3))
            }
            0xfe => {
                if bytes.len() < 5 {
                    return Err(NetworkError::ProtocolViolation {
                        peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                        violation: "Insufficient data for 4-byte length".to_string(),
                    });
                }
                let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
                Ok((len, 5))
            }
            0xff => {
                if bytes.len() < 9 {
                    return Err(NetworkError::ProtocolViolation {
                        peer: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
                        violation: "Insufficient data for 8-byte length".to_string(),
                    });
                }
                let len = u64::from_le_bytes([
                    bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7], bytes[8],
                ]) as usize;
                Ok((len, 9))
            }
        }
    }
}
