use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use once_cell::sync::Lazy;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DbError;

const ID_LEN: usize = 12;
const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: Lazy<[u8; 5]> = Lazy::new(|| {
    let random = uuid::Uuid::new_v4();
    let mut bytes = [0u8; 5];
    bytes.copy_from_slice(&random.as_bytes()[..5]);
    bytes
});

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Store-assigned document identifier.
///
/// Twelve bytes: seconds since the epoch (big-endian), five bytes unique to
/// the process, and a three byte counter. Ordering of ids issued by one
/// process follows issue order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; ID_LEN]);

impl ObjectId {
    /// Issues a new identifier.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as u32)
            .unwrap_or_default();
        let counter = COUNTER.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK;

        let mut bytes = [0u8; ID_LEN];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; ID_LEN] {
        self.0
    }

    /// Parses the 24-character hexadecimal form.
    pub fn parse_str(value: &str) -> Result<Self, DbError> {
        let malformed = || DbError::MalformedId(value.to_string());
        if value.len() != ID_LEN * 2 || !value.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(malformed());
        }

        let mut bytes = [0u8; ID_LEN];
        for (index, byte) in bytes.iter_mut().enumerate() {
            let pair = &value[index * 2..index * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| malformed())?;
        }
        Ok(Self(bytes))
    }

    /// Whether `value` is a syntactically valid identifier.
    pub fn is_valid(value: &str) -> bool {
        Self::parse_str(value).is_ok()
    }

    /// Seconds since the epoch at which the id was issued.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl FromStr for ObjectId {
    type Err = DbError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_str(value)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse_str(&value).map_err(de::Error::custom)
    }
}
