//! Record codec - the fixed-width user row.
//!
//! A [`Row`] is stored verbatim in the value region of a leaf cell:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     id (little-endian u32, also the B-tree key)
//! 4       33    username (32 bytes of text + NUL)
//! 37      256   email (255 bytes of text + NUL)
//! ------
//! 293     ROW_SIZE
//! ```
//!
//! Text columns are NUL-padded. No length prefixes, no encoding conversion.

use std::borrow::Cow;
use std::fmt;

use crate::common::{Error, Result};

/// Maximum username length in bytes.
pub const COLUMN_USERNAME_SIZE: usize = 32;
/// Maximum email length in bytes.
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = std::mem::size_of::<u32>();
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;
pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

/// One user record.
///
/// Immutable once built: it is serialized into a leaf cell on insert and
/// decoded fresh on every read.
///
/// # Example
/// ```
/// use stratadb::record::{self, Row, ROW_SIZE};
///
/// let row = Row::new(1, "alice", "alice@example.com").unwrap();
/// let mut slot = [0u8; ROW_SIZE];
/// record::serialize(&row, &mut slot);
/// assert_eq!(record::deserialize(&slot), row);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

impl Row {
    /// Build a row, checking both text fields fit their columns.
    ///
    /// # Errors
    /// Returns `Error::StringTooLong` if `username` exceeds 32 bytes or
    /// `email` exceeds 255 bytes.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        check_len("username", username, COLUMN_USERNAME_SIZE)?;
        check_len("email", email, COLUMN_EMAIL_SIZE)?;

        let mut row = Self {
            id,
            username: [0u8; USERNAME_SIZE],
            email: [0u8; EMAIL_SIZE],
        };
        row.username[..username.len()].copy_from_slice(username.as_bytes());
        row.email[..email.len()].copy_from_slice(email.as_bytes());
        Ok(row)
    }

    /// Username text up to the first NUL.
    pub fn username(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(until_nul(&self.username))
    }

    /// Email text up to the first NUL.
    pub fn email(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(until_nul(&self.email))
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.len() > max {
        return Err(Error::StringTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// Copy a row into a value slot.
///
/// # Panics
/// Panics if `dest` is shorter than `ROW_SIZE`.
pub fn serialize(row: &Row, dest: &mut [u8]) {
    assert!(dest.len() >= ROW_SIZE, "slot too small for Row");

    dest[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&row.id.to_le_bytes());
    dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&row.username);
    dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&row.email);
}

/// Decode a row from a value slot.
///
/// # Panics
/// Panics if `src` is shorter than `ROW_SIZE`.
pub fn deserialize(src: &[u8]) -> Row {
    assert!(src.len() >= ROW_SIZE, "slot too small for Row");

    let id = &src[ID_OFFSET..ID_OFFSET + ID_SIZE];
    let mut row = Row {
        id: u32::from_le_bytes([id[0], id[1], id[2], id[3]]),
        username: [0u8; USERNAME_SIZE],
        email: [0u8; EMAIL_SIZE],
    };
    row.username
        .copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
    row.email
        .copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);
    row
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("username", &self.username())
            .field("email", &self.email())
            .finish()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.username(), self.email())
    }
}
