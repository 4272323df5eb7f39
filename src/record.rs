//! Rows of the table, and their fixed-width on-page encoding.
//!
//! A serialized row is `ROW_SIZE` bytes:
//!
//! | Offset | Size | Field                                       |
//! |--------|------|---------------------------------------------|
//! | 0      | 4    | id, little-endian                           |
//! | 4      | 33   | username, NUL-padded                        |
//! | 37     | 256  | email, NUL-padded                           |
//!
//! Text columns are stored one byte wider than their column limit, so even a value at the limit
//! is NUL-terminated on disk.

use byteorder::{ByteOrder, LittleEndian};

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = std::mem::size_of::<u32>();
pub const USERNAME_SIZE: usize = COLUMN_USERNAME_SIZE + 1;
pub const EMAIL_SIZE: usize = COLUMN_EMAIL_SIZE + 1;

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;

pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("String is too long.")]
    StringTooLong { column: &'static str, len: usize },
}

/// One record of the table.  Text columns are held in their stored, NUL-padded form, so a row
/// can be copied in and out of a page without allocating.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Row {
    id: u32,
    username: [u8; USERNAME_SIZE],
    email: [u8; EMAIL_SIZE],
}

fn padded<const N: usize>(
    column: &'static str,
    limit: usize,
    value: &str,
) -> Result<[u8; N], Error> {
    let bytes = value.as_bytes();
    if bytes.len() > limit {
        return Err(Error::StringTooLong {
            column,
            len: bytes.len(),
        });
    }
    let mut out = [0_u8; N];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(out)
}

/// The stored bytes up to the first NUL.
fn trimmed(stored: &[u8]) -> &[u8] {
    match stored.iter().position(|b| *b == 0) {
        Some(end) => &stored[..end],
        None => stored,
    }
}

impl Row {
    /// Builds a row, rejecting a username over 32 bytes or an email over 255 bytes.
    pub fn new(id: u32, username: &str, email: &str) -> Result<Row, Error> {
        Ok(Row {
            id,
            username: padded::<USERNAME_SIZE>("username", COLUMN_USERNAME_SIZE, username)?,
            email: padded::<EMAIL_SIZE>("email", COLUMN_EMAIL_SIZE, email)?,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn username(&self) -> &[u8] {
        trimmed(&self.username)
    }

    pub fn email(&self) -> &[u8] {
        trimmed(&self.email)
    }

    /// Writes the row into the first `ROW_SIZE` bytes of `dest`.
    pub fn serialize(&self, dest: &mut [u8]) {
        LittleEndian::write_u32(&mut dest[ID_OFFSET..ID_OFFSET + ID_SIZE], self.id);
        dest[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE].copy_from_slice(&self.username);
        dest[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE].copy_from_slice(&self.email);
    }

    /// Reads a row back from the first `ROW_SIZE` bytes of `src`.
    pub fn deserialize(src: &[u8]) -> Row {
        let mut row = Row {
            id: LittleEndian::read_u32(&src[ID_OFFSET..ID_OFFSET + ID_SIZE]),
            username: [0; USERNAME_SIZE],
            email: [0; EMAIL_SIZE],
        };
        row.username
            .copy_from_slice(&src[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]);
        row.email
            .copy_from_slice(&src[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]);
        row
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("id", &self.id)
            .field("username", &String::from_utf8_lossy(self.username()))
            .field("email", &String::from_utf8_lossy(self.email()))
            .finish()
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}]",
            self.id,
            String::from_utf8_lossy(self.username()),
            String::from_utf8_lossy(self.email())
        )
    }
}

#[test]
fn test_layout_sizes() {
    assert_eq!(USERNAME_OFFSET, 4);
    assert_eq!(EMAIL_OFFSET, 37);
    assert_eq!(ROW_SIZE, 293);
}

#[test]
fn test_serialize_layout() {
    let row = Row::new(0x01020304, "ab", "c@d").unwrap();
    let mut buf = [0xff_u8; ROW_SIZE];
    row.serialize(&mut buf);
    assert_eq!(&buf[..4], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&buf[4..6], b"ab");
    assert!(buf[6..EMAIL_OFFSET].iter().all(|b| *b == 0));
    assert_eq!(&buf[EMAIL_OFFSET..EMAIL_OFFSET + 3], b"c@d");
    assert!(buf[EMAIL_OFFSET + 3..].iter().all(|b| *b == 0));
}

#[test]
fn test_serialize_deserialize_keeps_padding() {
    let row = Row::new(7, "user1", "person1@example.com").unwrap();
    let mut buf = [0xaa_u8; ROW_SIZE];
    row.serialize(&mut buf);
    let back = Row::deserialize(&buf);
    assert_eq!(back, row);
    assert_eq!(back.username(), b"user1");
    assert_eq!(back.email(), b"person1@example.com");

    let mut again = [0_u8; ROW_SIZE];
    back.serialize(&mut again);
    assert_eq!(buf, again);
}

#[test]
fn test_serialize_at_offset_within_page() {
    let row = Row::new(42, "x", "y").unwrap();
    let mut page = [0_u8; 4096];
    row.serialize(&mut page[1000..]);
    assert_eq!(Row::deserialize(&page[1000..]), row);
    assert!(page[..1000].iter().all(|b| *b == 0));
    assert!(page[1000 + ROW_SIZE..].iter().all(|b| *b == 0));
}

#[test]
fn test_max_length_columns() {
    let username = "a".repeat(COLUMN_USERNAME_SIZE);
    let email = "b".repeat(COLUMN_EMAIL_SIZE);
    let row = Row::new(1, &username, &email).expect("Should accept columns at their limit.");
    let mut buf = [0_u8; ROW_SIZE];
    row.serialize(&mut buf);
    assert_eq!(buf[USERNAME_OFFSET + COLUMN_USERNAME_SIZE], 0);
    assert_eq!(buf[EMAIL_OFFSET + COLUMN_EMAIL_SIZE], 0);
    let back = Row::deserialize(&buf);
    assert_eq!(back.username(), username.as_bytes());
    assert_eq!(back.email(), email.as_bytes());
}

#[test]
fn test_over_length_columns() {
    let long_username = "a".repeat(COLUMN_USERNAME_SIZE + 1);
    let long_email = "b".repeat(COLUMN_EMAIL_SIZE + 1);
    assert_eq!(
        Row::new(1, &long_username, "e"),
        Err(Error::StringTooLong {
            column: "username",
            len: 33
        })
    );
    assert_eq!(
        Row::new(1, "u", &long_email),
        Err(Error::StringTooLong {
            column: "email",
            len: 256
        })
    );
}

#[test]
fn test_display() {
    let row = Row::new(3, "user3", "person3@example.com").unwrap();
    assert_eq!(row.to_string(), "[3, user3, person3@example.com]");
}
