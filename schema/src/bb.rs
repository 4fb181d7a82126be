use std::cell::Cell;

use crate::{
    error::{DecodeError, EncodeError},
    timestamp::Timestamp,
    traits::{is_nil, Serializable, NIL_MESSAGE},
};

/// Deepest chain of nested messages a single decode will follow.
pub const MAX_NESTING_DEPTH: usize = 256;

thread_local! {
    static NESTING_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// One level of nested-message decoding on the current thread, released on
/// drop. Held by every decoder while it descends into a nested payload.
pub struct NestingGuard(());

impl NestingGuard {
    pub fn enter() -> Result<NestingGuard, DecodeError> {
        NESTING_DEPTH.with(|depth| {
            if depth.get() >= MAX_NESTING_DEPTH {
                return Err(DecodeError::TooDeep(MAX_NESTING_DEPTH));
            }
            depth.set(depth.get() + 1);
            Ok(NestingGuard(()))
        })
    }
}

impl Drop for NestingGuard {
    fn drop(&mut self) {
        NESTING_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

macro_rules! read_fixed {
    ($(#[$doc:meta] $name:ident -> $ty:ty;)*) => {
        $(
            #[$doc]
            pub fn $name(&mut self) -> Result<$ty, DecodeError> {
                Ok(<$ty>::from_le_bytes(self.read_array()?))
            }
        )*
    };
}

macro_rules! write_fixed {
    ($(#[$doc:meta] $name:ident($ty:ty);)*) => {
        $(
            #[$doc]
            pub fn $name(&mut self, value: $ty) {
                self.data.extend_from_slice(&value.to_le_bytes());
            }
        )*
    };
}

/// A CCL byte buffer meant for reading.
///
/// Every read is bounds checked; running past the end of the data is a
/// [DecodeError::Truncated], never a zero-filled result.
///
/// ```
/// let mut bb = ccl_schema::ByteBuffer::new(&[2, 0, 0, 0, 104, 105, 7, 0]);
/// assert_eq!(bb.read_string(), Ok("hi".to_owned()));
/// assert_eq!(bb.read_u16(), Ok(7));
/// assert!(bb.read_u8().is_err());
/// ```
///
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    index: usize,
}

impl<'a> ByteBuffer<'a> {
    /// Create a new ByteBuffer that wraps the provided byte slice.
    pub fn new(data: &'a [u8]) -> ByteBuffer<'a> {
        ByteBuffer { data, index: 0 }
    }

    /// Retrieves the underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Retrieves the current index into the underlying byte slice. This starts
    /// off as 0 and ends up as `self.data().len()` when everything has been
    /// read.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    /// Try to read `len` raw bytes starting at the current index.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::Truncated {
                needed:    len,
                remaining: self.remaining(),
            });
        }
        let value = &self.data[self.index..self.index + len];
        self.index += len;
        Ok(value)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Try to read a boolean stored as a single `0` or `1` byte.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    read_fixed! {
        /// Try to read an unsigned 8-bit integer.
        read_u8 -> u8;
        /// Try to read a signed 8-bit integer.
        read_i8 -> i8;
        /// Try to read a little-endian unsigned 16-bit integer.
        read_u16 -> u16;
        /// Try to read a little-endian signed 16-bit integer.
        read_i16 -> i16;
        /// Try to read a little-endian unsigned 32-bit integer.
        read_u32 -> u32;
        /// Try to read a little-endian signed 32-bit integer.
        read_i32 -> i32;
        /// Try to read a little-endian unsigned 64-bit integer.
        read_u64 -> u64;
        /// Try to read a little-endian signed 64-bit integer.
        read_i64 -> i64;
        /// Try to read a little-endian 32-bit float.
        read_f32 -> f32;
        /// Try to read a little-endian 64-bit float.
        read_f64 -> f64;
    }

    /// Try to read a `uint32` length prefix.
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        Ok(self.read_u32()? as usize)
    }

    /// Try to read a `uint32` array element count. Every element occupies at
    /// least one byte, so a count larger than the remaining data is rejected
    /// before anything is allocated.
    pub fn read_count(&mut self) -> Result<usize, DecodeError> {
        let count = self.read_len()?;
        if count > self.remaining() {
            return Err(DecodeError::Truncated {
                needed:    count,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    /// Try to read a length-prefixed byte run. The returned slice aliases the
    /// underlying memory.
    pub fn read_prefixed(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len()?;
        self.read_bytes(len)
    }

    /// Try to read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_prefixed()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Try to read a length-prefixed byte sequence.
    pub fn read_byte_vec(&mut self) -> Result<Vec<u8>, DecodeError> {
        Ok(self.read_prefixed()?.to_vec())
    }

    /// Try to read an `int64` nanosecond timestamp.
    pub fn read_timestamp(&mut self) -> Result<Timestamp, DecodeError> {
        Ok(Timestamp::from_unix_nanos(self.read_i64()?))
    }

    /// Try to read a length-prefixed nested message. A payload equal to the
    /// nil sentinel yields `None`.
    pub fn read_message<T: Serializable + Default>(&mut self) -> Result<Option<T>, DecodeError> {
        let payload = self.read_prefixed()?;
        if is_nil(payload) {
            return Ok(None);
        }
        let _nesting = NestingGuard::enter()?;
        let mut message = T::default();
        message.deserialize_binary(payload)?;
        Ok(Some(message))
    }

    /// Try to read a length-prefixed array element. A nil payload yields the
    /// element's zero value.
    pub fn read_element<T: Serializable + Default>(&mut self) -> Result<T, DecodeError> {
        Ok(self.read_message()?.unwrap_or_default())
    }
}

#[test]
fn read_bool() {
    let read = |bytes| ByteBuffer::new(bytes).read_bool();
    assert_eq!(read(&[]), Err(DecodeError::Truncated { needed: 1, remaining: 0 }));
    assert_eq!(read(&[0]), Ok(false));
    assert_eq!(read(&[1]), Ok(true));
    assert_eq!(read(&[2]), Err(DecodeError::InvalidBool(2)));
}

#[test]
fn read_bytes() {
    let read = |bytes, len| ByteBuffer::new(bytes).read_bytes(len);
    assert_eq!(read(&[], 0), Ok(vec![].as_slice()));
    assert!(read(&[], 1).is_err());
    assert_eq!(read(&[0], 1), Ok(vec![0].as_slice()));
    assert_eq!(read(&[0], 2), Err(DecodeError::Truncated { needed: 2, remaining: 1 }));

    let mut bb = ByteBuffer::new(&[1, 2, 3, 4, 5]);
    assert_eq!(bb.read_bytes(3), Ok(vec![1, 2, 3].as_slice()));
    assert_eq!(bb.remaining(), 2);
    assert_eq!(bb.read_bytes(2), Ok(vec![4, 5].as_slice()));
    assert!(bb.read_bytes(1).is_err());
}

#[test]
fn read_fixed_little_endian() {
    assert_eq!(ByteBuffer::new(&[0xFF]).read_i8(), Ok(-1));
    assert_eq!(ByteBuffer::new(&[0x34, 0x12]).read_u16(), Ok(0x1234));
    assert_eq!(ByteBuffer::new(&[0xFE, 0xFF]).read_i16(), Ok(-2));
    assert_eq!(ByteBuffer::new(&[1, 0, 0, 0]).read_i32(), Ok(1));
    assert_eq!(ByteBuffer::new(&[0, 0, 0, 0x80]).read_u32(), Ok(0x8000_0000));
    assert_eq!(
        ByteBuffer::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]).read_i64(),
        Ok(-1)
    );
    assert_eq!(ByteBuffer::new(&[0, 0, 0x80, 0x3F]).read_f32(), Ok(1.0));
    assert_eq!(
        ByteBuffer::new(&[0, 0, 0, 0, 0, 0, 0xF0, 0xBF]).read_f64(),
        Ok(-1.0)
    );
    assert_eq!(
        ByteBuffer::new(&[1, 0, 0]).read_u32(),
        Err(DecodeError::Truncated { needed: 4, remaining: 3 })
    );
}

#[test]
fn read_string() {
    let read = |bytes| ByteBuffer::new(bytes).read_string();
    assert_eq!(read(&[0, 0, 0, 0]), Ok(String::new()));
    assert_eq!(read(&[3, 0, 0, 0, 97, 98, 99]), Ok("abc".to_owned()));
    assert_eq!(read(&[4, 0, 0, 0, 240, 159, 141, 149]), Ok("🍕".to_owned()));
    assert_eq!(
        read(&[5, 0, 0, 0, 97]),
        Err(DecodeError::Truncated { needed: 5, remaining: 1 })
    );
    assert_eq!(read(&[2, 0, 0, 0, 0xC3, 0x28]), Err(DecodeError::InvalidUtf8));
    assert!(read(&[1, 0]).is_err());
}

#[test]
fn read_count_rejects_oversized_counts() {
    let mut bb = ByteBuffer::new(&[2, 0, 0, 0, 7, 8]);
    assert_eq!(bb.read_count(), Ok(2));

    let mut bb = ByteBuffer::new(&[0xFF, 0xFF, 0xFF, 0x7F, 1]);
    assert_eq!(
        bb.read_count(),
        Err(DecodeError::Truncated { needed: 0x7FFF_FFFF, remaining: 1 })
    );
}

#[cfg(test)]
mod nesting {
    use super::*;
    use std::any::Any;

    /// `model Node { Next Node; }`, written the way the Rust backend emits it.
    #[derive(Debug, Default, PartialEq)]
    struct Node {
        next: Option<Box<Node>>,
    }

    impl Serializable for Node {
        fn model_id(&self) -> u32 {
            0
        }

        fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError> {
            let mut bb = ByteBufferMut::new();
            bb.write_message(self.next.as_deref())?;
            Ok(bb.data())
        }

        fn deserialize_binary(&mut self, data: &[u8]) -> Result<(), DecodeError> {
            *self = Node::default();
            if is_nil(data) {
                return Ok(());
            }
            let mut bb = ByteBuffer::new(data);
            self.next = bb.read_message::<Node>()?.map(Box::new);
            Ok(())
        }

        fn clone_empty_serializable(&self) -> Box<dyn Serializable> {
            Box::new(Node::default())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// A chain with `depth` present nested messages below the top level.
    fn chain(depth: usize) -> Vec<u8> {
        let mut bytes = vec![1, 0, 0, 0, 0];
        for _ in 0..depth {
            let mut outer = (bytes.len() as u32).to_le_bytes().to_vec();
            outer.extend_from_slice(&bytes);
            bytes = outer;
        }
        bytes
    }

    #[test]
    fn read_message_follows_chains_up_to_the_limit() {
        let mut node = Node::default();
        assert_eq!(node.deserialize_binary(&chain(MAX_NESTING_DEPTH)), Ok(()));
        let mut levels = 0;
        let mut cursor = &node;
        while let Some(next) = cursor.next.as_deref() {
            levels += 1;
            cursor = next;
        }
        assert_eq!(levels, MAX_NESTING_DEPTH);
    }

    #[test]
    fn read_message_rejects_deeper_chains() {
        let mut node = Node::default();
        assert_eq!(
            node.deserialize_binary(&chain(MAX_NESTING_DEPTH + 1)),
            Err(DecodeError::TooDeep(MAX_NESTING_DEPTH))
        );
        // The guard is released on the error path, so the next decode starts at zero.
        assert_eq!(node.deserialize_binary(&chain(3)), Ok(()));
    }
}

#[test]
fn read_sequence() {
    let mut bb = ByteBuffer::new(&[
        1, 2, 0, 0, 0, 104, 105, 0xE8, 0x03, 0, 0, 0, 0, 0, 0,
    ]);
    assert_eq!(bb.read_bool(), Ok(true));
    assert_eq!(bb.read_string(), Ok("hi".to_owned()));
    assert_eq!(bb.read_timestamp(), Ok(Timestamp::from_unix_nanos(1000)));
    assert_eq!(bb.remaining(), 0);
}

/// A CCL byte buffer meant for writing.
///
/// Example usage:
///
/// ```
/// let mut bb = ccl_schema::ByteBufferMut::new();
/// bb.write_string("hi").unwrap();
/// bb.write_u16(7);
/// assert_eq!(bb.data(), [2, 0, 0, 0, 104, 105, 7, 0]);
/// ```
///
#[derive(Debug, Default)]
pub struct ByteBufferMut {
    data: Vec<u8>,
}

impl ByteBufferMut {
    /// Creates an empty ByteBufferMut ready for writing.
    pub fn new() -> ByteBufferMut {
        ByteBufferMut { data: vec![] }
    }

    /// Consumes this buffer and returns the underlying backing store. Use this
    /// to get the data out when you're done writing to the buffer.
    pub fn data(self) -> Vec<u8> {
        self.data
    }

    /// Borrows what has been written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Returns the number of bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a boolean value as a single `0` or `1` byte.
    pub fn write_bool(&mut self, value: bool) {
        self.data.push(if value { 1 } else { 0 });
    }

    write_fixed! {
        /// Write an unsigned 8-bit integer.
        write_u8(u8);
        /// Write a signed 8-bit integer.
        write_i8(i8);
        /// Write a little-endian unsigned 16-bit integer.
        write_u16(u16);
        /// Write a little-endian signed 16-bit integer.
        write_i16(i16);
        /// Write a little-endian unsigned 32-bit integer.
        write_u32(u32);
        /// Write a little-endian signed 32-bit integer.
        write_i32(i32);
        /// Write a little-endian unsigned 64-bit integer.
        write_u64(u64);
        /// Write a little-endian signed 64-bit integer.
        write_i64(i64);
        /// Write a little-endian 32-bit float.
        write_f32(f32);
        /// Write a little-endian 64-bit float.
        write_f64(f64);
    }

    /// Write raw bytes with no prefix.
    pub fn write_raw(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
    }

    /// Write a `uint32` length prefix or element count.
    pub fn write_len(&mut self, len: usize) -> Result<(), EncodeError> {
        let len = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))?;
        self.write_u32(len);
        Ok(())
    }

    /// Write a length-prefixed byte sequence.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), EncodeError> {
        self.write_len(value.len())?;
        self.write_raw(value);
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string with no terminator.
    pub fn write_string(&mut self, value: &str) -> Result<(), EncodeError> {
        self.write_bytes(value.as_bytes())
    }

    /// Write an `int64` nanosecond timestamp.
    pub fn write_timestamp(&mut self, value: Timestamp) {
        self.write_i64(value.unix_nanos());
    }

    /// Write a nested message as its length-prefixed serialized form. `None`
    /// writes the length-prefixed nil sentinel.
    pub fn write_message<T: Serializable + ?Sized>(&mut self, value: Option<&T>) -> Result<(), EncodeError> {
        match value {
            Some(value) => {
                let bytes = value.serialize_binary()?;
                self.write_bytes(&bytes)
            }
            None => self.write_bytes(&NIL_MESSAGE),
        }
    }

    /// Write one element of a nested-message array.
    pub fn write_element<T: Serializable + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.write_message(Some(value))
    }
}

#[cfg(test)]
fn write_once(cb: fn(&mut ByteBufferMut)) -> Vec<u8> {
    let mut bb = ByteBufferMut::new();
    cb(&mut bb);
    bb.data()
}

#[test]
fn write_bool() {
    assert_eq!(write_once(|bb| bb.write_bool(false)), [0]);
    assert_eq!(write_once(|bb| bb.write_bool(true)), [1]);
}

#[test]
fn write_fixed_little_endian() {
    assert_eq!(write_once(|bb| bb.write_i8(-1)), [0xFF]);
    assert_eq!(write_once(|bb| bb.write_u16(0x1234)), [0x34, 0x12]);
    assert_eq!(write_once(|bb| bb.write_i32(2)), [2, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_u32(0x8000_0000)), [0, 0, 0, 0x80]);
    assert_eq!(
        write_once(|bb| bb.write_i64(-2)),
        [0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(write_once(|bb| bb.write_f32(1.0)), [0, 0, 0x80, 0x3F]);
    assert_eq!(
        write_once(|bb| bb.write_f64(-1.0)),
        [0, 0, 0, 0, 0, 0, 0xF0, 0xBF]
    );
}

#[test]
fn write_prefixed() {
    assert_eq!(write_once(|bb| bb.write_string("").unwrap()), [0, 0, 0, 0]);
    assert_eq!(write_once(|bb| bb.write_string("ab").unwrap()), [2, 0, 0, 0, 97, 98]);
    assert_eq!(
        write_once(|bb| bb.write_bytes(&[9, 8, 7]).unwrap()),
        [3, 0, 0, 0, 9, 8, 7]
    );
    assert_eq!(
        write_once(|bb| bb.write_timestamp(Timestamp::from_unix_nanos(-1))),
        [0xFF; 8]
    );
}

#[test]
fn write_sequence() {
    let mut bb = ByteBufferMut::new();
    bb.write_bool(true);
    bb.write_string("hi").unwrap();
    bb.write_timestamp(Timestamp::from_unix_nanos(1000));
    assert_eq!(bb.len(), 15);
    assert_eq!(
        bb.data(),
        [1, 2, 0, 0, 0, 104, 105, 0xE8, 0x03, 0, 0, 0, 0, 0, 0]
    );
}
