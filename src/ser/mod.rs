//! Serialize a Rust data structure into JSON data

use core::fmt;

use serde::ser;
use serde::ser::{Impossible, SerializeSeq as _, SerializeStruct as _, Serializer as _};

use heapless::{String, Vec};

use crate::num::Fixed3;

use self::backend::{FmtWriter, LengthCounter, SerializerBackend, SliceWriter};
use self::map::SerializeMap;
use self::seq::SerializeSeq;
use self::struct_::SerializeStruct;

mod backend;
mod map;
mod seq;
mod struct_;

/// Serialization result
pub type Result<T> = ::core::result::Result<T, Error>;

/// This type represents all possible errors that can occur when serializing JSON data
///
/// The discriminants are stable result codes; `0` is reserved for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Error {
    /// A fragment did not fit in the remaining buffer capacity
    BufferTooSmall = 1,
    /// The output buffer has no capacity, or the value has a shape that can't be written
    InvalidArgument = 2,
}

impl Error {
    /// Numeric result code of this error
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl serde::ser::StdError for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Error::BufferTooSmall => "Buffer is too small",
                Error::InvalidArgument => "Invalid argument",
            }
        )
    }
}

impl ser::Error for Error {
    fn custom<T>(_msg: T) -> Self
    where
        T: fmt::Display,
    {
        Error::InvalidArgument
    }
}

/// Where the serializer breaks lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Everything on a single line
    Compact,
    /// Containers nested `first..=last` levels deep (the outer-most container is level 0) open
    /// with a newline and put each element on its own line. Other containers stay compact.
    Lines {
        /// Shallowest level that breaks lines
        first: usize,
        /// Deepest level that breaks lines
        last: usize,
    },
}

impl Layout {
    fn breaks(self, depth: usize) -> bool {
        match self {
            Layout::Compact => false,
            Layout::Lines { first, last } => first <= depth && depth <= last,
        }
    }
}

pub(crate) struct Serializer<B> {
    backend: B,
    layout: Layout,
    depth: usize,
    fixed3: bool,
}

impl<B: SerializerBackend> Serializer<B> {
    fn new(backend: B, layout: Layout) -> Self {
        Serializer {
            backend,
            layout,
            depth: 0,
            fixed3: false,
        }
    }

    /// Open a container, returns whether its elements go on their own lines
    fn begin(&mut self, token: u8) -> Result<bool> {
        let lines = self.layout.breaks(self.depth);
        self.depth += 1;
        self.backend.push(token)?;
        if lines {
            self.backend.push(b'\n')?;
        }
        Ok(lines)
    }

    fn separate(&mut self, lines: bool, first: bool) -> Result<()> {
        if first {
            return Ok(());
        }
        if lines {
            self.backend.extend_from_slice(b",\n")
        } else {
            self.backend.push(b',')
        }
    }

    fn finish(&mut self, token: u8, lines: bool, empty: bool) -> Result<()> {
        self.depth -= 1;
        if lines && !empty {
            self.backend.push(b'\n')?;
        }
        self.backend.push(token)
    }
}

// NOTE(serialize_*signed) This is basically the numtoa implementation minus the lookup tables,
// which take 200+ bytes of ROM / Flash
macro_rules! serialize_unsigned {
    ($self:ident, $N:expr, $v:expr) => {{
        let mut buf = [0u8; $N];

        let mut v = $v;
        let mut i = $N - 1;
        loop {
            buf[i] = (v % 10) as u8 + b'0';
            v /= 10;

            if v == 0 {
                break;
            } else {
                i -= 1;
            }
        }

        $self.backend.extend_from_slice(&buf[i..])
    }};
}

macro_rules! serialize_signed {
    ($self:ident, $N:expr, $v:expr, $ixx:ident, $uxx:ident) => {{
        let v = $v;
        let (signed, mut v) = if v == $ixx::MIN {
            (true, $ixx::MAX as $uxx + 1)
        } else if v < 0 {
            (true, -v as $uxx)
        } else {
            (false, v as $uxx)
        };

        let mut buf = [0u8; $N];
        let mut i = $N - 1;
        loop {
            buf[i] = (v % 10) as u8 + b'0';
            v /= 10;

            i -= 1;

            if v == 0 {
                break;
            }
        }

        if signed {
            buf[i] = b'-';
        } else {
            i += 1;
        }
        $self.backend.extend_from_slice(&buf[i..])
    }};
}

macro_rules! serialize_ryu {
    ($self:ident, $v:expr) => {{
        if !$v.is_finite() {
            return $self.backend.extend_from_slice(b"null");
        }
        let mut buffer = ryu::Buffer::new();
        let printed = buffer.format_finite($v);
        $self.backend.extend_from_slice(printed.as_bytes())
    }};
}

impl<B: SerializerBackend> Serializer<B> {
    // "-340282350000000000000000000000000000000.000"
    fn serialize_fixed3(&mut self, v: f32) -> Result<()> {
        if !v.is_finite() {
            return self.backend.extend_from_slice(b"null");
        }
        let mut s: String<48> = String::new();
        fmt::Write::write_fmt(&mut s, format_args!("{:.3}", v))
            .map_err(|_| Error::BufferTooSmall)?;
        self.backend.extend_from_slice(s.as_bytes())
    }
}

impl<'a, B: SerializerBackend> ser::Serializer for &'a mut Serializer<B> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SerializeSeq<'a, B>;
    type SerializeTuple = SerializeSeq<'a, B>;
    type SerializeTupleStruct = SerializeSeq<'a, B>;
    type SerializeTupleVariant = Impossible<(), Error>;
    type SerializeMap = SerializeMap<'a, B>;
    type SerializeStruct = SerializeStruct<'a, B>;
    type SerializeStructVariant = Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok> {
        if v {
            self.backend.extend_from_slice(b"true")
        } else {
            self.backend.extend_from_slice(b"false")
        }
    }

    fn serialize_i8(self, v: i8) -> Result<Self::Ok> {
        // "-128"
        serialize_signed!(self, 4, v, i8, u8)
    }

    fn serialize_i16(self, v: i16) -> Result<Self::Ok> {
        // "-32768"
        serialize_signed!(self, 6, v, i16, u16)
    }

    fn serialize_i32(self, v: i32) -> Result<Self::Ok> {
        // "-2147483648"
        serialize_signed!(self, 11, v, i32, u32)
    }

    fn serialize_i64(self, v: i64) -> Result<Self::Ok> {
        // "-9223372036854775808"
        serialize_signed!(self, 20, v, i64, u64)
    }

    fn serialize_u8(self, v: u8) -> Result<Self::Ok> {
        // "255"
        serialize_unsigned!(self, 3, v)
    }

    fn serialize_u16(self, v: u16) -> Result<Self::Ok> {
        // "65535"
        serialize_unsigned!(self, 5, v)
    }

    fn serialize_u32(self, v: u32) -> Result<Self::Ok> {
        // "4294967295"
        serialize_unsigned!(self, 10, v)
    }

    fn serialize_u64(self, v: u64) -> Result<Self::Ok> {
        // "18446744073709551615"
        serialize_unsigned!(self, 20, v)
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok> {
        if self.fixed3 {
            return self.serialize_fixed3(v);
        }
        serialize_ryu!(self, v)
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok> {
        serialize_ryu!(self, v)
    }

    fn serialize_char(self, v: char) -> Result<Self::Ok> {
        let mut encoded = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut encoded))
    }

    // Strings are trusted: no escaping is performed.
    fn serialize_str(self, v: &str) -> Result<Self::Ok> {
        self.backend.push(b'"')?;
        self.backend.extend_from_slice(v.as_bytes())?;
        self.backend.push(b'"')
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok> {
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for byte in v {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }

    fn serialize_none(self) -> Result<Self::Ok> {
        self.backend.extend_from_slice(b"null")
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok>
    where
        T: ser::Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok> {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized>(self, name: &'static str, value: &T) -> Result<Self::Ok>
    where
        T: ser::Serialize,
    {
        if name == Fixed3::NAME {
            self.fixed3 = true;
            let result = value.serialize(&mut *self);
            self.fixed3 = false;
            result
        } else {
            value.serialize(self)
        }
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok>
    where
        T: ser::Serialize,
    {
        let mut object = self.serialize_struct(variant, 1)?;
        object.serialize_field(variant, value)?;
        object.end()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        let lines = self.begin(b'[')?;

        Ok(SerializeSeq::new(self, lines))
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Error::InvalidArgument)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        let lines = self.begin(b'{')?;

        Ok(SerializeMap::new(self, lines))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        let lines = self.begin(b'{')?;

        Ok(SerializeStruct::new(self, lines))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Error::InvalidArgument)
    }

    fn collect_str<T: ?Sized>(self, value: &T) -> Result<Self::Ok>
    where
        T: fmt::Display,
    {
        self.backend.push(b'"')?;
        fmt::Write::write_fmt(&mut FmtWriter(&mut self.backend), format_args!("{}", value))
            .map_err(|_| Error::BufferTooSmall)?;
        self.backend.push(b'"')
    }
}

/// Serializes the given data structure as a string of JSON text
///
/// `N` must leave room for the terminator byte that `to_slice` reserves.
pub fn to_string<T, const N: usize>(value: &T) -> Result<String<N>>
where
    T: ser::Serialize + ?Sized,
{
    String::from_utf8(to_vec(value)?).map_err(|_| Error::InvalidArgument)
}

/// Serializes the given data structure as a JSON byte vector
///
/// `N` must leave room for the terminator byte that `to_slice` reserves.
pub fn to_vec<T, const N: usize>(value: &T) -> Result<Vec<u8, N>>
where
    T: ser::Serialize + ?Sized,
{
    let mut buf = Vec::<u8, N>::new();
    buf.resize_default(N).map_err(|_| Error::BufferTooSmall)?;
    let len = to_slice(value, &mut buf)?;
    buf.truncate(len);
    Ok(buf)
}

/// Serializes the given data structure as compact JSON into the provided buffer
///
/// On success the output is followed by a NUL byte and the returned length excludes it. On
/// error the buffer contents are unspecified.
pub fn to_slice<T>(value: &T, buf: &mut [u8]) -> Result<usize>
where
    T: ser::Serialize + ?Sized,
{
    to_slice_with_layout(value, buf, Layout::Compact)
}

/// Serializes the given data structure as JSON into the provided buffer, breaking lines as
/// `layout` says
pub fn to_slice_with_layout<T>(value: &T, buf: &mut [u8], layout: Layout) -> Result<usize>
where
    T: ser::Serialize + ?Sized,
{
    if buf.is_empty() {
        return Err(Error::InvalidArgument);
    }

    let mut ser = Serializer::new(SliceWriter::new(buf), layout);
    value.serialize(&mut ser)?;
    ser.backend.terminate();
    Ok(ser.backend.end())
}

/// Returns the length of the JSON text `value` serializes to, excluding the terminator
///
/// A buffer of `measure(..)? + 1` bytes is the smallest one `to_slice_with_layout` accepts.
pub fn measure<T>(value: &T, layout: Layout) -> Result<usize>
where
    T: ser::Serialize + ?Sized,
{
    let mut ser = Serializer::new(LengthCounter::default(), layout);
    value.serialize(&mut ser)?;
    Ok(ser.backend.end())
}
