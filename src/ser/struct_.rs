use serde::ser;

use crate::ser::backend::SerializerBackend;
use crate::ser::{Error, Result, Serializer};

pub struct SerializeStruct<'a, B> {
    ser: &'a mut Serializer<B>,
    first: bool,
    lines: bool,
}

impl<'a, B: SerializerBackend> SerializeStruct<'a, B> {
    pub(crate) fn new(ser: &'a mut Serializer<B>, lines: bool) -> Self {
        SerializeStruct {
            ser,
            first: true,
            lines,
        }
    }
}

impl<'a, B: SerializerBackend> ser::SerializeStruct for SerializeStruct<'a, B> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        // XXX if `value` is `None` we still produce `null` for this field
        self.ser.separate(self.lines, self.first)?;
        self.first = false;

        self.ser.backend.push(b'"')?;
        self.ser.backend.extend_from_slice(key.as_bytes())?;
        self.ser.backend.extend_from_slice(b"\":")?;

        value.serialize(&mut *self.ser)?;

        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        self.ser.finish(b'}', self.lines, self.first)
    }
}
