use serde::ser;

use crate::ser::backend::SerializerBackend;
use crate::ser::{Error, Result, Serializer};

pub struct SerializeMap<'a, B> {
    ser: &'a mut Serializer<B>,
    first: bool,
    lines: bool,
}

impl<'a, B: SerializerBackend> SerializeMap<'a, B> {
    pub(crate) fn new(ser: &'a mut Serializer<B>, lines: bool) -> Self {
        SerializeMap {
            ser,
            first: true,
            lines,
        }
    }
}

impl<'a, B: SerializerBackend> ser::SerializeMap for SerializeMap<'a, B> {
    type Ok = ();
    type Error = Error;

    fn end(self) -> Result<Self::Ok> {
        self.ser.finish(b'}', self.lines, self.first)
    }

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        self.ser.separate(self.lines, self.first)?;
        self.first = false;
        key.serialize(&mut *self.ser)?;
        self.ser.backend.push(b':')?;
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        value.serialize(&mut *self.ser)?;
        Ok(())
    }
}
