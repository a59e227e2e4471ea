use serde::ser;

use crate::ser::backend::SerializerBackend;
use crate::ser::{Error, Result, Serializer};

pub struct SerializeSeq<'a, B> {
    de: &'a mut Serializer<B>,
    first: bool,
    lines: bool,
}

impl<'a, B: SerializerBackend> SerializeSeq<'a, B> {
    pub(crate) fn new(de: &'a mut Serializer<B>, lines: bool) -> Self {
        SerializeSeq {
            de,
            first: true,
            lines,
        }
    }
}

impl<'a, B: SerializerBackend> ser::SerializeSeq for SerializeSeq<'a, B> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        self.de.separate(self.lines, self.first)?;
        self.first = false;

        value.serialize(&mut *self.de)?;
        Ok(())
    }

    fn end(self) -> Result<Self::Ok> {
        self.de.finish(b']', self.lines, self.first)
    }
}

impl<'a, B: SerializerBackend> ser::SerializeTuple for SerializeSeq<'a, B> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a, B: SerializerBackend> ser::SerializeTupleStruct for SerializeSeq<'a, B> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<()>
    where
        T: ser::Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok> {
        ser::SerializeSeq::end(self)
    }
}
