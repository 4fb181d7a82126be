// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.

use std::any::Any;

use ccl::{ByteBuffer, ByteBufferMut, DecodeError, EncodeError, is_nil, Serializable};

use super::constants::{MODEL_ID_POINT, MODEL_ID_LINE, MODEL_ID_DRAWING};
use super::types::{Point, Line, Drawing};

impl Point {
    /// A zero-valued `Point`; field values are not copied.
    pub fn clone_empty(&self) -> Point {
        Point::default()
    }
}

impl Serializable for Point {
    fn model_id(&self) -> u32 {
        MODEL_ID_POINT
    }

    fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bb = ByteBufferMut::new();
        bb.write_i32(self.x);
        bb.write_i32(self.y);
        Ok(bb.data())
    }

    fn deserialize_binary(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        *self = Point::default();
        if is_nil(data) {
            return Ok(());
        }
        let mut bb = ByteBuffer::new(data);
        self.x = bb.read_i32()?;
        self.y = bb.read_i32()?;
        Ok(())
    }

    fn clone_empty_serializable(&self) -> Box<dyn Serializable> {
        Box::new(self.clone_empty())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Line {
    /// A zero-valued `Line`; field values are not copied.
    pub fn clone_empty(&self) -> Line {
        Line::default()
    }
}

impl Serializable for Line {
    fn model_id(&self) -> u32 {
        MODEL_ID_LINE
    }

    fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bb = ByteBufferMut::new();
        bb.write_message(self.a.as_deref())?;
        bb.write_len(self.points.len())?;
        for item in &self.points {
            bb.write_element(item)?;
        }
        bb.write_string(&self.label)?;
        Ok(bb.data())
    }

    fn deserialize_binary(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        *self = Line::default();
        if is_nil(data) {
            return Ok(());
        }
        let mut bb = ByteBuffer::new(data);
        self.a = bb.read_message::<Point>()?.map(Box::new);
        let count = bb.read_count()?;
        self.points = Vec::with_capacity(count);
        for _ in 0..count {
            self.points.push(bb.read_element::<Point>()?);
        }
        self.label = bb.read_string()?;
        Ok(())
    }

    fn clone_empty_serializable(&self) -> Box<dyn Serializable> {
        Box::new(self.clone_empty())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drawing {
    /// A zero-valued `Drawing`; field values are not copied.
    pub fn clone_empty(&self) -> Drawing {
        Drawing::default()
    }
}

impl Serializable for Drawing {
    fn model_id(&self) -> u32 {
        MODEL_ID_DRAWING
    }

    fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bb = ByteBufferMut::new();
        bb.write_string(&self.title)?;
        bb.write_len(self.lines.len())?;
        for item in &self.lines {
            bb.write_element(item)?;
        }
        bb.write_bytes(&self.thumbnail)?;
        bb.write_timestamp(self.created_at);
        bb.write_len(self.tags.len())?;
        for item in &self.tags {
            bb.write_string(item)?;
        }
        bb.write_bool(self.visible);
        bb.write_f64(self.scale);
        Ok(bb.data())
    }

    fn deserialize_binary(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        *self = Drawing::default();
        if is_nil(data) {
            return Ok(());
        }
        let mut bb = ByteBuffer::new(data);
        self.title = bb.read_string()?;
        let count = bb.read_count()?;
        self.lines = Vec::with_capacity(count);
        for _ in 0..count {
            self.lines.push(bb.read_element::<Line>()?);
        }
        self.thumbnail = bb.read_byte_vec()?;
        self.created_at = bb.read_timestamp()?;
        let count = bb.read_count()?;
        self.tags = Vec::with_capacity(count);
        for _ in 0..count {
            self.tags.push(bb.read_string()?);
        }
        self.visible = bb.read_bool()?;
        self.scale = bb.read_f64()?;
        Ok(())
    }

    fn clone_empty_serializable(&self) -> Box<dyn Serializable> {
        Box::new(self.clone_empty())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
