// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.

pub const MODEL_ID_POINT: u32 = 0;
pub const MODEL_ID_LINE: u32 = 1;
pub const MODEL_ID_DRAWING: u32 = 10;
