// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.

use ccl::Serializable;

use super::constants::{MODEL_ID_POINT, MODEL_ID_LINE, MODEL_ID_DRAWING};
use super::types::{Point, Line, Drawing};

/// Returns an empty instance of the model with the given id.
pub fn new_by_model_id(model_id: u32) -> Option<Box<dyn Serializable>> {
    match model_id {
        MODEL_ID_POINT => Some(Box::new(Point::default())),
        MODEL_ID_LINE => Some(Box::new(Line::default())),
        MODEL_ID_DRAWING => Some(Box::new(Drawing::default())),
        _ => None,
    }
}
