use serde::Serialize;
use ccl_schema::Primitive;
use crate::{
    catalog::{resolve, Resolved},
    error::CclError,
    types::{Definition, Field, Model},
};

/// How one value travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// Raw little-endian bytes of the primitive's width.
    FixedScalar(Primitive),
    LengthPrefixedText,
    LengthPrefixedBytes,
    /// Signed 64-bit nanoseconds since the Unix epoch.
    Timestamp,
    /// The named model's serialized form behind a `uint32` length.
    LengthPrefixedNested(String),
    /// A `uint32` element count followed by every element.
    Array(Box<Strategy>),
}

impl Strategy {
    /// The strategy of a single element: itself, or the inner one of an array.
    pub fn element(&self) -> &Strategy {
        match self {
            Strategy::Array(inner) => &**inner,
            other => other,
        }
    }

    pub fn nested_model(&self) -> Option<&str> {
        match self.element() {
            Strategy::LengthPrefixedNested(model) => Some(model.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldPlan {
    pub field_name:        String,
    pub type_name:         String,
    pub strategy:          Strategy,
    pub element_is_nested: bool,
}

impl FieldPlan {
    pub fn is_array(&self) -> bool {
        matches!(self.strategy, Strategy::Array(_))
    }

    /// True when the field holds a timestamp, alone or in an array.
    pub fn uses_timestamp(&self) -> bool {
        *self.strategy.element() == Strategy::Timestamp
    }
}

/// The ordered encode/decode steps for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPlan {
    pub model_name: String,
    pub model_id:   u32,
    pub fields:     Vec<FieldPlan>,
}

fn element_strategy(field: &Field, model: &Model, definition: &Definition) -> Result<Strategy, CclError> {
    match resolve(&field.type_, definition) {
        Resolved::Primitive(Primitive::String)   => Ok(Strategy::LengthPrefixedText),
        Resolved::Primitive(Primitive::Bytes)    => Ok(Strategy::LengthPrefixedBytes),
        Resolved::Primitive(Primitive::DateTime) => Ok(Strategy::Timestamp),
        Resolved::Primitive(primitive)           => Ok(Strategy::FixedScalar(primitive)),
        Resolved::Model(nested)                  => Ok(Strategy::LengthPrefixedNested(nested.name.clone())),
        Resolved::Unknown => Err(CclError::UnresolvedType {
            type_name:  field.type_.clone(),
            field_name: field.name.clone(),
            model_name: model.name.clone(),
        }),
    }
}

/// Derives one [FieldPlan] per field of `model`, in declaration order.
pub fn plan_model(model: &Model, definition: &Definition) -> Result<ModelPlan, CclError> {
    let mut fields = Vec::with_capacity(model.fields.len());
    for field in &model.fields {
        let element = element_strategy(field, model, definition)?;
        let element_is_nested = field.is_array && matches!(element, Strategy::LengthPrefixedNested(_));
        let strategy = if field.is_array {
            Strategy::Array(Box::new(element))
        } else {
            element
        };
        fields.push(FieldPlan {
            field_name: field.name.clone(),
            type_name: field.type_.clone(),
            strategy,
            element_is_nested,
        });
    }

    Ok(ModelPlan {
        model_name: model.name.clone(),
        model_id: model.model_id,
        fields,
    })
}

/// Plans every model of the definition, in declaration order.
pub fn plan_definition(definition: &Definition) -> Result<Vec<ModelPlan>, CclError> {
    definition
        .models
        .iter()
        .map(|model| plan_model(model, definition))
        .collect()
}
