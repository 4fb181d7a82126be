use std::collections::HashMap;

use crate::primitive::Primitive;

/// What a runtime field holds: a primitive, or the model at an index into
/// [Schema::models].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Primitive(Primitive),
    Model(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name:     String,
    pub type_:    FieldType,
    pub is_array: bool,
}

impl Field {
    pub fn new(name: &str, type_: FieldType, is_array: bool) -> Field {
        Field {
            name: name.to_owned(),
            type_,
            is_array,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    pub name:     String,
    pub model_id: u32,
    pub fields:   Vec<Field>,
}

impl ModelDef {
    pub fn new(name: String, model_id: u32, fields: Vec<Field>) -> ModelDef {
        ModelDef {
            name,
            model_id,
            fields,
        }
    }
}

/// A compiled, name-resolved schema that the dynamic [Value](crate::Value)
/// codec walks. Models keep their declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub models:              Vec<ModelDef>,
    pub model_name_to_index: HashMap<String, usize>,
}

impl Schema {
    pub fn new(models: Vec<ModelDef>) -> Schema {
        let model_name_to_index = models
            .iter()
            .enumerate()
            .map(|(i, model)| (model.name.clone(), i))
            .collect();
        Schema {
            models,
            model_name_to_index,
        }
    }

    pub fn model(&self, index: usize) -> Option<&ModelDef> {
        self.models.get(index)
    }

    pub fn model_index(&self, name: &str) -> Option<usize> {
        self.model_name_to_index.get(name).copied()
    }
}
