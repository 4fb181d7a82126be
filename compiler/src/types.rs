use serde::Serialize;

/// The root of a parsed schema: every model of one generation run, in
/// declaration order. Never mutated after verification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Definition {
    pub package: Option<String>,
    pub models:  Vec<Model>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name:     String,
    pub line:     usize,
    pub column:   usize,
    pub model_id: u32,
    pub fields:   Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:     String,
    pub line:     usize,
    pub column:   usize,
    pub type_:    String,
    pub is_array: bool,
}

impl Definition {
    pub fn new(package: Option<String>, models: Vec<Model>) -> Definition {
        Definition { package, models }
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn model_index(&self, name: &str) -> Option<usize> {
        self.models.iter().position(|model| model.name == name)
    }

    /// True when `type_name` names a model of this definition.
    pub fn is_model(&self, type_name: &str) -> bool {
        self.model_by_name(type_name).is_some()
    }
}

impl Model {
    /// A model with no source location, for building definitions in code.
    pub fn new(name: &str, model_id: u32, fields: Vec<Field>) -> Model {
        Model {
            name: name.to_string(),
            line: 0,
            column: 0,
            model_id,
            fields,
        }
    }
}

impl Field {
    /// A field with no source location, for building definitions in code.
    pub fn new(name: &str, type_: &str, is_array: bool) -> Field {
        Field {
            name: name.to_string(),
            line: 0,
            column: 0,
            type_: type_.to_string(),
            is_array,
        }
    }
}
