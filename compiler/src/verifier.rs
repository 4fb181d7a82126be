use std::collections::HashMap;
use ccl_schema::PRIMITIVES;
use crate::{
    types::Definition,
    utils::quote,
    error::CclError,
};

/// Model names the backends claim for themselves.
pub const RESERVED_NAMES: [&str; 1] = ["Serializable"];

/// Returns `Ok(())` if verification passed, or the first violation found in
/// declaration order as `Err(CclError::SchemaValidation(_))`.
pub fn verify_definition(definition: &Definition) -> Result<(), CclError> {
    let mut defined_types: Vec<String> = PRIMITIVES.iter().map(|p| p.name().to_string()).collect();

    // 1) Duplicate / reserved model names
    for model in &definition.models {
        if defined_types.contains(&model.name) {
            return Err(CclError::SchemaValidation(format!(
                "The type {} is defined twice",
                quote(&model.name)
            )));
        }
        if RESERVED_NAMES.contains(&model.name.as_str()) {
            return Err(CclError::SchemaValidation(format!(
                "The type name {} is reserved",
                quote(&model.name)
            )));
        }
        defined_types.push(model.name.clone());
    }

    // 2) Fields inside each model
    for model in &definition.models {
        let mut field_names: Vec<&str> = Vec::new();
        for field in &model.fields {
            if field_names.contains(&field.name.as_str()) {
                return Err(CclError::SchemaValidation(format!(
                    "The field {} is defined twice in model {}",
                    quote(&field.name),
                    quote(&model.name)
                )));
            }
            field_names.push(&field.name);

            if !defined_types.contains(&field.type_) {
                return Err(CclError::SchemaValidation(format!(
                    "The type {} is not defined for field {} of model {}",
                    quote(&field.type_),
                    quote(&field.name),
                    quote(&model.name)
                )));
            }
        }
    }

    // 3) Model ids
    let mut ids: HashMap<u32, &str> = HashMap::new();
    for model in &definition.models {
        if let Some(previous) = ids.insert(model.model_id, &model.name) {
            return Err(CclError::SchemaValidation(format!(
                "The model id {} is used by both {} and {}",
                model.model_id,
                quote(previous),
                quote(&model.name)
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, Model};

    fn definition(models: Vec<Model>) -> Definition {
        Definition::new(None, models)
    }

    #[test]
    fn test_verify_forward_reference() {
        let def = definition(vec![
            Model::new("Line", 0, vec![Field::new("A", "Point", false)]),
            Model::new("Point", 1, vec![Field::new("X", "int32", false)]),
        ]);
        assert!(verify_definition(&def).is_ok());
    }

    #[test]
    fn test_verify_self_reference() {
        let def = definition(vec![Model::new(
            "Node",
            0,
            vec![Field::new("Next", "Node", false), Field::new("Children", "Node", true)],
        )]);
        assert!(verify_definition(&def).is_ok());
    }

    #[test]
    fn test_verify_duplicate_model() {
        let def = definition(vec![Model::new("A", 0, vec![]), Model::new("A", 1, vec![])]);
        let err = verify_definition(&def).unwrap_err();
        assert_eq!(err.to_string(), "Schema validation error: The type \"A\" is defined twice");
    }

    #[test]
    fn test_verify_primitive_name_collision() {
        let def = definition(vec![Model::new("string", 0, vec![])]);
        assert!(matches!(verify_definition(&def), Err(CclError::SchemaValidation(_))));
    }

    #[test]
    fn test_verify_reserved_name() {
        let def = definition(vec![Model::new("Serializable", 0, vec![])]);
        let err = verify_definition(&def).unwrap_err();
        assert!(err.to_string().contains("is reserved"), "{}", err);
    }

    #[test]
    fn test_verify_duplicate_field() {
        let def = definition(vec![Model::new(
            "A",
            0,
            vec![Field::new("X", "int32", false), Field::new("X", "string", false)],
        )]);
        let err = verify_definition(&def).unwrap_err();
        assert!(err.to_string().contains("The field \"X\" is defined twice"), "{}", err);
    }

    #[test]
    fn test_verify_unresolved_type() {
        let def = definition(vec![Model::new("A", 0, vec![Field::new("B", "Missing", false)])]);
        let err = verify_definition(&def).unwrap_err();
        assert!(err.to_string().contains("\"Missing\" is not defined"), "{}", err);
    }

    #[test]
    fn test_verify_duplicate_model_id() {
        let def = definition(vec![Model::new("A", 1, vec![]), Model::new("B", 1, vec![])]);
        let err = verify_definition(&def).unwrap_err();
        assert!(err.to_string().contains("used by both \"A\" and \"B\""), "{}", err);
    }
}
