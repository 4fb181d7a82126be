use ccl_schema::{Field as RuntimeField, FieldType, ModelDef, Schema};
use tracing::debug;
use crate::{
    catalog::{resolve, Resolved},
    types::Definition,
    verifier::verify_definition,
    tokenizer::tokenize_schema,
    parser::parse_schema,
    error::CclError,
};

/// Compile schema text into a verified [Definition].
/// Returns `Err(CclError)` if tokenization/parsing/verification fails.
pub fn compile_schema(text: &str) -> Result<Definition, CclError> {
    let tokens = tokenize_schema(text)?;
    debug!(tokens = tokens.len(), "tokenized schema");
    let definition = parse_schema(&tokens)?;
    debug!(models = definition.models.len(), "parsed schema");
    verify_definition(&definition)?;
    Ok(definition)
}

/// Builds the runtime descriptor the dynamic `Value` codec walks, with every
/// field type resolved to a primitive or a model index.
pub fn compile_runtime_schema(definition: &Definition) -> Result<Schema, CclError> {
    let mut models = Vec::with_capacity(definition.models.len());
    for model in &definition.models {
        let mut fields = Vec::with_capacity(model.fields.len());
        for field in &model.fields {
            let type_ = match resolve(&field.type_, definition) {
                Resolved::Primitive(primitive) => Some(FieldType::Primitive(primitive)),
                Resolved::Model(nested)        => definition.model_index(&nested.name).map(FieldType::Model),
                Resolved::Unknown              => None,
            };
            let type_ = type_.ok_or_else(|| CclError::UnresolvedType {
                type_name:  field.type_.clone(),
                field_name: field.name.clone(),
                model_name: model.name.clone(),
            })?;
            fields.push(RuntimeField::new(&field.name, type_, field.is_array));
        }
        models.push(ModelDef::new(model.name.clone(), model.model_id, fields));
    }
    Ok(Schema::new(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccl_schema::Primitive;

    #[test]
    fn test_compile_schema() {
        let def = compile_schema("package shapes;\nmodel Line { A Point; }\nmodel Point { X int32; }").unwrap();
        assert_eq!(def.package.as_deref(), Some("shapes"));
        assert_eq!(def.models[1].name, "Point");
    }

    #[test]
    fn test_compile_schema_rejects_unknown_type() {
        let err = compile_schema("model A { B Missing; }").unwrap_err();
        assert!(matches!(err, CclError::SchemaValidation(_)));
    }

    #[test]
    fn test_compile_runtime_schema() {
        let def = compile_schema("model Line { A Point; Points []Point; }\nmodel Point { X int32; }").unwrap();
        let schema = compile_runtime_schema(&def).unwrap();
        let line = schema.model(0).unwrap();
        assert_eq!(line.fields[0].type_, FieldType::Model(1));
        assert!(line.fields[1].is_array);
        assert_eq!(schema.model(1).unwrap().fields[0].type_, FieldType::Primitive(Primitive::Int32));
        assert_eq!(schema.model_index("Point"), Some(1));
    }
}
