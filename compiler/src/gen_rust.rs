use ccl_schema::Primitive;
use crate::{
    backend::{first_clash, indent_block, ArtifactKind, Backend, GenerationContext, GENERATED_HEADER},
    error::CclError,
    planner::{FieldPlan, ModelPlan, Strategy},
    types::Model,
};

/// Rust representation of each primitive. Scalar names double as the
/// `ByteBuffer` read/write method suffixes.
pub const RUST_NATIVE_TYPES: [(Primitive, &str); 14] = [
    (Primitive::Bool,     "bool"),
    (Primitive::Int8,     "i8"),
    (Primitive::Int16,    "i16"),
    (Primitive::Int32,    "i32"),
    (Primitive::Int64,    "i64"),
    (Primitive::UInt8,    "u8"),
    (Primitive::UInt16,   "u16"),
    (Primitive::UInt32,   "u32"),
    (Primitive::UInt64,   "u64"),
    (Primitive::Float32,  "f32"),
    (Primitive::Float64,  "f64"),
    (Primitive::String,   "String"),
    (Primitive::Bytes,    "Vec<u8>"),
    (Primitive::DateTime, "Timestamp"),
];

const INDENT: &str = "    ";

/// Type and variant names the generated modules use unqualified. A model
/// whose type name equals one of these would shadow it.
const RESERVED_TYPE_NAMES: [&str; 21] = [
    "Any", "Box", "ByteBuffer", "ByteBufferMut", "Clone", "Debug", "DecodeError",
    "Default", "EncodeError", "Err", "None", "Ok", "Option", "PartialEq", "Result",
    "Self", "Serializable", "Some", "String", "Timestamp", "Vec",
];

/// Emits a Rust module tree (`mod.rs` plus one file per category) built on
/// the `ccl` runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

/// Converts a string to PascalCase.
/// - If the string contains underscores, it splits on underscores and converts each word
///   so that its first letter is uppercase and the rest lowercase.
/// - If the string is fully uppercase, only the first letter stays uppercase.
/// - Otherwise, it ensures only the first letter is uppercase.
pub fn to_pascal_case(s: &str) -> String {
    fn capitalize(word: &str, lower_rest: bool) -> String {
        let mut chars = word.chars();
        match chars.next() {
            None => String::new(),
            Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
            Some(first) => first.to_uppercase().to_string() + chars.as_str(),
        }
    }

    if s.contains('_') {
        s.split('_')
         .filter(|word| !word.is_empty())
         .map(|word| capitalize(word, true))
         .collect::<String>()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to snake_case.
/// Underscores are not inserted between consecutive uppercase letters, so
/// acronyms stay intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                if (!prev.is_uppercase() && prev != '_')
                    || (prev.is_uppercase() && i + 1 < chars.len() && chars[i + 1].is_lowercase())
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "abstract", "as", "async", "await", "become", "box", "break", "const",
        "continue", "crate", "do", "dyn", "else", "enum", "extern", "false",
        "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
        "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
        "return", "self", "Self", "static", "struct", "super", "trait", "true",
        "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where",
        "while", "yield",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

fn native_type(primitive: Primitive) -> Option<&'static str> {
    RUST_NATIVE_TYPES
        .iter()
        .find(|(p, _)| *p == primitive)
        .map(|(_, name)| *name)
}

fn unsupported(model: &Model, field: &FieldPlan) -> CclError {
    CclError::UnsupportedFieldType {
        type_name:  field.type_name.clone(),
        field_name: field.field_name.clone(),
        model_name: model.name.clone(),
        backend:    "rust".to_string(),
    }
}

fn conflict(reason: String) -> CclError {
    CclError::NameConflict { backend: "rust".to_string(), reason }
}

fn type_name(model_name: &str) -> String {
    to_pascal_case(model_name)
}

fn field_name(field: &FieldPlan) -> String {
    escape_rust_keyword(&to_snake_case(&field.field_name))
}

fn model_id_const(model_name: &str) -> String {
    format!("MODEL_ID_{}", to_snake_case(model_name).to_uppercase())
}

/// The Rust type of one array element or single value.
fn element_type(strategy: &Strategy) -> Option<String> {
    match strategy {
        Strategy::FixedScalar(primitive)  => native_type(*primitive).map(str::to_string),
        Strategy::LengthPrefixedText      => native_type(Primitive::String).map(str::to_string),
        Strategy::LengthPrefixedBytes     => native_type(Primitive::Bytes).map(str::to_string),
        Strategy::Timestamp               => native_type(Primitive::DateTime).map(str::to_string),
        Strategy::LengthPrefixedNested(m) => Some(type_name(m)),
        Strategy::Array(element)          => element_type(element).map(|t| format!("Vec<{}>", t)),
    }
}

fn field_type(strategy: &Strategy) -> Option<String> {
    match strategy {
        Strategy::LengthPrefixedNested(m) => Some(format!("Option<Box<{}>>", type_name(m))),
        other => element_type(other),
    }
}

fn rust_file(uses: &[String], body: Vec<String>) -> String {
    let mut lines = vec![GENERATED_HEADER.to_string(), String::new()];
    if !uses.is_empty() {
        lines.extend(uses.iter().cloned());
        lines.push(String::new());
    }
    lines.extend(body);
    lines.join("\n") + "\n"
}

/// `by_ref` values are `&T` loop items; otherwise `value` is a `self.` path.
fn write_stmt(strategy: &Strategy, value: &str, by_ref: bool) -> Option<Vec<String>> {
    let copied = if by_ref { format!("*{}", value) } else { value.to_string() };
    let borrowed = if by_ref { value.to_string() } else { format!("&{}", value) };
    let stmt = match strategy {
        Strategy::FixedScalar(p)          => format!("bb.write_{}({});", native_type(*p)?, copied),
        Strategy::LengthPrefixedText      => format!("bb.write_string({})?;", borrowed),
        Strategy::LengthPrefixedBytes     => format!("bb.write_bytes({})?;", borrowed),
        Strategy::Timestamp               => format!("bb.write_timestamp({});", copied),
        Strategy::LengthPrefixedNested(_) if by_ref => format!("bb.write_element({})?;", value),
        Strategy::LengthPrefixedNested(_) => format!("bb.write_message({}.as_deref())?;", value),
        Strategy::Array(element) => {
            let mut lines = vec![
                format!("bb.write_len({}.len())?;", value),
                format!("for item in &{} {{", value),
            ];
            indent_block(&mut lines, &write_stmt(element, "item", true)?, 1, INDENT);
            lines.push("}".to_string());
            return Some(lines);
        }
    };
    Some(vec![stmt])
}

fn read_expr(strategy: &Strategy, in_array: bool) -> Option<String> {
    let expr = match strategy {
        Strategy::FixedScalar(p)          => format!("bb.read_{}()?", native_type(*p)?),
        Strategy::LengthPrefixedText      => "bb.read_string()?".to_string(),
        Strategy::LengthPrefixedBytes     => "bb.read_byte_vec()?".to_string(),
        Strategy::Timestamp               => "bb.read_timestamp()?".to_string(),
        Strategy::LengthPrefixedNested(m) if in_array => format!("bb.read_element::<{}>()?", type_name(m)),
        Strategy::LengthPrefixedNested(m) => format!("bb.read_message::<{}>()?.map(Box::new)", type_name(m)),
        Strategy::Array(_) => return None,
    };
    Some(expr)
}

fn read_stmt(strategy: &Strategy, target: &str) -> Option<Vec<String>> {
    match strategy {
        Strategy::Array(element) => Some(vec![
            "let count = bb.read_count()?;".to_string(),
            format!("{} = Vec::with_capacity(count);", target),
            "for _ in 0..count {".to_string(),
            format!("{}{}.push({});", INDENT, target, read_expr(element, true)?),
            "}".to_string(),
        ]),
        other => Some(vec![format!("{} = {};", target, read_expr(other, false)?)]),
    }
}

fn model_methods(model: &Model, plan: &ModelPlan) -> Result<Vec<String>, CclError> {
    let name = type_name(&model.name);
    let mut lines = vec![
        format!("impl {} {{", name),
        format!("{}/// A zero-valued `{}`; field values are not copied.", INDENT, name),
        format!("{}pub fn clone_empty(&self) -> {} {{", INDENT, name),
        format!("{}{}{}::default()", INDENT, INDENT, name),
        format!("{}}}", INDENT),
        "}".to_string(),
        String::new(),
        format!("impl Serializable for {} {{", name),
        format!("{}fn model_id(&self) -> u32 {{", INDENT),
        format!("{}{}{}", INDENT, INDENT, model_id_const(&model.name)),
        format!("{}}}", INDENT),
        String::new(),
    ];

    let mut serialize = vec!["fn serialize_binary(&self) -> Result<Vec<u8>, EncodeError> {".to_string()];
    let data = if plan.fields.is_empty() { "_data" } else { "data" };
    let mut deserialize = vec![
        format!("fn deserialize_binary(&mut self, {}: &[u8]) -> Result<(), DecodeError> {{", data),
        format!("{}*self = {}::default();", INDENT, name),
    ];
    if plan.fields.is_empty() {
        serialize.push(format!("{}Ok(Vec::new())", INDENT));
    } else {
        serialize.push(format!("{}let mut bb = ByteBufferMut::new();", INDENT));
        deserialize.push(format!("{}if is_nil(data) {{", INDENT));
        deserialize.push(format!("{}{}return Ok(());", INDENT, INDENT));
        deserialize.push(format!("{}}}", INDENT));
        deserialize.push(format!("{}let mut bb = ByteBuffer::new(data);", INDENT));
        for field in &plan.fields {
            let target = format!("self.{}", field_name(field));
            let write = write_stmt(&field.strategy, &target, false).ok_or_else(|| unsupported(model, field))?;
            let read = read_stmt(&field.strategy, &target).ok_or_else(|| unsupported(model, field))?;
            indent_block(&mut serialize, &write, 1, INDENT);
            indent_block(&mut deserialize, &read, 1, INDENT);
        }
        serialize.push(format!("{}Ok(bb.data())", INDENT));
    }
    serialize.push("}".to_string());
    deserialize.push(format!("{}Ok(())", INDENT));
    deserialize.push("}".to_string());

    indent_block(&mut lines, &serialize, 1, INDENT);
    lines.push(String::new());
    indent_block(&mut lines, &deserialize, 1, INDENT);
    lines.extend([
        String::new(),
        format!("{}fn clone_empty_serializable(&self) -> Box<dyn Serializable> {{", INDENT),
        format!("{}{}Box::new(self.clone_empty())", INDENT, INDENT),
        format!("{}}}", INDENT),
        String::new(),
        format!("{}fn as_any(&self) -> &dyn Any {{", INDENT),
        format!("{}{}self", INDENT, INDENT),
        format!("{}}}", INDENT),
        "}".to_string(),
    ]);
    Ok(lines)
}

fn use_list(path: &str, names: Vec<String>) -> String {
    if names.len() == 1 {
        format!("use {}::{};", path, names[0])
    } else {
        format!("use {}::{{{}}};", path, names.join(", "))
    }
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust"
    }

    fn extension(&self) -> &'static str {
        "rs"
    }

    fn check_names(&self, ctx: &GenerationContext) -> Result<(), CclError> {
        let models = &ctx.definition.models;
        for model in models {
            let name = type_name(&model.name);
            if !name.starts_with(|c: char| c.is_alphabetic()) {
                return Err(conflict(format!("model \"{}\" does not map to a Rust type name", model.name)));
            }
            if RESERVED_TYPE_NAMES.contains(&name.as_str()) {
                return Err(conflict(format!("model \"{}\" would shadow `{}` in the generated code", model.name, name)));
            }
        }
        for to_name in [type_name, model_id_const] {
            if let Some((first, second, name)) = first_clash(models.iter().map(|m| (m.name.as_str(), to_name(&m.name)))) {
                return Err(conflict(format!("models \"{}\" and \"{}\" both become `{}`", first, second, name)));
            }
        }
        for (model, plan) in ctx.models() {
            if let Some(field) = plan.fields.iter().find(|field| field_name(field) == "_") {
                return Err(conflict(format!("field \"{}\" of model \"{}\" does not map to a Rust field name", field.field_name, model.name)));
            }
            let fields = plan.fields.iter().map(|field| (field.field_name.as_str(), field_name(field)));
            if let Some((first, second, name)) = first_clash(fields) {
                return Err(conflict(format!(
                    "fields \"{}\" and \"{}\" of model \"{}\" both become `{}`",
                    first, second, model.name, name
                )));
            }
        }
        Ok(())
    }

    fn constants(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let body = ctx
            .definition
            .models
            .iter()
            .map(|model| format!("pub const {}: u32 = {};", model_id_const(&model.name), model.model_id))
            .collect();
        Ok(Some(rust_file(&[], body)))
    }

    fn vars(&self, _ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        Ok(None)
    }

    fn types(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let mut body = Vec::new();
        for (model, plan) in ctx.models() {
            if !body.is_empty() {
                body.push(String::new());
            }
            body.push("#[derive(Debug, Clone, PartialEq, Default)]".to_string());
            body.push(format!("pub struct {} {{", type_name(&model.name)));
            for field in &plan.fields {
                let rust_type = field_type(&field.strategy).ok_or_else(|| unsupported(model, field))?;
                body.push(format!("{}pub {}: {},", INDENT, field_name(field), rust_type));
            }
            body.push("}".to_string());
        }
        let uses = if ctx.uses_timestamps() { vec!["use ccl::Timestamp;".to_string()] } else { vec![] };
        Ok(Some(rust_file(&uses, body)))
    }

    fn helpers(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let models = &ctx.definition.models;
        let uses = vec![
            "use ccl::Serializable;".to_string(),
            String::new(),
            use_list("super::constants", models.iter().map(|m| model_id_const(&m.name)).collect()),
            use_list("super::types", models.iter().map(|m| type_name(&m.name)).collect()),
        ];
        let mut body = vec![
            "/// Returns an empty instance of the model with the given id.".to_string(),
            "pub fn new_by_model_id(model_id: u32) -> Option<Box<dyn Serializable>> {".to_string(),
            format!("{}match model_id {{", INDENT),
        ];
        for model in models {
            body.push(format!(
                "{}{}{} => Some(Box::new({}::default())),",
                INDENT,
                INDENT,
                model_id_const(&model.name),
                type_name(&model.name)
            ));
        }
        body.push(format!("{}{}_ => None,", INDENT, INDENT));
        body.push(format!("{}}}", INDENT));
        body.push("}".to_string());
        Ok(Some(rust_file(&uses, body)))
    }

    fn methods(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let models = &ctx.definition.models;
        let mut runtime = Vec::new();
        if ctx.plans.iter().any(|plan| !plan.fields.is_empty()) {
            runtime.extend(["ByteBuffer", "ByteBufferMut"]);
        }
        runtime.extend(["DecodeError", "EncodeError"]);
        if ctx.plans.iter().any(|plan| !plan.fields.is_empty()) {
            runtime.push("is_nil");
        }
        runtime.push("Serializable");

        let uses = vec![
            "use std::any::Any;".to_string(),
            String::new(),
            use_list("ccl", runtime.into_iter().map(str::to_string).collect()),
            String::new(),
            use_list("super::constants", models.iter().map(|m| model_id_const(&m.name)).collect()),
            use_list("super::types", models.iter().map(|m| type_name(&m.name)).collect()),
        ];

        let mut body = Vec::new();
        for (model, plan) in ctx.models() {
            if !body.is_empty() {
                body.push(String::new());
            }
            body.extend(model_methods(model, plan)?);
        }
        Ok(Some(rust_file(&uses, body)))
    }

    fn index(&self, _ctx: &GenerationContext, written: &[ArtifactKind]) -> Option<String> {
        if written.is_empty() {
            return None;
        }
        let mut body: Vec<String> = written
            .iter()
            .map(|kind| format!("pub mod {};", kind.stem()))
            .collect();
        body.push(String::new());
        for kind in [ArtifactKind::Constants, ArtifactKind::Types, ArtifactKind::Helpers] {
            if written.contains(&kind) {
                body.push(format!("pub use {}::*;", kind.stem()));
            }
        }
        Some(rust_file(&[], body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compiler::compile_schema, types::Definition};

    const SHAPES: &str = "model Point { X int32; Y int32; }\nmodel Line { A Point; Points []Point; Label string; }";

    fn context(def: &Definition) -> GenerationContext<'_> {
        GenerationContext::new(def, "shapes").unwrap()
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("point"), "Point");
        assert_eq!(to_pascal_case("SIGNAL"), "Signal");
        assert_eq!(to_pascal_case("user_account"), "UserAccount");
        assert_eq!(to_pascal_case("HttpRequest"), "HttpRequest");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Points"), "points");
        assert_eq!(to_snake_case("sessionID"), "session_id");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("created_At"), "created_at");
    }

    #[test]
    fn test_escape_rust_keyword() {
        assert_eq!(escape_rust_keyword("type"), "type_");
        assert_eq!(escape_rust_keyword("label"), "label");
    }

    #[test]
    fn test_rust_constants() {
        let def = compile_schema(SHAPES).unwrap();
        let out = RustBackend.constants(&context(&def)).unwrap().unwrap();
        assert_eq!(
            out,
            format!("{}\n\npub const MODEL_ID_POINT: u32 = 0;\npub const MODEL_ID_LINE: u32 = 1;\n", GENERATED_HEADER)
        );
    }

    #[test]
    fn test_rust_types() {
        let def = compile_schema(SHAPES).unwrap();
        let out = RustBackend.types(&context(&def)).unwrap().unwrap();
        assert!(out.contains("pub struct Line {\n    pub a: Option<Box<Point>>,\n    pub points: Vec<Point>,\n    pub label: String,\n}"));
        assert!(!out.contains("Timestamp"));

        let def = compile_schema("model Event { At datetime; type string; }").unwrap();
        let out = RustBackend.types(&context(&def)).unwrap().unwrap();
        assert!(out.contains("use ccl::Timestamp;\n"));
        assert!(out.contains("    pub at: Timestamp,\n    pub type_: String,\n"));
    }

    #[test]
    fn test_rust_methods() {
        let def = compile_schema(SHAPES).unwrap();
        let out = RustBackend.methods(&context(&def)).unwrap().unwrap();
        assert!(out.contains("use ccl::{ByteBuffer, ByteBufferMut, DecodeError, EncodeError, is_nil, Serializable};"));
        assert!(out.contains("        bb.write_i32(self.x);\n"));
        assert!(out.contains("        bb.write_message(self.a.as_deref())?;\n"));
        assert!(out.contains("        for item in &self.points {\n            bb.write_element(item)?;\n        }\n"));
        assert!(out.contains("        self.a = bb.read_message::<Point>()?.map(Box::new);\n"));
        assert!(out.contains("            self.points.push(bb.read_element::<Point>()?);\n"));
        assert!(out.contains("        self.label = bb.read_string()?;\n"));
    }

    #[test]
    fn test_rust_empty_model_ignores_data() {
        let def = compile_schema("model Ping {}").unwrap();
        let out = RustBackend.methods(&context(&def)).unwrap().unwrap();
        assert!(out.contains(
            "    fn deserialize_binary(&mut self, _data: &[u8]) -> Result<(), DecodeError> {\n        *self = Ping::default();\n        Ok(())\n    }\n"
        ));
        assert!(!out.contains("let _ = data;"));
        assert!(!out.contains("ByteBuffer"));
    }

    fn name_conflict(schema: &str) -> String {
        let def = compile_schema(schema).unwrap();
        match RustBackend.check_names(&context(&def)) {
            Err(CclError::NameConflict { backend, reason }) => {
                assert_eq!(backend, "rust");
                reason
            }
            other => panic!("expected a name conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_rust_rejects_fields_with_the_same_snake_case() {
        assert_eq!(
            name_conflict("model Point { X int32; x int32; }"),
            "fields \"X\" and \"x\" of model \"Point\" both become `x`"
        );
        assert_eq!(
            name_conflict("model Req { sessionID string; session_id string; }"),
            "fields \"sessionID\" and \"session_id\" of model \"Req\" both become `session_id`"
        );
    }

    #[test]
    fn test_rust_rejects_models_with_the_same_type_name() {
        assert_eq!(
            name_conflict("model user_account {} model UserAccount {}"),
            "models \"user_account\" and \"UserAccount\" both become `UserAccount`"
        );
    }

    #[test]
    fn test_rust_rejects_models_with_the_same_id_constant() {
        assert_eq!(
            name_conflict("model HTTPServer {} model HttpServer {}"),
            "models \"HTTPServer\" and \"HttpServer\" both become `MODEL_ID_HTTP_SERVER`"
        );
    }

    #[test]
    fn test_rust_rejects_models_shadowing_runtime_types() {
        for name in ["String", "Timestamp", "Vec", "Option", "Box", "Any", "ByteBuffer", "Ok"] {
            assert_eq!(
                name_conflict(&format!("model {} {{ A int32; }}", name)),
                format!("model \"{}\" would shadow `{}` in the generated code", name, name)
            );
        }
        assert_eq!(name_conflict("model STRING {}"), "model \"STRING\" would shadow `String` in the generated code");
    }

    #[test]
    fn test_rust_rejects_unusable_names() {
        assert_eq!(name_conflict("model _ {}"), "model \"_\" does not map to a Rust type name");
        assert_eq!(name_conflict("model _1st {}"), "model \"_1st\" does not map to a Rust type name");
        assert_eq!(name_conflict("model A { _ int32; }"), "field \"_\" of model \"A\" does not map to a Rust field name");
    }

    #[test]
    fn test_rust_accepts_escaped_keywords() {
        let def = compile_schema("model Event { type string; self int32; try bool; Holder Event; }").unwrap();
        assert!(RustBackend.check_names(&context(&def)).is_ok());
        let out = RustBackend.types(&context(&def)).unwrap().unwrap();
        assert!(out.contains("    pub type_: String,\n    pub self_: i32,\n    pub try_: bool,\n"));
    }

    #[test]
    fn test_rust_index() {
        let written = [ArtifactKind::Constants, ArtifactKind::Types, ArtifactKind::Helpers, ArtifactKind::Methods];
        let def = Definition::new(None, vec![]);
        let out = RustBackend.index(&context(&def), &written).unwrap();
        assert!(out.contains("pub mod constants;\npub mod types;\npub mod helpers;\npub mod methods;\n\n"));
        assert!(out.contains("pub use helpers::*;\n"));
        assert!(!out.contains("pub use methods"));
    }
}
