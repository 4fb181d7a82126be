use ccl_schema::Primitive;
use crate::{
    backend::{first_clash, indent_block, Backend, GenerationContext, GENERATED_HEADER},
    error::CclError,
    planner::{FieldPlan, ModelPlan, Strategy},
    types::Model,
};

/// Go representation of each primitive.
pub const GO_NATIVE_TYPES: [(Primitive, &str); 14] = [
    (Primitive::Bool,     "bool"),
    (Primitive::Int8,     "int8"),
    (Primitive::Int16,    "int16"),
    (Primitive::Int32,    "int32"),
    (Primitive::Int64,    "int64"),
    (Primitive::UInt8,    "uint8"),
    (Primitive::UInt16,   "uint16"),
    (Primitive::UInt32,   "uint32"),
    (Primitive::UInt64,   "uint64"),
    (Primitive::Float32,  "float32"),
    (Primitive::Float64,  "float64"),
    (Primitive::String,   "string"),
    (Primitive::Bytes,    "[]byte"),
    (Primitive::DateTime, "time.Time"),
];

const TAB: &str = "\t";

const GO_KEYWORDS: [&str; 25] = [
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

/// Names a model type cannot take: package-level declarations of the
/// helpers file, imported packages, predeclared identifiers the generated
/// code calls, and the locals that are in scope wherever a model type is
/// named.
const GO_RESERVED_TYPE_NAMES: [&str; 36] = [
    "ErrTooLong", "ErrTruncated", "NewSerializable", "Serializable", "isNilMessage",
    "modelFactories", "readCount", "readFixed", "readLen", "readPrefixed", "readTime",
    "writeFixed", "writeLen", "writeMessage", "writePrefixed", "writeTime",
    "binary", "errors", "io", "math", "time",
    "any", "byte", "error", "int", "len", "make", "new", "nil",
    "buf", "count", "data", "err", "i", "m", "raw",
];

/// Field names that would collide with the generated methods.
const GO_METHOD_NAMES: [&str; 5] = [
    "CloneEmpty", "CloneEmptySerializable", "DeserializeBinary", "GetModelId", "SerializeBinary",
];

/// Emits a Go package: one struct per model with pointer receivers
/// implementing the `Serializable` interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

fn native_type(primitive: Primitive) -> Option<&'static str> {
    GO_NATIVE_TYPES
        .iter()
        .find(|(p, _)| *p == primitive)
        .map(|(_, name)| *name)
}

fn unsupported(model: &Model, field: &FieldPlan) -> CclError {
    CclError::UnsupportedFieldType {
        type_name:  field.type_name.clone(),
        field_name: field.field_name.clone(),
        model_name: model.name.clone(),
        backend:    "go".to_string(),
    }
}

/// The Go type of one element: primitives via the native table, models as
/// pointers.
fn element_type(strategy: &Strategy) -> Option<String> {
    match strategy {
        Strategy::FixedScalar(primitive)   => native_type(*primitive).map(str::to_string),
        Strategy::LengthPrefixedText       => native_type(Primitive::String).map(str::to_string),
        Strategy::LengthPrefixedBytes      => native_type(Primitive::Bytes).map(str::to_string),
        Strategy::Timestamp                => native_type(Primitive::DateTime).map(str::to_string),
        Strategy::LengthPrefixedNested(m)  => Some(format!("*{}", m)),
        Strategy::Array(element)           => element_type(element).map(|t| format!("[]{}", t)),
    }
}

fn conflict(reason: String) -> CclError {
    CclError::NameConflict { backend: "go".to_string(), reason }
}

fn model_id_const(model_name: &str) -> String {
    format!("ModelId{}", model_name)
}

fn package_name<'c>(ctx: &'c GenerationContext) -> Result<&'c str, CclError> {
    if ctx.package_name.is_empty() {
        return Err(CclError::MissingPackageName("Go"));
    }
    Ok(&ctx.package_name)
}

/// Header, package clause, import block and body of one Go source file.
fn go_file(package: &str, imports: &[&str], body: Vec<String>) -> String {
    let mut lines = vec![
        GENERATED_HEADER.to_string(),
        String::new(),
        format!("package {}", package),
        String::new(),
    ];
    if !imports.is_empty() {
        lines.push("import (".to_string());
        for import in imports {
            lines.push(format!("{}\"{}\"", TAB, import));
        }
        lines.push(")".to_string());
        lines.push(String::new());
    }
    lines.extend(body);
    lines.join("\n") + "\n"
}

fn check_err(call: &str, ret: &str) -> Vec<String> {
    vec![
        format!("if err := {}; err != nil {{", call),
        format!("{}return {}", TAB, ret),
        "}".to_string(),
    ]
}

fn encode_call(strategy: &Strategy, value: &str) -> String {
    match strategy {
        Strategy::FixedScalar(_)          => format!("writeFixed(buf, {})", value),
        Strategy::LengthPrefixedText      => format!("writePrefixed(buf, []byte({}))", value),
        Strategy::LengthPrefixedBytes     => format!("writePrefixed(buf, {})", value),
        Strategy::Timestamp               => format!("writeTime(buf, {})", value),
        Strategy::LengthPrefixedNested(_) => format!("writeMessage(buf, {})", value),
        Strategy::Array(_)                => format!("writeLen(buf, len({}))", value),
    }
}

fn encode_field(strategy: &Strategy, value: &str) -> Vec<String> {
    let mut lines = check_err(&encode_call(strategy, value), "nil, err");
    if let Strategy::Array(element) = strategy {
        lines.push(format!("for _, elem := range {} {{", value));
        indent_block(&mut lines, &check_err(&encode_call(element, "elem"), "nil, err"), 1, TAB);
        lines.push("}".to_string());
    }
    lines
}

/// Reads a prefixed payload into `raw` inside a fresh block, then runs `then`.
fn with_prefixed(then: Vec<String>) -> Vec<String> {
    let mut lines = vec![
        "{".to_string(),
        format!("{}raw, err := readPrefixed(buf)", TAB),
        format!("{}if err != nil {{", TAB),
        format!("{}{}return err", TAB, TAB),
        format!("{}}}", TAB),
    ];
    indent_block(&mut lines, &then, 1, TAB);
    lines.push("}".to_string());
    lines
}

fn decode_field(strategy: &Strategy, target: &str) -> Result<Vec<String>, String> {
    let lines = match strategy {
        Strategy::FixedScalar(_) => check_err(&format!("readFixed(buf, &{})", target), "err"),
        Strategy::LengthPrefixedText  => with_prefixed(vec![format!("{} = string(raw)", target)]),
        Strategy::LengthPrefixedBytes => with_prefixed(vec![format!("{} = raw", target)]),
        Strategy::Timestamp => check_err(&format!("readTime(buf, &{})", target), "err"),
        Strategy::LengthPrefixedNested(model) => {
            let mut then = vec![
                "if isNilMessage(raw) {".to_string(),
                format!("{}{} = nil", TAB, target),
                "} else {".to_string(),
                format!("{}{} = new({})", TAB, target, model),
            ];
            indent_block(&mut then, &check_err(&format!("{}.DeserializeBinary(raw)", target), "err"), 1, TAB);
            then.push("}".to_string());
            with_prefixed(then)
        }
        Strategy::Array(element) => {
            let slice_type = element_type(strategy).ok_or_else(|| target.to_string())?;
            let mut lines = vec![
                "{".to_string(),
                format!("{}count, err := readCount(buf)", TAB),
                format!("{}if err != nil {{", TAB),
                format!("{}{}return err", TAB, TAB),
                format!("{}}}", TAB),
                format!("{}{} = make({}, count)", TAB, target, slice_type),
                format!("{}for i := range {} {{", TAB, target),
            ];
            let element_lines = decode_field(element, &format!("{}[i]", target))?;
            indent_block(&mut lines, &element_lines, 2, TAB);
            lines.push(format!("{}}}", TAB));
            lines.push("}".to_string());
            lines
        }
    };
    Ok(lines)
}

fn model_methods(model: &Model, plan: &ModelPlan) -> Result<Vec<String>, CclError> {
    let name = &model.name;
    let mut lines = vec![
        "//------------------------------------------------------------".to_string(),
        format!("// {}", name),
        String::new(),
        format!("func (m *{}) GetModelId() int {{", name),
        format!("{}return {}", TAB, model_id_const(name)),
        "}".to_string(),
        String::new(),
    ];

    for (method, ret) in [("CloneEmpty", format!("*{}", name)), ("CloneEmptySerializable", "Serializable".to_string())] {
        lines.push(format!("func (m *{}) {}() {} {{", name, method, ret));
        lines.push(format!("{}if m == nil {{", TAB));
        lines.push(format!("{}{}return nil", TAB, TAB));
        lines.push(format!("{}}}", TAB));
        lines.push(format!("{}return &{}{{}}", TAB, name));
        lines.push("}".to_string());
        lines.push(String::new());
    }

    lines.push(format!("func (m *{}) SerializeBinary() ([]byte, error) {{", name));
    lines.push(format!("{}if m == nil {{", TAB));
    lines.push(format!("{}{}return []byte{{0}}, nil", TAB, TAB));
    lines.push(format!("{}}}", TAB));
    if plan.fields.is_empty() {
        lines.push(format!("{}return []byte{{}}, nil", TAB));
    } else {
        lines.push(String::new());
        lines.push(format!("{}buf := new(bytes.Buffer)", TAB));
        for field in &plan.fields {
            let value = format!("m.{}", field.field_name);
            indent_block(&mut lines, &encode_field(&field.strategy, &value), 1, TAB);
        }
        lines.push(format!("{}return buf.Bytes(), nil", TAB));
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("func (m *{}) DeserializeBinary(data []byte) error {{", name));
    lines.push(format!("{}*m = {}{{}}", TAB, name));
    if !plan.fields.is_empty() {
        lines.push(format!("{}if isNilMessage(data) {{", TAB));
        lines.push(format!("{}{}return nil", TAB, TAB));
        lines.push(format!("{}}}", TAB));
        lines.push(String::new());
        lines.push(format!("{}buf := bytes.NewReader(data)", TAB));
        for field in &plan.fields {
            let target = format!("m.{}", field.field_name);
            let decoded = decode_field(&field.strategy, &target).map_err(|_| unsupported(model, field))?;
            indent_block(&mut lines, &decoded, 1, TAB);
        }
    }
    lines.push(format!("{}return nil", TAB));
    lines.push("}".to_string());
    Ok(lines)
}

const HELPERS: &str = r#"// ErrTruncated is returned when data ends before a value or a length
// prefix is satisfied.
var ErrTruncated = errors.New("ccl: truncated input")

// ErrTooLong is returned when a length does not fit in a uint32 prefix.
var ErrTooLong = errors.New("ccl: length exceeds uint32")

func isNilMessage(data []byte) bool {
	return len(data) == 1 && data[0] == 0
}

func writeFixed(buf *bytes.Buffer, value any) error {
	return binary.Write(buf, binary.LittleEndian, value)
}

func readFixed(buf *bytes.Reader, value any) error {
	if err := binary.Read(buf, binary.LittleEndian, value); err != nil {
		if errors.Is(err, io.EOF) || errors.Is(err, io.ErrUnexpectedEOF) {
			return ErrTruncated
		}
		return err
	}
	return nil
}

func writeLen(buf *bytes.Buffer, n int) error {
	if uint64(n) > math.MaxUint32 {
		return ErrTooLong
	}
	return writeFixed(buf, uint32(n))
}

func writePrefixed(buf *bytes.Buffer, data []byte) error {
	if err := writeLen(buf, len(data)); err != nil {
		return err
	}
	_, err := buf.Write(data)
	return err
}

func writeMessage(buf *bytes.Buffer, message Serializable) error {
	data, err := message.SerializeBinary()
	if err != nil {
		return err
	}
	return writePrefixed(buf, data)
}

func readLen(buf *bytes.Reader) (int, error) {
	var n uint32
	if err := readFixed(buf, &n); err != nil {
		return 0, err
	}
	return int(n), nil
}

// readCount rejects counts larger than the remaining data, since every
// element occupies at least one byte.
func readCount(buf *bytes.Reader) (int, error) {
	n, err := readLen(buf)
	if err != nil {
		return 0, err
	}
	if n > buf.Len() {
		return 0, ErrTruncated
	}
	return n, nil
}

func readPrefixed(buf *bytes.Reader) ([]byte, error) {
	n, err := readLen(buf)
	if err != nil {
		return nil, err
	}
	if n > buf.Len() {
		return nil, ErrTruncated
	}
	data := make([]byte, n)
	if _, err := io.ReadFull(buf, data); err != nil {
		return nil, ErrTruncated
	}
	return data, nil
}

// NewSerializable returns an empty instance of the model with the given id,
// or nil when no model has that id.
func NewSerializable(modelId int) Serializable {
	factory, ok := modelFactories[modelId]
	if !ok {
		return nil
	}
	return factory()
}"#;

/// Appended to the helpers when some model has a datetime field. The zero
/// `time.Time` has no UnixNano value, so it travels as 0 and 0 decodes back
/// to the zero time.
const TIME_HELPERS: &str = r#"func writeTime(buf *bytes.Buffer, t time.Time) error {
	if t.IsZero() {
		return writeFixed(buf, int64(0))
	}
	return writeFixed(buf, t.UnixNano())
}

func readTime(buf *bytes.Reader, t *time.Time) error {
	var nanos int64
	if err := readFixed(buf, &nanos); err != nil {
		return err
	}
	if nanos == 0 {
		*t = time.Time{}
	} else {
		*t = time.Unix(0, nanos).UTC()
	}
	return nil
}"#;

impl Backend for GoBackend {
    fn name(&self) -> &'static str {
        "go"
    }

    fn extension(&self) -> &'static str {
        "go"
    }

    fn check_names(&self, ctx: &GenerationContext) -> Result<(), CclError> {
        let models = &ctx.definition.models;
        for model in models {
            if model.name == "_" || GO_KEYWORDS.contains(&model.name.as_str()) {
                return Err(conflict(format!("model name \"{}\" is not a usable Go type name", model.name)));
            }
            if GO_RESERVED_TYPE_NAMES.contains(&model.name.as_str()) {
                return Err(conflict(format!("model \"{}\" collides with `{}` in the generated code", model.name, model.name)));
            }
        }
        let declared = models
            .iter()
            .map(|m| (m.name.as_str(), m.name.clone()))
            .chain(models.iter().map(|m| (m.name.as_str(), model_id_const(&m.name))));
        if let Some((first, second, name)) = first_clash(declared) {
            return Err(conflict(format!("models \"{}\" and \"{}\" both declare `{}`", first, second, name)));
        }
        for model in models {
            for field in &model.fields {
                if field.name == "_" || GO_KEYWORDS.contains(&field.name.as_str()) {
                    return Err(conflict(format!(
                        "field name \"{}\" of model \"{}\" is not a usable Go field name",
                        field.name, model.name
                    )));
                }
                if GO_METHOD_NAMES.contains(&field.name.as_str()) {
                    return Err(conflict(format!(
                        "field \"{}\" of model \"{}\" collides with the generated method `{}`",
                        field.name, model.name, field.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn constants(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let package = package_name(ctx)?;
        let mut body = vec!["const (".to_string()];
        for model in &ctx.definition.models {
            body.push(format!("{}{} = {}", TAB, model_id_const(&model.name), model.model_id));
        }
        body.push(")".to_string());
        Ok(Some(go_file(package, &[], body)))
    }

    fn vars(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let package = package_name(ctx)?;
        let mut body = vec!["var modelFactories = map[int]func() Serializable{".to_string()];
        for model in &ctx.definition.models {
            body.push(format!(
                "{}{}: func() Serializable {{ return &{}{{}} }},",
                TAB,
                model_id_const(&model.name),
                model.name
            ));
        }
        body.push("}".to_string());
        Ok(Some(go_file(package, &[], body)))
    }

    fn types(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let package = package_name(ctx)?;
        let mut body = vec![
            "// Serializable is implemented by every generated model.".to_string(),
            "type Serializable interface {".to_string(),
            format!("{}GetModelId() int", TAB),
            format!("{}SerializeBinary() ([]byte, error)", TAB),
            format!("{}DeserializeBinary(data []byte) error", TAB),
            format!("{}CloneEmptySerializable() Serializable", TAB),
            "}".to_string(),
        ];
        for (model, plan) in ctx.models() {
            body.push(String::new());
            body.push(format!("type {} struct {{", model.name));
            for field in &plan.fields {
                let go_type = element_type(&field.strategy).ok_or_else(|| unsupported(model, field))?;
                body.push(format!("{}{} {}", TAB, field.field_name, go_type));
            }
            body.push("}".to_string());
        }
        let imports: &[&str] = if ctx.uses_timestamps() { &["time"] } else { &[] };
        Ok(Some(go_file(package, imports, body)))
    }

    fn helpers(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let package = package_name(ctx)?;
        let mut body: Vec<String> = HELPERS.lines().map(str::to_string).collect();
        let mut imports = vec!["bytes", "encoding/binary", "errors", "io", "math"];
        if ctx.uses_timestamps() {
            body.push(String::new());
            body.extend(TIME_HELPERS.lines().map(str::to_string));
            imports.push("time");
        }
        Ok(Some(go_file(package, &imports, body)))
    }

    fn methods(&self, ctx: &GenerationContext) -> Result<Option<String>, CclError> {
        if ctx.is_empty() {
            return Ok(None);
        }
        let package = package_name(ctx)?;
        let mut body = Vec::new();
        for (i, (model, plan)) in ctx.models().enumerate() {
            if i > 0 {
                body.push(String::new());
            }
            body.extend(model_methods(model, plan)?);
        }

        let imports: &[&str] = if ctx.plans.iter().any(|plan| !plan.fields.is_empty()) { &["bytes"] } else { &[] };
        Ok(Some(go_file(package, imports, body)))
    }
}
