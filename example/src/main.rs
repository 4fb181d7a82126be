use ccl::{Serializable, Timestamp, Value};
use example_app::generated::{new_by_model_id, Drawing, Line, Point, MODEL_ID_LINE};

const SHAPES: &str = include_str!("../schema/shapes.ccl");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let line = Line {
        a: Some(Box::new(Point { x: 1, y: 2 })),
        points: vec![Point { x: 3, y: 4 }],
        label: "ab".to_string(),
    };
    let bytes = line.serialize_binary()?;
    println!("Line encodes to {} bytes: {:02x?}", bytes.len(), bytes);

    // Decode through the capability interface, knowing only the model id.
    let mut decoded = new_by_model_id(MODEL_ID_LINE).ok_or("unknown model id")?;
    decoded.deserialize_binary(&bytes)?;
    let decoded_line = decoded.as_any().downcast_ref::<Line>().ok_or("not a Line")?;
    assert_eq!(decoded_line, &line);
    println!("Decoded {:?}", decoded_line);

    // The same bytes, decoded dynamically from the schema text.
    println!("As JSON: {}", ccl::decode_to_json(SHAPES, "Line", &bytes)?);

    let drawing = Drawing {
        title: "sketch".to_string(),
        lines: vec![line.clone(), line.clone_empty()],
        thumbnail: vec![0x89, b'P', b'N', b'G'],
        created_at: Timestamp::now(),
        tags: vec!["draft".to_string()],
        visible: true,
        scale: 1.5,
    };
    let bytes = drawing.serialize_binary()?;
    let definition = ccl::compile_schema(SHAPES)?;
    let schema = ccl::compile_runtime_schema(&definition)?;
    let index = schema.model_index("Drawing").ok_or("unknown model")?;
    let value = Value::decode(&schema, index, &bytes)?;
    println!("Drawing {} as a dynamic value: {:?}", drawing.model_id(), value);

    Ok(())
}
