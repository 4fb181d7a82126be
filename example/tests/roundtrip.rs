use ccl::{serialize_optional, DecodeError, Serializable, Timestamp, NIL_MESSAGE};
use example_app::generated::{
    new_by_model_id, Drawing, Line, Point, MODEL_ID_DRAWING, MODEL_ID_LINE, MODEL_ID_POINT,
};

const LINE_BYTES: [u8; 34] = [
    8, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0,
    1, 0, 0, 0,
    8, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0,
    2, 0, 0, 0, b'a', b'b',
];

fn sample_line() -> Line {
    Line {
        a: Some(Box::new(Point { x: 1, y: 2 })),
        points: vec![Point { x: 3, y: 4 }],
        label: "ab".to_string(),
    }
}

fn sample_drawing() -> Drawing {
    Drawing {
        title: "sketch".to_string(),
        lines: vec![sample_line(), Line::default()],
        thumbnail: vec![0, 1, 2, 255],
        created_at: Timestamp::from_unix_nanos(-1_500_000_000),
        tags: vec!["draft".to_string(), String::new()],
        visible: true,
        scale: -0.25,
    }
}

#[test]
fn line_encodes_to_known_bytes() {
    assert_eq!(sample_line().serialize_binary().unwrap(), LINE_BYTES);
}

#[test]
fn line_decodes_from_known_bytes() {
    let mut line = Line::default();
    line.deserialize_binary(&LINE_BYTES).unwrap();
    assert_eq!(line, sample_line());
}

#[test]
fn drawing_round_trip() {
    let drawing = sample_drawing();
    let bytes = drawing.serialize_binary().unwrap();
    let mut decoded = Drawing::default();
    decoded.deserialize_binary(&bytes).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn empty_values_round_trip() {
    let drawing = Drawing::default();
    let bytes = drawing.serialize_binary().unwrap();
    let mut decoded = sample_drawing();
    decoded.deserialize_binary(&bytes).unwrap();
    assert_eq!(decoded, drawing);
}

#[test]
fn nil_message() {
    assert_eq!(serialize_optional::<Line>(None).unwrap(), NIL_MESSAGE);
    let mut line = sample_line();
    line.deserialize_binary(&NIL_MESSAGE).unwrap();
    assert_eq!(line, Line::default());
}

#[test]
fn absent_nested_field() {
    let line = Line { a: None, ..sample_line() };
    let bytes = line.serialize_binary().unwrap();
    assert_eq!(&bytes[..5], &[1, 0, 0, 0, 0]);
    let mut decoded = Line::default();
    decoded.deserialize_binary(&bytes).unwrap();
    assert_eq!(decoded.a, None);
    assert_eq!(decoded, line);
}

#[test]
fn truncated_input_is_an_error() {
    for len in 1..LINE_BYTES.len() {
        let mut line = Line::default();
        let err = line.deserialize_binary(&LINE_BYTES[..len]);
        assert!(
            matches!(err, Err(DecodeError::Truncated { .. })),
            "prefix of {} bytes gave {:?}",
            len,
            err
        );
    }
}

#[test]
fn model_ids() {
    assert_eq!(Point::default().model_id(), MODEL_ID_POINT);
    assert_eq!(Line::default().model_id(), MODEL_ID_LINE);
    assert_eq!(Drawing::default().model_id(), 10);
    assert_eq!(MODEL_ID_DRAWING, 10);
}

#[test]
fn clone_empty_drops_values() {
    let line = sample_line();
    assert_eq!(line.clone_empty(), Line::default());
    let empty = line.clone_empty_serializable();
    assert_eq!(empty.model_id(), MODEL_ID_LINE);
    assert_eq!(empty.as_any().downcast_ref::<Line>(), Some(&Line::default()));
}

#[test]
fn new_by_model_id_decodes_polymorphically() {
    let mut message = new_by_model_id(MODEL_ID_LINE).unwrap();
    message.deserialize_binary(&LINE_BYTES).unwrap();
    assert_eq!(message.as_any().downcast_ref::<Line>(), Some(&sample_line()));
    assert!(new_by_model_id(MODEL_ID_POINT).is_some());
    assert!(new_by_model_id(2).is_none());
}

#[test]
fn generated_bytes_match_dynamic_codec() {
    let definition = ccl::compile_schema(include_str!("../schema/shapes.ccl")).unwrap();
    let schema = ccl::compile_runtime_schema(&definition).unwrap();
    let index = schema.model_index("Drawing").unwrap();

    let bytes = sample_drawing().serialize_binary().unwrap();
    let value = ccl::Value::decode(&schema, index, &bytes).unwrap();
    assert_eq!(value.encode(&schema).unwrap(), bytes);
}
