// THIS FILE IS AUTOGENERATED BY A CCL TOOL. DO NOT EDIT.

use ccl::Timestamp;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub a: Option<Box<Point>>,
    pub points: Vec<Point>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing {
    pub title: String,
    pub lines: Vec<Line>,
    pub thumbnail: Vec<u8>,
    pub created_at: Timestamp,
    pub tags: Vec<String>,
    pub visible: bool,
    pub scale: f64,
}
