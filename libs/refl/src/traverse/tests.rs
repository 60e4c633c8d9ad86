use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::field::Tag;
use crate::reflect::Struct;

#[derive(Debug, Default, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

static POINT_FIELDS: [Field; 2] = [
    Field::new("x", 0, "i32", Tag::EMPTY),
    Field::new("y", 1, "i32", Tag::new(r#"env:"POINT_Y""#)),
];

impl Reflect for Point {
    fn zero() -> Self {
        Self::default()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Struct(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Struct(self)
    }
}

impl Struct for Point {
    fn fields(&self) -> &'static [Field] {
        &POINT_FIELDS
    }

    fn field_at(&self, index: usize) -> Option<&dyn Reflect> {
        match index {
            0 => Some(&self.x),
            1 => Some(&self.y),
            _ => None,
        }
    }

    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        match index {
            0 => Some(&mut self.x),
            1 => Some(&mut self.y),
            _ => None,
        }
    }
}

fn paths(v: &dyn Reflect) -> Vec<(String, usize)> {
    let mut seen = Vec::new();
    traverse::<(), _>(v, |_, state, _| {
        seen.push((state.path.clone(), state.depth));
        Ok(())
    })
    .expect("collecting never fails");
    seen
}

#[test]
fn sequence_elements_are_indexed() {
    assert_eq!(
        paths(&vec![10u8, 20, 30]),
        vec![
            (String::new(), 0),
            ("[0]".to_string(), 1),
            ("[1]".to_string(), 1),
            ("[2]".to_string(), 1),
        ]
    );
}

#[test]
fn struct_fields_are_reported_with_descriptors() {
    let mut seen = Vec::new();
    traverse::<(), _>(&Point { x: 1, y: 2 }, |value, state, field| {
        seen.push((
            state.path.clone(),
            field.map(|f| (f.name, f.index, f.tag.get("env"))),
            value.kind(),
        ));
        Ok(())
    })
    .expect("collecting never fails");

    assert_eq!(
        seen,
        vec![
            (String::new(), None, crate::Kind::Struct),
            ("x".to_string(), Some(("x", 0, "")), crate::Kind::Int),
            ("y".to_string(), Some(("y", 1, "POINT_Y")), crate::Kind::Int),
        ]
    );
}

#[test]
fn nested_paths_join_left_to_right() {
    let points = vec![Point::default(), Point::default()];
    let seen: Vec<String> = paths(&points).into_iter().map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["", "[0]", "[0].x", "[0].y", "[1]", "[1].x", "[1].y"]);
}

#[test]
fn nil_pointer_is_a_leaf() {
    assert_eq!(paths(&None::<Point>), vec![(String::new(), 0)]);
}

#[test]
fn pointee_path_wraps_parent() {
    let seen: Vec<(String, usize)> = paths(&Some(Box::new(7i32)));
    assert_eq!(
        seen,
        vec![
            (String::new(), 0),
            ("*()".to_string(), 1),
            ("*(*())".to_string(), 2),
        ]
    );
}

#[test]
fn map_keys_use_display_form() {
    let by_name = BTreeMap::from([("b".to_string(), 2i32), ("a".to_string(), 1)]);
    let seen: Vec<String> = paths(&by_name).into_iter().skip(1).map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["[a]", "[b]"]);

    let by_id = BTreeMap::from([(3u16, true), (1, false)]);
    let seen: Vec<String> = paths(&by_id).into_iter().skip(1).map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["[1]", "[3]"]);

    let by_timeout = BTreeMap::from([(Duration::from_millis(1500), 0u8)]);
    let seen: Vec<String> = paths(&by_timeout).into_iter().skip(1).map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["[1.5s]"]);

    let by_addr = BTreeMap::from([(IpAddr::V4(Ipv4Addr::LOCALHOST), 1i64)]);
    let seen: Vec<String> = paths(&by_addr).into_iter().skip(1).map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["[127.0.0.1]"]);
}

#[test]
fn key_without_display_form_renders_empty_brackets() {
    let by_path = BTreeMap::from([(PathBuf::from("/etc"), 1i32)]);
    let seen: Vec<String> = paths(&by_path).into_iter().skip(1).map(|(p, _)| p).collect();
    assert_eq!(seen, vec!["[]"]);
}

#[test]
fn first_error_stops_the_walk() {
    let mut calls = 0;
    let result = traverse(&vec![1i32, 2, 3], |_, state, _| {
        calls += 1;
        if state.path == "[0]" {
            return Err(format!("stop at {}", state.path));
        }
        Ok(())
    });
    assert_eq!(result, Err("stop at [0]".to_string()));
    assert_eq!(calls, 2);
}

#[test]
fn traverse_fields_skips_non_field_nodes() {
    let points = vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }];
    let mut sum = 0;
    traverse_fields::<(), _>(&points, |value, _, field| {
        if let ReflectRef::Primitive(p) = value.reflect_ref() {
            sum += p.as_i128().unwrap_or_default();
        }
        assert!(!field.name.is_empty());
        Ok(())
    })
    .expect("summing never fails");
    assert_eq!(sum, 10);
}

#[test]
fn mutable_walk_rewrites_nodes_before_children() {
    let mut secrets = vec!["hunter2".to_string(), "swordfish".to_string()];
    traverse_mut::<(), _>(&mut secrets, |value, _, _| {
        if let ReflectMut::String(s) = value.reflect_mut() {
            *s = "***".to_string();
        }
        Ok(())
    })
    .expect("masking never fails");
    assert_eq!(secrets, vec!["***", "***"]);

    let mut slot: Option<Point> = None;
    let mut visited = Vec::new();
    traverse_mut::<(), _>(&mut slot, |value, state, _| {
        if let ReflectMut::Pointer(ptr) = value.reflect_mut() {
            let fresh = ptr.new_elem();
            ptr.bind(fresh).expect("same type");
        }
        visited.push(state.path.clone());
        Ok(())
    })
    .expect("allocation never fails");
    assert_eq!(visited, vec!["", "*()", "*().x", "*().y"]);
}

#[test]
fn fields_mut_sees_declared_fields() {
    let mut point = Point { x: 5, y: -5 };
    traverse_fields_mut::<(), _>(&mut point, |value, _, field| {
        if field.name == "y" {
            if let ReflectMut::Primitive(mut p) = value.reflect_mut() {
                p.convert_from(crate::Primitive::I32(0));
            }
        }
        Ok(())
    })
    .expect("never fails");
    assert_eq!(point, Point { x: 5, y: 0 });
}

#[test]
fn user_value_reaches_every_node() {
    struct Limit(usize);

    let limit = Limit(1);
    let mut deep = Vec::new();
    Traverser::new()
        .with_value(&limit)
        .walk::<(), _>(&vec![vec![1u8]], |_, state, _| {
            let limit = state.user_value::<Limit>().expect("value attached");
            if state.depth > limit.0 {
                deep.push(state.path.clone());
            }
            assert!(state.user_value::<String>().is_none());
            Ok(())
        })
        .expect("never fails");
    assert_eq!(deep, vec!["[0][0]"]);
}

#[test]
fn clear_resets_to_default() {
    let mut point = Point { x: 1, y: 2 };
    clear(&mut point);
    assert_eq!(point, Point::default());

    let mut names = vec!["a".to_string()];
    clear(&mut names);
    assert!(names.is_empty());
}
