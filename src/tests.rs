/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Crate unit tests.

use super::*;
use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn done(v: f64) -> TagExpr<f64> {
    TagExpr::Done(Value::Float(v))
}

fn uneval(expr: Expr) -> TagExpr<f64> {
    TagExpr::Unevaluated(expr)
}

fn float(v: f64) -> ArgVal<f64> {
    ArgVal::Val(Value::Float(v))
}

fn props(entries: Vec<(&str, TagExpr<f64>)>) -> PropertyDict<f64> {
    entries
        .into_iter()
        .map(|(name, tag)| (name.to_string(), tag))
        .collect()
}

fn uniform(min: f64, max: f64) -> PropertyDef {
    PropertyDef::new(PropertyType::Float, Sampler::Uniform { min, max })
}

fn choice(options: &[&str]) -> PropertyDef {
    PropertyDef::new(
        PropertyType::Str,
        Sampler::Choice {
            options: options.iter().map(|s| s.to_string()).collect(),
        },
    )
}

/// `Dot`: numeric `x`/`y`, sampled `mode`, pending `label`.
fn dot_catalog() -> ShapeCatalog {
    let mut catalog = ShapeCatalog::new();
    catalog.insert(
        "Dot",
        ShapeDef::new()
            .with_property("x", uniform(-5.0, 5.0))
            .with_property("y", uniform(-5.0, 5.0))
            .with_property("mode", choice(&["fill", "outline"]))
            .with_property(
                "label",
                PropertyDef::new(
                    PropertyType::Str,
                    Sampler::Fixed {
                        value: Value::Str(String::new()),
                    },
                )
                .pending(),
            ),
    );
    catalog
}

fn store_with(objects: &[&str]) -> Store<f64> {
    let mut store = Store::new();
    for object in objects {
        store.declare_object(*object);
    }
    store
}

fn eval_with_limit(
    store: &Store<f64>,
    expr: &Expr,
    vary: &VaryMap<f64>,
    limit: usize,
) -> TranslationResult<ArgVal<f64>> {
    let registries = Registries::<f64>::standard();
    let evaluator = Evaluator::new(&registries.computations, limit);
    evaluator
        .evaluate(expr, store.clone(), vary)
        .map(|(value, _)| value)
}

fn eval(store: &Store<f64>, expr: &Expr) -> TranslationResult<ArgVal<f64>> {
    eval_with_limit(store, expr, &VaryMap::new(), 1000)
}

fn circle(x: f64, y: f64, r: f64) -> ArgVal<f64> {
    let mut properties = BTreeMap::new();
    properties.insert("x".to_string(), Value::Float(x));
    properties.insert("y".to_string(), Value::Float(y));
    properties.insert("r".to_string(), Value::Float(r));
    properties.insert("name".to_string(), Value::Str("A.c".to_string()));
    ArgVal::Shape(Shape {
        kind: "Circle".to_string(),
        properties,
    })
}

fn standard_problem(store: Store<f64>) -> TranslationResult<OptimizationState> {
    let config = TranslationConfig::default();
    gen_opt_problem_and_state(
        store,
        &standard_catalog(&config.canvas),
        Arc::new(Registries::standard()),
        &config,
    )
}

fn dot_problem(store: Store<f64>) -> TranslationResult<OptimizationState> {
    gen_opt_problem_and_state(
        store,
        &dot_catalog(),
        Arc::new(Registries::standard()),
        &TranslationConfig::default(),
    )
}

#[test]
fn path_text_round_trips() {
    let field: Path = "A.shape".parse().unwrap();
    assert_eq!(field, Path::field("A", "shape"));
    assert_eq!(field.to_string(), "A.shape");

    let property: Path = "  node_1 . shape . x2 ".parse().unwrap();
    assert_eq!(property, Path::property("node_1", "shape", "x2"));
    assert_eq!(property.to_string(), "node_1.shape.x2");
    assert_eq!(property.to_field_path(), Path::field("node_1", "shape"));

    let json = serde_json::to_string(&property).unwrap();
    assert_eq!(json, "\"node_1.shape.x2\"");
    let back: Path = serde_json::from_str(&json).unwrap();
    assert_eq!(back, property);
}

#[test]
fn path_syntax_errors_point_at_offending_column() {
    let cases = [
        ("A..x", 3, "field name"),
        ("A.b.", 5, "property name"),
        ("A", 2, "'.'"),
        ("1A.b", 1, "object name"),
    ];
    for (source, column, expected) in cases {
        let err = parse_path(source).unwrap_err();
        assert_eq!(err.column, column, "{source}: {}", err.message);
        assert!(
            err.message.contains(expected),
            "{source}: unexpected message '{}'",
            err.message
        );
        assert_eq!(err.input, source);
        assert_eq!(err.caret(), format!("{}^", " ".repeat(column - 1)), "{source}");
    }
}

#[test]
fn path_with_trailing_garbage_is_rejected() {
    let err = parse_path("A.b.c d").unwrap_err();
    assert!(err.message.starts_with("Syntax error"));
    assert_eq!(err.column, 7);
    let rendered = err.to_string();
    assert!(rendered.contains("at column 7"), "{rendered}");
    assert!(rendered.ends_with("\n          ^"), "{rendered:?}");

    let err: TranslationError = "A.b c".parse::<Path>().unwrap_err().into();
    assert!(matches!(err, TranslationError::PathSyntax(_)));
}

#[test]
fn path_deserialization_reports_syntax_errors() {
    let result: Result<Path, _> = serde_json::from_str("\"A.\"");
    assert!(result.is_err());
}

#[test]
fn shapes_require_a_declared_object() {
    let mut store = store_with(&["B", "A", "A"]);
    assert_eq!(store.object_names().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(store.has_object("A"));
    assert!(!store.has_object("C"));

    let mut store = store_with(&["A"]);
    let err = store
        .insert_shape("B", "s", "Dot", PropertyDict::new())
        .unwrap_err();
    assert_eq!(err, TranslationError::UnknownObject("B".to_string()));

    store
        .insert_shape("A", "s", "Dot", PropertyDict::new())
        .unwrap();
    let err = store
        .insert_shape("A", "s", "Dot", PropertyDict::new())
        .unwrap_err();
    assert_eq!(err, TranslationError::DuplicatePath(Path::field("A", "s")));
}

#[test]
fn insert_path_never_overrides() {
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "x"), done(1.0)).unwrap();
    let err = store
        .insert_path(Path::field("A", "x"), done(2.0))
        .unwrap_err();
    assert_eq!(err, TranslationError::DuplicatePath(Path::field("A", "x")));
    assert_eq!(
        store.done_value(&Path::field("A", "x")),
        Some(&Value::Float(1.0))
    );

    let err = store
        .insert_path(Path::property("A", "x", "p"), done(1.0))
        .unwrap_err();
    assert_eq!(err, TranslationError::UnknownPath(Path::field("A", "x")));

    let err = store
        .insert_path(Path::field("Z", "x"), done(1.0))
        .unwrap_err();
    assert_eq!(err, TranslationError::UnknownObject("Z".to_string()));
}

#[test]
fn insert_paths_checks_arity() {
    let mut store = store_with(&["A"]);
    let paths = vec![Path::field("A", "x"), Path::field("A", "y")];
    for tags in [vec![], vec![done(1.0)], vec![done(1.0), done(2.0), done(3.0)]] {
        let found = tags.len();
        let err = store.insert_paths(&paths, tags).unwrap_err();
        assert_eq!(
            err,
            TranslationError::ArityMismatch {
                context: "insert_paths".to_string(),
                expected: 2,
                found,
            }
        );
    }
    assert!(store.field("A", "x").is_err());
}

#[test]
fn insert_paths_is_all_or_nothing() {
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "y"), done(0.0)).unwrap();
    let before = store.clone();

    let paths = vec![Path::field("A", "x"), Path::field("A", "y")];
    let err = store
        .insert_paths(&paths, vec![done(1.0), done(2.0)])
        .unwrap_err();
    assert!(matches!(err, TranslationError::DuplicatePath(_)));
    assert_eq!(store, before);

    let paths = vec![Path::field("A", "x"), Path::field("A", "z")];
    store
        .insert_paths(&paths, vec![done(1.0), done(2.0)])
        .unwrap();
    assert_eq!(
        store.done_value(&Path::field("A", "z")),
        Some(&Value::Float(2.0))
    );
}

#[test]
fn set_done_overwrites_and_adds_absent_properties() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "s", "Dot", props(vec![("x", done(1.0))]))
        .unwrap();

    assert!(store.set_done(&Path::property("A", "s", "x"), Value::Float(2.0)));
    assert!(store.set_done(&Path::property("A", "s", "y"), Value::Float(3.0)));
    assert_eq!(
        store.done_value(&Path::property("A", "s", "x")),
        Some(&Value::Float(2.0))
    );
    assert_eq!(
        store.done_value(&Path::property("A", "s", "y")),
        Some(&Value::Float(3.0))
    );

    // A shape field is not a scalar slot.
    assert!(!store.set_done(&Path::field("A", "s"), Value::Float(0.0)));
    assert!(!store.set_done(&Path::field("B", "f"), Value::Float(0.0)));
}

#[test]
fn cache_done_keeps_the_first_write() {
    let mut store = store_with(&["A"]);
    let path = Path::field("A", "f");
    store
        .insert_path(path.clone(), uneval(Expr::Float(1.0)))
        .unwrap();

    store.cache_done(&path, Value::Float(1.0));
    store.cache_done(&path, Value::Float(99.0));
    assert_eq!(store.done_value(&path), Some(&Value::Float(1.0)));
}

#[test]
fn resolve_prefers_the_override() {
    let mut store = store_with(&["A"]);
    let path = Path::field("A", "x");
    store.insert_path(path.clone(), done(5.0)).unwrap();

    let vary = VaryMap::from_parts(&[path.clone()], &[7.0]).unwrap();
    assert!(matches!(
        store.resolve(&path, &vary).unwrap(),
        Resolved::Override(v) if v == 7.0
    ));
    assert!(matches!(
        store.resolve(&path, &VaryMap::new()).unwrap(),
        Resolved::Field(FieldSlot::Expr(TagExpr::Done(Value::Float(v)))) if *v == 5.0
    ));
}

#[test]
fn vary_map_checks_arity() {
    let paths = vec![Path::field("A", "x")];
    let err = VaryMap::<f64>::from_parts(&paths, &[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        TranslationError::ArityMismatch {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn fold_visits_slots_in_sorted_order() {
    let mut store = store_with(&["B", "A"]);
    store.insert_path(Path::field("B", "a"), done(0.0)).unwrap();
    store.insert_path(Path::field("A", "z"), done(0.0)).unwrap();
    store.insert_path(Path::field("A", "b"), done(0.0)).unwrap();

    let visited = store.fold(Vec::new(), |mut acc, object, field, _| {
        acc.push(format!("{object}.{field}"));
        acc
    });
    assert_eq!(visited, vec!["A.b", "A.z", "B.a"]);
}

fn analysis_store() -> Store<f64> {
    let mut store = store_with(&["A", "B"]);
    store.insert_path(Path::field("A", "free"), uneval(Expr::Vary)).unwrap();
    store.insert_path(Path::field("A", "fixed"), done(1.0)).unwrap();
    store
        .insert_path(
            Path::field("A", "goal"),
            uneval(Expr::objective(
                "near",
                vec![Expr::field_ref("A", "s"), Expr::field_ref("B", "s")],
            )),
        )
        .unwrap();
    store
        .insert_path(
            Path::field("A", "keep"),
            uneval(Expr::constraint(
                "disjoint",
                vec![Expr::field_ref("A", "s"), Expr::field_ref("B", "s")],
            )),
        )
        .unwrap();
    store
        .insert_path(
            Path::field("A", "avoid"),
            uneval(Expr::AvoidFn {
                name: "far".to_string(),
                args: vec![],
            }),
        )
        .unwrap();
    // `x` absent, `y` concrete.
    store
        .insert_shape("A", "s", "Dot", props(vec![("y", done(0.0))]))
        .unwrap();
    // `x` declared free, `y` absent, `mode` present.
    store
        .insert_shape(
            "B",
            "s",
            "Dot",
            props(vec![
                ("x", uneval(Expr::Vary)),
                ("mode", TagExpr::Done(Value::Str("fill".to_string()))),
            ]),
        )
        .unwrap();
    store
}

#[test]
fn varying_paths_cover_free_fields_and_numeric_properties() {
    let varying = find_varying_paths(&analysis_store(), &dot_catalog());
    assert_eq!(
        varying,
        vec![
            Path::field("A", "free"),
            Path::property("A", "s", "x"),
            Path::property("B", "s", "x"),
            Path::property("B", "s", "y"),
        ]
    );
}

#[test]
fn pending_properties_are_neither_varying_nor_uninitialized() {
    let mut catalog = dot_catalog();
    let mut def = catalog.get("Dot").cloned().unwrap();
    def.properties.get_mut("y").unwrap().pending = true;
    catalog.insert("Dot", def);

    let store = analysis_store();
    let varying = find_varying_paths(&store, &catalog);
    assert!(!varying.contains(&Path::property("B", "s", "y")));
    let unset = find_uninitialized_paths(&store, &catalog);
    assert!(!unset.iter().any(|p| p.property_name() == Some("label")));
}

#[test]
fn uninitialized_paths_are_absent_non_numeric_properties() {
    let unset = find_uninitialized_paths(&analysis_store(), &dot_catalog());
    assert_eq!(unset, vec![Path::property("A", "s", "mode")]);
}

#[test]
fn declared_fns_skip_avoid_calls_and_plain_fields() {
    let calls = find_declared_fns(&analysis_store());
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].role, FnRole::Objective);
    assert_eq!(calls[0].name, "near");
    assert_eq!(calls[1].role, FnRole::Constraint);
    assert_eq!(calls[1].name, "disjoint");
}

#[test]
fn default_fns_take_the_shape_path_as_sole_argument() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "c", "Circle", PropertyDict::new())
        .unwrap();
    store
        .insert_shape("A", "t", "Text", PropertyDict::new())
        .unwrap();

    let calls = find_default_fns(&store, &standard_catalog(&Canvas::default()));
    let expected_args = vec![Expr::field_ref("A", "c")];
    assert_eq!(
        calls,
        vec![
            FnCall::new(FnRole::Constraint, "minSize", expected_args.clone()),
            FnCall::new(FnRole::Constraint, "maxSize", expected_args),
        ]
    );
}

#[test]
fn shape_enumeration_lists_names_and_present_properties() {
    let store = analysis_store();
    assert_eq!(
        find_shape_names(&store),
        vec![Path::field("A", "s"), Path::field("B", "s")]
    );
    assert_eq!(
        find_shape_property_paths(&store),
        vec![
            Path::property("A", "s", "y"),
            Path::property("B", "s", "mode"),
            Path::property("B", "s", "x"),
        ]
    );
}

#[test]
fn literals_evaluate_to_themselves() {
    let store = Store::new();
    assert_eq!(eval(&store, &Expr::Int(3)).unwrap(), ArgVal::Val(Value::Int(3)));
    assert_eq!(eval(&store, &Expr::Float(2.5)).unwrap(), float(2.5));
    assert_eq!(
        eval(&store, &Expr::Str("hi".to_string())).unwrap(),
        ArgVal::Val(Value::Str("hi".to_string()))
    );
    assert_eq!(
        eval(&store, &Expr::Bool(true)).unwrap(),
        ArgVal::Val(Value::Bool(true))
    );
}

#[test]
fn arithmetic_follows_operand_types() {
    let store = Store::new();
    let bin = |op, l, r| Expr::binary(op, l, r);

    assert_eq!(
        eval(&store, &bin(BinaryOp::Divide, Expr::Int(7), Expr::Int(2))).unwrap(),
        ArgVal::Val(Value::Int(3))
    );
    assert_eq!(
        eval(&store, &bin(BinaryOp::Exp, Expr::Int(2), Expr::Int(10))).unwrap(),
        ArgVal::Val(Value::Int(1024))
    );
    assert_eq!(
        eval(&store, &bin(BinaryOp::Exp, Expr::Float(2.0), Expr::Float(3.0))).unwrap(),
        float(8.0)
    );
    let nested = bin(
        BinaryOp::BMinus,
        bin(BinaryOp::Multiply, Expr::Float(3.0), Expr::Float(4.0)),
        Expr::unary(UnaryOp::UMinus, Expr::Float(1.5)),
    );
    assert_eq!(eval(&store, &nested).unwrap(), float(13.5));
    assert_eq!(
        eval(&store, &Expr::unary(UnaryOp::UPlus, Expr::Int(-4))).unwrap(),
        ArgVal::Val(Value::Int(-4))
    );
}

#[test]
fn integer_division_by_zero_fails() {
    let expr = Expr::binary(BinaryOp::Divide, Expr::Int(4), Expr::Int(0));
    assert!(matches!(
        eval(&Store::new(), &expr),
        Err(TranslationError::DivideByZero { .. })
    ));

    let expr = Expr::binary(BinaryOp::Divide, Expr::Float(4.0), Expr::Float(0.0));
    assert!(matches!(
        eval(&Store::new(), &expr),
        Err(TranslationError::DivideByZero { .. })
    ));
}

#[test]
fn mixed_operands_are_a_type_mismatch() {
    let store = Store::new();
    let expr = Expr::binary(BinaryOp::BPlus, Expr::Float(1.0), Expr::Int(1));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::TypeMismatch { .. })
    ));

    let expr = Expr::unary(UnaryOp::UMinus, Expr::Str("x".to_string()));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::TypeMismatch { .. })
    ));

    let expr = Expr::binary(BinaryOp::Exp, Expr::Int(2), Expr::Int(-1));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::TypeMismatch { .. })
    ));
}

#[test]
fn integer_overflow_is_reported() {
    let store = Store::new();
    let expr = Expr::binary(BinaryOp::BPlus, Expr::Int(i64::MAX), Expr::Int(1));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::IntegerOverflow { .. })
    ));
    let expr = Expr::unary(UnaryOp::UMinus, Expr::Int(i64::MIN));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::IntegerOverflow { .. })
    ));
    let expr = Expr::binary(BinaryOp::Exp, Expr::Int(10), Expr::Int(40));
    assert!(matches!(
        eval(&store, &expr),
        Err(TranslationError::IntegerOverflow { .. })
    ));
}

#[test]
fn computation_lookup_precedes_argument_evaluation() {
    let store = store_with(&["A"]);
    // The argument would fail with UnknownPath if it were evaluated.
    let expr = Expr::comp("nope", vec![Expr::field_ref("A", "missing")]);
    assert_eq!(
        eval(&store, &expr).unwrap_err(),
        TranslationError::UnknownComputation("nope".to_string())
    );

    let expr = Expr::comp("norm", vec![Expr::Float(3.0), Expr::Float(4.0)]);
    assert_eq!(eval(&store, &expr).unwrap(), float(5.0));
}

#[test]
fn missing_slots_are_reported_by_path() {
    let store = store_with(&["A"]);
    assert_eq!(
        eval(&store, &Expr::field_ref("A", "missing")).unwrap_err(),
        TranslationError::UnknownPath(Path::field("A", "missing"))
    );
    assert_eq!(
        eval(&store, &Expr::field_ref("Z", "x")).unwrap_err(),
        TranslationError::UnknownObject("Z".to_string())
    );
}

#[test]
fn override_wins_over_store_value() {
    let mut store = store_with(&["A"]);
    let path = Path::field("A", "x");
    store.insert_path(path.clone(), done(5.0)).unwrap();
    let vary = VaryMap::from_parts(&[path.clone()], &[7.0]).unwrap();

    let value = eval_with_limit(&store, &Expr::path(path.clone()), &vary, 1000).unwrap();
    assert_eq!(value, float(7.0));
    assert_eq!(eval(&store, &Expr::path(path)).unwrap(), float(5.0));
}

#[test]
fn memoized_fields_are_computed_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ComputationRegistry::<f64>::new();
    let counter = calls.clone();
    registry.register("tick", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(ArgVal::Val(Value::Float(1.5)))
    });

    let mut store = store_with(&["A"]);
    let path = Path::field("A", "f");
    store
        .insert_path(path.clone(), uneval(Expr::comp("tick", vec![])))
        .unwrap();

    let evaluator = Evaluator::new(&registry, 1000);
    let vary = VaryMap::new();
    let (first, store) = evaluator.evaluate(&Expr::path(path.clone()), store, &vary).unwrap();
    let (second, store) = evaluator.evaluate(&Expr::path(path.clone()), store, &vary).unwrap();

    assert_eq!(first, float(1.5));
    assert_eq!(second, first);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.done_value(&path), Some(&Value::Float(1.5)));
}

#[test]
fn shapes_evaluate_every_property_and_get_a_name() {
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "base"), done(2.0)).unwrap();
    store
        .insert_shape(
            "A",
            "s",
            "Dot",
            props(vec![
                (
                    "x",
                    uneval(Expr::binary(
                        BinaryOp::Multiply,
                        Expr::field_ref("A", "base"),
                        Expr::Float(3.0),
                    )),
                ),
                ("y", uneval(Expr::property_ref("A", "s", "x"))),
                ("mode", TagExpr::Done(Value::Str("fill".to_string()))),
            ]),
        )
        .unwrap();

    let registries = Registries::<f64>::standard();
    let evaluator = Evaluator::new(&registries.computations, 1000);
    let (value, store) = evaluator
        .evaluate(&Expr::field_ref("A", "s"), store, &VaryMap::new())
        .unwrap();

    let ArgVal::Shape(shape) = value else {
        panic!("expected a shape");
    };
    assert_eq!(shape.kind, "Dot");
    assert_eq!(shape.name(), "A.s");
    assert_eq!(shape.float("x").unwrap(), 6.0);
    assert_eq!(shape.float("y").unwrap(), 6.0);
    assert_eq!(shape.get("mode"), Some(&Value::Str("fill".to_string())));
    // Property results are memoized one by one.
    assert_eq!(
        store.done_value(&Path::property("A", "s", "x")),
        Some(&Value::Float(6.0))
    );
}

#[test]
fn shape_properties_honor_overrides() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "s", "Dot", props(vec![("x", done(1.0)), ("y", done(2.0))]))
        .unwrap();
    let vary = VaryMap::from_parts(&[Path::property("A", "s", "x")], &[9.0]).unwrap();

    let ArgVal::Shape(shape) =
        eval_with_limit(&store, &Expr::field_ref("A", "s"), &vary, 1000).unwrap()
    else {
        panic!("expected a shape");
    };
    assert_eq!(shape.float("x").unwrap(), 9.0);
    assert_eq!(shape.float("y").unwrap(), 2.0);
}

#[test]
fn property_holding_a_shape_is_rejected() {
    let mut store = store_with(&["A", "B"]);
    store.insert_shape("B", "s", "Dot", PropertyDict::new()).unwrap();
    store
        .insert_shape(
            "A",
            "s",
            "Dot",
            props(vec![("x", uneval(Expr::field_ref("B", "s")))]),
        )
        .unwrap();
    assert!(matches!(
        eval(&store, &Expr::property_ref("A", "s", "x")),
        Err(TranslationError::TypeMismatch { .. })
    ));
}

#[test]
fn path_cycles_hit_the_recursion_limit() {
    let mut store = store_with(&["A"]);
    store
        .insert_path(Path::field("A", "x"), uneval(Expr::field_ref("A", "y")))
        .unwrap();
    store
        .insert_path(Path::field("A", "y"), uneval(Expr::field_ref("A", "x")))
        .unwrap();

    let err = eval_with_limit(&store, &Expr::field_ref("A", "x"), &VaryMap::new(), 64).unwrap_err();
    assert!(matches!(
        err,
        TranslationError::RecursionLimitExceeded { limit: 64, .. }
    ));
}

#[test]
fn self_reference_hits_the_default_recursion_limit() {
    let mut store = store_with(&["A"]);
    store
        .insert_path(Path::field("A", "x"), uneval(Expr::field_ref("A", "x")))
        .unwrap();
    let limit = TranslationConfig::default().recursion_limit;
    let err = eval_with_limit(&store, &Expr::field_ref("A", "x"), &VaryMap::new(), limit)
        .unwrap_err();
    assert!(matches!(
        err,
        TranslationError::RecursionLimitExceeded { limit: 1000, .. }
    ));
}

#[test]
fn cyclic_shape_property_hits_the_default_recursion_limit() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape(
            "A",
            "s",
            "Dot",
            props(vec![("x", uneval(Expr::property_ref("A", "s", "y")))]),
        )
        .unwrap();
    store
        .insert_path(
            Path::property("A", "s", "y"),
            uneval(Expr::property_ref("A", "s", "x")),
        )
        .unwrap();
    let result = std::thread::spawn(move || eval(&store, &Expr::field_ref("A", "s")))
        .join()
        .unwrap();
    assert!(matches!(
        result,
        Err(TranslationError::RecursionLimitExceeded { limit: 1000, .. })
    ));
}

#[test]
fn recursion_limit_is_capped() {
    let registries = Registries::<f64>::standard();
    assert_eq!(Evaluator::new(&registries.computations, 64).limit(), 64);
    let evaluator = Evaluator::new(&registries.computations, MAX_RECURSION_LIMIT * 8);
    assert_eq!(evaluator.limit(), MAX_RECURSION_LIMIT);

    let config = TranslationConfig {
        recursion_limit: MAX_RECURSION_LIMIT + 1,
        ..TranslationConfig::default()
    };
    assert!(matches!(config.validate(), Err(TranslationError::Config(_))));
    assert!(TranslationConfig::default().recursion_limit <= MAX_RECURSION_LIMIT);
}

#[test]
fn reference_chain_caches_every_hop() {
    let mut store = store_with(&["A"]);
    store
        .insert_path(Path::field("A", "a"), uneval(Expr::field_ref("A", "b")))
        .unwrap();
    store
        .insert_path(Path::field("A", "b"), uneval(Expr::field_ref("A", "c")))
        .unwrap();
    store
        .insert_path(
            Path::field("A", "c"),
            uneval(Expr::binary(BinaryOp::Multiply, Expr::Float(3.0), Expr::Float(4.0))),
        )
        .unwrap();

    let registries = Registries::<f64>::standard();
    let evaluator = Evaluator::new(&registries.computations, 64);
    let (value, store) = evaluator
        .evaluate(&Expr::field_ref("A", "a"), store, &VaryMap::new())
        .unwrap();
    assert_eq!(value, float(12.0));
    for field in ["a", "b", "c"] {
        assert_eq!(
            store.done_value(&Path::field("A", field)),
            Some(&Value::Float(12.0)),
            "{field}"
        );
    }
}

#[test]
fn long_chains_fail_only_past_the_budget() {
    let chain = |len: usize| {
        let mut store = store_with(&["A"]);
        for i in 0..len {
            store
                .insert_path(
                    Path::field("A", format!("f{i}")),
                    uneval(Expr::field_ref("A", &format!("f{}", i + 1))),
                )
                .unwrap();
        }
        store
            .insert_path(Path::field("A", format!("f{len}")), done(42.0))
            .unwrap();
        store
    };

    let short = chain(5);
    assert_eq!(
        eval_with_limit(&short, &Expr::field_ref("A", "f0"), &VaryMap::new(), 64).unwrap(),
        float(42.0)
    );

    let long = chain(100);
    assert!(matches!(
        eval_with_limit(&long, &Expr::field_ref("A", "f0"), &VaryMap::new(), 64),
        Err(TranslationError::RecursionLimitExceeded { .. })
    ));
}

#[test]
fn unsupported_expressions_fail_fast() {
    let store = store_with(&["A"]);
    let cases = vec![
        Expr::Vary,
        Expr::objective("near", vec![]),
        Expr::constraint("disjoint", vec![]),
        Expr::Ctor {
            kind: "Circle".to_string(),
            properties: vec![],
        },
        Expr::Layering {
            below: Path::field("A", "a"),
            above: Path::field("A", "b"),
        },
        Expr::List(vec![Expr::Int(1)]),
        Expr::ListAccess {
            path: Path::field("A", "l"),
            index: 0,
        },
        Expr::comp("abs", vec![Expr::objective("near", vec![])]),
    ];
    for expr in cases {
        assert!(
            matches!(eval(&store, &expr), Err(TranslationError::UnsupportedExpression(_))),
            "{}",
            expr.describe()
        );
    }
}

#[test]
fn free_fields_are_drawn_in_one_ordered_batch() {
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "a"), uneval(Expr::Vary)).unwrap();
    store.insert_path(Path::field("A", "b"), uneval(Expr::Vary)).unwrap();
    let varying = find_varying_paths(&store, &dot_catalog());

    let canvas = Canvas::default();
    let mut rng = fastrand::Rng::with_seed(16);
    init_fields(&mut store, &varying, &mut rng, &canvas);

    let (lo, hi) = canvas.coordinate_range();
    assert_eq!((lo, hi), (-350.0, 350.0));
    let mut reference = fastrand::Rng::with_seed(16);
    for path in &varying {
        let expected = lo + (hi - lo) * reference.f64();
        assert_eq!(store.done_value(path), Some(&Value::Float(expected)));
    }
}

#[test]
fn shape_sampling_skips_concrete_and_pending_properties() {
    let mut store = analysis_store();
    let mut rng = fastrand::Rng::with_seed(3);
    init_shapes(&mut store, &dot_catalog(), &mut rng);

    // Concrete values are untouched.
    assert_eq!(
        store.done_value(&Path::property("A", "s", "y")),
        Some(&Value::Float(0.0))
    );
    assert_eq!(
        store.done_value(&Path::property("B", "s", "mode")),
        Some(&Value::Str("fill".to_string()))
    );
    // Absent and declared-free properties are sampled in range.
    for path in [
        Path::property("A", "s", "x"),
        Path::property("B", "s", "x"),
        Path::property("B", "s", "y"),
    ] {
        let Some(Value::Float(v)) = store.done_value(&path) else {
            panic!("{path} was not sampled");
        };
        assert!((-5.0..5.0).contains(v), "{path} = {v}");
    }
    assert!(matches!(
        store.done_value(&Path::property("A", "s", "mode")),
        Some(Value::Str(mode)) if mode == "fill" || mode == "outline"
    ));
    // Pending properties stay absent.
    assert!(store.property("A", "s", "label").is_err());
}

#[test]
fn samplers_produce_their_declared_types() {
    let mut rng = fastrand::Rng::with_seed(1);
    assert!(matches!(Sampler::Color.sample(&mut rng), Value::Color([_, _, _, a]) if a == 0.5));
    assert!(matches!(Sampler::Bool.sample(&mut rng), Value::Bool(_)));
    assert_eq!(
        Sampler::Fixed {
            value: Value::Int(3)
        }
        .sample(&mut rng),
        Value::Int(3)
    );
    assert_eq!(Sampler::Color.output_type(), PropertyType::Color);
}

#[test]
fn function_registry_validates_signatures() {
    let registries = Registries::<f64>::standard();
    let err = registries
        .objectives
        .call("near", &[circle(0.0, 0.0, 1.0)])
        .unwrap_err();
    assert!(matches!(
        err,
        TranslationError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));

    let err = registries
        .objectives
        .call("near", &[circle(0.0, 0.0, 1.0), float(1.0)])
        .unwrap_err();
    assert!(matches!(err, TranslationError::TypeMismatch { .. }));

    let err = registries.constraints.call("near", &[]).unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnknownFunction {
            role: FnRole::Constraint,
            name: "near".to_string(),
        }
    );
}

#[test]
fn standard_registries_list_their_builtins() {
    let registries = Registries::<f64>::standard();
    assert_eq!(registries.objectives.role(), FnRole::Objective);
    assert_eq!(registries.constraints.role(), FnRole::Constraint);
    assert_eq!(
        registries.objectives.names().collect::<Vec<_>>(),
        vec!["centerLabel", "near", "nearPoint", "repel"]
    );
    assert_eq!(
        registries.constraints.names().collect::<Vec<_>>(),
        vec!["contains", "disjoint", "maxSize", "minSize", "smallerThan"]
    );
    assert_eq!(
        registries.computations.names().collect::<Vec<_>>(),
        vec!["abs", "average", "centerX", "centerY", "max", "min", "norm", "sqrt"]
    );
    assert_eq!(
        registries.objectives.signature("nearPoint"),
        Some(&Signature::new(vec![
            ArgType::Shape,
            ArgType::Float,
            ArgType::Float
        ]))
    );
    assert_eq!(registries.constraints.signature("nearPoint"), None);
}

#[test]
fn constraints_are_exterior_penalties() {
    let registries = Registries::<f64>::standard();
    let c = &registries.constraints;

    assert_eq!(c.call("minSize", &[circle(0.0, 0.0, 5.0)]).unwrap(), 225.0);
    assert_eq!(c.call("minSize", &[circle(0.0, 0.0, 30.0)]).unwrap(), 0.0);
    assert_eq!(c.call("maxSize", &[circle(0.0, 0.0, 260.0)]).unwrap(), 100.0);
    assert_eq!(
        c.call("disjoint", &[circle(0.0, 0.0, 10.0), circle(15.0, 0.0, 10.0)])
            .unwrap(),
        25.0
    );
    assert_eq!(
        c.call("contains", &[circle(0.0, 0.0, 50.0), circle(10.0, 0.0, 10.0)])
            .unwrap(),
        0.0
    );
    assert_eq!(
        c.call("smallerThan", &[circle(0.0, 0.0, 12.0), circle(0.0, 0.0, 10.0)])
            .unwrap(),
        4.0
    );
}

#[test]
fn objectives_measure_center_distances() {
    let registries = Registries::<f64>::standard();
    let o = &registries.objectives;
    assert_eq!(
        o.call("near", &[circle(0.0, 0.0, 1.0), circle(3.0, 4.0, 1.0)])
            .unwrap(),
        25.0
    );
    assert_eq!(
        o.call("nearPoint", &[circle(1.0, 1.0, 1.0), float(1.0), float(3.0)])
            .unwrap(),
        4.0
    );
    let far = o
        .call("repel", &[circle(0.0, 0.0, 1.0), circle(100.0, 0.0, 1.0)])
        .unwrap();
    let close = o
        .call("repel", &[circle(0.0, 0.0, 1.0), circle(1.0, 0.0, 1.0)])
        .unwrap();
    assert!(close > far);
}

#[test]
fn computations_cover_numbers_and_shapes() {
    let registries = Registries::<f64>::standard();
    let comp = |name: &str, args: &[ArgVal<f64>]| {
        (registries.computations.get(name).unwrap())(args)
    };

    assert_eq!(comp("abs", &[float(-2.0)]).unwrap(), float(2.0));
    assert_eq!(comp("max", &[float(1.0), float(3.0)]).unwrap(), float(3.0));
    assert_eq!(comp("min", &[float(1.0), float(3.0)]).unwrap(), float(1.0));
    assert_eq!(
        comp("average", &[float(1.0), float(2.0), float(6.0)]).unwrap(),
        float(3.0)
    );
    assert_eq!(comp("centerX", &[circle(4.0, 5.0, 1.0)]).unwrap(), float(4.0));
    assert_eq!(comp("centerY", &[circle(4.0, 5.0, 1.0)]).unwrap(), float(5.0));
    assert!(matches!(
        comp("sqrt", &[float(-1.0)]),
        Err(TranslationError::TypeMismatch { .. })
    ));
    assert!(matches!(
        comp("average", &[]),
        Err(TranslationError::ArityMismatch { .. })
    ));
}

/// One `Node` with a free `x` and an unset `mode`.
#[test]
fn end_to_end_single_shape() {
    let mut catalog = ShapeCatalog::new();
    catalog.insert(
        "Node",
        ShapeDef::new()
            .with_property("x", uniform(-5.0, 5.0))
            .with_property("mode", choice(&["fill", "outline"])),
    );
    let mut store = store_with(&["A"]);
    store.insert_shape("A", "node", "Node", PropertyDict::new()).unwrap();

    let state = gen_opt_problem_and_state(
        store,
        &catalog,
        Arc::new(Registries::standard()),
        &TranslationConfig::default(),
    )
    .unwrap();

    assert_eq!(state.varying_paths, vec![Path::property("A", "node", "x")]);
    assert_eq!(state.uninitialized_paths, vec![Path::property("A", "node", "mode")]);
    assert_eq!(state.shape_names, vec![Path::field("A", "node")]);
    assert_eq!(state.varying_state.len(), 1);
    assert!((-5.0..5.0).contains(&state.varying_state[0]));
    assert!(matches!(
        state.store.done_value(&Path::property("A", "node", "mode")),
        Some(Value::Str(mode)) if mode == "fill" || mode == "outline"
    ));
    assert_eq!(state.shapes.len(), 1);
    assert_eq!(state.shapes[0].name(), "A.node");
    assert_eq!(state.shapes[0].float("x").unwrap(), state.varying_state[0]);
    assert_eq!(state.params.phase, OptimizerPhase::NewIteration);
    assert_eq!(state.params.penalty_weight, 1e-3);
    assert_eq!(state.energy(&state.varying_state).unwrap(), 0.0);
}

#[test]
fn assembly_is_deterministic() {
    let mut store = store_with(&["A", "B"]);
    store.insert_path(Path::field("A", "gap"), uneval(Expr::Vary)).unwrap();
    store.insert_shape("A", "c", "Circle", PropertyDict::new()).unwrap();
    store.insert_shape("B", "r", "Rectangle", PropertyDict::new()).unwrap();

    let first = standard_problem(store.clone()).unwrap();
    let second = standard_problem(store).unwrap();
    assert_eq!(first.varying_state, second.varying_state);
    assert_eq!(first.shapes, second.shapes);
    assert_eq!(first.store, second.store);

    let (lo, hi) = Canvas::default().coordinate_range();
    let gap = first.varying_value(&Path::field("A", "gap")).unwrap();
    assert!((lo..hi).contains(&gap));
}

#[test]
fn default_functions_merge_after_declared_ones() {
    let mut store = store_with(&["A", "B"]);
    store.insert_shape("A", "c", "Circle", PropertyDict::new()).unwrap();
    store.insert_shape("B", "c", "Circle", PropertyDict::new()).unwrap();
    store
        .insert_path(
            Path::field("A", "apart"),
            uneval(Expr::constraint(
                "disjoint",
                vec![Expr::field_ref("A", "c"), Expr::field_ref("B", "c")],
            )),
        )
        .unwrap();

    let state = standard_problem(store).unwrap();
    assert!(state.objectives.is_empty());
    let names: Vec<&str> = state.constraints.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["disjoint", "minSize", "maxSize", "minSize", "maxSize"]);
    assert_eq!(state.constraints[3].args, vec![Expr::field_ref("B", "c")]);
}

#[test]
fn store_without_free_parameters_is_rejected() {
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "x"), done(1.0)).unwrap();
    assert_eq!(
        standard_problem(store).unwrap_err(),
        TranslationError::EmptyInitialState
    );
}

#[test]
fn unknown_shape_types_and_functions_are_rejected() {
    let mut store = store_with(&["A"]);
    store.insert_shape("A", "b", "Blob", PropertyDict::new()).unwrap();
    assert_eq!(
        dot_problem(store).unwrap_err(),
        TranslationError::UnknownShape {
            kind: "Blob".to_string(),
            path: Path::field("A", "b"),
        }
    );

    let mut store = store_with(&["A"]);
    store.insert_shape("A", "s", "Dot", PropertyDict::new()).unwrap();
    store
        .insert_path(Path::field("A", "goal"), uneval(Expr::objective("nope", vec![])))
        .unwrap();
    assert_eq!(
        dot_problem(store).unwrap_err(),
        TranslationError::UnknownFunction {
            role: FnRole::Objective,
            name: "nope".to_string(),
        }
    );
}

fn small_circle_state() -> OptimizationState {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "c", "Circle", props(vec![("r", done(5.0))]))
        .unwrap();
    standard_problem(store).unwrap()
}

#[test]
fn energy_checks_varying_vector_arity() {
    let state = small_circle_state();
    assert_eq!(state.varying_paths.len(), 2);
    for varying in [vec![], vec![1.0], vec![1.0, 2.0, 3.0]] {
        assert!(matches!(
            state.energy(&varying),
            Err(TranslationError::ArityMismatch { expected: 2, .. })
        ));
    }
}

#[test]
fn penalty_weight_scales_violated_constraints() {
    let state = small_circle_state();
    let energy = &state.params.energy;
    let varying = &state.varying_state;

    let terms = energy.terms(1.0, varying).unwrap();
    assert_eq!(terms.objective, 0.0);
    assert_eq!(terms.constraint, 225.0 * 1e4);

    let mut previous = energy.evaluate(1e-3, varying).unwrap();
    for weight in [1e-2, 1.0, 10.0, 1e3] {
        let next = energy.evaluate(weight, varying).unwrap();
        assert!(next > previous, "{next} <= {previous}");
        previous = next;
    }
}

#[test]
fn energy_does_not_reuse_values_across_calls() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "s", "Dot", props(vec![("y", done(3.0))]))
        .unwrap();
    store
        .insert_path(
            Path::field("A", "goal"),
            uneval(Expr::objective(
                "nearPoint",
                vec![Expr::field_ref("A", "s"), Expr::Float(1.0), Expr::Float(2.0)],
            )),
        )
        .unwrap();
    let state = dot_problem(store).unwrap();
    assert_eq!(state.varying_paths, vec![Path::property("A", "s", "x")]);

    assert_eq!(state.energy(&[4.0]).unwrap(), 10.0);
    assert_eq!(state.energy(&[1.0]).unwrap(), 1.0);
    assert_eq!(state.energy(&[4.0]).unwrap(), 10.0);
}

#[test]
fn energy_recomputes_derived_properties_each_call() {
    let mut store = store_with(&["A"]);
    let doubled = Expr::binary(
        BinaryOp::Multiply,
        Expr::property_ref("A", "s", "x"),
        Expr::Float(2.0),
    );
    store
        .insert_shape("A", "s", "Dot", props(vec![("y", uneval(doubled))]))
        .unwrap();
    store
        .insert_path(
            Path::field("A", "goal"),
            uneval(Expr::objective(
                "nearPoint",
                vec![Expr::field_ref("A", "s"), Expr::Float(0.0), Expr::Float(0.0)],
            )),
        )
        .unwrap();
    let state = dot_problem(store).unwrap();
    assert_eq!(state.varying_paths, vec![Path::property("A", "s", "x")]);

    assert_eq!(state.energy(&[1.0]).unwrap(), 5.0);
    assert_eq!(state.energy(&[2.0]).unwrap(), 20.0);
    assert_eq!(state.energy(&[1.0]).unwrap(), 5.0);

    let shapes = state.evaluate_shapes(&[3.0]).unwrap();
    assert_eq!(shapes[0].float("y").unwrap(), 6.0);
}

#[test]
fn set_varying_state_refreshes_shapes() {
    let mut state = small_circle_state();
    state.set_varying_state(vec![10.0, -20.0]).unwrap();
    assert_eq!(state.shapes[0].float("x").unwrap(), 10.0);
    assert_eq!(state.shapes[0].float("y").unwrap(), -20.0);
    assert_eq!(state.varying_value(&Path::property("A", "c", "y")), Some(-20.0));

    assert!(state.set_varying_state(vec![1.0]).is_err());
    assert_eq!(state.varying_state, vec![10.0, -20.0]);
}

#[test]
fn optimizer_phases_follow_the_outer_loop() {
    use OptimizerPhase::*;
    let v = vec![1.0];
    assert_eq!(OptimizerPhase::default(), NewIteration);
    assert!(NewIteration.permits(&UnconstrainedRunning(v.clone())));
    assert!(UnconstrainedRunning(v.clone()).permits(&UnconstrainedConverged(v.clone())));
    assert!(UnconstrainedConverged(v.clone()).permits(&NewIteration));
    assert!(UnconstrainedConverged(v.clone()).permits(&OptimizationConverged));
    assert!(!NewIteration.permits(&OptimizationConverged));
    assert!(!NewIteration.permits(&UnconstrainedConverged(v.clone())));
    assert!(!OptimizationConverged.permits(&NewIteration));
    assert!(OptimizationConverged.is_converged());
}

#[test]
fn config_json_fills_defaults() {
    let config = TranslationConfig::from_json(r#"{ "seed": 7, "canvas": { "height": 100.0 } }"#)
        .unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.canvas.width, 800.0);
    assert_eq!(config.canvas.coordinate_range(), (-50.0, 50.0));
    assert_eq!(config.constraint_weight, 1e4);
    assert_eq!(config.recursion_limit, 1000);
}

#[test]
fn invalid_config_is_rejected() {
    for source in [
        r#"{ "recursion_limit": 0 }"#,
        r#"{ "canvas": { "width": -1.0 } }"#,
        r#"{ "constraint_weight": 0.0 }"#,
        r#"{ "seed": "x" }"#,
    ] {
        assert!(
            matches!(TranslationConfig::from_json(source), Err(TranslationError::Config(_))),
            "{source}"
        );
    }

    let config = TranslationConfig {
        initial_penalty_weight: f64::NAN,
        ..TranslationConfig::default()
    };
    let mut store = store_with(&["A"]);
    store.insert_path(Path::field("A", "x"), uneval(Expr::Vary)).unwrap();
    assert!(matches!(
        gen_opt_problem_and_state(store, &dot_catalog(), Arc::new(Registries::standard()), &config),
        Err(TranslationError::Config(_))
    ));
}

#[test]
fn catalog_loads_from_json() {
    let source = r#"{ "shapes": { "Dot": {
        "properties": {
            "x": { "ty": "Float", "sampler": { "Uniform": { "min": -10.0, "max": 10.0 } } },
            "mode": { "ty": "Str", "sampler": { "Choice": { "options": ["a", "b"] } } },
            "tint": { "ty": "Color", "sampler": "Color" },
            "w": { "ty": "Float", "pending": true, "sampler": { "Fixed": { "value": { "Float": 0.0 } } } }
        },
        "default_constraints": ["minSize"]
    } } }"#;
    let catalog = ShapeCatalog::from_json(source).unwrap();
    let dot = catalog.get("Dot").unwrap();
    assert_eq!(dot.numeric_properties().collect::<Vec<_>>(), vec!["w", "x"]);
    assert_eq!(dot.pending_properties().collect::<Vec<_>>(), vec!["w"]);
    assert!(dot.default_objectives.is_empty());
    assert_eq!(dot.default_constraints, vec!["minSize".to_string()]);
}

#[test]
fn catalog_rejects_mistyped_samplers() {
    let source = r#"{ "shapes": { "Dot": { "properties": {
        "x": { "ty": "Float", "sampler": { "Choice": { "options": ["a"] } } }
    } } } }"#;
    assert!(matches!(
        ShapeCatalog::from_json(source),
        Err(TranslationError::Config(_))
    ));

    let source = r#"{ "shapes": { "Dot": { "properties": {
        "x": { "ty": "Float", "sampler": { "Uniform": { "min": 2.0, "max": 1.0 } } }
    } } } }"#;
    assert!(matches!(
        ShapeCatalog::from_json(source),
        Err(TranslationError::Config(_))
    ));
    assert!(standard_catalog(&Canvas::default()).validate().is_ok());
}

/// Forward-mode dual number `v + d·ε`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dual {
    v: f64,
    d: f64,
}

impl Dual {
    fn var(v: f64) -> Self {
        Dual { v, d: 1.0 }
    }
}

impl Add for Dual {
    type Output = Dual;
    fn add(self, o: Dual) -> Dual {
        Dual { v: self.v + o.v, d: self.d + o.d }
    }
}

impl Sub for Dual {
    type Output = Dual;
    fn sub(self, o: Dual) -> Dual {
        Dual { v: self.v - o.v, d: self.d - o.d }
    }
}

impl Mul for Dual {
    type Output = Dual;
    fn mul(self, o: Dual) -> Dual {
        Dual { v: self.v * o.v, d: self.d * o.v + self.v * o.d }
    }
}

impl Div for Dual {
    type Output = Dual;
    fn div(self, o: Dual) -> Dual {
        Dual {
            v: self.v / o.v,
            d: (self.d * o.v - self.v * o.d) / (o.v * o.v),
        }
    }
}

impl Neg for Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        Dual { v: -self.v, d: -self.d }
    }
}

impl Number for Dual {
    fn from_f64(value: f64) -> Self {
        Dual { v: value, d: 0.0 }
    }

    fn value(&self) -> f64 {
        self.v
    }

    fn powf(self, e: Self) -> Self {
        let v = self.v.powf(e.v);
        let mut d = e.v * self.v.powf(e.v - 1.0) * self.d;
        if e.d != 0.0 {
            d += v * self.v.ln() * e.d;
        }
        Dual { v, d }
    }

    fn sqrt(self) -> Self {
        let s = self.v.sqrt();
        Dual { v: s, d: self.d / (2.0 * s) }
    }

    fn abs(self) -> Self {
        if self.v < 0.0 {
            -self
        } else {
            self
        }
    }
}

#[test]
fn dual_numbers_carry_the_energy_gradient() {
    let mut store = store_with(&["A"]);
    store
        .insert_shape("A", "s", "Dot", props(vec![("y", done(3.0))]))
        .unwrap();
    store
        .insert_path(
            Path::field("A", "goal"),
            uneval(Expr::objective(
                "nearPoint",
                vec![Expr::field_ref("A", "s"), Expr::Float(1.0), Expr::Float(2.0)],
            )),
        )
        .unwrap();
    let state = dot_problem(store).unwrap();

    let dual = state
        .params
        .energy
        .with_number::<Dual>(Arc::new(Registries::standard()));
    // (x - 1)^2 + (3 - 2)^2 at x = 4.
    let energy = dual
        .evaluate(Dual::from_f64(1e-3), &[Dual::var(4.0)])
        .unwrap();
    assert_eq!(energy, Dual { v: 10.0, d: 6.0 });
}

#[test]
fn dual_numbers_flow_through_operators() {
    let mut store = Store::<Dual>::new();
    store.declare_object("A");
    store
        .insert_path(Path::field("A", "x"), TagExpr::Done(Value::Float(Dual::var(3.0))))
        .unwrap();
    let registries = Registries::<Dual>::standard();
    let evaluator = Evaluator::new(&registries.computations, 100);

    // x^2 / 2 + sqrt(x * 3)
    let expr = Expr::binary(
        BinaryOp::BPlus,
        Expr::binary(
            BinaryOp::Divide,
            Expr::binary(BinaryOp::Exp, Expr::field_ref("A", "x"), Expr::Float(2.0)),
            Expr::Float(2.0),
        ),
        Expr::comp(
            "sqrt",
            vec![Expr::binary(BinaryOp::Multiply, Expr::field_ref("A", "x"), Expr::Float(3.0))],
        ),
    );
    let (value, _) = evaluator.evaluate(&expr, store, &VaryMap::new()).unwrap();
    let ArgVal::Val(Value::Float(result)) = value else {
        panic!("expected a float");
    };
    assert!((result.v - 7.5).abs() < 1e-12);
    // d/dx = x + 3 / (2 sqrt(3x)) = 3 + 0.5
    assert!((result.d - 3.5).abs() < 1e-12);
}
