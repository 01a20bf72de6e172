use std::sync::Arc;

use ct_ir::expr::{
    ArithExpr, ArithOp, Constraint, LogicOp, Node, NodeKind, NumType, Operator, RelOp, StrExpr,
};
use ct_ir::render::Render;
use ct_ir::types::{ParamSpec, ParamType, ParamValue};

fn specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::with_values(
            "width",
            ParamType::Int,
            vec![ParamValue::coerce("1", ParamType::Int)],
        ),
        ParamSpec::boolean("enabled"),
        ParamSpec::with_values(
            "os",
            ParamType::String,
            vec![ParamValue::coerce("linux", ParamType::String)],
        ),
    ]
}

#[test]
fn test_num_type_join() {
    assert_eq!(NumType::Int.join(NumType::Int), NumType::Int);
    assert_eq!(NumType::Int.join(NumType::Double), NumType::Double);
    assert_eq!(NumType::Double.join(NumType::Int), NumType::Double);
    assert_eq!(NumType::Double.join(NumType::Double), NumType::Double);
}

#[test]
fn test_negation_keeps_operand_type() {
    let neg = ArithExpr::Neg(Arc::new(ArithExpr::double(1.5)));
    assert_eq!(neg.num_type(), NumType::Double);
    let neg = ArithExpr::Neg(Arc::new(ArithExpr::int(3)));
    assert_eq!(neg.num_type(), NumType::Int);
}

#[test]
fn test_literal_text_is_preserved() {
    assert_eq!(Node::int_spelled(7, "007").text(), "007");
    assert_eq!(Node::double_spelled(0.5, ".5").text(), ".5");
    assert_eq!(Node::string("abc").text(), "abc");
    assert_eq!(Node::boolean(false).text(), "false");
    assert!(Node::int(1).is_literal());

    let param = Node::Arith(Arc::new(ArithExpr::Param {
        pid: 0,
        ty: NumType::Int,
    }));
    assert_eq!(param.text(), "");
    assert!(!param.is_literal());
}

#[test]
fn test_node_kinds() {
    assert_eq!(Node::int(1).kind(), NodeKind::Arith);
    assert_eq!(Node::string("x").kind(), NodeKind::Str);
    assert_eq!(Node::boolean(true).kind(), NodeKind::Constraint);
    assert_eq!(NodeKind::Str.to_string(), "string expression");
}

#[test]
fn test_clone_shares_subtree() {
    let shared = Constraint::invalid(1);
    let node = Node::Constraint(shared.clone());
    let copy = node.clone();
    match (&node, &copy) {
        (Node::Constraint(a), Node::Constraint(b)) => {
            assert!(Arc::ptr_eq(a, b));
            assert!(Arc::ptr_eq(a, &shared));
        }
        _ => panic!("expected constraints"),
    }
}

#[test]
fn test_operator_mapping() {
    assert_eq!(Operator::Mod.arith(), Some(ArithOp::Mod));
    assert_eq!(Operator::Le.relational(), Some(RelOp::Le));
    assert_eq!(Operator::Eq.logical(), Some(LogicOp::Iff));
    assert_eq!(Operator::Ne.logical(), Some(LogicOp::Xor));
    assert_eq!(Operator::Add.logical(), None);
    assert_eq!(Operator::Not.arith(), None);
}

#[test]
fn test_operator_deserializes_from_token_name() {
    let op: Operator = serde_json::from_value(serde_json::json!("IMPLY")).unwrap();
    assert_eq!(op, Operator::Imply);
    let op: Operator = serde_json::from_value(serde_json::json!("UPLUS")).unwrap();
    assert_eq!(op, Operator::Uplus);
}

#[test]
fn test_render_with_param_names() {
    let specs = specs();
    let width = Arc::new(ArithExpr::Param {
        pid: 0,
        ty: NumType::Int,
    });
    let sum = Arc::new(ArithExpr::Binary {
        op: ArithOp::Add,
        ty: NumType::Int,
        lhs: width,
        rhs: Arc::new(ArithExpr::int(2)),
    });
    let rel = Arc::new(Constraint::Arith {
        op: RelOp::Gt,
        lhs: sum,
        rhs: Arc::new(ArithExpr::int(3)),
        precision: 0.0,
    });
    let os_check = Arc::new(Constraint::Str {
        op: ct_ir::expr::StrRelOp::Eq,
        lhs: Arc::new(StrExpr::Param(2)),
        rhs: Arc::new(StrExpr::Const("linux".into())),
    });
    let both = Constraint::logic(LogicOp::And, rel, os_check);
    let guarded = Constraint::logic(LogicOp::Imply, Arc::new(Constraint::Param(1)), both);

    assert_eq!(
        guarded.display(&specs).to_string(),
        "(enabled -> ((width + 2) > 3 && os == \"linux\"))"
    );
    assert_eq!(Constraint::not(Constraint::invalid(0)).display(&specs).to_string(), "!IVLD(width)");
}

#[test]
fn test_render_precision_and_unknown_param() {
    let rel = Constraint::Arith {
        op: RelOp::Eq,
        lhs: Arc::new(ArithExpr::Param {
            pid: 9,
            ty: NumType::Double,
        }),
        rhs: Arc::new(ArithExpr::double(1.5)),
        precision: 0.01,
    };
    assert_eq!(rel.display(&[]).to_string(), "#9 ==[0.01] 1.5");
}
