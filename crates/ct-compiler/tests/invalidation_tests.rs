use std::sync::Arc;

use ct_compiler::{AssembleError, Assembler};
use ct_ir::expr::{Constraint, LogicOp, Node, Operator};
use ct_ir::render::Render;

fn make_assembler() -> Assembler {
    let mut asm = Assembler::new();
    asm.declare_param("bool", "enabled", &[]).unwrap();
    asm.declare_param("int", "width", &[Node::int(1), Node::int(2)]).unwrap();
    asm.declare_param("string", "os", &[Node::string("linux"), Node::string("mac")])
        .unwrap();
    asm
}

#[test]
fn test_no_preconditions_means_never_invalid() {
    let mut asm = make_assembler();
    let built = asm.finalize_invalidations().unwrap();
    assert_eq!(built.len(), 3);
    for (pid, c) in built.iter().enumerate() {
        assert_eq!(**c, Constraint::Not(Constraint::invalid(pid)));
    }
}

#[test]
fn test_preconditions_form_left_associated_disjunction() {
    let mut asm = make_assembler();
    let enabled = asm.build_param_reference("enabled").unwrap();
    let disabled = Node::Constraint(
        asm.build_unary_logical(Operator::Not, Some(enabled)).unwrap(),
    );
    let os = asm.build_param_reference("os").unwrap();
    let is_mac = Node::Constraint(
        asm.build_relational_constraint(Operator::Eq, Some(os), Some(Node::string("mac")), "==")
            .unwrap(),
    );

    asm.record_invalidation_precondition(&["width"], disabled.clone());
    asm.record_invalidation_precondition(&["width"], is_mac);
    asm.record_invalidation_precondition(&["width"], Node::boolean(false));

    let built = asm.finalize_invalidations().unwrap();
    assert_eq!(
        built[1].display(asm.params()).to_string(),
        "(((!enabled || os == \"mac\") || false) <-> IVLD(width))"
    );
    match &*built[1] {
        Constraint::Logic {
            op: LogicOp::Iff,
            lhs,
            ..
        } => match &**lhs {
            Constraint::Logic {
                op: LogicOp::Or, ..
            } => {}
            other => panic!("expected disjunction, got {other:?}"),
        },
        other => panic!("expected equivalence, got {other:?}"),
    }
    assert_eq!(asm.num_warnings(), 0);
}

#[test]
fn test_precondition_is_shared_between_params() {
    let mut asm = make_assembler();
    let shared = Arc::new(Constraint::Bool(true));
    asm.record_invalidation_precondition(&["width", "os"], Node::Constraint(shared.clone()));
    let built = asm.finalize_invalidations().unwrap();

    for c in &built[1..] {
        let Constraint::Logic { lhs, .. } = &**c else {
            panic!("expected equivalence");
        };
        assert!(Arc::ptr_eq(lhs, &shared));
    }
}

#[test]
fn test_unknown_name_is_skipped_with_warning() {
    let mut asm = make_assembler();
    asm.record_invalidation_precondition(&["ghost", "os"], Node::boolean(true));
    assert_eq!(asm.num_warnings(), 1);
    assert_eq!(asm.logger().unwrap().warnings()[0], "parameter ghost not found");
    let built = asm.finalize_invalidations().unwrap();
    assert!(matches!(*built[2], Constraint::Logic { op: LogicOp::Iff, .. }));
}

#[test]
fn test_non_constraint_precondition_returns_partial_result() {
    let mut asm = make_assembler();
    asm.record_invalidation_precondition(&["os"], Node::boolean(true));
    asm.record_invalidation_precondition(&["os"], Node::int(1));

    let partial = asm.finalize_invalidations().unwrap_err();
    assert_eq!(
        partial.error,
        AssembleError::NotACondition {
            position: 2,
            param: "os".into()
        }
    );
    assert_eq!(partial.built.len(), 2);
    assert_eq!(
        partial.to_string(),
        "condition #2 for invalidating parameter os is not a condition"
    );
    assert_eq!(asm.num_errs(), 1);
}

#[test]
fn test_build_invalidation_marker() {
    let mut asm = make_assembler();
    let marker = asm.build_invalidation("width").unwrap();
    assert_eq!(*marker, Constraint::Invalid(1));
    assert!(asm.build_invalidation("ghost").is_none());
    assert_eq!(asm.num_warnings(), 1);
    assert_eq!(asm.num_errs(), 0);
}
