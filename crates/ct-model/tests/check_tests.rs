use ct_compiler::{AssembledModel, Assembler};
use ct_ir::expr::{Node, Operator};
use ct_model::check::{check, check_all, is_legal, Verdict};
use ct_model::{Assignment, EvalOptions};

/// `enabled -> width > 1`, with width invalidated while `!enabled`.
fn make_model() -> AssembledModel {
    let mut asm = Assembler::new();
    asm.declare_param("bool", "enabled", &[]).unwrap();
    asm.declare_param("int", "width", &[Node::int(1), Node::int(2)]).unwrap();

    let enabled = asm.build_param_reference("enabled").unwrap();
    let width = asm.build_param_reference("width").unwrap();
    let wide = asm
        .build_relational_constraint(Operator::Gt, Some(width), Some(Node::int(1)), ">")
        .unwrap();
    let rule = asm
        .build_logical_constraint(
            Operator::Imply,
            Some(enabled.clone()),
            Some(Node::Constraint(wide)),
        )
        .unwrap();
    asm.add_constraint(rule);

    let disabled = asm.build_unary_logical(Operator::Not, Some(enabled)).unwrap();
    asm.record_invalidation_precondition(&["width"], Node::Constraint(disabled));
    asm.finish().unwrap()
}

fn all_constraints(model: &AssembledModel) -> Vec<ct_ir::expr::ConstraintRef> {
    model.all_constraints().cloned().collect()
}

#[test]
fn test_legal_assignments() {
    let model = make_model();
    let constraints = all_constraints(&model);
    let on = Assignment::new().with(0, 0).with(1, 1);
    let off = Assignment::new().with(0, 1).with_invalid(1);
    assert!(is_legal(&constraints, &model.params, &on).unwrap());
    assert!(is_legal(&constraints, &model.params, &off).unwrap());
}

#[test]
fn test_violations_name_the_constraint() {
    let model = make_model();
    let constraints = all_constraints(&model);
    let narrow = Assignment::new().with(0, 0).with(1, 0);
    let verdict = check(&constraints, &model.params, &narrow, EvalOptions::default()).unwrap();
    assert_eq!(verdict, Verdict::Violated(0));

    // width set although it should be a don't-care
    let stray = Assignment::new().with(0, 1).with(1, 1);
    let verdict = check(&constraints, &model.params, &stray, EvalOptions::default()).unwrap();
    assert_eq!(verdict, Verdict::Violated(2));
}

#[test]
fn test_partial_assignment_is_undetermined() {
    let model = make_model();
    let constraints = all_constraints(&model);
    let partial = Assignment::new().with(0, 0);
    let verdict = check(&constraints, &model.params, &partial, EvalOptions::default()).unwrap();
    assert_eq!(verdict, Verdict::Undetermined(0));
    assert!(!verdict.is_legal());
}

#[test]
fn test_check_all_keeps_input_order() {
    let model = make_model();
    let constraints = all_constraints(&model);
    let assignments: Vec<_> = (0..64)
        .map(|i| {
            if i % 2 == 0 {
                Assignment::new().with(0, 0).with(1, 1)
            } else {
                Assignment::new().with(0, 0).with(1, 0)
            }
        })
        .collect();
    let verdicts =
        check_all(&constraints, &model.params, &assignments, EvalOptions::default()).unwrap();
    assert_eq!(verdicts.len(), 64);
    for (i, verdict) in verdicts.iter().enumerate() {
        assert_eq!(verdict.is_legal(), i % 2 == 0);
    }
}

#[test]
fn test_check_all_reports_structural_errors() {
    let model = make_model();
    let constraints = all_constraints(&model);
    let assignments = vec![Assignment::new().with(0, 0).with(1, 1)];
    assert!(check_all(&constraints, &[], &assignments, EvalOptions::default()).is_err());
}
