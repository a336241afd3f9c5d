use anyhow::{bail, Result};
use minipy::{
    analyze, execute, parse, tokenize, BlockMode, Outcome, RuntimeError,
    Scoping, Value,
};

mod common;

fn file_test(
    filename: &str,
    block_mode: BlockMode,
    scoping: Scoping,
    reference: &[&str],
) -> Result<Outcome> {
    let outcome = common::run_script(filename, block_mode, scoping)?;

    match &outcome {
        Outcome::Completed(execution) => assert_eq!(execution.output, reference),
        other => bail!("Expected Completed, got {:?}", other),
    }

    Ok(outcome)
}

#[test]
fn test_heuristic_blocks() -> Result<()> {
    let outcome = file_test(
        "heuristic.py",
        BlockMode::Heuristic,
        Scoping::Dynamic,
        &["20", "40"],
    )?;

    if let Outcome::Completed(execution) = outcome {
        assert_eq!(execution.bindings["c"], Value::Int(20));
        assert_eq!(execution.bindings["y"], Value::Int(20));
    }

    Ok(())
}

#[test]
fn test_fibonacci() -> Result<()> {
    file_test(
        "fibonacci.py",
        BlockMode::Indentation,
        Scoping::Dynamic,
        &["[0, 1, 1, 2, 3, 5, 8, 13, 21, 34]", "10"],
    )?;

    Ok(())
}

#[test]
fn test_exceptions() -> Result<()> {
    file_test(
        "exceptions.py",
        BlockMode::Indentation,
        Scoping::Dynamic,
        &[
            "Unsupported operand type(s) for /: tuple and int!",
            "done",
            "caught: Division by zero!",
            "cleanup",
        ],
    )?;

    Ok(())
}

#[test]
fn test_classes_and_imports() -> Result<()> {
    let outcome = file_test(
        "classes.py",
        BlockMode::Indentation,
        Scoping::Dynamic,
        &["World!", "{'apples': 3, 'pears': 2}"],
    )?;

    if let Outcome::Completed(execution) = outcome {
        assert_eq!(execution.bindings["count"], Value::Int(2));
        assert_eq!(execution.bindings["m"], Value::Module("math".to_string()));
    }

    Ok(())
}

#[test]
fn test_scoping_strategies() -> Result<()> {
    file_test(
        "scoping.py",
        BlockMode::Indentation,
        Scoping::Dynamic,
        &["local", "global"],
    )?;

    file_test(
        "scoping.py",
        BlockMode::Indentation,
        Scoping::Lexical,
        &["global", "global"],
    )?;

    Ok(())
}

#[test]
fn test_rejected_script() -> Result<()> {
    let outcome = common::run_script(
        "rejected.py",
        BlockMode::Indentation,
        Scoping::Dynamic,
    )?;

    match outcome {
        Outcome::Rejected { diagnostics } => assert_eq!(
            diagnostics,
            [
                "Duplicate function or class declaration: 'f'.",
                "Undeclared identifier: 'undefined'.",
                "'return' outside of a function.",
            ]
        ),
        other => bail!("Expected Rejected, got {:?}", other),
    }

    // The heuristic block mode puts everything after the second `def` in its
    // body, which is skipped.
    let outcome =
        common::run_script("rejected.py", BlockMode::Heuristic, Scoping::Dynamic)?;

    match outcome {
        Outcome::Rejected { diagnostics } => assert_eq!(diagnostics.len(), 1),
        other => bail!("Expected Rejected, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_free_functions() -> Result<()> {
    let source = "total = 0\nfor n in [1, 2, 3]:\n    total += n\nprint(total)";
    let tokens = tokenize(source)?.into_tokens();
    let program = parse(tokens, common::options(BlockMode::Indentation))?;

    assert!(analyze(&program).is_empty());

    let execution = execute(&program, common::limited(Scoping::Dynamic))?;
    assert_eq!(execution.output, ["6"]);
    assert_eq!(execution.bindings["n"], Value::Int(3));
    Ok(())
}

#[test]
fn test_iteration_limit() -> Result<()> {
    let tokens = tokenize("while True:\n    print('spin')")?.into_tokens();
    let program = parse(tokens, common::options(BlockMode::Indentation))?;

    match execute(&program, common::limited(Scoping::Dynamic)) {
        Ok(execution) => bail!("Expected failure, got {:?}", execution),
        Err(failure) => {
            assert_eq!(failure.error, RuntimeError::IterationLimit(10_000));
            assert_eq!(failure.output.len(), 10_000);
        }
    }

    Ok(())
}
