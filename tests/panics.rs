//! Lives in its own test binary: it installs a process-wide panic hook.

use std::{
    panic,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use calctree::{
    Calculator,
    ast::Notation,
    error::RuntimeError,
    interpreter::{types::core::RuntimeType, value::function::Function},
};

#[test]
fn caught_native_panics_are_not_reported_by_the_hook() {
    let reported = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reported);
    panic::set_hook(Box::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    let mut calc = Calculator::new().unwrap();
    let boom = Function::native("boom",
                                Notation::Postfix,
                                RuntimeType::number(),
                                RuntimeType::number(),
                                1,
                                |_, _| panic!("kaboom"))
                   .unwrap();
    calc.register_operator(boom, 9).unwrap();

    for _ in 0..3 {
        let err = calc.evaluate_str("1 boom").unwrap_err();
        let err = err.downcast_ref::<RuntimeError>().unwrap();
        assert!(matches!(err.root_cause(), RuntimeError::LambdaEvaluation { .. }));
    }
    assert_eq!(reported.load(Ordering::SeqCst), 0);

    // Panics outside native bodies still reach the previous hook.
    assert!(panic::catch_unwind(|| panic!("elsewhere")).is_err());
    assert_eq!(reported.load(Ordering::SeqCst), 1);

    let _ = panic::take_hook();
}
