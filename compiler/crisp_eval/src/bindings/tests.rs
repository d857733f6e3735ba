#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn num(n: u64) -> Option<BindingValue> {
    Some(BindingValue::Value(Value::from(n)))
}

fn user_value(store: &BindingStore, name: &str) -> Option<Value> {
    store
        .get_binding_value(name, Namespace::User)
        .and_then(BindingValue::as_value)
        .cloned()
}

#[test]
fn test_inner_binding_invisible_after_exit() {
    let mut store = BindingStore::new();
    store.enter_scope(None);
    store
        .set_binding("$x", num(1), Namespace::User, false, false)
        .unwrap();
    assert_eq!(user_value(&store, "$x"), Some(Value::from(1u64)));
    assert!(store.exit_scope());
    assert!(!store.has_binding("$x", Namespace::User));
}

#[test]
fn test_shadowing_per_namespace() {
    let mut store = BindingStore::new();
    store
        .set_binding("vault", num(1), Namespace::User, false, false)
        .unwrap();
    store
        .set_binding("vault", num(2), Namespace::Addr, false, false)
        .unwrap();
    store.enter_scope(None);
    store
        .set_binding("vault", num(3), Namespace::User, false, false)
        .unwrap();

    assert_eq!(user_value(&store, "vault"), Some(Value::from(3u64)));
    // ADDR is not shadowed by the inner USER binding.
    assert_eq!(
        store.get_binding_value("vault", Namespace::Addr),
        num(2).as_ref()
    );
}

#[test]
fn test_duplicate_without_overwrite_fails() {
    let mut store = BindingStore::new();
    store
        .set_binding("$x", num(1), Namespace::User, false, false)
        .unwrap();
    let err = store
        .set_binding("$x", num(2), Namespace::User, false, false)
        .unwrap_err();
    assert_eq!(
        err,
        BindingError::AlreadyExists {
            frame: FrameKind::Local,
            namespace: Namespace::User,
            name: "$x".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "USER binding `$x` already exists in the local scope"
    );

    store
        .set_binding("$x", num(2), Namespace::User, false, true)
        .unwrap();
    assert_eq!(user_value(&store, "$x"), Some(Value::from(2u64)));
}

#[test]
fn test_same_name_in_outer_frame_is_not_a_duplicate() {
    let mut store = BindingStore::new();
    store
        .set_binding("$x", num(1), Namespace::User, false, false)
        .unwrap();
    store.enter_scope(None);
    store
        .set_binding("$x", num(2), Namespace::User, false, false)
        .unwrap();
    store.exit_scope();
    assert_eq!(user_value(&store, "$x"), Some(Value::from(1u64)));
}

#[test]
fn test_global_writes_go_to_root() {
    let mut store = BindingStore::new();
    store.enter_scope(None);
    store.enter_scope(None);
    store
        .set_binding("chain", num(1), Namespace::Other, true, false)
        .unwrap();
    let err = store
        .set_binding("chain", num(2), Namespace::Other, true, false)
        .unwrap_err();
    assert!(matches!(
        err,
        BindingError::AlreadyExists {
            frame: FrameKind::Global,
            ..
        }
    ));
    store.exit_scope();
    store.exit_scope();
    assert!(store.has_binding("chain", Namespace::Other));
}

#[test]
fn test_root_is_never_popped() {
    let mut store = BindingStore::new();
    assert!(!store.exit_scope());
    assert_eq!(store.depth(), 1);
}

#[test]
fn test_scope_module_inherits() {
    let mut store = BindingStore::new();
    assert_eq!(store.current_module(), None);
    store.enter_scope(Some("aragonos"));
    store.enter_scope(None);
    assert_eq!(store.current_module(), Some("aragonos"));
    store.exit_scope();
    store.exit_scope();
    assert_eq!(store.current_module(), None);
}

#[test]
fn test_get_all_bindings_filters() {
    let mut store = BindingStore::new();
    store
        .set_binding("$a", num(1), Namespace::User, false, false)
        .unwrap();
    store
        .set_binding("pending", None, Namespace::Addr, false, false)
        .unwrap();
    store.enter_scope(None);
    store
        .set_binding("$b", num(2), Namespace::User, false, false)
        .unwrap();
    store
        .set_binding("$a", num(3), Namespace::User, false, false)
        .unwrap();

    let all: Vec<(&str, Namespace)> = store
        .get_all_bindings(&BindingFilter::default())
        .into_iter()
        .map(|b| (b.identifier.as_str(), b.namespace))
        .collect();
    assert_eq!(
        all,
        vec![
            ("$a", Namespace::User),
            ("$b", Namespace::User),
            ("pending", Namespace::Addr),
        ]
    );

    let local = store.get_all_bindings(&BindingFilter {
        only_local: true,
        ..BindingFilter::default()
    });
    assert_eq!(local.len(), 2);

    let resolved_addrs = store.get_all_bindings(&BindingFilter {
        namespaces: vec![Namespace::Addr],
        ignore_nulls: true,
        ..BindingFilter::default()
    });
    assert!(resolved_addrs.is_empty());

    let a = store.get_all_bindings(&BindingFilter::namespace(Namespace::User));
    assert_eq!(a[0].value, num(3));
}

#[test]
fn test_clear_namespace() {
    let mut store = BindingStore::new();
    store
        .set_binding("x", num(1), Namespace::Abi, false, false)
        .unwrap();
    store
        .set_binding("x", num(1), Namespace::User, false, false)
        .unwrap();
    store.enter_scope(None);
    store
        .set_binding("y", num(1), Namespace::Abi, false, false)
        .unwrap();
    store.clear_namespace(Namespace::Abi);
    assert!(!store.has_binding("x", Namespace::Abi));
    assert!(!store.has_binding("y", Namespace::Abi));
    assert!(store.has_binding("x", Namespace::User));
}

struct Fixed;

impl DataProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn resolve(&self, identifier: &str) -> Option<Address> {
        (identifier == "kernel").then(|| Address::from_low_u64(1))
    }

    fn identifiers(&self) -> Vec<String> {
        vec!["kernel".to_string()]
    }
}

#[test]
fn test_data_providers_visible_from_inner_scopes() {
    let mut store = BindingStore::new();
    store.enter_scope(None);
    store
        .set_binding(
            "dao",
            Some(BindingValue::DataProvider(Arc::new(Fixed))),
            Namespace::DataProvider,
            false,
            false,
        )
        .unwrap();
    store.enter_scope(None);
    let providers = store.data_providers();
    assert_eq!(providers.len(), 1);
    assert_eq!(
        providers[0].resolve("kernel"),
        Some(Address::from_low_u64(1))
    );
    store.exit_scope();
    store.exit_scope();
    assert!(store.data_providers().is_empty());
}

#[derive(Clone, Debug)]
enum Op {
    Enter,
    Exit,
    Set(u8, u8, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Enter),
        Just(Op::Exit),
        (0u8..4, 0u8..2, any::<bool>()).prop_map(|(n, ns, o)| Op::Set(n, ns, o)),
    ]
}

proptest! {
    /// Lookups agree with a naive model of the frame stack, and bulk
    /// listings never repeat a pair.
    #[test]
    fn store_matches_frame_model(ops in proptest::collection::vec(op_strategy(), 0..60)) {
        let namespaces = [Namespace::User, Namespace::Addr];
        let mut store = BindingStore::new();
        let mut model: Vec<Vec<(String, Namespace, u64)>> = vec![Vec::new()];
        let mut counter = 0u64;

        for op in ops {
            match op {
                Op::Enter => {
                    store.enter_scope(None);
                    model.push(Vec::new());
                }
                Op::Exit => {
                    let popped = store.exit_scope();
                    prop_assert_eq!(popped, model.len() > 1);
                    if popped {
                        model.pop();
                    }
                }
                Op::Set(n, ns, overwrite) => {
                    counter += 1;
                    let name = format!("v{n}");
                    let ns = namespaces[usize::from(ns)];
                    let frame = model.last_mut().unwrap();
                    let existing = frame.iter().position(|(i, s, _)| *i == name && *s == ns);
                    let result = store.set_binding(&name, num(counter), ns, false, overwrite);
                    match (existing, overwrite) {
                        (Some(_), false) => prop_assert!(result.is_err()),
                        (Some(idx), true) => {
                            prop_assert!(result.is_ok());
                            frame[idx].2 = counter;
                        }
                        (None, _) => {
                            prop_assert!(result.is_ok());
                            frame.push((name, ns, counter));
                        }
                    }
                }
            }
        }

        for n in 0u8..4 {
            for ns in namespaces {
                let name = format!("v{n}");
                let expected = model
                    .iter()
                    .rev()
                    .find_map(|f| f.iter().find(|(i, s, _)| *i == name && *s == ns))
                    .map(|(_, _, v)| *v);
                prop_assert_eq!(
                    store.get_binding_value(&name, ns).cloned(),
                    expected.and_then(num)
                );
            }
        }

        let all = store.get_all_bindings(&BindingFilter::default());
        let mut pairs: Vec<(&str, Namespace)> =
            all.iter().map(|b| (b.identifier.as_str(), b.namespace)).collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        prop_assert_eq!(pairs.len(), total);
        for binding in all {
            prop_assert_eq!(
                Some(binding),
                store.get_binding(&binding.identifier, binding.namespace)
            );
        }
    }
}
