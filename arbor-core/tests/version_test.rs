use arbor_core::error::Error;
use arbor_core::version::{exact_version, reconcile};
use proptest::prelude::*;

#[test]
fn test_null_sides() {
    assert_eq!(reconcile(None, Some("^1.0.0")).unwrap(), "^1.0.0");
    assert_eq!(reconcile(Some("~2.1.0"), None).unwrap(), "~2.1.0");
    assert!(matches!(reconcile(None, None), Err(Error::NoVersion)));
}

#[test]
fn test_same_operator_takes_greater_version() {
    assert_eq!(reconcile(Some("^1.0.0"), Some("^1.1.0")).unwrap(), "^1.1.0");
    assert_eq!(reconcile(Some("^1.1.0"), Some("^1.0.0")).unwrap(), "^1.1.0");
    assert_eq!(reconcile(Some("~1.1.0"), Some("~1.1.3")).unwrap(), "~1.1.3");
    assert_eq!(reconcile(Some("1.2.3"), Some("1.2.3")).unwrap(), "1.2.3");
}

#[test]
fn test_mixed_operators_take_most_permissive() {
    assert_eq!(reconcile(Some("~1.1.0"), Some("^1.0.0")).unwrap(), "^1.1.0");
    assert_eq!(reconcile(Some("^1.0.0"), Some("~1.1.0")).unwrap(), "^1.1.0");
    assert_eq!(reconcile(Some("1.1.4"), Some("~1.1.0")).unwrap(), "~1.1.4");
    assert_eq!(reconcile(Some("^2.0.0"), Some("2.3.0")).unwrap(), "^2.3.0");
}

#[test]
fn test_disjoint_ranges_are_incompatible() {
    assert!(matches!(
        reconcile(Some("~1.0.0"), Some("^1.1.0")),
        Err(Error::IncompatibleVersions { .. })
    ));
    assert!(matches!(
        reconcile(Some("^1.0.0"), Some("^2.0.0")),
        Err(Error::IncompatibleVersions { .. })
    ));
    assert!(matches!(
        reconcile(Some("1.0.0"), Some("1.0.1")),
        Err(Error::IncompatibleVersions { .. })
    ));
    assert!(matches!(
        reconcile(Some("^0.1.0"), Some("^0.2.0")),
        Err(Error::IncompatibleVersions { .. })
    ));
}

#[test]
fn test_invalid_semver() {
    assert!(matches!(
        reconcile(Some("latest"), Some("^1.0.0")),
        Err(Error::InvalidSemver(v)) if v == "latest"
    ));
    assert!(matches!(
        reconcile(Some("^1.0.0"), Some(">=1.0.0 <2")),
        Err(Error::InvalidSemver(_))
    ));
}

#[test]
fn test_cleans_prefixes() {
    assert_eq!(exact_version("^v1.2.3").unwrap(), semver::Version::new(1, 2, 3));
    assert_eq!(reconcile(Some("=1.2.3"), Some("^1.0.0")).unwrap(), "^1.2.3");
}

fn gen_version() -> impl Strategy<Value = (u64, u64, u64)> {
    (1u64..4, 0u64..5, 0u64..5)
}

fn gen_operator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(""), Just("~"), Just("^")]
}

proptest! {
    #[test]
    fn test_same_operator_is_symmetric(
        op in gen_operator(),
        a in gen_version(),
        b in gen_version(),
    ) {
        let left = format!("{}{}.{}.{}", op, a.0, a.1, a.2);
        let right = format!("{}{}.{}.{}", op, b.0, b.1, b.2);

        let forward = reconcile(Some(left.as_str()), Some(right.as_str()));
        let backward = reconcile(Some(right.as_str()), Some(left.as_str()));

        match (forward, backward) {
            (Ok(f), Ok(b)) => {
                prop_assert_eq!(&f, &b);
                let max = exact_version(&left).unwrap().max(exact_version(&right).unwrap());
                prop_assert_eq!(exact_version(&f).unwrap(), max);
            }
            (Err(_), Err(_)) => {}
            (f, b) => prop_assert!(false, "asymmetric outcome: {:?} vs {:?}", f, b),
        }
    }

    #[test]
    fn test_null_side_is_identity(op in gen_operator(), v in gen_version()) {
        let range = format!("{}{}.{}.{}", op, v.0, v.1, v.2);
        prop_assert_eq!(reconcile(None, Some(range.as_str())).unwrap(), range.clone());
        prop_assert_eq!(reconcile(Some(range.as_str()), None).unwrap(), range);
    }
}
