use scrollect::{Collector, ConfigError, SiteProfile};

#[test]
fn default_configuration_builds() {
    assert!(Collector::builder().build().is_ok());
}

#[test]
fn empty_container_chain_is_rejected() {
    let profile = SiteProfile {
        container_selectors: Vec::new(),
        ..SiteProfile::ozon()
    };
    let err = Collector::builder().profile(profile).build().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::EmptySelectorList("container_selectors")
    ));
}

#[test]
fn empty_name_chain_is_rejected() {
    let profile = SiteProfile {
        name_selectors: Vec::new(),
        ..SiteProfile::ozon()
    };
    assert!(matches!(
        Collector::builder().profile(profile).build().unwrap_err(),
        ConfigError::EmptySelectorList("name_selectors")
    ));
}

#[test]
fn malformed_selector_is_rejected_with_context() {
    let mut profile = SiteProfile::ozon();
    profile
        .price_selectors
        .push("div[unclosed".to_string());

    match Collector::builder().profile(profile).build().unwrap_err() {
        ConfigError::InvalidSelector { selector, .. } => {
            assert_eq!(selector, "div[unclosed");
        }
        other => panic!("expected InvalidSelector, got {other:?}"),
    }
}

#[test]
fn zero_stagnation_budget_is_rejected() {
    let err = Collector::builder().max_stagnation(0).build().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidStagnationBudget(0)));
}

#[test]
fn profile_validation_is_directly_callable() {
    assert!(SiteProfile::ozon().validate().is_ok());

    let broken = SiteProfile {
        price_selectors: vec![":::".to_string()],
        ..SiteProfile::ozon()
    };
    assert!(broken.validate().is_err());
}
