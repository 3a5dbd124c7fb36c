use scrollect::{MAX_DESIRED_COUNT, RunSettings, normalize_url, same_url};

mod url_normalization {
    use super::*;

    #[test]
    fn removes_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#section"),
            "https://example.com/page"
        );
    }

    #[test]
    fn removes_trailing_slash_from_path() {
        assert_eq!(
            normalize_url("https://example.com/page/"),
            "https://example.com/page"
        );
    }

    #[test]
    fn keeps_trailing_slash_for_root() {
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn keeps_query_parameters() {
        assert_eq!(
            normalize_url("https://example.com/catalog/?sort=price#top"),
            "https://example.com/catalog?sort=price"
        );
    }

    #[test]
    fn collapses_repeated_trailing_slashes() {
        assert_eq!(
            normalize_url("https://example.com/a/b///"),
            "https://example.com/a/b"
        );
    }

    #[test]
    fn non_urls_pass_through() {
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn idempotent() {
        let once = normalize_url("https://example.com/page/#x");
        assert_eq!(normalize_url(&once), once);
    }
}

mod page_identity {
    use super::*;

    #[test]
    fn fragment_and_trailing_slash_do_not_make_a_different_page() {
        assert!(same_url(
            "https://example.com/catalog/",
            "https://example.com/catalog#seen"
        ));
    }

    #[test]
    fn different_queries_are_different_pages() {
        assert!(!same_url(
            "https://example.com/catalog?page=1",
            "https://example.com/catalog?page=2"
        ));
    }
}

mod run_settings {
    use super::*;

    #[test]
    fn desired_count_is_clamped() {
        assert_eq!(RunSettings::new("https://x.ru/c", 0).desired_count, 1);
        assert_eq!(
            RunSettings::new("https://x.ru/c", 1_000_000).desired_count,
            MAX_DESIRED_COUNT
        );
        assert_eq!(RunSettings::new("https://x.ru/c", 50).desired_count, 50);
    }

    #[test]
    fn resume_requires_the_collecting_flag_and_the_same_page() {
        let mut settings = RunSettings::new("https://www.ozon.ru/category/tea/", 50);
        assert!(!settings.should_resume("https://www.ozon.ru/category/tea/"));

        settings.collecting = true;
        assert!(settings.should_resume("https://www.ozon.ru/category/tea#top"));
        assert!(!settings.should_resume("https://www.ozon.ru/category/coffee/"));
    }

    #[test]
    fn settings_round_trip_through_serde() {
        let mut settings = RunSettings::new("https://www.ozon.ru/category/tea/", 120);
        settings.collecting = true;

        let json = serde_json::to_string(&settings).unwrap();
        let restored: RunSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, settings);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            segments in proptest::collection::vec("[a-z0-9]{1,8}", 0..5),
            fragment in proptest::option::of("[a-z]{1,6}"),
            trailing in 0usize..3
        ) {
            let mut url = format!("https://example.com/{}", segments.join("/"));
            url.push_str(&"/".repeat(trailing));
            if let Some(fragment) = fragment {
                url.push('#');
                url.push_str(&fragment);
            }

            let once = normalize_url(&url);
            prop_assert_eq!(normalize_url(&once), once);
        }

        #[test]
        fn normalized_urls_never_keep_fragments(
            path in "[a-z]{1,8}",
            fragment in "[a-z]{1,8}"
        ) {
            let url = format!("https://example.com/{path}#{fragment}");
            prop_assert!(!normalize_url(&url).contains('#'));
        }
    }
}
