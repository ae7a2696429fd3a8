//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::path::PathBuf;

    use sitemirror::utils::{resolve_fetch_target, BaseContext, TargetLocation, Url};

    fn remote(base: &str) -> BaseContext {
        BaseContext::Remote(Url::parse(base).unwrap())
    }

    fn local(root: &str, dir: &str) -> BaseContext {
        BaseContext::Local {
            root: PathBuf::from(root),
            dir: PathBuf::from(dir),
        }
    }

    #[test]
    fn relative_against_remote_directory() {
        let target = resolve_fetch_target("img/a.png", &remote("https://example.com/site/"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "https://example.com/site/img/a.png");
        assert_eq!(target.file_name(), "a.png");
    }

    #[test]
    fn parent_segments_against_remote_stylesheet() {
        let base = remote("https://example.com/static/css/site.css");
        let target = resolve_fetch_target("../fonts/f.woff2?v=3#iefix", &base)
            .unwrap()
            .unwrap();

        // Query stays part of the identity, fragment does not
        assert_eq!(target.identity, "https://example.com/static/fonts/f.woff2?v=3");
        assert_eq!(target.file_name(), "f.woff2");
    }

    #[test]
    fn root_relative_against_remote() {
        let target = resolve_fetch_target("/app.js", &remote("https://example.com/a/b/"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "https://example.com/app.js");
    }

    #[test]
    fn scheme_relative_against_remote() {
        let target = resolve_fetch_target("//cdn.example.net/lib.js", &remote("http://example.com/"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "http://cdn.example.net/lib.js");
    }

    #[test]
    fn extensionless_remote_endpoint_is_named_after_host() {
        let target = resolve_fetch_target("https://cdn.example.net/", &remote("https://example.com/"))
            .unwrap()
            .unwrap();

        assert_eq!(target.file_name(), "cdn.example.net.js");
    }

    #[test]
    fn relative_against_local_directory() {
        let target = resolve_fetch_target("../img/./a.png", &local("/src/front", "/src/front/css"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "/src/front/img/a.png");
        assert_eq!(
            target.location,
            TargetLocation::Local {
                root: PathBuf::from("/src/front"),
                path: PathBuf::from("/src/front/img/a.png"),
            }
        );
    }

    #[test]
    fn root_relative_against_local() {
        let target = resolve_fetch_target("/img/a.png?v=1", &local("/src/front", "/src/front/a/b"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "/src/front/img/a.png");
    }

    #[test]
    fn absolute_url_in_local_document_is_remote() {
        let target = resolve_fetch_target("https://cdn.example.net/x.css", &local("/src", "/src"))
            .unwrap()
            .unwrap();

        assert!(target.is_remote());
    }

    #[test]
    fn scheme_relative_in_local_document_uses_https() {
        let target = resolve_fetch_target("//cdn.example.net/x.css", &local("/src", "/src"))
            .unwrap()
            .unwrap();

        assert_eq!(target.identity, "https://cdn.example.net/x.css");
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use std::path::PathBuf;

    use sitemirror::utils::{resolve_fetch_target, BaseContext, Url};

    fn remote() -> BaseContext {
        BaseContext::Remote(Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn ignorable_references_are_skipped() {
        for reference in [
            "",
            "   ",
            "#top",
            "data:image/png;base64,AAAA",
            "javascript:void(0)",
            "JavaScript:alert(1)",
            "mailto:me@example.com",
            "about:blank",
        ] {
            assert_eq!(resolve_fetch_target(reference, &remote()).unwrap(), None, "{reference}");
        }
    }

    #[test]
    fn non_http_scheme_is_skipped() {
        assert_eq!(
            resolve_fetch_target("ftp://example.com/file.zip", &remote()).unwrap(),
            None
        );
    }

    #[test]
    fn query_only_local_reference_is_skipped() {
        let base = BaseContext::Local {
            root: PathBuf::from("/src"),
            dir: PathBuf::from("/src"),
        };

        assert_eq!(resolve_fetch_target("?v=2", &base).unwrap(), None);
    }

    #[test]
    fn malformed_scheme_relative_is_rejected() {
        let base = BaseContext::Local {
            root: PathBuf::from("/src"),
            dir: PathBuf::from("/src"),
        };

        assert!(resolve_fetch_target("//[bad", &base).is_err());
    }
}
