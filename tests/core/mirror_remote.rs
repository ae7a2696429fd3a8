//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::sync::Arc;
    use std::time::Duration;

    use sitemirror::cli::InteractivePreflight;
    use sitemirror::core::{CrawlContext, Mirror};
    use sitemirror::utils::Deadline;

    use crate::common::{
        options_with_output, read_string, run_mirror, write_file, StaticRenderer, TestServer,
    };

    #[test]
    fn rendered_page_and_resources_are_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        write_file(&site, "css/site.css", "body { background: url('../img/bg.png') }");
        write_file(&site, "img/a.png", b"A");
        write_file(&site, "img/bg.png", b"BG");
        let server = TestServer::start(site);

        let renderer = StaticRenderer::new(&[
            (
                "/index.html",
                r#"<html><head><link rel="stylesheet" href="css/site.css"></head><body><img src="img/a.png"><iframe src="sub/frame.html"></iframe></body></html>"#,
            ),
            ("/sub/frame.html", r#"<img src="../img/a.png">"#),
        ]);

        let outcome = run_mirror(&server.url(), &out, Arc::new(renderer), Duration::from_secs(20));

        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        let index = read_string(&out, "index.html");
        assert!(index.contains(r#"href="assets/site.css""#));
        assert!(index.contains(r#"<img src="assets/a.png">"#));
        assert!(index.contains(r#"<iframe src="sub/frame.html">"#));
        assert!(read_string(&out, "sub/frame.html").contains(r#"src="../assets/a.png""#));
        assert_eq!(
            read_string(&out, "assets/site.css"),
            "body { background: url('bg.png') }"
        );
        // site.css, bg.png, a.png, index.html, sub/frame.html
        assert_eq!(outcome.statistics.files_written, 5);
    }

    #[test]
    fn remote_start_document_named_in_input() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        write_file(&site, "docs/logo.png", b"LOGO");
        let server = TestServer::start(site);

        let renderer = StaticRenderer::new(&[("/docs/guide.html", r#"<img src="logo.png">"#)]);
        let input = format!("{}docs/guide.html", server.url());

        let outcome = run_mirror(&input, &out, Arc::new(renderer), Duration::from_secs(20));

        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert!(read_string(&out, "guide.html").contains(r#"src="assets/logo.png""#));
    }

    #[test]
    fn root_relative_iframes_resolve_against_the_host() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&site).unwrap();
        let server = TestServer::start(site);

        let renderer = StaticRenderer::new(&[
            (
                "/docs/guide.html",
                r#"<iframe src="/docs/sub/frame.html"></iframe><iframe src="/top.html"></iframe>"#,
            ),
            ("/docs/sub/frame.html", r#"<iframe src="/docs/deep/inner.html"></iframe>"#),
            ("/docs/deep/inner.html", "<p>inner</p>"),
            ("/docs/top.html", "<p>wrong page</p>"),
            ("/top.html", "<p>outside the mirrored tree</p>"),
        ]);
        let input = format!("{}docs/guide.html", server.url());

        let outcome = run_mirror(&input, &out, Arc::new(renderer), Duration::from_secs(20));

        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        let guide = read_string(&out, "guide.html");
        assert!(guide.contains(r#"<iframe src="sub/frame.html">"#), "{guide}");
        assert!(guide.contains(r#"<iframe src="/top.html">"#), "{guide}");
        assert!(read_string(&out, "sub/frame.html").contains(r#"src="../deep/inner.html""#));
        assert!(read_string(&out, "deep/inner.html").contains("<p>inner</p>"));
        assert!(!out.join("top.html").exists());
        assert!(!out.join("docs").exists());
        // guide.html, sub/frame.html, deep/inner.html
        assert_eq!(outcome.statistics.files_written, 3);
    }

    #[test]
    fn interactive_preflight_checks_remote_input() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        write_file(&site, "index.html", "<p>served</p>");
        let server = TestServer::start(site);

        let renderer = StaticRenderer::new(&[("/index.html", "<p>rendered</p>")]);
        let context = CrawlContext::from_input(&server.url()).unwrap();
        let mirror = Mirror::with_renderer(
            context,
            options_with_output(&out),
            Deadline::after(Duration::from_secs(20)),
            Arc::new(renderer),
        )
        .unwrap();

        let outcome = mirror.execute(&InteractivePreflight::new(true, true));

        assert!(outcome.result.is_ok(), "{:?}", outcome.result);
        assert!(read_string(&out, "index.html").contains("<p>rendered</p>"));
        assert!(out.join("assets").is_dir());
        assert!(out.join("fonts").is_dir());
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
    use std::sync::Arc;
    use std::time::Duration;

    use sitemirror::cli::InteractivePreflight;
    use sitemirror::core::{CrawlContext, Mirror, MirrorError};
    use sitemirror::utils::Deadline;

    use crate::common::{
        options_with_output, run_mirror, run_mirror_with, write_file, FailingRenderer,
        SlowRenderer, StaticRenderer, TestServer, SLOW_PREFIX,
    };

    #[test]
    fn failed_render_writes_no_start_document() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let outcome = run_mirror(
            "https://example.invalid/",
            &out,
            Arc::new(FailingRenderer),
            Duration::from_secs(20),
        );

        match outcome.result {
            Err(MirrorError::Render { message, .. }) => {
                assert!(message.contains("ERR_NAME_NOT_RESOLVED"))
            }
            other => panic!("expected a render error, got {other:?}"),
        }
        assert!(!out.join("index.html").exists());
        // Buckets may already exist, but stay empty
        assert!(out.join("assets").is_dir());
        assert_eq!(std::fs::read_dir(out.join("assets")).unwrap().count(), 0);
        assert_eq!(outcome.statistics.files_written, 0);
    }

    #[test]
    fn slow_render_exceeds_wait_bound() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let options = sitemirror::core::MirrorOptions {
            render_wait: Duration::from_millis(200),
            ..options_with_output(&out)
        };

        let outcome = run_mirror_with(
            "https://example.invalid/",
            options,
            Arc::new(SlowRenderer(Duration::from_secs(2))),
            Duration::from_secs(20),
        );

        match outcome.result {
            Err(MirrorError::RenderWait(bound)) => assert_eq!(bound, Duration::from_millis(200)),
            other => panic!("expected a render wait timeout, got {other:?}"),
        }
        assert!(!out.join("index.html").exists());
    }

    #[test]
    fn slow_render_exceeds_global_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");

        let outcome = run_mirror(
            "https://example.invalid/",
            &out,
            Arc::new(SlowRenderer(Duration::from_secs(3))),
            Duration::from_millis(300),
        );

        assert!(outcome.result.unwrap_err().is_deadline());
        assert!(!out.join("index.html").exists());
    }

    #[test]
    fn slow_resource_exceeds_global_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        write_file(&site, "img/a.png", b"A");
        let server = TestServer::start(site);

        let slow_image = format!("{}{}img/a.png", server.url(), SLOW_PREFIX.trim_start_matches('/'));
        let markup = format!(r#"<img src="{slow_image}">"#);
        let renderer = StaticRenderer::new(&[("/index.html", markup.as_str())]);

        let outcome = run_mirror(&server.url(), &out, Arc::new(renderer), Duration::from_millis(800));

        let error = outcome.result.unwrap_err();
        assert!(error.is_deadline(), "expected the deadline, got {error:?}");
        assert!(!out.join("index.html").exists());
        assert!(!out.join("assets/a.png").exists());
    }

    #[test]
    fn unreachable_remote_input_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        let out = dir.path().join("out");
        let server = TestServer::start(site);

        let renderer = StaticRenderer::new(&[("/index.html", "<p>rendered</p>")]);
        let context = CrawlContext::from_input(&server.url()).unwrap();
        let mirror = Mirror::with_renderer(
            context,
            options_with_output(&out),
            Deadline::after(Duration::from_secs(20)),
            Arc::new(renderer),
        )
        .unwrap();

        let outcome = mirror.execute(&InteractivePreflight::new(true, true));

        match outcome.result {
            Err(MirrorError::Unreachable(message)) => assert!(message.contains("404")),
            other => panic!("expected the input to be unreachable, got {other:?}"),
        }
        // Validation runs before any output is created
        assert!(!out.exists());
    }
}
