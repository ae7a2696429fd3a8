//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use std::time::Duration;

    use sitemirror::utils::Deadline;

    #[test]
    fn budget_is_remembered() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert_eq!(deadline.budget(), Duration::from_secs(60));
    }

    #[test]
    fn copies_share_the_same_expiry() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let copy = deadline;

        std::thread::sleep(Duration::from_millis(80));

        assert!(deadline.is_expired());
        assert!(copy.is_expired());
    }

    #[test]
    fn short_sleep_inside_budget() {
        let deadline = Deadline::after(Duration::from_secs(10));
        assert!(deadline.sleep(Duration::from_millis(10)).is_ok());
        assert!(!deadline.is_expired());
    }

    #[test]
    fn bound_keeps_smaller_limit() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert_eq!(deadline.bound(Duration::from_secs(5)), Duration::from_secs(5));
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
    use std::time::{Duration, Instant};

    use sitemirror::core::MirrorError;
    use sitemirror::utils::Deadline;

    #[test]
    fn expired_deadline_reports_budget() {
        let deadline = Deadline::after(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(30));

        match deadline.check() {
            Err(MirrorError::DeadlineExceeded(budget)) => {
                assert_eq!(budget, Duration::from_millis(10))
            }
            other => panic!("expected the deadline to be exceeded, got {other:?}"),
        }
    }

    #[test]
    fn sleep_wakes_at_deadline() {
        let deadline = Deadline::after(Duration::from_millis(50));
        let started = Instant::now();

        assert!(deadline.sleep(Duration::from_secs(10)).is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn bound_is_zero_after_expiry() {
        let deadline = Deadline::after(Duration::ZERO);
        assert_eq!(deadline.bound(Duration::from_secs(30)), Duration::ZERO);
    }
}
