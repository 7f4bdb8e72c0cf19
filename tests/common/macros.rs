/// Asserts that a report holds exactly the given number of requests.
#[macro_export]
macro_rules! assert_requests {
    ($report:expr, $count:expr) => {
        assert_eq!(
            $report.requests.len(),
            $count,
            "Unexpected request count: {:?}",
            $report.requests
        );
    };
}

/// Asserts that every request in a report is of the given kind.
#[macro_export]
macro_rules! assert_all_kind {
    ($report:expr, $kind:expr) => {
        for request in &$report.requests {
            assert_eq!(
                request.kind.as_str(),
                $kind,
                "Request {:?} has the wrong kind",
                request
            );
        }
    };
}

/// Asserts that the validator never entered the given stage.
#[macro_export]
macro_rules! assert_stage_untouched {
    ($stages:expr, $stage:expr) => {
        assert_eq!(
            $stages.entered($stage),
            0,
            "Stage {:?} should not have been reached",
            $stage
        );
    };
}
