use porssisahko::logging::{level_rank, min_level, parse_log_level};
use tracing::Level;

#[test]
fn parse_accepts_common_spellings() {
    assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
    assert!(parse_log_level("loud").is_err());
}

#[test]
fn min_level_picks_the_more_verbose() {
    assert!(level_rank(Level::TRACE) < level_rank(Level::ERROR));
    assert_eq!(min_level(Level::WARN, Level::DEBUG), Level::DEBUG);
    assert_eq!(min_level(Level::INFO, Level::ERROR), Level::INFO);
}
