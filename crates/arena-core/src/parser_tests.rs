use super::*;

#[test]
fn last_candidate_wins() {
    let mv = parse_action("I will play [e2e4] because it controls the centre ... final: [e7e5]");
    assert_eq!(mv, Some(MoveToken::from_uci("e7e5")));
}

#[test]
fn no_coordinates_is_no_match() {
    assert_eq!(parse_action("I resign, this position is hopeless."), None);
    assert_eq!(parse_action(""), None);
}

#[test]
fn bare_and_spaced_tokens_are_rewrapped() {
    assert_eq!(parse_action("Final move: g1f3").unwrap().as_str(), "[g1f3]");
    assert_eq!(parse_action("Final move: [ d2d4 ]").unwrap().as_str(), "[d2d4]");
}

#[test]
fn promotion_letter_is_kept() {
    let mv = parse_action("Promote! [e7e8q]").unwrap();
    assert_eq!(mv.as_str(), "[e7e8q]");
    assert_eq!(mv.uci(), "e7e8q");
}

#[test]
fn uppercase_squares_are_not_moves() {
    assert_eq!(parse_action("E2E4"), None);
}

#[test]
fn out_of_board_squares_are_ignored() {
    assert_eq!(parse_action("[i2i4] then [e9e4]"), None);
}
