use super::*;
use arena_core::{LegalMoves, MoveToken, Side, TokenUsage};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn three_moves() -> LegalMoves {
    LegalMoves::from_uci(["e2e4", "d2d4", "g1f3"])
}

fn usage() -> TokenUsage {
    TokenUsage::new(120, 8, 128)
}

#[tokio::test]
async fn legal_answer_is_accepted_on_first_attempt() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::repeating("alpha", "I think the best is... Final move: [e2e4]", usage());
    let mut rng = StdRng::seed_from_u64(7);

    let res = resolver
        .resolve(&mut agent, "prompt", Side::White, &three_moves(), &mut rng)
        .await
        .unwrap();

    assert_eq!(res.action, MoveToken::from_uci("e2e4"));
    assert!(!res.used_fallback());
    let info = &res.attempt;
    assert_eq!(info.attempts_used, 1);
    assert_eq!(info.cleaned_action, Some(MoveToken::from_uci("e2e4")));
    assert_eq!(info.usage(), usage());
    assert_eq!(info.failure_reason, None);
    assert_eq!(info.prompt_input, "prompt");
    assert_eq!(agent.calls(), 1);
}

#[tokio::test]
async fn last_mentioned_move_is_the_one_played() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::repeating(
        "alpha",
        "[e2e4] looks fine but [g1f3] is more flexible",
        usage(),
    );
    let mut rng = StdRng::seed_from_u64(7);

    let res = resolver
        .resolve(&mut agent, "p", Side::White, &three_moves(), &mut rng)
        .await
        .unwrap();
    assert_eq!(res.action, MoveToken::from_uci("g1f3"));
}

#[tokio::test]
async fn illegal_answer_with_single_attempt_falls_back() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::repeating("alpha", "I play [e2e5]", usage());
    let mut rng = StdRng::seed_from_u64(1);
    let legal = three_moves();

    let res = resolver
        .resolve(&mut agent, "p", Side::White, &legal, &mut rng)
        .await
        .unwrap();

    assert!(res.used_fallback());
    assert!(legal.contains(&res.action));
    assert_eq!(agent.calls(), 1);

    let info = &res.attempt;
    assert!(info.is_random_fallback);
    assert_eq!(info.usage(), TokenUsage::default());
    assert_eq!(info.cleaned_action, Some(MoveToken::from_uci("e2e5")));
    assert_eq!(info.llm_raw_output, "I play [e2e5]");
    assert_eq!(info.attempts_used, 1);

    let reason = info.failure_reason.as_deref().unwrap();
    assert!(reason.starts_with("All 1 attempts failed."));
    assert!(reason.contains("[e2e5]"));
    assert!(reason.contains("[e2e4], [d2d4], [g1f3]"));
}

#[tokio::test]
async fn unparseable_answer_records_no_candidate() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::repeating("alpha", "I resign.", usage());
    let mut rng = StdRng::seed_from_u64(1);

    let res = resolver
        .resolve(&mut agent, "p", Side::Black, &three_moves(), &mut rng)
        .await
        .unwrap();

    assert!(res.used_fallback());
    assert_eq!(res.attempt.cleaned_action, None);
    assert!(res.attempt.failure_reason.unwrap().contains("'None'"));
}

#[tokio::test]
async fn fallback_is_reproducible_with_a_seed() {
    let resolver = ActionResolver::default();
    let legal = LegalMoves::from_uci(["a2a3", "b2b3", "c2c3", "d2d3", "e2e3", "f2f3", "g2g3"]);

    let mut picks = Vec::new();
    for _ in 0..2 {
        let mut agent = ScriptedAgent::repeating("alpha", "no idea", usage());
        let mut rng = StdRng::seed_from_u64(42);
        let mut run = Vec::new();
        for _ in 0..5 {
            let res = resolver
                .resolve(&mut agent, "p", Side::White, &legal, &mut rng)
                .await
                .unwrap();
            run.push(res.action);
        }
        picks.push(run);
    }

    assert_eq!(picks[0], picks[1]);
}

#[tokio::test]
async fn transport_error_counts_as_failed_attempt() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::new("alpha", vec![Scripted::Fail("connection reset".into())]);
    let mut rng = StdRng::seed_from_u64(3);
    let legal = three_moves();

    let res = resolver
        .resolve(&mut agent, "p", Side::White, &legal, &mut rng)
        .await
        .unwrap();

    assert!(res.used_fallback());
    assert!(legal.contains(&res.action));
    assert_eq!(res.attempt.llm_raw_output, "");
    let reason = res.attempt.failure_reason.unwrap();
    assert!(reason.contains("connection reset"));
}

#[tokio::test]
async fn second_attempt_can_recover() {
    let resolver = ActionResolver::new(2, RetryStrategy::Resend);
    let mut agent = ScriptedAgent::new(
        "alpha",
        vec![
            Scripted::Reply("[h7h5]".into(), TokenUsage::new(10, 1, 11)),
            Scripted::Reply("[d2d4]".into(), TokenUsage::new(20, 2, 22)),
        ],
    );
    let mut rng = StdRng::seed_from_u64(3);

    let res = resolver
        .resolve(&mut agent, "p", Side::White, &three_moves(), &mut rng)
        .await
        .unwrap();

    assert!(!res.used_fallback());
    assert_eq!(res.action, MoveToken::from_uci("d2d4"));
    assert_eq!(res.attempt.attempts_used, 2);
    // only the accepted attempt's usage is kept
    assert_eq!(res.attempt.usage(), TokenUsage::new(20, 2, 22));
    assert_eq!(agent.prompts(), ["p", "p"]);
}

#[tokio::test]
async fn augment_strategy_extends_the_retry_prompt() {
    let resolver = ActionResolver::new(2, RetryStrategy::augmenting());
    let mut agent = ScriptedAgent::repeating("alpha", "[a7a5]", usage());
    let mut rng = StdRng::seed_from_u64(3);

    let res = resolver
        .resolve(&mut agent, "base prompt", Side::Black, &three_moves(), &mut rng)
        .await
        .unwrap();

    assert!(res.used_fallback());
    assert_eq!(res.attempt.attempts_used, 2);
    let prompts = agent.prompts();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0], "base prompt");
    assert!(prompts[1].starts_with("base prompt\n\nAttempt 1 failed"));
    assert!(prompts[1].contains("acting as Black"));
    assert_eq!(res.attempt.prompt_input, prompts[1]);
    assert!(res.attempt.failure_reason.unwrap().starts_with("All 2 attempts failed."));
}

#[tokio::test]
async fn empty_legal_set_is_an_error() {
    let resolver = ActionResolver::default();
    let mut agent = ScriptedAgent::repeating("alpha", "[e2e4]", usage());
    let mut rng = StdRng::seed_from_u64(3);

    let err = resolver
        .resolve(&mut agent, "p", Side::White, &LegalMoves::default(), &mut rng)
        .await
        .unwrap_err();

    assert!(matches!(err, arena_core::ArenaError::NoLegalMoves(_)));
    assert_eq!(agent.calls(), 0);
}

#[test]
fn retries_below_one_are_clamped() {
    assert_eq!(ActionResolver::new(0, RetryStrategy::Resend).retries(), 1);
    assert_eq!(ActionResolver::default().retries(), DEFAULT_RETRIES);
}
