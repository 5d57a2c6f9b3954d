//! Grading of a frozen vote snapshot at reveal time.
//!
//! The functions here are pure: they read the question, the votes and the
//! roster, and return per-player deltas. Applying the deltas to the roster
//! is the session owner's job, so grading can be tested in isolation.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::wire::{Badge, RoundStats},
    state::{
        game::{Player, Vote},
        quiz::{Question, QuestionKind},
    },
};

/// Points awarded for a correct answer before any bonus.
pub const BASE_POINTS: f64 = 500.0;
/// Maximum extra points for answering instantly.
pub const MAX_SPEED_BONUS: f64 = 500.0;
/// Full-score scale for slider accuracy grading.
pub const SLIDER_SCALE: f64 = 1000.0;
/// Accuracy above which a slider vote counts as correct.
pub const SLIDER_CORRECT_THRESHOLD: f64 = 0.95;
/// Points per streak level.
const STREAK_BONUS_STEP: u32 = 100;
/// Streak level past which the bonus stops growing.
const STREAK_BONUS_CAP: u32 = 5;
/// Post-round streak required for the on-fire badge.
const ON_FIRE_STREAK: u32 = 3;
/// Smallest slider range used for accuracy. A degenerate question with
/// `max == min` would otherwise divide by zero.
const MIN_SLIDER_RANGE: f64 = 1.0;

/// Grading outcome for a single roster player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerOutcome {
    /// The graded player.
    pub player_id: Uuid,
    /// Whether a vote was recorded for this round.
    pub voted: bool,
    /// Whether the answer counts as correct.
    pub is_correct: bool,
    /// Score delta, streak bonus included.
    pub earned_points: u32,
    /// Streak value after this round.
    pub new_streak: u32,
    /// Coin delta for this round.
    pub coins_earned: u32,
    /// Informational badges awarded for this round.
    pub badges: Vec<Badge>,
}

/// Full grading result for one round.
#[derive(Debug, Clone)]
pub struct RoundGrading {
    /// Per-player outcomes in roster order.
    pub outcomes: Vec<PlayerOutcome>,
    /// Aggregated statistics for the round.
    pub stats: RoundStats,
}

/// Grade a round from its frozen vote snapshot.
///
/// Every roster player receives an outcome; players without a vote are
/// graded as incorrect with no answer. Ungraded question kinds (polls,
/// word clouds) leave score, streak and coins untouched.
pub fn grade(
    question: &Question,
    started_at_ms: u64,
    votes: &HashMap<Uuid, Vote>,
    roster: &IndexMap<Uuid, Player>,
    config: &AppConfig,
) -> RoundGrading {
    let graded = question.kind.is_graded();
    let fastest_correct = graded.then(|| fastest_correct_voter(question, votes, roster)).flatten();

    let mut outcomes = Vec::with_capacity(roster.len());
    let mut correct_count = 0u32;
    let mut distribution: BTreeMap<String, u32> = BTreeMap::new();
    let mut numeric_sum = 0.0f64;
    let mut numeric_count = 0u32;

    for (id, player) in roster {
        let vote = votes.get(id);

        if let Some(vote) = vote {
            *distribution.entry(vote.answer.as_text()).or_insert(0) += 1;
            if let Some(value) = vote.answer.as_number() {
                numeric_sum += value;
                numeric_count += 1;
            }
        }

        if !graded {
            outcomes.push(PlayerOutcome {
                player_id: *id,
                voted: vote.is_some(),
                is_correct: false,
                earned_points: 0,
                new_streak: player.streak,
                coins_earned: 0,
                badges: Vec::new(),
            });
            continue;
        }

        let (is_correct, raw_points) = match vote {
            Some(vote) => judge(question, vote, started_at_ms),
            None => (false, 0),
        };

        if is_correct {
            correct_count += 1;
        }

        let new_streak = if is_correct { player.streak + 1 } else { 0 };
        let streak_bonus = if is_correct {
            new_streak.min(STREAK_BONUS_CAP) * STREAK_BONUS_STEP
        } else {
            0
        };

        let mut badges = Vec::new();
        if fastest_correct == Some(*id) {
            badges.push(Badge::SpeedDemon);
        }
        if new_streak >= ON_FIRE_STREAK {
            badges.push(Badge::OnFire);
        }

        outcomes.push(PlayerOutcome {
            player_id: *id,
            voted: vote.is_some(),
            is_correct,
            earned_points: raw_points + streak_bonus,
            new_streak,
            coins_earned: if is_correct {
                config.correct_answer_coins
            } else {
                config.participation_coins
            },
            badges,
        });
    }

    let average_value = (matches!(question.kind, QuestionKind::Slider { .. })
        && numeric_count > 0)
        .then(|| numeric_sum / f64::from(numeric_count));

    RoundGrading {
        outcomes,
        stats: RoundStats {
            total_players: roster.len() as u32,
            correct_count,
            vote_distribution: distribution,
            average_value,
        },
    }
}

/// Extra points for a correct answer, linear in how early it arrived within
/// the time limit.
pub fn speed_bonus(elapsed_ms: u64, time_limit_secs: u64) -> f64 {
    let limit_ms = (time_limit_secs.max(1) * 1000) as f64;
    (MAX_SPEED_BONUS * (1.0 - elapsed_ms as f64 / limit_ms)).max(0.0)
}

/// Continuous accuracy of a slider guess in `[0, 1]`.
pub fn slider_accuracy(value: f64, min: f64, max: f64, correct_value: f64) -> f64 {
    let range = (max - min).max(MIN_SLIDER_RANGE);
    (1.0 - (value - correct_value).abs() / range).max(0.0)
}

/// Correctness and pre-streak points for a single vote.
fn judge(question: &Question, vote: &Vote, started_at_ms: u64) -> (bool, u32) {
    match &question.kind {
        QuestionKind::MultipleChoice {
            correct_option_id, ..
        }
        | QuestionKind::TrueFalse {
            correct_option_id, ..
        } => {
            let is_correct = vote.answer.as_text() == *correct_option_id;
            (is_correct, timed_points(is_correct, vote, started_at_ms, question))
        }
        QuestionKind::OpenEnded { correct_answer } => {
            let is_correct = normalized(&vote.answer.as_text()) == normalized(correct_answer);
            (is_correct, timed_points(is_correct, vote, started_at_ms, question))
        }
        QuestionKind::Slider {
            min,
            max,
            correct_value,
            ..
        } => match vote.answer.as_number() {
            // Unparseable slider input grades as incorrect rather than failing.
            None => (false, 0),
            Some(value) => {
                let accuracy = slider_accuracy(value, *min, *max, *correct_value);
                (
                    accuracy > SLIDER_CORRECT_THRESHOLD,
                    (accuracy * SLIDER_SCALE).round() as u32,
                )
            }
        },
        QuestionKind::Poll { .. } | QuestionKind::WordCloud => (false, 0),
    }
}

fn timed_points(is_correct: bool, vote: &Vote, started_at_ms: u64, question: &Question) -> u32 {
    if !is_correct {
        return 0;
    }
    let elapsed_ms = vote.timestamp_ms.saturating_sub(started_at_ms);
    (BASE_POINTS + speed_bonus(elapsed_ms, question.time_limit_secs)).round() as u32
}

fn normalized(text: &str) -> String {
    text.trim().to_lowercase()
}

/// The single correct voter with the earliest timestamp, if any. Exact
/// timestamp ties go to the earlier roster entry.
fn fastest_correct_voter(
    question: &Question,
    votes: &HashMap<Uuid, Vote>,
    roster: &IndexMap<Uuid, Player>,
) -> Option<Uuid> {
    let mut fastest: Option<(Uuid, u64)> = None;
    for id in roster.keys() {
        let Some(vote) = votes.get(id) else { continue };
        let (is_correct, _) = judge(question, vote, 0);
        if is_correct && fastest.is_none_or(|(_, best)| vote.timestamp_ms < best) {
            fastest = Some((*id, vote.timestamp_ms));
        }
    }
    fastest.map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        game::AnswerValue,
        quiz::{AnswerOption, OptionColor},
    };

    fn config() -> AppConfig {
        AppConfig::default()
    }

    fn mc_question(time_limit_secs: u64) -> Question {
        Question {
            id: 0,
            text: "Pick one".into(),
            time_limit_secs,
            kind: QuestionKind::MultipleChoice {
                options: vec![
                    AnswerOption {
                        id: "opt1".into(),
                        color: OptionColor::Red,
                        text: "Right".into(),
                    },
                    AnswerOption {
                        id: "opt2".into(),
                        color: OptionColor::Blue,
                        text: "Wrong".into(),
                    },
                ],
                correct_option_id: "opt1".into(),
            },
        }
    }

    fn slider_question(min: f64, max: f64, correct_value: f64) -> Question {
        Question {
            id: 1,
            text: "Guess".into(),
            time_limit_secs: 20,
            kind: QuestionKind::Slider {
                min,
                max,
                step: 1.0,
                correct_value,
            },
        }
    }

    fn player(id: Uuid, streak: u32) -> Player {
        Player {
            id,
            name: format!("p-{id}"),
            avatar: "🦊".into(),
            theme: "indigo".into(),
            joined_at_ms: 0,
            score: 0,
            streak,
            coins: 200,
        }
    }

    fn roster_of(players: Vec<Player>) -> IndexMap<Uuid, Player> {
        players.into_iter().map(|p| (p.id, p)).collect()
    }

    fn vote(answer: AnswerValue, timestamp_ms: u64) -> Vote {
        Vote {
            answer,
            timestamp_ms,
        }
    }

    #[test]
    fn instant_correct_vote_earns_full_speed_bonus() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("opt1".into()), 0))]);

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(outcome.is_correct);
        // 500 base + 500 speed, then 100 for the fresh streak.
        assert_eq!(outcome.earned_points, 1100);
    }

    #[test]
    fn vote_at_the_limit_earns_no_speed_bonus() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("opt1".into()), 20_000))]);

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        assert_eq!(grading.outcomes[0].earned_points, 500 + 100);
    }

    #[test]
    fn vote_after_the_limit_never_goes_negative() {
        assert_eq!(speed_bonus(30_000, 20), 0.0);
        assert_eq!(speed_bonus(0, 20), 500.0);
        assert_eq!(speed_bonus(2_000, 20), 450.0);
    }

    #[test]
    fn scenario_one_player_mc_round() {
        // One player, MC with opt1 correct, vote after 2 s of a 20 s round:
        // 500 + 450 speed = 950, streak 0 → 1, streak bonus 100, coins +50.
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("opt1".into()), 12_000))]);

        let grading = grade(&mc_question(20), 10_000, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(outcome.is_correct);
        assert_eq!(outcome.earned_points, 1050);
        assert_eq!(outcome.new_streak, 1);
        assert_eq!(outcome.coins_earned, 50);
    }

    #[test]
    fn missing_vote_resets_streak_and_pays_participation_coins() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 4)]);
        let votes = HashMap::new();

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(!outcome.voted);
        assert!(!outcome.is_correct);
        assert_eq!(outcome.earned_points, 0);
        assert_eq!(outcome.new_streak, 0);
        assert_eq!(outcome.coins_earned, 10);
    }

    #[test]
    fn open_ended_matching_ignores_case_and_whitespace() {
        let question = Question {
            id: 0,
            text: "Capital of France?".into(),
            time_limit_secs: 20,
            kind: QuestionKind::OpenEnded {
                correct_answer: "Paris".into(),
            },
        };
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("  pArIs ".into()), 20_000))]);

        let grading = grade(&question, 0, &votes, &roster, &config());
        assert!(grading.outcomes[0].is_correct);
    }

    #[test]
    fn slider_points_scale_with_accuracy_and_ignore_the_badge() {
        // min 0, max 100, target 50, vote 60: diff 10, accuracy 0.9 → 900
        // points even though the vote does not count as correct.
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Number(60.0), 1_000))]);

        let grading = grade(&slider_question(0.0, 100.0, 50.0), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(!outcome.is_correct);
        assert_eq!(outcome.earned_points, 900);
        assert_eq!(outcome.new_streak, 0);
        assert_eq!(outcome.coins_earned, 10);
    }

    #[test]
    fn slider_extremes_hit_the_scale_bounds() {
        assert_eq!(slider_accuracy(50.0, 0.0, 100.0, 50.0), 1.0);
        assert_eq!(slider_accuracy(100.0, 0.0, 100.0, 0.0), 0.0);
    }

    #[test]
    fn slider_accuracy_decreases_with_distance() {
        let mut last = f64::INFINITY;
        for guess in [50.0, 55.0, 70.0, 90.0, 100.0] {
            let accuracy = slider_accuracy(guess, 0.0, 100.0, 50.0);
            assert!(accuracy < last || (accuracy == last && guess == 50.0));
            last = accuracy;
        }
    }

    #[test]
    fn degenerate_slider_range_is_clamped_not_divided() {
        // max == min would divide by zero; the range clamps to 1 so an exact
        // guess still scores full marks.
        assert_eq!(slider_accuracy(50.0, 50.0, 50.0, 50.0), 1.0);
        assert_eq!(slider_accuracy(51.0, 50.0, 50.0, 50.0), 0.0);
    }

    #[test]
    fn exact_slider_guess_is_correct_and_extends_the_streak() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 1)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Number(50.0), 1_000))]);

        let grading = grade(&slider_question(0.0, 100.0, 50.0), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(outcome.is_correct);
        // 1000 accuracy points + 200 streak bonus at streak 2.
        assert_eq!(outcome.earned_points, 1200);
        assert_eq!(outcome.new_streak, 2);
    }

    #[test]
    fn unparseable_slider_vote_grades_as_incorrect() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 3)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("banana".into()), 1_000))]);

        let grading = grade(&slider_question(0.0, 100.0, 50.0), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert!(!outcome.is_correct);
        assert_eq!(outcome.earned_points, 0);
        assert_eq!(outcome.new_streak, 0);
    }

    #[test]
    fn numeric_votes_match_option_ids_after_coercion() {
        let mut question = mc_question(20);
        if let QuestionKind::MultipleChoice {
            correct_option_id, ..
        } = &mut question.kind
        {
            *correct_option_id = "2".into();
        }
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 0)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Number(2.0), 20_000))]);

        let grading = grade(&question, 0, &votes, &roster, &config());
        assert!(grading.outcomes[0].is_correct);
    }

    #[test]
    fn streak_bonus_caps_at_five_levels() {
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 9)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("opt1".into()), 20_000))]);

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert_eq!(outcome.new_streak, 10);
        // 500 base + capped 500 streak bonus.
        assert_eq!(outcome.earned_points, 1000);
    }

    #[test]
    fn polls_leave_streak_coins_and_score_untouched() {
        let question = Question {
            id: 0,
            text: "Favourite?".into(),
            time_limit_secs: 20,
            kind: QuestionKind::Poll {
                options: vec![
                    AnswerOption {
                        id: "a".into(),
                        color: OptionColor::Red,
                        text: "A".into(),
                    },
                    AnswerOption {
                        id: "b".into(),
                        color: OptionColor::Blue,
                        text: "B".into(),
                    },
                ],
            },
        };
        let id = Uuid::new_v4();
        let roster = roster_of(vec![player(id, 2)]);
        let votes = HashMap::from([(id, vote(AnswerValue::Text("a".into()), 1_000))]);

        let grading = grade(&question, 0, &votes, &roster, &config());
        let outcome = &grading.outcomes[0];
        assert_eq!(outcome.earned_points, 0);
        assert_eq!(outcome.new_streak, 2);
        assert_eq!(outcome.coins_earned, 0);
        assert_eq!(grading.stats.vote_distribution["a"], 1);
    }

    #[test]
    fn speed_demon_goes_to_the_single_earliest_correct_voter() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let wrong = Uuid::new_v4();
        let roster = roster_of(vec![player(first, 0), player(second, 0), player(wrong, 0)]);
        let votes = HashMap::from([
            (first, vote(AnswerValue::Text("opt1".into()), 2_000)),
            (second, vote(AnswerValue::Text("opt1".into()), 3_000)),
            // The earliest vote overall is wrong and must not win the badge.
            (wrong, vote(AnswerValue::Text("opt2".into()), 1_000)),
        ]);

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        let by_id = |id: Uuid| {
            grading
                .outcomes
                .iter()
                .find(|o| o.player_id == id)
                .unwrap()
        };
        assert!(by_id(first).badges.contains(&Badge::SpeedDemon));
        assert!(!by_id(second).badges.contains(&Badge::SpeedDemon));
        assert!(!by_id(wrong).badges.contains(&Badge::SpeedDemon));
    }

    #[test]
    fn on_fire_can_be_awarded_to_several_players() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let roster = roster_of(vec![player(a, 2), player(b, 5)]);
        let votes = HashMap::from([
            (a, vote(AnswerValue::Text("opt1".into()), 2_000)),
            (b, vote(AnswerValue::Text("opt1".into()), 3_000)),
        ]);

        let grading = grade(&mc_question(20), 0, &votes, &roster, &config());
        assert!(grading.outcomes.iter().all(|o| o.badges.contains(&Badge::OnFire)));
    }

    #[test]
    fn round_stats_aggregate_votes_and_slider_average() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let roster = roster_of(vec![player(a, 0), player(b, 0), player(c, 0)]);
        let votes = HashMap::from([
            (a, vote(AnswerValue::Number(40.0), 1_000)),
            (b, vote(AnswerValue::Number(60.0), 2_000)),
        ]);

        let grading = grade(&slider_question(0.0, 100.0, 50.0), 0, &votes, &roster, &config());
        assert_eq!(grading.stats.total_players, 3);
        assert_eq!(grading.stats.average_value, Some(50.0));
        assert_eq!(grading.stats.vote_distribution.len(), 2);
    }
}
