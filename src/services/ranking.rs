//! Leaderboard derivation from the roster.

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{dto::game::LeaderboardEntry, state::game::Player};

/// One entry of a derived ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPlayer {
    /// 1-based leaderboard position.
    pub rank: u32,
    /// The ranked player.
    pub player_id: Uuid,
    /// Display name at ranking time.
    pub name: String,
    /// Score backing the rank.
    pub score: u32,
}

/// Order the roster by score, best first.
///
/// Ties are not specially resolved: the sort is stable, so players with
/// equal scores keep their roster join order and still receive distinct
/// sequential ranks. This mirrors how results were always presented and is
/// intentionally kept, not fixed.
pub fn rank(roster: &IndexMap<Uuid, Player>) -> Vec<RankedPlayer> {
    let mut entries: Vec<(&Uuid, &Player)> = roster.iter().collect();
    entries.sort_by(|a, b| b.1.score.cmp(&a.1.score));

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (id, player))| RankedPlayer {
            rank: index as u32 + 1,
            player_id: *id,
            name: player.name.clone(),
            score: player.score,
        })
        .collect()
}

impl From<&RankedPlayer> for LeaderboardEntry {
    fn from(ranked: &RankedPlayer) -> Self {
        Self {
            rank: ranked.rank,
            player_id: ranked.player_id,
            name: ranked.name.clone(),
            score: ranked.score,
        }
    }
}

/// Rank of a single player within a derived ranking.
pub fn rank_of(ranking: &[RankedPlayer], player_id: &Uuid) -> Option<u32> {
    ranking
        .iter()
        .find(|entry| entry.player_id == *player_id)
        .map(|entry| entry.rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, score: u32) -> Player {
        Player {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: "🦊".into(),
            theme: "indigo".into(),
            joined_at_ms: 0,
            score,
            streak: 0,
            coins: 200,
        }
    }

    fn roster_of(players: Vec<Player>) -> IndexMap<Uuid, Player> {
        players.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn ranks_are_ordered_by_score_descending() {
        let roster = roster_of(vec![
            player("low", 100),
            player("high", 900),
            player("mid", 400),
        ]);

        let ranking = rank(&roster);
        let names: Vec<&str> = ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[2].rank, 3);
    }

    #[test]
    fn ties_keep_join_order_and_distinct_ranks() {
        // Scores [300, 500, 500] in join order: the two 500s stay in join
        // order and get ranks 1 and 2; the 300 player is rank 3.
        let roster = roster_of(vec![
            player("alice", 300),
            player("bob", 500),
            player("carol", 500),
        ]);

        let ranking = rank(&roster);
        let by_name = |name: &str| ranking.iter().find(|r| r.name == name).unwrap().rank;
        assert_eq!(by_name("alice"), 3);
        assert_eq!(by_name("bob"), 1);
        assert_eq!(by_name("carol"), 2);
    }

    #[test]
    fn rank_of_finds_individual_players() {
        let roster = roster_of(vec![player("a", 10), player("b", 20)]);
        let ranking = rank(&roster);
        let b_id = *roster.keys().nth(1).unwrap();
        assert_eq!(rank_of(&ranking, &b_id), Some(1));
        assert_eq!(rank_of(&ranking, &Uuid::new_v4()), None);
    }

    #[test]
    fn empty_roster_yields_an_empty_ranking() {
        assert!(rank(&IndexMap::new()).is_empty());
    }
}
