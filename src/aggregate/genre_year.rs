//! Genre/year playtime rollups with argmax selection.
//!
//! Both selections use a "maximum total, first-seen on tie" policy. The
//! candidate groups are iterated in sorted key order, so the result is
//! reproducible for a fixed input; re-sorting the input can move which
//! tied row comes first, and that is an accepted, documented property of
//! the selection rather than something to be corrected here.

use crate::model::{GenreYearAggregate, InteractionRecord, UserGenreAggregate};
use std::collections::BTreeMap;

/// For each genre, the year with the maximum summed playtime.
///
/// Candidates are the (genre, year) playtime sums; within a genre the
/// first year (ascending) holding the maximum wins ties.
pub fn winning_year_per_genre(records: &[InteractionRecord]) -> Vec<GenreYearAggregate> {
    let mut sums: BTreeMap<(String, i32), u64> = BTreeMap::new();
    for record in records {
        *sums
            .entry((record.genre.clone(), record.release_year))
            .or_insert(0) += record.playtime_forever;
    }

    let mut winners: Vec<GenreYearAggregate> = Vec::new();
    for ((genre, year), total) in sums {
        match winners.last_mut() {
            Some(current) if current.genre == genre => {
                // Strict comparison keeps the first-seen year on ties
                if total > current.total_playtime {
                    current.release_year = year;
                    current.total_playtime = total;
                }
            }
            _ => winners.push(GenreYearAggregate {
                genre,
                release_year: year,
                total_playtime: total,
            }),
        }
    }
    winners
}

/// For each genre, the user with the maximum summed playtime across all
/// years, expanded back into that user's per-year breakdown for the
/// genre. Rows come out ordered by (genre, year).
pub fn winning_user_per_genre(records: &[InteractionRecord]) -> Vec<UserGenreAggregate> {
    let mut user_genre_totals: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut breakdown: BTreeMap<(String, String, i32), u64> = BTreeMap::new();
    for record in records {
        *user_genre_totals
            .entry((record.user_id.clone(), record.genre.clone()))
            .or_insert(0) += record.playtime_forever;
        *breakdown
            .entry((
                record.user_id.clone(),
                record.genre.clone(),
                record.release_year,
            ))
            .or_insert(0) += record.playtime_forever;
    }

    // Winner per genre, first-seen in (user, genre)-sorted order on ties
    let mut winners: BTreeMap<String, (String, u64)> = BTreeMap::new();
    for ((user_id, genre), total) in &user_genre_totals {
        match winners.get_mut(genre) {
            Some((winner, best)) => {
                if *total > *best {
                    *winner = user_id.clone();
                    *best = *total;
                }
            }
            None => {
                winners.insert(genre.clone(), (user_id.clone(), *total));
            }
        }
    }

    let mut rows = Vec::new();
    for (genre, (user_id, _)) in winners {
        let from = (user_id.clone(), genre.clone(), i32::MIN);
        let to = (user_id.clone(), genre.clone(), i32::MAX);
        for ((_, _, year), total) in breakdown.range(from..=to) {
            rows.push(UserGenreAggregate {
                user_id: user_id.clone(),
                genre: genre.clone(),
                release_year: *year,
                total_playtime: *total,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user: &str, genre: &str, year: i32, playtime: u64) -> InteractionRecord {
        InteractionRecord {
            user_id: user.to_string(),
            item_id: 1,
            playtime_forever: playtime,
            genre: genre.to_string(),
            release_year: year,
        }
    }

    #[test]
    fn picks_the_year_with_maximum_summed_playtime() {
        let records = vec![
            record("u1", "Action", 2012, 300),
            record("u2", "Action", 2012, 200),
            record("u1", "Action", 2015, 800),
        ];
        let winners = winning_year_per_genre(&records);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].genre, "Action");
        assert_eq!(winners[0].release_year, 2015);
        assert_eq!(winners[0].total_playtime, 800);
    }

    #[test]
    fn tie_keeps_the_first_year_in_sorted_order() {
        let records = vec![
            record("u1", "Indie", 2014, 500),
            record("u1", "Indie", 2010, 500),
        ];
        let winners = winning_year_per_genre(&records);
        assert_eq!(winners[0].release_year, 2010);
    }

    #[test]
    fn one_winner_per_genre() {
        let records = vec![
            record("u1", "Action", 2012, 100),
            record("u1", "Indie", 2013, 50),
            record("u2", "Strategy", 2014, 75),
        ];
        let winners = winning_year_per_genre(&records);
        let genres: Vec<&str> = winners.iter().map(|w| w.genre.as_str()).collect();
        assert_eq!(genres, vec!["Action", "Indie", "Strategy"]);
    }

    #[test]
    fn winning_user_expands_to_per_year_breakdown() {
        let records = vec![
            record("heavy", "Action", 2012, 400),
            record("heavy", "Action", 2015, 700),
            record("light", "Action", 2015, 900),
        ];
        // heavy: 1100 total beats light: 900
        let rows = winning_user_per_genre(&records);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.user_id == "heavy"));
        assert_eq!(rows[0].release_year, 2012);
        assert_eq!(rows[0].total_playtime, 400);
        assert_eq!(rows[1].release_year, 2015);
        assert_eq!(rows[1].total_playtime, 700);
    }

    #[test]
    fn winning_user_tie_keeps_first_sorted_user() {
        let records = vec![
            record("zed", "Action", 2012, 500),
            record("amy", "Action", 2013, 500),
        ];
        let rows = winning_user_per_genre(&records);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "amy");
    }
}
