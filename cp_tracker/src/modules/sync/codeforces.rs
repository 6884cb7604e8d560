use super::{policy::DivisionPolicy, QueueCandidate, Reconciliation};
use crate::types::profile::{LastContest, MissedContest};
use cp_tracker_libs::codeforces::model::{Contest, Problem, RatingChange, Submission};
use std::collections::{BTreeSet, HashMap, HashSet};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// The `n` most recent rated contests, newest first.
pub fn recent_window(history: &[RatingChange], n: usize) -> Vec<&RatingChange> {
    history.iter().rev().take(n).collect()
}

/// Keys (`1900C`) of every problem with an accepted submission.
pub fn solved_keys(submissions: &[Submission]) -> HashSet<String> {
    submissions
        .iter()
        .filter(|submission| submission.is_accepted())
        .filter_map(|submission| submission.problem.key())
        .collect()
}

/// Standard rounds finished within the last `days` days that the user never entered, newest first.
///
/// Participation is checked against the whole rating history, not only the recent window.
pub fn missed_contests(
    history: &[RatingChange],
    contests: &[Contest],
    now: i64,
    days: i64,
) -> Vec<MissedContest> {
    let participated: HashSet<i64> = history.iter().map(|change| change.contest_id).collect();
    let since = now - days * SECONDS_PER_DAY;

    let mut missed: Vec<MissedContest> = contests
        .iter()
        .filter(|contest| contest.is_finished())
        .filter(|contest| !participated.contains(&contest.id))
        .filter(|contest| super::policy::is_standard_round(&contest.name))
        .filter_map(|contest| {
            let start = contest.start_time_seconds?;
            if since <= start && start <= now {
                Some(MissedContest {
                    id: contest.id,
                    name: contest.name.clone(),
                    start_time: start,
                })
            } else {
                None
            }
        })
        .collect();
    missed.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    missed
}

pub fn last_contest(history: &[RatingChange]) -> Option<LastContest> {
    history.last().map(|change| LastContest {
        contest_id: change.contest_id,
        contest_name: change.contest_name.clone(),
        time_seconds: change.rating_update_time_seconds,
    })
}

/// Decides queue changes for the recent contests.
///
/// Every solved problem seen in the window or already queued is removed. Unsolved
/// problems the division policy selects are added unless queued.
pub fn plan_queue(
    window: &[&RatingChange],
    problems: &HashMap<i64, Vec<Problem>>,
    solved: &HashSet<String>,
    queued: &HashSet<String>,
    policy: &DivisionPolicy,
) -> Reconciliation {
    let mut to_remove: BTreeSet<String> = queued.intersection(solved).cloned().collect();
    let mut to_add: Vec<QueueCandidate> = Vec::new();
    let mut planned: HashSet<String> = HashSet::new();

    for contest in window.iter() {
        let contest_problems = match problems.get(&contest.contest_id) {
            Some(contest_problems) => contest_problems,
            None => continue,
        };

        for problem in contest_problems.iter() {
            let (key, url) = match (problem.key(), problem.url()) {
                (Some(key), Some(url)) => (key, url),
                _ => continue,
            };

            if solved.contains(&key) {
                to_remove.insert(key);
                continue;
            }
            if !policy.includes(&contest.contest_name, &problem.index) {
                continue;
            }
            if queued.contains(&key) || !planned.insert(key.clone()) {
                continue;
            }

            to_add.push(QueueCandidate {
                problem_id: key,
                title: problem.name.clone(),
                url,
                difficulty: problem.rating.unwrap_or(0),
            });
        }
    }

    Reconciliation {
        to_add,
        to_remove: to_remove.into_iter().collect(),
    }
}
