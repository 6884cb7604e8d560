use super::{QueueCandidate, Reconciliation};
use cp_tracker_libs::leetcode::model::Submission;
use std::collections::{BTreeSet, HashSet};

/// Decides queue changes from one batch of recent submissions.
///
/// The solved set is built first so a later failed attempt never re-queues a slug
/// that the same batch shows accepted.
pub fn plan_queue(submissions: &[Submission], queued: &HashSet<String>) -> Reconciliation {
    let solved: BTreeSet<&str> = submissions
        .iter()
        .filter(|submission| submission.is_accepted())
        .map(|submission| submission.title_slug.as_str())
        .collect();

    let mut planned: HashSet<&str> = HashSet::new();
    let to_add = submissions
        .iter()
        .filter(|submission| !solved.contains(submission.title_slug.as_str()))
        .filter(|submission| !queued.contains(&submission.title_slug))
        .filter(|submission| planned.insert(submission.title_slug.as_str()))
        .map(|submission| QueueCandidate {
            problem_id: submission.title_slug.clone(),
            title: submission.title.clone(),
            url: submission.url(),
            difficulty: 0,
        })
        .collect();

    Reconciliation {
        to_add,
        to_remove: solved.into_iter().map(String::from).collect(),
    }
}
