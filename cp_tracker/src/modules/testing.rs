//! In-memory repositories and platform fakes for unit and router tests.

use crate::{
    config::{AppConfig, DatabaseConfig, JwtConfig, PlatformConfig},
    modules::{
        auth::jwt,
        repository::{
            ProblemQuery, ProblemRepository, ProblemSort, Result, StoreError, TopicRepository,
            UpsolveRepository, UserRepository,
        },
        state::AppState,
        sync::SyncSettings,
    },
    types::{
        profile::{CodeforcesStats, LastContest, LeetCodeStats, MissedContest},
        tables::{NewProblem, NewTopic, NewUpsolve, NewUser, Problem, ProfileUpdate, Topic, UpsolveEntry, User},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use cp_tracker_libs::{
    codeforces::{
        model::{Contest, Problem as CodeforcesProblem, RatingChange, Submission, UserInfo},
        CodeforcesApi,
    },
    leetcode::{model::Submission as LeetCodeSubmission, LeetCodeApi},
    FetchError, Platform,
};
use sqlx::types::Json;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

fn unavailable() -> FetchError {
    FetchError::StatusError(503)
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn add_user(&self, username: &str, codeforces: &str, leetcode: &str) -> User {
        let mut users = self.users.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: String::new(),
            name: String::new(),
            bio: String::new(),
            codeforces_handle: codeforces.to_string(),
            leetcode_handle: leetcode.to_string(),
            codechef_handle: String::new(),
            codeforces_stats: None,
            leetcode_stats: None,
            last_contest: None,
            missed_contests: Json(vec![]),
            role: String::from("user"),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        user
    }

    pub fn get(&self, id: i64) -> User {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .unwrap()
    }

    pub fn update(&self, id: i64, f: impl FnOnce(&mut User)) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|user| user.id == id) {
            f(user);
        }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create(&self, new_user: &NewUser) -> Result<User> {
        let taken = self.users.lock().unwrap().iter().any(|user| {
            user.username == new_user.username || user.email.eq_ignore_ascii_case(&new_user.email)
        });
        if taken {
            return Err(StoreError::Conflict(String::from("user")));
        }

        let user = self.add_user(&new_user.username, "", "");
        self.update(user.id, |user| {
            user.email = new_user.email.clone();
            user.password_hash = new_user.password_hash.clone();
        });
        Ok(self.get(user.id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_linked(&self) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|user| {
                user.handle(Platform::Codeforces).is_some() || user.handle(Platform::LeetCode).is_some()
            })
            .cloned()
            .collect())
    }

    async fn update_profile(&self, id: i64, update: &ProfileUpdate) -> Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let user = match users.iter_mut().find(|user| user.id == id) {
            Some(user) => user,
            None => return Ok(None),
        };
        if let Some(value) = &update.codeforces {
            user.codeforces_handle = value.clone();
        }
        if let Some(value) = &update.leetcode {
            user.leetcode_handle = value.clone();
        }
        if let Some(value) = &update.codechef {
            user.codechef_handle = value.clone();
        }
        if let Some(value) = &update.name {
            user.name = value.clone();
        }
        if let Some(value) = &update.bio {
            user.bio = value.clone();
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn save_codeforces_stats(&self, id: i64, stats: &CodeforcesStats) -> Result<()> {
        self.update(id, |user| user.codeforces_stats = Some(Json(stats.clone())));
        Ok(())
    }

    async fn save_leetcode_stats(&self, id: i64, stats: &LeetCodeStats) -> Result<()> {
        self.update(id, |user| user.leetcode_stats = Some(Json(stats.clone())));
        Ok(())
    }

    async fn save_contest_snapshot(
        &self,
        id: i64,
        last_contest: Option<&LastContest>,
        missed_contests: &[MissedContest],
    ) -> Result<()> {
        self.update(id, |user| {
            if let Some(contest) = last_contest {
                user.last_contest = Some(Json(contest.clone()));
            }
            user.missed_contests = Json(missed_contests.to_vec());
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUpsolveRepository {
    entries: Mutex<Vec<UpsolveEntry>>,
    next_id: AtomicI64,
    broken_users: Mutex<HashSet<i64>>,
}

impl MemoryUpsolveRepository {
    /// Every queue read of this user fails as if the database were down.
    pub fn break_for(&self, user_id: i64) {
        self.broken_users.lock().unwrap().insert(user_id);
    }

    /// Snapshot ordered by id.
    pub fn entries(&self) -> Vec<UpsolveEntry> {
        let mut entries = self.entries.lock().unwrap().clone();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}

#[async_trait]
impl UpsolveRepository for MemoryUpsolveRepository {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<UpsolveEntry>> {
        let mut entries: Vec<UpsolveEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.added_at.cmp(&a.added_at).then(b.id.cmp(&a.id)));
        Ok(entries)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UpsolveEntry>> {
        Ok(self.entries.lock().unwrap().iter().find(|entry| entry.id == id).cloned())
    }

    async fn create(&self, new_entry: &NewUpsolve) -> Result<Option<UpsolveEntry>> {
        let mut entries = self.entries.lock().unwrap();
        let exists = entries.iter().any(|entry| {
            entry.user_id == new_entry.user_id
                && entry.platform == new_entry.platform.as_str()
                && entry.problem_id == new_entry.problem_id
        });
        if exists {
            return Ok(None);
        }

        let entry = UpsolveEntry {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            user_id: new_entry.user_id,
            platform: new_entry.platform.to_string(),
            problem_id: new_entry.problem_id.clone(),
            title: new_entry.title.clone(),
            url: new_entry.url.clone(),
            difficulty: new_entry.difficulty,
            added_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(Some(entry))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        Ok(entries.len() < before)
    }

    async fn delete_by_key(
        &self,
        user_id: i64,
        platform: Platform,
        problem_id: &str,
    ) -> Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|entry| {
            !(entry.user_id == user_id
                && entry.platform == platform.as_str()
                && entry.problem_id == problem_id)
        });
        Ok(entries.len() < before)
    }

    async fn problem_ids(&self, user_id: i64, platform: Platform) -> Result<HashSet<String>> {
        if self.broken_users.lock().unwrap().contains(&user_id) {
            return Err(StoreError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.platform == platform.as_str())
            .map(|entry| entry.problem_id.clone())
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryProblemRepository {
    problems: Mutex<Vec<Problem>>,
}

#[async_trait]
impl ProblemRepository for MemoryProblemRepository {
    async fn search(&self, query: &ProblemQuery) -> Result<(i64, Vec<Problem>)> {
        let keyword = query.keyword.as_ref().map(|keyword| keyword.trim().to_lowercase());
        let mut hits: Vec<Problem> = self
            .problems
            .lock()
            .unwrap()
            .iter()
            .filter(|problem| match &keyword {
                Some(keyword) => {
                    problem.title.to_lowercase().contains(keyword)
                        || problem.problem_id.to_lowercase().contains(keyword)
                }
                None => true,
            })
            .filter(|problem| query.platforms.is_empty() || query.platforms.contains(&problem.platform))
            .filter(|problem| query.tags.is_empty() || problem.tags.iter().any(|tag| query.tags.contains(tag)))
            .filter(|problem| match (query.difficulty_from, problem.difficulty) {
                (Some(from), Some(difficulty)) => from <= difficulty,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter(|problem| match (query.difficulty_to, problem.difficulty) {
                (Some(to), Some(difficulty)) => difficulty < to,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .cloned()
            .collect();

        match query.sort {
            ProblemSort::Platform => hits.sort_by(|a, b| {
                (a.platform.as_str(), a.problem_id.as_str()).cmp(&(b.platform.as_str(), b.problem_id.as_str()))
            }),
            ProblemSort::DifficultyAsc => hits.sort_by_key(|problem| problem.difficulty.unwrap_or(i32::MAX)),
            ProblemSort::DifficultyDesc => {
                hits.sort_by_key(|problem| std::cmp::Reverse(problem.difficulty.unwrap_or(i32::MIN)))
            }
            ProblemSort::TitleAsc => hits.sort_by(|a, b| a.title.cmp(&b.title)),
            ProblemSort::TitleDesc => hits.sort_by(|a, b| b.title.cmp(&a.title)),
        }

        let total = hits.len() as i64;
        let page = hits
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((total, page))
    }

    async fn upsert_many(&self, new_problems: &[NewProblem]) -> Result<usize> {
        let mut problems = self.problems.lock().unwrap();
        for new_problem in new_problems.iter() {
            let platform = new_problem.platform.to_string();
            problems.retain(|problem| {
                !(problem.platform == platform && problem.problem_id == new_problem.problem_id)
            });
            let id = problems.len() as i64 + 1;
            problems.push(Problem {
                id,
                platform,
                problem_id: new_problem.problem_id.clone(),
                title: new_problem.title.clone(),
                url: new_problem.url.clone(),
                difficulty: new_problem.difficulty,
                tags: new_problem.tags.clone(),
                acceptance_rate: new_problem.acceptance_rate,
            });
        }
        Ok(new_problems.len())
    }
}

#[derive(Default)]
pub struct MemoryTopicRepository {
    topics: Mutex<Vec<Topic>>,
}

fn tier_rank(tier: &str) -> usize {
    ["Bronze", "Silver", "Gold", "Platinum"]
        .iter()
        .position(|t| *t == tier)
        .unwrap_or(usize::MAX)
}

#[async_trait]
impl TopicRepository for MemoryTopicRepository {
    async fn list(&self) -> Result<Vec<Topic>> {
        let mut topics = self.topics.lock().unwrap().clone();
        topics.sort_by(|a, b| {
            tier_rank(&a.tier)
                .cmp(&tier_rank(&b.tier))
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(topics)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Topic>> {
        Ok(self.topics.lock().unwrap().iter().find(|topic| topic.slug == slug).cloned())
    }

    async fn upsert_many(&self, new_topics: &[NewTopic]) -> Result<usize> {
        let mut topics = self.topics.lock().unwrap();
        for new_topic in new_topics.iter() {
            topics.retain(|topic| topic.slug != new_topic.slug);
            let id = topics.len() as i64 + 1;
            topics.push(Topic {
                id,
                slug: new_topic.slug.clone(),
                title: new_topic.title.clone(),
                tier: new_topic.tier.clone(),
                tags: new_topic.tags.clone(),
                summary: new_topic.summary.clone(),
                content: new_topic.content.clone(),
                code_template: new_topic.code_template.clone(),
                problems: Json(new_topic.problems.clone()),
                created_at: Utc::now(),
            });
        }
        Ok(new_topics.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeforcesData {
    pub info: Option<UserInfo>,
    pub submissions: Vec<Submission>,
    pub history: Vec<RatingChange>,
    pub contests: Vec<Contest>,
    pub problems: HashMap<i64, Vec<CodeforcesProblem>>,
    /// Every call fails.
    pub failing: bool,
    /// Only `user.status` fails.
    pub failing_submissions: bool,
}

pub struct FakeCodeforces {
    data: Mutex<CodeforcesData>,
    calls: AtomicUsize,
}

impl FakeCodeforces {
    pub fn new(data: CodeforcesData) -> Self {
        Self {
            data: Mutex::new(data),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut CodeforcesData)) {
        f(&mut self.data.lock().unwrap());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn snapshot(&self) -> std::result::Result<CodeforcesData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap().clone();
        if data.failing {
            Err(unavailable())
        } else {
            Ok(data)
        }
    }
}

#[async_trait]
impl CodeforcesApi for FakeCodeforces {
    async fn user_info(&self, handle: &str) -> std::result::Result<UserInfo, FetchError> {
        self.snapshot()?
            .info
            .ok_or_else(|| FetchError::ApiError(format!("handles: User with handle {} not found", handle)))
    }

    async fn user_status(
        &self,
        _handle: &str,
        count: u32,
    ) -> std::result::Result<Vec<Submission>, FetchError> {
        let data = self.snapshot()?;
        if data.failing_submissions {
            return Err(unavailable());
        }
        Ok(data.submissions.into_iter().take(count as usize).collect())
    }

    async fn user_rating(&self, _handle: &str) -> std::result::Result<Vec<RatingChange>, FetchError> {
        Ok(self.snapshot()?.history)
    }

    async fn contest_list(&self) -> std::result::Result<Vec<Contest>, FetchError> {
        Ok(self.snapshot()?.contests)
    }

    async fn contest_problems(
        &self,
        contest_id: i64,
    ) -> std::result::Result<Vec<CodeforcesProblem>, FetchError> {
        self.snapshot()?
            .problems
            .remove(&contest_id)
            .ok_or_else(|| FetchError::ApiError(format!("contestId: Contest with id {} not found", contest_id)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeetCodeData {
    pub stats: Option<LeetCodeStats>,
    pub submissions: Vec<LeetCodeSubmission>,
    pub failing: bool,
}

pub struct FakeLeetCode {
    data: Mutex<LeetCodeData>,
}

impl FakeLeetCode {
    pub fn new(data: LeetCodeData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut LeetCodeData)) {
        f(&mut self.data.lock().unwrap());
    }

    fn snapshot(&self) -> std::result::Result<LeetCodeData, FetchError> {
        let data = self.data.lock().unwrap().clone();
        if data.failing {
            Err(unavailable())
        } else {
            Ok(data)
        }
    }
}

#[async_trait]
impl LeetCodeApi for FakeLeetCode {
    async fn profile_stats(&self, username: &str) -> std::result::Result<LeetCodeStats, FetchError> {
        self.snapshot()?
            .stats
            .ok_or_else(|| FetchError::UserNotFound(username.to_string()))
    }

    async fn recent_submissions(
        &self,
        _username: &str,
        limit: u32,
    ) -> std::result::Result<Vec<LeetCodeSubmission>, FetchError> {
        Ok(self
            .snapshot()?
            .submissions
            .into_iter()
            .take(limit as usize)
            .collect())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig {
            url: String::from("postgres://localhost/cp_tracker_test"),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: String::from("test-secret"),
            expiry_hours: 1,
        },
        platforms: PlatformConfig {
            codeforces_api_url: String::from("https://codeforces.com/api/"),
            leetcode_graphql_url: String::from("https://leetcode.com/graphql"),
            leetcode_submissions_url: String::from("https://alfa-leetcode-api.onrender.com/"),
            codeforces_submissions_timeout: Duration::from_secs(10),
        },
        sync: SyncSettings::default(),
        frontend_origin: None,
    }
}

/// Application state wired to in-memory parts, with handles kept for assertions.
pub struct TestApp {
    pub state: Arc<AppState>,
    pub users: Arc<MemoryUserRepository>,
    pub upsolves: Arc<MemoryUpsolveRepository>,
    pub problems: Arc<MemoryProblemRepository>,
    pub topics: Arc<MemoryTopicRepository>,
    pub codeforces: Arc<FakeCodeforces>,
    pub leetcode: Arc<FakeLeetCode>,
}

impl TestApp {
    pub fn new(codeforces: CodeforcesData, leetcode: LeetCodeData) -> Self {
        let users = Arc::new(MemoryUserRepository::default());
        let upsolves = Arc::new(MemoryUpsolveRepository::default());
        let problems = Arc::new(MemoryProblemRepository::default());
        let topics = Arc::new(MemoryTopicRepository::default());
        let codeforces = Arc::new(FakeCodeforces::new(codeforces));
        let leetcode = Arc::new(FakeLeetCode::new(leetcode));
        let state = Arc::new(AppState::new(
            test_config(),
            users.clone(),
            upsolves.clone(),
            problems.clone(),
            topics.clone(),
            codeforces.clone(),
            leetcode.clone(),
        ));

        Self {
            state,
            users,
            upsolves,
            problems,
            topics,
            codeforces,
            leetcode,
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        jwt::generate_token(user.id, &user.role, &self.state.config.jwt).unwrap()
    }

    pub async fn queue(&self, user: &User, platform: Platform, problem_id: &str) -> UpsolveEntry {
        let entry = NewUpsolve {
            user_id: user.id,
            platform,
            problem_id: problem_id.to_string(),
            title: problem_id.to_string(),
            url: format!("https://example.com/{}", problem_id),
            difficulty: 0,
        };
        self.upsolves.create(&entry).await.unwrap().unwrap()
    }
}
