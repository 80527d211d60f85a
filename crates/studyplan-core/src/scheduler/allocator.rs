//! Per-day session allocation.
//!
//! One call fills one day window `[day_start, day_start + budget)`.
//! Study time is planned against the day's capacity before anything is
//! placed, so every planned block and the break in front of it fits. Subjects
//! get weighted study time when they all fit at the minimum block length;
//! otherwise the day seats as many as fit, in placement order. Leftover
//! capacity becomes a revision block when a subject from an earlier day is
//! available, and whatever is still unassigned becomes a buffer. Sessions are
//! contiguous from the day start and end exactly at the window end.

use std::collections::HashSet;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::topics::{TopicRequest, TopicSource, BREAK_TOPIC, BUFFER_TOPIC, FALLBACK_TOPIC};
use super::PlannerConfig;
use crate::plan::Subject;
use crate::schedule::{weekday_serde, DaySchedule, Session, SessionKind, TimeOfDay};
use crate::timeline::{Interval, TimeGrid};
use crate::weighting;

const ROUNDING_MINUTES: u32 = 5;

/// A subject as seen by one day's allocation.
#[derive(Debug, Clone, Copy)]
pub struct DaySubject<'a> {
    pub subject: &'a Subject,
    /// Position in the plan's subject list, used for tie-breaks.
    pub plan_index: usize,
}

/// A subject-day that received less study time than it was allotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truncation {
    #[serde(with = "weekday_serde")]
    pub day: Weekday,
    pub subject: String,
    pub requested_minutes: u32,
    pub placed_minutes: u32,
}

/// Round-robin pointer over subjects for revision blocks.
///
/// Only subjects marked as studied on an earlier day are eligible; the
/// pointer advances past each subject it hands out and survives across days.
#[derive(Debug, Clone)]
pub struct RevisionRotation {
    order: Vec<Subject>,
    studied: HashSet<String>,
    next: usize,
}

impl RevisionRotation {
    /// `order` is the plan's subjects, weakest first.
    pub fn new(order: Vec<Subject>) -> Self {
        Self {
            order,
            studied: HashSet::new(),
            next: 0,
        }
    }

    pub fn mark_studied<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        self.studied.extend(names.into_iter().cloned());
    }

    pub fn has_candidate(&self) -> bool {
        self.order.iter().any(|s| self.studied.contains(&s.name))
    }

    /// Next eligible subject, advancing the pointer past it.
    pub fn next_candidate(&mut self) -> Option<Subject> {
        let len = self.order.len();
        for step in 0..len {
            let index = (self.next + step) % len;
            if self.studied.contains(&self.order[index].name) {
                self.next = (index + 1) % len;
                return Some(self.order[index].clone());
            }
        }
        None
    }
}

/// Result of allocating one day.
#[derive(Debug, Clone)]
pub struct DayAllocation {
    pub schedule: DaySchedule,
    pub truncations: Vec<Truncation>,
    /// Subjects that got at least one study session, in placement order.
    pub studied: Vec<String>,
    pub topic_fallbacks: usize,
}

enum Placement {
    Full(Interval),
    Truncated(Interval),
    Dropped,
}

/// Fills single days according to a [`PlannerConfig`].
pub struct SessionAllocator<'a> {
    config: &'a PlannerConfig,
    topics: &'a dyn TopicSource,
    week_index: u32,
}

impl<'a> SessionAllocator<'a> {
    pub fn new(config: &'a PlannerConfig, topics: &'a dyn TopicSource, week_index: u32) -> Self {
        Self {
            config,
            topics,
            week_index,
        }
    }

    /// Break minutes held back from the study budget, Pomodoro style.
    pub fn reserved_break_minutes(&self, budget: u32) -> u32 {
        let pomodoros = budget / self.config.pomodoro_minutes.max(1);
        let cap = (budget as f64 * self.config.max_break_fraction).floor() as u32;
        (pomodoros * self.config.break_minutes).min(cap)
    }

    /// Study minutes that fit in `budget` when `seats` subjects share the
    /// day, breaks between their blocks included. Never more than the budget
    /// left after the break reservation; always a multiple of 5.
    pub fn study_capacity(&self, budget: u32, seats: usize) -> u32 {
        let max_block = self.config.max_block_minutes.max(ROUNDING_MINUTES);
        let net = budget.saturating_sub(self.reserved_break_minutes(budget));
        let mut capacity = floor5(net);
        while capacity > 0 {
            // Each subject adds at most one block beyond `capacity / max_block`.
            let blocks = capacity / max_block + seats as u32;
            let breaks = self.config.break_minutes * blocks.saturating_sub(1);
            if capacity + breaks <= budget {
                break;
            }
            capacity -= ROUNDING_MINUTES;
        }
        capacity
    }

    /// How many subjects one day holds with each at the minimum block
    /// length. At least one when there is any subject at all.
    pub fn seats(&self, budget: u32, subjects: usize) -> usize {
        (1..=subjects)
            .rev()
            .find(|&m| self.study_capacity(budget, m) >= m as u32 * self.config.min_block_minutes)
            .unwrap_or(subjects.min(1))
    }

    /// Split `total` minutes across `subjects` by weight, never giving a
    /// subject less than the minimum block.
    ///
    /// Subjects whose weighted share falls below the minimum are held at it
    /// and the rest of `total` is re-split among the others, so raising one
    /// subject never takes time the day does not have. Free shares are
    /// rounded down to a multiple of 5 and the leftover goes to the weakest
    /// subject (lowest plan index on ties). The result is in the order of
    /// `subjects` and always sums to `total`.
    pub fn distribute(&self, total: u32, subjects: &[DaySubject<'_>]) -> Vec<u32> {
        if subjects.is_empty() {
            return Vec::new();
        }
        let count = subjects.len() as u32;
        let floor = self.config.min_block_minutes.min(floor5(total / count));
        let weights: Vec<u32> = subjects
            .iter()
            .map(|s| weighting::weight(s.subject.proficiency))
            .collect();

        let mut held = vec![false; subjects.len()];
        let pool_and_weight = |held: &[bool]| {
            let held_count = held.iter().filter(|&&h| h).count() as u32;
            let free_weight: u32 = weights
                .iter()
                .zip(held)
                .filter(|(_, &h)| !h)
                .map(|(w, _)| w)
                .sum();
            (total - floor * held_count, free_weight)
        };
        loop {
            let (pool, free_weight) = pool_and_weight(&held);
            let below: Vec<usize> = (0..weights.len())
                .filter(|&i| !held[i] && pool * weights[i] < floor * free_weight)
                .collect();
            if below.is_empty() {
                break;
            }
            for i in below {
                held[i] = true;
            }
        }

        let (pool, free_weight) = pool_and_weight(&held);
        let mut minutes: Vec<u32> = weights
            .iter()
            .zip(&held)
            .map(|(&w, &h)| {
                if h || free_weight == 0 {
                    floor
                } else {
                    floor5(pool * w / free_weight)
                }
            })
            .collect();

        let assigned: u32 = minutes.iter().sum();
        let weakest = subjects
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| (s.subject.proficiency, s.plan_index))
            .map(|(i, _)| i)
            .unwrap_or(0);
        minutes[weakest] += total.saturating_sub(assigned);
        minutes
    }

    /// Study minutes per subject for one day, in the order of `subjects`.
    ///
    /// When every subject fits at the minimum block length, the day's
    /// capacity is split by weight. Otherwise only the first subjects that
    /// fit are seated, each with an equal part of the capacity, and the rest
    /// get `0`. The planned blocks and the breaks between them always fit in
    /// `budget`.
    pub fn plan_day(&self, budget: u32, subjects: &[DaySubject<'_>]) -> Vec<u32> {
        let seats = self.seats(budget, subjects.len());
        if seats == 0 {
            return Vec::new();
        }
        let capacity = self.study_capacity(budget, seats);
        if seats == subjects.len() {
            return self.distribute(capacity, subjects);
        }

        let each = floor5(capacity / seats as u32);
        (0..subjects.len())
            .map(|i| if i < seats { each } else { 0 })
            .collect()
    }

    /// Cut `minutes` into near-equal blocks no longer than the max block.
    pub fn split_blocks(&self, minutes: u32) -> Vec<u32> {
        if minutes == 0 {
            return Vec::new();
        }
        let max_block = self.config.max_block_minutes.max(ROUNDING_MINUTES);
        let count = minutes.div_ceil(max_block);
        let units = minutes / ROUNDING_MINUTES;
        let odd = minutes % ROUNDING_MINUTES;
        let base = units / count;
        let extra = units % count;

        (0..count)
            .map(|i| {
                let mut block = (base + u32::from(i < extra)) * ROUNDING_MINUTES;
                if i == 0 {
                    block += odd;
                }
                block
            })
            .filter(|&b| b > 0)
            .collect()
    }

    /// Allocate one day. `subjects` is the day's placement order.
    pub fn allocate_day(
        &self,
        day: Weekday,
        day_index: u32,
        budget: u32,
        subjects: &[DaySubject<'_>],
        rotation: &mut RevisionRotation,
    ) -> DayAllocation {
        let day_start = self.config.day_start.minutes();
        let mut grid = TimeGrid::new(day_start, day_start + budget);
        let mut sessions = Vec::new();
        let mut truncations = Vec::new();
        let mut studied = Vec::new();
        let mut topic_fallbacks = 0;

        let net = budget.saturating_sub(self.reserved_break_minutes(budget));
        let wanted = self.distribute(floor5(net), subjects);
        let planned = self.plan_day(budget, subjects);

        for ((entry, &requested), &minutes) in subjects.iter().zip(&wanted).zip(&planned) {
            let subject = entry.subject;
            let mut placed = 0;

            for block in self.split_blocks(minutes) {
                let had_focus = !sessions.is_empty();
                match self.place_focus(&mut grid, block, had_focus, &mut sessions) {
                    Placement::Full(interval) | Placement::Truncated(interval) => {
                        placed += interval.duration_minutes();
                        let topic =
                            self.topic_for(subject, day_index, SessionKind::Study, &mut topic_fallbacks);
                        sessions.push(session(
                            interval,
                            Some(&subject.name),
                            topic,
                            SessionKind::Study,
                        ));
                        if interval.duration_minutes() < block {
                            break;
                        }
                    }
                    Placement::Dropped => break,
                }
            }

            if placed > 0 {
                studied.push(subject.name.clone());
            }
            if placed < requested {
                tracing::debug!(
                    day = ?day,
                    subject = %subject.name,
                    requested,
                    placed,
                    "study time truncated"
                );
                truncations.push(Truncation {
                    day,
                    subject: subject.name.clone(),
                    requested_minutes: requested,
                    placed_minutes: placed,
                });
            }
        }

        self.place_revision(&mut grid, day_index, rotation, &mut sessions, &mut topic_fallbacks);

        if let Some(rest) = grid.first_gap(grid.cursor()) {
            if let Ok(interval) = grid.place(rest.duration_minutes(), rest.start) {
                sessions.push(session(
                    interval,
                    None,
                    BUFFER_TOPIC.to_string(),
                    SessionKind::Buffer,
                ));
            }
        }

        DayAllocation {
            schedule: DaySchedule { day, sessions },
            truncations,
            studied,
            topic_fallbacks,
        }
    }

    /// Place a focus block at the cursor, preceded by a break unless it is
    /// the first focus block of the day. Shortens the block to the space
    /// left when it does not fit.
    fn place_focus(
        &self,
        grid: &mut TimeGrid,
        minutes: u32,
        needs_break: bool,
        sessions: &mut Vec<Session>,
    ) -> Placement {
        let cursor = grid.cursor();
        let lead = if needs_break { self.config.break_minutes } else { 0 };
        let available = grid
            .first_gap(cursor)
            .map(|g| g.duration_minutes())
            .unwrap_or(0);

        let length = if available >= lead + minutes {
            minutes
        } else if available >= lead + self.config.min_truncated_minutes {
            available - lead
        } else {
            return Placement::Dropped;
        };
        if length == 0 {
            return Placement::Dropped;
        }

        if lead > 0 {
            match grid.place(lead, cursor) {
                Ok(interval) => {
                    sessions.push(session(interval, None, BREAK_TOPIC.to_string(), SessionKind::Break))
                }
                Err(_) => return Placement::Dropped,
            }
        }
        let at = grid.cursor();
        match grid.place(length, at) {
            Ok(interval) if length == minutes => {
                tracing::debug!(start = interval.start, minutes, "placed focus block");
                Placement::Full(interval)
            }
            Ok(interval) => Placement::Truncated(interval),
            Err(_) => Placement::Dropped,
        }
    }

    fn place_revision(
        &self,
        grid: &mut TimeGrid,
        day_index: u32,
        rotation: &mut RevisionRotation,
        sessions: &mut Vec<Session>,
        topic_fallbacks: &mut usize,
    ) {
        if !rotation.has_candidate() {
            return;
        }
        let lead = if sessions.is_empty() { 0 } else { self.config.break_minutes };
        let residual = grid
            .first_gap(grid.cursor())
            .map(|g| g.duration_minutes())
            .unwrap_or(0);
        if residual < lead + self.config.min_revision_minutes {
            return;
        }
        let length = (residual - lead).min(self.config.max_block_minutes) / ROUNDING_MINUTES
            * ROUNDING_MINUTES;
        if length < self.config.min_revision_minutes {
            return;
        }
        let Some(subject) = rotation.next_candidate() else {
            return;
        };

        if let Placement::Full(interval) = self.place_focus(grid, length, lead > 0, sessions) {
            let topic = self.topic_for(&subject, day_index, SessionKind::Revision, topic_fallbacks);
            sessions.push(session(
                interval,
                Some(&subject.name),
                topic,
                SessionKind::Revision,
            ));
        }
    }

    fn topic_for(
        &self,
        subject: &Subject,
        day_index: u32,
        kind: SessionKind,
        fallbacks: &mut usize,
    ) -> String {
        let request = TopicRequest {
            subject: &subject.name,
            proficiency: subject.proficiency,
            week_index: self.week_index,
            day_index,
            kind,
        };
        match self.topics.topic(&request) {
            Ok(topic) if !topic.trim().is_empty() => topic,
            Ok(_) => {
                *fallbacks += 1;
                FALLBACK_TOPIC.to_string()
            }
            Err(e) => {
                tracing::warn!(subject = %subject.name, error = %e, "topic source failed, using fallback");
                *fallbacks += 1;
                FALLBACK_TOPIC.to_string()
            }
        }
    }
}

fn session(interval: Interval, subject: Option<&str>, topic: String, kind: SessionKind) -> Session {
    Session {
        start_time: to_time(interval.start),
        end_time: to_time(interval.end),
        subject_name: subject.map(str::to_string),
        topic,
        kind,
    }
}

fn floor5(minutes: u32) -> u32 {
    minutes / ROUNDING_MINUTES * ROUNDING_MINUTES
}

fn to_time(minutes: u32) -> TimeOfDay {
    // Window bounds are checked against 24:00 before allocation starts.
    TimeOfDay::saturating_from_minutes(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::topics::{FallbackTopics, TopicError};

    fn config() -> PlannerConfig {
        PlannerConfig::default()
    }

    fn day_subjects(subjects: &[Subject]) -> Vec<DaySubject<'_>> {
        let mut order: Vec<DaySubject<'_>> = subjects
            .iter()
            .enumerate()
            .map(|(plan_index, subject)| DaySubject { subject, plan_index })
            .collect();
        order.sort_by_key(|s| s.subject.proficiency);
        order
    }

    fn rotation(subjects: &[Subject]) -> RevisionRotation {
        RevisionRotation::new(subjects.to_vec())
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn break_reservation_is_capped() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        assert_eq!(alloc.reserved_break_minutes(240), 45);
        assert_eq!(alloc.reserved_break_minutes(60), 10);

        let mut greedy = config();
        greedy.break_minutes = 10;
        let alloc = SessionAllocator::new(&greedy, &FallbackTopics, 0);
        // 9 pomodoros * 10 = 90, capped at 20% of 240
        assert_eq!(alloc.reserved_break_minutes(240), 48);
    }

    #[test]
    fn distribute_gives_leftover_to_weakest() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [Subject::new("Math", 1), Subject::new("English", 5)];
        let minutes = alloc.distribute(195, &day_subjects(&subjects));
        assert_eq!(minutes, vec![165, 30]);
    }

    #[test]
    fn distribute_breaks_ties_by_plan_order() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [
            Subject::new("A", 3),
            Subject::new("B", 3),
            Subject::new("C", 3),
        ];
        let minutes = alloc.distribute(160, &day_subjects(&subjects));
        assert_eq!(minutes, vec![60, 50, 50]);
        assert_eq!(minutes.iter().sum::<u32>(), 160);
    }

    #[test]
    fn distribute_holds_small_shares_at_min_block() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [
            Subject::new("Math", 1),
            Subject::new("Physics", 1),
            Subject::new("Art", 5),
        ];
        // Art's weighted 9 minutes is raised to 25 out of the same 100.
        let minutes = alloc.distribute(100, &day_subjects(&subjects));
        assert_eq!(minutes, vec![40, 35, 25]);
    }

    #[test]
    fn capacity_leaves_room_for_breaks() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        assert_eq!(alloc.study_capacity(240, 2), 195);
        assert_eq!(alloc.study_capacity(60, 2), 50);
        assert_eq!(alloc.study_capacity(60, 3), 45);
        assert_eq!(alloc.seats(60, 3), 2);
        assert_eq!(alloc.seats(75, 3), 2);
        assert_eq!(alloc.seats(240, 3), 3);
        assert_eq!(alloc.seats(60, 0), 0);
    }

    #[test]
    fn planned_day_always_fits() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects: Vec<Subject> = (1..=5u8)
            .map(|p| Subject::new(format!("S{p}"), p))
            .collect();
        for budget in (60..=720).step_by(15) {
            for count in 1..=subjects.len() {
                let order = day_subjects(&subjects[..count]);
                let planned = alloc.plan_day(budget, &order);
                let blocks: usize = planned.iter().map(|&m| alloc.split_blocks(m).len()).sum();
                let study: u32 = planned.iter().sum();
                let breaks = cfg.break_minutes * (blocks as u32).saturating_sub(1);
                assert!(study + breaks <= budget, "{budget} min, {count} subjects");
                assert!(planned.iter().any(|&m| m > 0));
            }
        }
    }

    #[test]
    fn weaker_subject_keeps_its_seat_on_a_short_day() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let minutes_for_first = |first: u8| {
            let subjects = [
                Subject::new("S0", first),
                Subject::new("S1", 1),
                Subject::new("S2", 1),
            ];
            let mut rot = rotation(&subjects);
            let day = alloc.allocate_day(Weekday::Mon, 0, 75, &day_subjects(&subjects), &mut rot);
            assert!(day
                .truncations
                .iter()
                .all(|t| t.placed_minutes == 0 || t.placed_minutes >= cfg.min_block_minutes));
            day.schedule
                .sessions
                .iter()
                .filter(|s| s.kind == SessionKind::Study && s.subject_name.as_deref() == Some("S0"))
                .map(|s| s.duration_minutes())
                .sum::<u32>()
        };
        assert!(minutes_for_first(3) >= minutes_for_first(4));
        assert!(minutes_for_first(1) >= minutes_for_first(2));
    }

    #[test]
    fn zero_length_revision_leaves_no_dangling_break() {
        let mut cfg = config();
        cfg.min_revision_minutes = 0;
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [Subject::new("Math", 1)];
        let mut rot = rotation(&subjects);
        rot.mark_studied(&["Math".to_string()]);
        let mut grid = TimeGrid::new(0, 58);
        let mut sessions = Vec::new();
        assert!(matches!(
            alloc.place_focus(&mut grid, 50, false, &mut sessions),
            Placement::Full(_)
        ));
        sessions.push(session(Interval { start: 0, end: 50 }, Some("Math"), "x".into(), SessionKind::Study));

        let mut fallbacks = 0;
        alloc.place_revision(&mut grid, 1, &mut rot, &mut sessions, &mut fallbacks);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.last().unwrap().kind, SessionKind::Study);
    }

    #[test]
    fn split_blocks_respects_max_block() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        assert_eq!(alloc.split_blocks(165), vec![45, 40, 40, 40]);
        assert_eq!(alloc.split_blocks(50), vec![50]);
        assert_eq!(alloc.split_blocks(55), vec![30, 25]);
        assert_eq!(alloc.split_blocks(51), vec![26, 25]);
        assert_eq!(alloc.split_blocks(25), vec![25]);
        assert!(alloc.split_blocks(0).is_empty());
    }

    #[test]
    fn math_and_english_four_hours() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [Subject::new("Math", 1), Subject::new("English", 5)];
        let mut rot = rotation(&subjects);

        let monday = alloc.allocate_day(Weekday::Mon, 0, 240, &day_subjects(&subjects), &mut rot);
        let sessions = &monday.schedule.sessions;

        assert!(monday.truncations.is_empty());
        assert_eq!(sessions[0].subject_name.as_deref(), Some("Math"));
        assert_eq!(sessions[0].start_time, t("08:00"));
        assert_eq!(sessions[0].end_time, t("08:45"));
        assert_eq!(sessions[1].kind, SessionKind::Break);

        let english: Vec<_> = sessions
            .iter()
            .filter(|s| s.subject_name.as_deref() == Some("English"))
            .collect();
        assert_eq!(english.len(), 1);
        assert_eq!(english[0].start_time, t("11:05"));
        assert_eq!(english[0].end_time, t("11:35"));

        // No earlier day on Monday, so the rest is buffer.
        let last = sessions.last().unwrap();
        assert_eq!(last.kind, SessionKind::Buffer);
        assert_eq!(last.end_time, t("12:00"));
        assert_eq!(monday.schedule.focus_minutes(), 195);
        assert_eq!(monday.studied, vec!["Math".to_string(), "English".to_string()]);
    }

    #[test]
    fn revision_follows_an_earlier_day() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [Subject::new("Math", 1), Subject::new("English", 5)];
        let mut rot = rotation(&subjects);
        rot.mark_studied(&["Math".to_string(), "English".to_string()]);

        let tuesday = alloc.allocate_day(Weekday::Tue, 1, 240, &day_subjects(&subjects), &mut rot);
        let sessions = &tuesday.schedule.sessions;
        let revision = sessions.last().unwrap();
        assert_eq!(revision.kind, SessionKind::Revision);
        assert_eq!(revision.subject_name.as_deref(), Some("Math"));
        assert_eq!(revision.start_time, t("11:40"));
        assert_eq!(revision.end_time, t("12:00"));
        assert_eq!(sessions[sessions.len() - 2].kind, SessionKind::Break);
        assert_eq!(tuesday.schedule.focus_minutes(), 215);

        // The pointer moved on to English.
        assert_eq!(rot.next_candidate().unwrap().name, "English");
    }

    #[test]
    fn tight_budget_truncates_last_subject() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [
            Subject::new("Physics", 2),
            Subject::new("Chemistry", 3),
            Subject::new("Biology", 4),
        ];
        let mut rot = rotation(&subjects);
        let day = alloc.allocate_day(Weekday::Mon, 0, 60, &day_subjects(&subjects), &mut rot);

        assert_eq!(day.truncations.len(), 1);
        assert_eq!(day.truncations[0].subject, "Biology");
        assert_eq!(day.truncations[0].placed_minutes, 0);
        assert_eq!(day.studied, vec!["Physics".to_string(), "Chemistry".to_string()]);

        let total: u32 = day.schedule.sessions.iter().map(|s| s.duration_minutes()).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn min_block_longer_than_the_day_uses_what_fits() {
        let mut cfg = config();
        cfg.max_block_minutes = 90;
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let subjects = [Subject::new("History", 1)];
        let mut rot = rotation(&subjects);
        // 60 min budget, 10 reserved, 50 net: one 50 minute block, no truncation.
        let day = alloc.allocate_day(Weekday::Mon, 0, 60, &day_subjects(&subjects), &mut rot);
        assert!(day.truncations.is_empty());

        let mut cfg = config();
        cfg.min_block_minutes = 80;
        cfg.max_block_minutes = 90;
        let alloc = SessionAllocator::new(&cfg, &FallbackTopics, 0);
        let day = alloc.allocate_day(Weekday::Mon, 0, 60, &day_subjects(&subjects), &mut rot);
        assert!(day.truncations.is_empty());
        assert_eq!(day.schedule.sessions[0].duration_minutes(), 50);
        assert_eq!(day.schedule.sessions[1].kind, SessionKind::Buffer);
    }

    struct BrokenTopics;

    impl TopicSource for BrokenTopics {
        fn topic(&self, _request: &TopicRequest<'_>) -> Result<String, TopicError> {
            Err(TopicError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn failing_topic_source_falls_back() {
        let cfg = config();
        let alloc = SessionAllocator::new(&cfg, &BrokenTopics, 0);
        let subjects = [Subject::new("Math", 1)];
        let mut rot = rotation(&subjects);
        let day = alloc.allocate_day(Weekday::Mon, 0, 120, &day_subjects(&subjects), &mut rot);

        assert!(day.topic_fallbacks > 0);
        for s in day.schedule.sessions.iter().filter(|s| s.kind == SessionKind::Study) {
            assert_eq!(s.topic, FALLBACK_TOPIC);
        }
    }

    #[test]
    fn rotation_skips_unstudied_subjects() {
        let subjects = [
            Subject::new("A", 1),
            Subject::new("B", 2),
            Subject::new("C", 3),
        ];
        let mut rot = rotation(&subjects);
        assert!(!rot.has_candidate());
        assert!(rot.next_candidate().is_none());

        rot.mark_studied(&["A".to_string(), "C".to_string()]);
        assert_eq!(rot.next_candidate().unwrap().name, "A");
        assert_eq!(rot.next_candidate().unwrap().name, "C");
        assert_eq!(rot.next_candidate().unwrap().name, "A");
    }
}
