//! Tagged events.
//!
//! The operator builds up a [`PendingEvent`] (team, player, skill, court
//! points, ...) while watching video. Committing it validates the selection,
//! resolves start and end zones and stamps an immutable [`TagEvent`] onto the
//! [`EventLog`].

use super::side::Side;
use super::zone::{classify, Coordinate, Zone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Volleyball skill being tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Skill {
    Serve,
    Receive,
    Set,
    Attack,
    Block,
    Dig,
    Freeball,
    Fault,
    Substitution,
}

impl Skill {
    pub const ALL: [Skill; 9] = [
        Skill::Serve,
        Skill::Receive,
        Skill::Set,
        Skill::Attack,
        Skill::Block,
        Skill::Dig,
        Skill::Freeball,
        Skill::Fault,
        Skill::Substitution,
    ];

    /// Sub-types an operator may pick for this skill.
    pub fn subtypes(&self) -> &'static [SkillSubType] {
        use SkillSubType::*;
        match self {
            Self::Attack => &[Open, QuickA, QuickB, QuickC, BackRow, Tip, Tool],
            Self::Serve => &[Float, Spin],
            Self::Fault => &[NetTouch, DoubleHit, Violation, Out, Carry, Rotation],
            Self::Set => &[SetA, SetB, SetC, SetOpen, SetSlide],
            _ => &[],
        }
    }

    pub fn allows(&self, sub_type: SkillSubType) -> bool {
        self.subtypes().contains(&sub_type)
    }
}

/// Finer classification of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillSubType {
    // Attack
    Open,
    QuickA,
    QuickB,
    QuickC,
    BackRow,
    Tip,
    Tool,
    // Serve
    Float,
    Spin,
    // Fault
    NetTouch,
    DoubleHit,
    Violation,
    Out,
    Carry,
    Rotation,
    // Set
    SetA,
    SetB,
    SetC,
    SetOpen,
    SetSlide,
}

/// Quality grade of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "#")]
    Perfect,
    #[serde(rename = "+")]
    Positive,
    #[serde(rename = "!")]
    Neutral,
    #[serde(rename = "-")]
    Poor,
    #[serde(rename = "=")]
    Error,
}

impl Grade {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Perfect => "#",
            Self::Positive => "+",
            Self::Neutral => "!",
            Self::Poor => "-",
            Self::Error => "=",
        }
    }
}

/// How the tagged action ended the rally, if it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RallyResult {
    /// The acting team won the rally
    Point,
    /// The acting team lost the rally by its own fault
    Error,
    /// Rally goes on
    Continue,
}

impl RallyResult {
    /// Team that won the rally, if it ended.
    pub fn winner(&self, acting: Side) -> Option<Side> {
        match self {
            Self::Point => Some(acting),
            Self::Error => Some(acting.opponent()),
            Self::Continue => None,
        }
    }
}

/// Well-known free-text tags.
pub const TAG_HIGHLIGHT: &str = "Highlight";
pub const TAG_ADJUSTMENT: &str = "Adjustment";
pub const TAG_GOOD: &str = "Good";
pub const TAG_BAD: &str = "Bad";

/// Staging area for the action currently being tagged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingEvent {
    pub team: Option<Side>,
    pub player_number: Option<String>,
    pub skill: Option<Skill>,
    pub sub_type: Option<SkillSubType>,
    pub grade: Option<Grade>,
    pub start_zone: Option<Zone>,
    pub end_zone: Option<Zone>,
    pub start_coordinate: Option<Coordinate>,
    pub end_coordinate: Option<Coordinate>,
    pub tags: Vec<String>,
}

impl PendingEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the acting player.
    pub fn select_player(&mut self, team: Side, number: impl Into<String>) {
        self.team = Some(team);
        self.player_number = Some(number.into());
    }

    /// Pick the skill, dropping a sub-type that does not belong to it.
    pub fn select_skill(&mut self, skill: Skill) {
        self.skill = Some(skill);
        if self.sub_type.is_some_and(|s| !skill.allows(s)) {
            self.sub_type = None;
        }
    }

    /// Mark a court point as both start and end of the action.
    pub fn select_coordinate(&mut self, coordinate: Coordinate) {
        self.start_coordinate = Some(coordinate);
        self.end_coordinate = Some(coordinate);
    }

    /// Add the tag if absent, remove it if present.
    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(i) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(i);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn check(&self) -> Result<(Side, &str, Skill), ValidationError> {
        let team = self.team.ok_or(ValidationError::MissingTeam)?;
        let number = self
            .player_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ValidationError::MissingPlayer)?;
        let skill = self.skill.ok_or(ValidationError::MissingSkill)?;
        Ok((team, number, skill))
    }
}

/// Why a pending event cannot be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingTeam,
    MissingPlayer,
    MissingSkill,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTeam => write!(f, "Select a team"),
            Self::MissingPlayer => write!(f, "Select a player"),
            Self::MissingSkill => write!(f, "Select a skill"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// One committed, immutable tagged action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEvent {
    pub id: String,

    /// Video playback position in seconds
    pub timestamp: f64,

    /// Wall-clock time of the commit
    pub recorded_at: DateTime<Utc>,

    pub team: Side,
    pub player_number: String,
    pub skill: Skill,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<SkillSubType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,

    pub start_zone: Zone,
    pub end_zone: Zone,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_coordinate: Option<Coordinate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_coordinate: Option<Coordinate>,

    pub result: RallyResult,
    pub set: u8,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl TagEvent {
    pub fn winner(&self) -> Option<Side> {
        self.result.winner(self.team)
    }
}

/// Explicit zone if chosen, else the classified coordinate, else zone 1.
pub fn resolve_zone(zone: Option<Zone>, coordinate: Option<Coordinate>) -> Zone {
    zone.or_else(|| coordinate.map(classify)).unwrap_or_default()
}

/// Match context a commit is stamped with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingContext {
    /// Video playback position in seconds
    pub playback_time: f64,
    pub set: u8,
}

impl RecordingContext {
    pub fn new(playback_time: f64, set: u8) -> Self {
        Self { playback_time, set }
    }
}

/// Build a [`TagEvent`] from a pending event without touching any log.
pub fn finalize(
    pending: &PendingEvent,
    result: RallyResult,
    context: &RecordingContext,
    recorded_at: DateTime<Utc>,
) -> Result<TagEvent, ValidationError> {
    let (team, number, skill) = pending.check()?;

    Ok(TagEvent {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp: context.playback_time,
        recorded_at,
        team,
        player_number: number.to_string(),
        skill,
        sub_type: pending.sub_type,
        grade: pending.grade,
        start_zone: resolve_zone(pending.start_zone, pending.start_coordinate),
        end_zone: resolve_zone(pending.end_zone, pending.end_coordinate),
        start_coordinate: pending.start_coordinate,
        end_coordinate: pending.end_coordinate,
        result,
        set: context.set,
        tags: pending.tags.clone(),
    })
}

/// Append-only, ordered log of committed events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<TagEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<TagEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[TagEvent] {
        &self.events
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&TagEvent> {
        self.events.last()
    }

    /// Events of one set, in order.
    pub fn in_set(&self, set: u8) -> impl Iterator<Item = &TagEvent> {
        self.events.iter().filter(move |e| e.set == set)
    }

    fn push(&mut self, event: TagEvent) {
        self.events.push(event);
    }

    /// Drop the most recent event.
    pub(crate) fn pop(&mut self) -> Option<TagEvent> {
        self.events.pop()
    }
}

/// Owns the staging area and the event log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    pending: PendingEvent,
    log: EventLog,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume recording onto an existing log.
    pub fn with_log(log: EventLog) -> Self {
        Self {
            pending: PendingEvent::default(),
            log,
        }
    }

    pub fn pending(&self) -> &PendingEvent {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut PendingEvent {
        &mut self.pending
    }

    /// Abandon the action being tagged.
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Commit the pending event.
    ///
    /// On rejection the pending event is left as-is for correction and the
    /// log is unchanged. On success the event is appended and the staging
    /// area is cleared.
    pub fn commit(
        &mut self,
        result: RallyResult,
        context: &RecordingContext,
    ) -> Result<TagEvent, ValidationError> {
        let event = finalize(&self.pending, result, context, Utc::now())
            .inspect_err(|e| debug!(reason = %e, "Rejected pending event"))?;

        info!(
            team = %event.team,
            player = %event.player_number,
            skill = ?event.skill,
            result = ?event.result,
            set = event.set,
            "Committed event"
        );

        self.log.push(event.clone());
        self.pending.clear();
        Ok(event)
    }

    /// Remove the most recent event from the log.
    pub fn retract_last(&mut self) -> Option<TagEvent> {
        self.log.pop()
    }

    /// Start a fresh log, dropping any pending selection.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
