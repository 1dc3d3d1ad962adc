//! Polling service.
//!
//! Lightweight live polls with at most one active poll per room. Votes
//! replace in place (last write wins) and tallies are computed from the
//! vote set at read time.

use std::sync::Arc;

use chrono::Utc;
use liveclass_common::{Actor, AppError, AppResult, CounterStore, IdGenerator, limits};
use liveclass_db::entities::{poll, poll::PollStatus, poll_vote, room::RoomStatus};
use liveclass_db::repositories::{PollRepository, PollVoteRepository};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::access;
use crate::services::RoomService;

/// Maximum options per poll.
const MAX_OPTIONS: usize = 10;

/// Maximum option label length.
const MAX_OPTION_LEN: usize = 200;

/// Polls kept in a room's history listing.
const HISTORY_LIMIT: u64 = 10;

/// Attempts at the close-then-create step before giving up on a room
/// whose active poll keeps changing underneath us.
const CREATE_POLL_ATTEMPTS: usize = 3;

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    pub room_id: String,
    #[validate(length(min = 1, max = 1024))]
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
}

/// Input for casting a vote.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInput {
    pub poll_id: String,
    /// Selected option indices, 0-based.
    pub choices: Vec<usize>,
}

/// Tallied poll results.
#[derive(Debug, Clone)]
pub struct PollResults {
    pub poll: poll::Model,
    /// Vote count per option, in option order. `None` for non-moderators
    /// while the poll is still open.
    pub counts: Option<Vec<u64>>,
    /// Total participants who voted. Withheld together with the counts,
    /// since turnout alone can sway a live vote.
    pub voter_count: Option<u64>,
    /// The requester's own current selections, if they voted.
    pub own_choices: Option<Vec<usize>>,
}

/// Service for live polls.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    vote_repo: PollVoteRepository,
    rooms: RoomService,
    counters: Arc<dyn CounterStore>,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub fn new(
        poll_repo: PollRepository,
        vote_repo: PollVoteRepository,
        rooms: RoomService,
        counters: Arc<dyn CounterStore>,
    ) -> Self {
        Self {
            poll_repo,
            vote_repo,
            rooms,
            counters,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll in an active room, moderator-only.
    ///
    /// A prior active poll is force-closed first, so the one-active-poll
    /// invariant holds even when a close request was lost.
    pub async fn create_poll(
        &self,
        actor: &Actor,
        input: CreatePollInput,
    ) -> AppResult<poll::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        validate_options(&input.options)?;

        let room = access::room_for_moderator(self.rooms.repo(), actor, &input.room_id).await?;
        if room.status != RoomStatus::Active {
            return Err(AppError::BadRequest(format!(
                "Room is not active: {}",
                room.id
            )));
        }

        let model = poll::ActiveModel {
            id: Set(self.id_gen.generate()),
            room_id: Set(room.id.clone()),
            creator_id: Set(actor.id.clone()),
            question: Set(input.question),
            options: Set(json!(input.options)),
            multiple: Set(input.multiple),
            status: Set(PollStatus::Active),
            created_at: Set(Utc::now().into()),
            closed_at: Set(None),
        };

        // The one-active-poll unique index rejects the insert when a
        // concurrent create claimed the slot between our close and our
        // insert; that winner is simply the next prior poll to close.
        for _ in 0..CREATE_POLL_ATTEMPTS {
            if let Some(prior) = self.poll_repo.find_active_by_room(&room.id).await? {
                self.close(prior).await?;
            }

            match self.poll_repo.create(model.clone()).await {
                Ok(created) => {
                    tracing::info!(room_id = %room.id, poll_id = %created.id, "Poll opened");
                    return Ok(created);
                }
                Err(AppError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict(format!(
            "Active poll for room {} kept changing",
            room.id
        )))
    }

    /// Cast or replace a vote on an active poll.
    ///
    /// Re-voting replaces the prior selections in place; the vote set
    /// never accumulates history.
    pub async fn vote(&self, actor: &Actor, input: VoteInput) -> AppResult<poll_vote::Model> {
        let key = format!("vote:{}:{}", input.poll_id, actor.id);
        if !self.counters.check(&key, limits::VOTE).await? {
            return Err(AppError::RateLimited);
        }

        let poll = self.poll_repo.get_by_id(&input.poll_id).await?;
        if poll.status != PollStatus::Active {
            return Err(AppError::BadRequest("Poll is closed".to_string()));
        }

        let option_count = option_labels(&poll)?.len();

        // Out-of-range indices are dropped, duplicates collapse.
        let mut choices: Vec<usize> = input
            .choices
            .into_iter()
            .filter(|&i| i < option_count)
            .collect();
        choices.sort_unstable();
        choices.dedup();

        if choices.is_empty() {
            return Err(AppError::Validation(
                "Vote must select at least one valid option".to_string(),
            ));
        }
        if !poll.multiple && choices.len() > 1 {
            return Err(AppError::Validation(
                "Poll allows a single selection".to_string(),
            ));
        }

        if let Some(existing) = self
            .vote_repo
            .find_by_poll_and_participant(&poll.id, &actor.id)
            .await?
        {
            return self.replace_vote(existing, choices).await;
        }

        let model = poll_vote::ActiveModel {
            id: Set(self.id_gen.generate()),
            poll_id: Set(poll.id.clone()),
            room_id: Set(poll.room_id.clone()),
            participant_id: Set(actor.id.clone()),
            choices: Set(json!(choices)),
            voted_at: Set(Utc::now().into()),
        };

        match self.vote_repo.create(model).await {
            Ok(vote) => Ok(vote),
            // A concurrent vote won the insert race; replace it instead.
            Err(AppError::Conflict(_)) => {
                let existing = self
                    .vote_repo
                    .find_by_poll_and_participant(&poll.id, &actor.id)
                    .await?
                    .ok_or_else(|| AppError::Internal("Poll vote vanished".to_string()))?;
                self.replace_vote(existing, choices).await
            }
            Err(e) => Err(e),
        }
    }

    /// Close a poll, moderator-only. Idempotent on closed polls.
    pub async fn close_poll(&self, actor: &Actor, poll_id: &str) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let room = self.rooms.get_by_id(&poll.room_id).await?;
        access::ensure_moderator(actor, &room)?;

        if poll.status == PollStatus::Closed {
            return Ok(poll);
        }
        self.close(poll).await
    }

    /// Tallied results for a poll.
    ///
    /// While the poll is open, counts and turnout are visible only to
    /// moderators; everyone always sees their own selections. Closed
    /// polls show counts to anyone who can see the room.
    pub async fn results(&self, actor: &Actor, poll_id: &str) -> AppResult<PollResults> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let room = self.rooms.get_by_id(&poll.room_id).await?;

        let votes = self.vote_repo.find_by_poll(&poll.id).await?;

        let own_choices = votes
            .iter()
            .find(|v| v.participant_id == actor.id)
            .map(vote_choices)
            .transpose()?;

        let counts_visible =
            poll.status == PollStatus::Closed || access::is_moderator(actor, &room);
        let (counts, voter_count) = if counts_visible {
            (
                Some(tally_votes(option_labels(&poll)?.len(), &votes)?),
                Some(votes.len() as u64),
            )
        } else {
            (None, None)
        };

        Ok(PollResults {
            poll,
            counts,
            voter_count,
            own_choices,
        })
    }

    /// Recent polls for a room, newest first.
    pub async fn list_polls(&self, room_id: &str) -> AppResult<Vec<poll::Model>> {
        let room = self.rooms.get_by_id(room_id).await?;
        self.poll_repo.list_by_room(&room.id, HISTORY_LIMIT).await
    }

    async fn close(&self, poll: poll::Model) -> AppResult<poll::Model> {
        let id = poll.id.clone();
        let mut active: poll::ActiveModel = poll.into();
        active.status = Set(PollStatus::Closed);
        active.closed_at = Set(Some(Utc::now().into()));

        let closed = self.poll_repo.update(active).await?;
        tracing::info!(poll_id = %id, "Poll closed");
        Ok(closed)
    }

    async fn replace_vote(
        &self,
        existing: poll_vote::Model,
        choices: Vec<usize>,
    ) -> AppResult<poll_vote::Model> {
        let mut active: poll_vote::ActiveModel = existing.into();
        active.choices = Set(json!(choices));
        active.voted_at = Set(Utc::now().into());
        self.vote_repo.update(active).await
    }
}

fn validate_options(options: &[String]) -> AppResult<()> {
    if options.len() < 2 {
        return Err(AppError::Validation(
            "Poll must have at least 2 options".to_string(),
        ));
    }
    if options.len() > MAX_OPTIONS {
        return Err(AppError::Validation(format!(
            "Poll cannot have more than {MAX_OPTIONS} options"
        )));
    }
    for option in options {
        if option.trim().is_empty() {
            return Err(AppError::Validation(
                "Poll options cannot be empty".to_string(),
            ));
        }
        if option.chars().count() > MAX_OPTION_LEN {
            return Err(AppError::Validation(format!(
                "Poll option is too long (max {MAX_OPTION_LEN} chars)"
            )));
        }
    }
    Ok(())
}

fn option_labels(poll: &poll::Model) -> AppResult<Vec<String>> {
    serde_json::from_value(poll.options.clone())
        .map_err(|e| AppError::Internal(format!("Invalid poll options: {e}")))
}

fn vote_choices(vote: &poll_vote::Model) -> AppResult<Vec<usize>> {
    serde_json::from_value(vote.choices.clone())
        .map_err(|e| AppError::Internal(format!("Invalid vote choices: {e}")))
}

/// Count votes per option. Indices past the option count are ignored
/// rather than treated as corruption.
fn tally_votes(option_count: usize, votes: &[poll_vote::Model]) -> AppResult<Vec<u64>> {
    let mut counts = vec![0u64; option_count];
    for vote in votes {
        for choice in vote_choices(vote)? {
            if let Some(slot) = counts.get_mut(choice) {
                *slot += 1;
            }
        }
    }
    Ok(counts)
}
