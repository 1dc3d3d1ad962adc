//! Shared moderator and visibility checks.
//!
//! A moderator is the room owner or a platform admin. Moderator-only
//! violations must not leak whether the target entity exists, so for
//! room-keyed moderator operations a missing room is reported as
//! `Forbidden` to non-admin callers.

use liveclass_common::{Actor, AppError, AppResult, CourseDirectory};
use liveclass_db::entities::room;
use liveclass_db::repositories::{RoomQuery, RoomRepository};

/// Whether the actor has moderator standing for the room.
#[must_use]
pub fn is_moderator(actor: &Actor, room: &room::Model) -> bool {
    actor.is_admin || actor.id == room.owner_id
}

/// Require moderator standing for the room.
pub fn ensure_moderator(actor: &Actor, room: &room::Model) -> AppResult<()> {
    if is_moderator(actor, room) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Moderator standing required".to_string(),
        ))
    }
}

/// Resolve a room for a moderator-only operation.
///
/// Returns `Forbidden` before revealing whether the room exists: a
/// non-admin caller asking about a missing room learns nothing beyond
/// "you may not do this". Admins get the true `NotFound`.
pub async fn room_for_moderator(
    rooms: &RoomRepository,
    actor: &Actor,
    room_id: &str,
) -> AppResult<room::Model> {
    match rooms.find_by_id(room_id).await? {
        Some(room) => {
            ensure_moderator(actor, &room)?;
            Ok(room)
        }
        None => {
            if actor.is_admin {
                Err(AppError::NotFound(format!("Room not found: {room_id}")))
            } else {
                Err(AppError::Forbidden(
                    "Moderator standing required".to_string(),
                ))
            }
        }
    }
}

/// Whether the actor may see the room at all (owner, admin, or enrolled
/// in the linked course).
pub async fn can_view_room(
    actor: &Actor,
    room: &room::Model,
    directory: &dyn CourseDirectory,
) -> AppResult<bool> {
    if is_moderator(actor, room) {
        return Ok(true);
    }
    if let Some(ref course_id) = room.course_id {
        return directory.is_enrolled(&actor.id, course_id).await;
    }
    Ok(false)
}

/// The requester's visible room IDs: rooms they own plus rooms linked to
/// courses they are enrolled in. Admins see every room.
pub async fn visible_room_ids(
    actor: &Actor,
    rooms: &RoomRepository,
    directory: &dyn CourseDirectory,
) -> AppResult<Vec<String>> {
    if actor.is_admin {
        let all = rooms.list(&RoomQuery::default(), None).await?;
        return Ok(all.into_iter().map(|r| r.id).collect());
    }

    let mut ids: Vec<String> = rooms
        .find_by_owner(&actor.id)
        .await?
        .into_iter()
        .map(|r| r.id)
        .collect();

    let courses = directory.enrolled_courses(&actor.id).await?;
    for room in rooms.find_by_courses(&courses).await? {
        if !ids.contains(&room.id) {
            ids.push(room.id);
        }
    }

    Ok(ids)
}
