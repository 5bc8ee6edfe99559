//! Artifact and context fixtures.

use chrono::{DateTime, TimeZone, Utc};
use chronicle_core::artifact::{StoryRoot, WorldState};
use chronicle_core::context::RequestContext;

/// The instant every fixed or stepping test clock starts from.
///
/// # Panics
///
/// Never; the date is a valid constant.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// A context for `user_id` in the `Testing` environment.
///
/// # Panics
///
/// Panics if `user_id` is blank.
#[must_use]
pub fn request_context(user_id: &str) -> RequestContext {
    RequestContext::new(user_id, "corr-test", Some("Testing".to_owned()))
        .expect("fixture user id must not be blank")
}

/// A story root with every required field filled in.
#[must_use]
pub fn sample_story_root() -> StoryRoot {
    StoryRoot {
        story_root_id: "story-root-1".to_owned(),
        genre: "Science Fiction".to_owned(),
        tone: "Dark and introspective".to_owned(),
        thematic_pillars: "AI consciousness, isolation".to_owned(),
        notes: String::new(),
    }
}

/// A world state with every required field filled in.
#[must_use]
pub fn sample_world_state() -> WorldState {
    WorldState {
        world_state_id: "world-state-1".to_owned(),
        physical_laws: "Faster-than-light travel via jump gates".to_owned(),
        social_structures: "Corporate city-states".to_owned(),
        historical_context: "Two centuries after the collapse of Earth".to_owned(),
        magic_or_technology: "Neural implants are ubiquitous".to_owned(),
        notes: "Gates are failing".to_owned(),
    }
}
