use chrono::NaiveDateTime;

use super::super::domain::{Call, Need, PreviousSupport, Source, Stage, Urgency};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Offer eligibility against the declared prior support. `Unknown` never rejects.
pub(crate) fn eligibility_ok(call: &Call, previous: PreviousSupport) -> bool {
    call.eligibility.admits(previous)
}

/// Same stage or one step apart. Missing stage on either side is permissive.
pub(crate) fn stage_ok(profile_stage: Option<Stage>, offer_stage: Option<Stage>) -> bool {
    match (profile_stage, offer_stage) {
        (Some(user), Some(offer)) => user.index().abs_diff(offer.index()) <= 1,
        _ => true,
    }
}

/// The need must appear among the call tags or the source tags. No need means no constraint.
pub(crate) fn need_ok(need: Option<Need>, source: &Source, call: &Call) -> bool {
    let Some(need) = need else {
        return true;
    };

    call.tags
        .iter()
        .chain(source.tags.iter())
        .any(|tag| need.matches_tag(tag))
}

/// Deadline window for time-bounded urgencies. A missing or malformed deadline fails a bounded
/// window and passes an unbounded one.
pub(crate) fn deadline_ok(
    call: &Call,
    urgency: Option<&Urgency>,
    now: NaiveDateTime,
    drop_expired: bool,
) -> bool {
    let deadline = call.deadline_at();

    if drop_expired && deadline.is_some_and(|deadline| deadline < now) {
        return false;
    }

    let Some(window) = urgency.and_then(Urgency::window_days) else {
        return true;
    };

    match deadline {
        Some(deadline) => days_until(deadline, now) <= window,
        None => false,
    }
}

pub(crate) fn days_until(deadline: NaiveDateTime, now: NaiveDateTime) -> f64 {
    (deadline - now).num_milliseconds() as f64 / MILLIS_PER_DAY
}
