// SPDX-License-Identifier: AGPL-3.0-or-later

//! Collision-checked numeric identifier allocation.
//!
//! User ids are allocated from progressively wider candidate sources with a
//! bounded number of retries: the first attempts derive a candidate from the
//! current timestamp, the middle attempts anchor on the directory size plus
//! a small random offset, and the final attempts fall back to a wide random
//! range. Every candidate is checked against the directory before use.
//!
//! This belongs to user creation, not to session logic.

use rand::Rng;
use thiserror::Error;

use crate::models::UserId;
use crate::store::UserDirectory;

/// Upper bound on attempts across all candidate sources.
const MAX_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum IdAllocError {
    #[error("could not allocate a unique user id after {MAX_ATTEMPTS} attempts")]
    Exhausted,
}

/// Allocate a user id not yet present in the directory.
pub fn allocate_user_id(directory: &UserDirectory) -> Result<UserId, IdAllocError> {
    let mut rng = rand::thread_rng();

    for attempt in 0..MAX_ATTEMPTS {
        let candidate = clamp(candidate_for(attempt, directory.count_users(), &mut rng));
        if !directory.user_exists(UserId(candidate)) {
            return Ok(UserId(candidate));
        }
    }

    Err(IdAllocError::Exhausted)
}

fn candidate_for(attempt: u32, user_count: usize, rng: &mut impl Rng) -> i64 {
    if attempt < 3 {
        // Last six digits of the millisecond clock.
        chrono::Utc::now().timestamp_millis() % 1_000_000
    } else if attempt < 6 {
        user_count as i64 + 1_000 + rng.gen_range(0..1_000) + i64::from(attempt)
    } else {
        rng.gen_range(100_000..1_000_000)
    }
}

/// Keep ids positive and within the store's integer column range.
fn clamp(candidate: i64) -> i64 {
    let candidate = candidate.abs();
    if candidate > i64::from(i32::MAX) {
        candidate % 1_000_000
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::sample_user;

    #[test]
    fn allocates_id_not_in_directory() {
        let directory = UserDirectory::new();
        let id = allocate_user_id(&directory).unwrap();
        assert!(id.0 > 0);
        assert!(id.0 <= i64::from(i32::MAX));
    }

    #[test]
    fn skips_colliding_timestamp_candidate() {
        let mut directory = UserDirectory::new();
        // Occupy the timestamp-derived candidate so the allocator has to
        // move past the first source.
        let taken = clamp(chrono::Utc::now().timestamp_millis() % 1_000_000);
        directory.insert_user(sample_user(taken, "taken@x.com", "pw"));

        let id = allocate_user_id(&directory).unwrap();
        assert_ne!(id.0, taken);
        assert!(!directory.user_exists(id));
    }

    #[test]
    fn clamp_keeps_values_in_range() {
        assert_eq!(clamp(-42), 42);
        assert_eq!(clamp(5_000_000_123), 123);
        assert_eq!(clamp(123_456), 123_456);
    }
}
