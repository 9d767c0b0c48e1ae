//! Probability helpers for play resolution
//!
//! All functions are pure - they take ratings as input and return
//! probabilities or distribution parameters, so they can be tested without
//! running a game.

use crate::models::PlayType;

// ============================================================================
// Ratings
// ============================================================================

/// Rating edge of one unit over another, in [-0.98, 0.98].
#[inline]
pub fn differential(offense: u8, defense: u8) -> f32 {
    (offense as f32 - defense as f32) / 100.0
}

/// Average of two ratings as a differential input.
#[inline]
pub fn blend(a: u8, b: u8) -> u8 {
    ((a as u16 + b as u16) / 2) as u8
}

// ============================================================================
// Passing
// ============================================================================

/// Per-depth passing profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassProfile {
    pub completion: f32,
    pub air_mean: f32,
    pub air_sd: f32,
    pub interception: f32,
    pub sack: f32,
}

pub fn pass_profile(play_type: PlayType) -> Option<PassProfile> {
    match play_type {
        PlayType::PassShort => Some(PassProfile {
            completion: 0.70,
            air_mean: 5.0,
            air_sd: 3.0,
            interception: 0.015,
            sack: 0.05,
        }),
        PlayType::PassMedium => Some(PassProfile {
            completion: 0.58,
            air_mean: 12.0,
            air_sd: 4.0,
            interception: 0.025,
            sack: 0.065,
        }),
        PlayType::PassLong => Some(PassProfile {
            completion: 0.38,
            air_mean: 28.0,
            air_sd: 8.0,
            interception: 0.045,
            sack: 0.08,
        }),
        _ => None,
    }
}

/// Completion chance after the passing/coverage edge and any momentum edge.
#[inline]
pub fn completion_probability(base: f32, edge: f32, momentum_edge: f32) -> f32 {
    (base + edge * 0.35 + momentum_edge * 0.03).clamp(0.05, 0.95)
}

/// Sack chance; a better line (or worse rush) lowers it.
#[inline]
pub fn sack_probability(base: f32, protection_edge: f32) -> f32 {
    (base - protection_edge * 0.08).clamp(0.01, 0.20)
}

#[inline]
pub fn interception_probability(base: f32, edge: f32) -> f32 {
    (base - edge * 0.03).clamp(0.002, 0.10)
}

// ============================================================================
// Running
// ============================================================================

/// (mean, sd) of a designed run.
pub fn run_distribution(play_type: PlayType, edge: f32) -> (f32, f32) {
    let (mean, sd) = match play_type {
        PlayType::RunOutside => (4.5, 6.0),
        _ => (4.0, 3.0),
    };
    (mean + edge * 4.0, sd)
}

pub fn fumble_probability(ball_security: u8) -> f32 {
    (0.012 - (ball_security as f32 - 50.0) / 100.0 * 0.008).clamp(0.002, 0.03)
}

/// Chance the offense falls on its own fumble.
pub const FUMBLE_RECOVERY_OFFENSE: f32 = 0.45;

// ============================================================================
// Kicking
// ============================================================================

/// Field goal success from the kick distance (snap spot + 17).
pub fn field_goal_probability(kick_distance: u8, kicking: u8) -> f32 {
    let d = kick_distance as f32;
    let base = if d <= 30.0 {
        0.97
    } else if d <= 40.0 {
        0.97 - (d - 30.0) * 0.01
    } else if d <= 50.0 {
        0.87 - (d - 40.0) * 0.02
    } else {
        0.67 - (d - 50.0) * 0.035
    };
    (base + (kicking as f32 - 50.0) / 100.0 * 0.15).clamp(0.05, 0.99)
}

pub fn extra_point_probability(kicking: u8) -> f32 {
    (0.94 + (kicking as f32 - 50.0) / 100.0 * 0.08).clamp(0.80, 0.995)
}

pub fn two_point_probability(edge: f32) -> f32 {
    (0.48 + edge * 0.30).clamp(0.25, 0.70)
}

/// (mean, sd) of a punt's gross distance.
pub fn punt_distribution(punting: u8) -> (f32, f32) {
    (45.0 + (punting as f32 - 50.0) / 5.0, 6.0)
}

pub const PUNT_MIN_GROSS: i32 = 20;
pub const PUNT_MAX_GROSS: i32 = 70;

/// (mean, sd) of a kickoff's gross distance.
pub fn kickoff_distribution(kicking: u8) -> (f32, f32) {
    (62.0 + (kicking as f32 - 50.0) / 10.0, 5.0)
}

/// (mean, sd) of a kick return.
pub fn return_distribution(returning: u8, coverage: u8, kickoff: bool) -> (f32, f32) {
    let edge = differential(returning, coverage);
    if kickoff {
        (22.0 + edge * 10.0, 7.0)
    } else {
        (8.0 + edge * 6.0, 5.0)
    }
}

// ============================================================================
// Penalties
// ============================================================================

/// Flag rate on scrimmage snaps.
pub const PENALTY_RATE: f32 = 0.04;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_goal_falls_off_with_distance() {
        let short = field_goal_probability(25, 50);
        let long = field_goal_probability(55, 50);
        assert!(short > long);
        assert!(long > 0.05);
    }

    #[test]
    fn test_better_kicker_makes_more() {
        assert!(field_goal_probability(45, 90) > field_goal_probability(45, 30));
    }

    #[test]
    fn test_completion_is_bounded() {
        assert_eq!(completion_probability(0.7, 5.0, 0.0), 0.95);
        assert_eq!(completion_probability(0.38, -5.0, 0.0), 0.05);
    }

    #[test]
    fn test_pass_profiles_get_riskier_with_depth() {
        let short = pass_profile(PlayType::PassShort).unwrap();
        let long = pass_profile(PlayType::PassLong).unwrap();
        assert!(short.completion > long.completion);
        assert!(short.interception < long.interception);
        assert!(pass_profile(PlayType::RunInside).is_none());
    }

    #[test]
    fn test_differential_sign() {
        assert!(differential(70, 50) > 0.0);
        assert!(differential(30, 50) < 0.0);
        assert_eq!(differential(50, 50), 0.0);
    }
}
