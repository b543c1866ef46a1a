//! Entity model shared by the tracker, the scorers and the feature extractor.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Team label the ingestion layer uses for the ball.
pub const BALL_TEAM: &str = "Ball";

/// Back-line position acronyms.
pub const BACK_LINE_ROLES: [&str; 7] = ["CB", "LCB", "RCB", "LB", "RB", "LWB", "RWB"];
/// Midfield position acronyms.
pub const MIDFIELD_ROLES: [&str; 7] = ["CM", "CDM", "CAM", "LM", "RM", "DM", "AM"];
/// Forward position acronyms.
pub const FORWARD_ROLES: [&str; 4] = ["CF", "ST", "LW", "RW"];

/// Role of a tracked entity: a position acronym, or the ball/referee sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Ball,
    Referee,
    Player(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Ball => "BALL",
            Role::Referee => "REF",
            Role::Player(acronym) => acronym,
        }
    }

    pub fn is_ball(&self) -> bool {
        matches!(self, Role::Ball)
    }

    pub fn is_referee(&self) -> bool {
        matches!(self, Role::Referee)
    }

    /// Players only (not ball, not referee).
    pub fn is_player(&self) -> bool {
        matches!(self, Role::Player(_))
    }

    pub fn is_goalkeeper(&self) -> bool {
        self.as_str() == "GK"
    }

    pub fn is_outfield(&self) -> bool {
        self.is_player() && !self.is_goalkeeper()
    }

    pub fn is_back_line(&self) -> bool {
        BACK_LINE_ROLES.contains(&self.as_str())
    }

    pub fn is_midfield(&self) -> bool {
        MIDFIELD_ROLES.contains(&self.as_str())
    }

    pub fn is_forward(&self) -> bool {
        FORWARD_ROLES.contains(&self.as_str())
    }
}

impl From<&str> for Role {
    fn from(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "BALL" => Role::Ball,
            "REF" | "REFEREE" => Role::Referee,
            upper => Role::Player(upper.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Role::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end the attacking team is scoring toward, serialized as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum AttackDirection {
    /// Toward `+x`.
    Positive,
    /// Toward `-x`.
    Negative,
}

impl AttackDirection {
    pub fn sign(self) -> f32 {
        match self {
            AttackDirection::Positive => 1.0,
            AttackDirection::Negative => -1.0,
        }
    }

    /// Unit vector along the pitch length, pointing at the attacked goal.
    pub fn forward(self) -> Vector2<f32> {
        Vector2::new(self.sign(), 0.0)
    }
}

impl TryFrom<i8> for AttackDirection {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AttackDirection::Positive),
            -1 => Ok(AttackDirection::Negative),
            other => Err(format!("attacking direction must be 1 or -1, got {}", other)),
        }
    }
}

impl From<AttackDirection> for i8 {
    fn from(dir: AttackDirection) -> Self {
        match dir {
            AttackDirection::Positive => 1,
            AttackDirection::Negative => -1,
        }
    }
}

/// Resolved state of one entity at the current tick.
///
/// Produced by the position tracker and handed to scorers as a read-only view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub id: String,
    pub team: String,
    pub role: Role,
    /// Ground-plane position `(x, z)`
    pub position: Vector2<f32>,
    /// Ground-plane velocity in units/s
    pub velocity: Vector2<f32>,
    /// Magnitude of `velocity`, never negative
    pub speed: f32,
    /// True while the position is gap-interpolated or frozen
    pub inferred: bool,
}

impl EntityState {
    pub fn new(id: impl Into<String>, team: impl Into<String>, role: Role, position: Vector2<f32>) -> Self {
        Self {
            id: id.into(),
            team: team.into(),
            role,
            position,
            velocity: Vector2::zeros(),
            speed: 0.0,
            inferred: false,
        }
    }

    /// Builder-style velocity setter; keeps `speed` consistent.
    pub fn with_velocity(mut self, velocity: Vector2<f32>) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f32>) {
        self.velocity = velocity;
        let speed = velocity.norm();
        self.speed = if speed.is_finite() { speed } else { 0.0 };
    }

    pub fn is_ball(&self) -> bool {
        self.role.is_ball() || self.team == BALL_TEAM
    }

    pub fn distance_to(&self, point: &Vector2<f32>) -> f32 {
        (self.position - point).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("ball"), Role::Ball);
        assert_eq!(Role::from("REF"), Role::Referee);
        assert_eq!(Role::from(" cb "), Role::Player("CB".into()));
        assert!(Role::from("GK").is_goalkeeper());
        assert!(!Role::from("GK").is_outfield());
        assert!(Role::from("LWB").is_back_line());
        assert!(Role::from("CDM").is_midfield());
        assert!(Role::from("ST").is_forward());
    }

    #[test]
    fn test_role_serde_as_string() {
        let json = serde_json::to_string(&Role::Player("RB".into())).unwrap();
        assert_eq!(json, "\"RB\"");
        let parsed: Role = serde_json::from_str("\"BALL\"").unwrap();
        assert_eq!(parsed, Role::Ball);
    }

    #[test]
    fn test_attack_direction_serde() {
        assert_eq!(serde_json::to_string(&AttackDirection::Negative).unwrap(), "-1");
        let parsed: AttackDirection = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, AttackDirection::Positive);
        assert!(serde_json::from_str::<AttackDirection>("0").is_err());
        assert_eq!(AttackDirection::Negative.forward(), Vector2::new(-1.0, 0.0));
    }

    #[test]
    fn test_speed_tracks_velocity() {
        let entity = EntityState::new("p1", "Home", Role::from("CM"), Vector2::new(0.0, 0.0))
            .with_velocity(Vector2::new(3.0, 4.0));
        assert!((entity.speed - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_ball_detection_by_team() {
        let ball = EntityState::new("b", BALL_TEAM, Role::Player("X".into()), Vector2::zeros());
        assert!(ball.is_ball());
    }
}
