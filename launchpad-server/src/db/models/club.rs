//! Club Model
//!
//! 三个社团共用同一套考勤系统；俱乐部标识贯穿成员、管理员和 JWT claims，
//! 是多租户数据隔离的分区键。

use serde::{Deserialize, Serialize};

/// One of the three fixed organizational tenants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Club {
    Sosc,
    Challengers,
    Src,
}

impl Club {
    /// All tenants, in report order
    pub const ALL: [Club; 3] = [Club::Sosc, Club::Challengers, Club::Src];

    pub fn as_str(&self) -> &'static str {
        match self {
            Club::Sosc => "sosc",
            Club::Challengers => "challengers",
            Club::Src => "src",
        }
    }

    /// Human-readable name used in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Club::Sosc => "SOSC",
            Club::Challengers => "Challengers",
            Club::Src => "SRC",
        }
    }
}

impl std::fmt::Display for Club {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Club {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sosc" => Ok(Club::Sosc),
            "challengers" => Ok(Club::Challengers),
            "src" => Ok(Club::Src),
            other => Err(format!("unknown club: {}", other)),
        }
    }
}
