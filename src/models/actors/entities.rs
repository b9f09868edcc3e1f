use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户类型，由认证网关提供
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/actor.ts")]
pub enum UserType {
    Admin,   // 管理员
    Teacher, // 教师
    Student, // 学生
}

impl UserType {
    pub const ADMIN: &'static str = "admin";
    pub const TEACHER: &'static str = "teacher";
    pub const STUDENT: &'static str = "student";

    // 可以创建班级的用户类型
    pub fn staff_types() -> &'static [UserType] {
        &[UserType::Admin, UserType::Teacher]
    }
}

impl<'de> Deserialize<'de> for UserType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Admin => write!(f, "{}", Self::ADMIN),
            UserType::Teacher => write!(f, "{}", Self::TEACHER),
            UserType::Student => write!(f, "{}", Self::STUDENT),
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::ADMIN => Ok(UserType::Admin),
            Self::TEACHER => Ok(UserType::Teacher),
            Self::STUDENT => Ok(UserType::Student),
            _ => Err(format!(
                "Invalid user type: '{s}'. Supported: admin, teacher, student"
            )),
        }
    }
}

/// 发起操作的用户
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/actor.ts")]
pub struct Actor {
    pub user_id: i64,
    pub user_type: UserType,
}

impl Actor {
    pub fn new(user_id: i64, user_type: UserType) -> Self {
        Self { user_id, user_type }
    }

    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn is_student(&self) -> bool {
        self.user_type == UserType::Student
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parse() {
        assert_eq!("admin".parse::<UserType>(), Ok(UserType::Admin));
        assert_eq!("student".parse::<UserType>(), Ok(UserType::Student));
        assert!("root".parse::<UserType>().is_err());
    }

    #[test]
    fn test_user_type_deserialize_rejects_unknown() {
        let parsed: Result<UserType, _> = serde_json::from_str("\"teacher\"");
        assert_eq!(parsed.ok(), Some(UserType::Teacher));
        let parsed: Result<UserType, _> = serde_json::from_str("\"guest\"");
        assert!(parsed.is_err());
    }
}
