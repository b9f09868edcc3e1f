//! 测试用班级构造器

use chrono::Utc;
use std::collections::BTreeSet;

use crate::errors::Result;
use crate::models::actors::entities::{Actor, UserType};
use crate::models::classes::entities::{Class, ClassStatus};
use crate::models::groups::entities::{ClassMember, Group, GroupStatus, Membership};
use crate::models::groups::requests::{CreateGroupRequest, CreateRoleRequest};
use crate::models::tasks::requests::CreateTaskRequest;

use super::{Applied, ClassState, Command, Subject, execute};

pub const TEACHER_USER: i64 = 500;
pub const FIRST_STUDENT_USER: i64 = 600;

pub fn class(id: i64) -> Class {
    let now = Utc::now();
    Class {
        id,
        name: "Software Engineering Project".into(),
        description: None,
        status: ClassStatus::NotStarted,
        first_task_id: None,
        version: 1,
        created_at: now,
        updated_at: now,
    }
}

pub fn group(class_id: i64, id: i64) -> Group {
    Group {
        id,
        class_id,
        name: format!("Group {id}"),
        status: GroupStatus::Pending,
        current_task_id: None,
        created_at: Utc::now(),
    }
}

pub fn member(class_id: i64, id: i64, user_id: i64, membership: Membership) -> ClassMember {
    ClassMember {
        id,
        class_id,
        user_id,
        is_teacher: false,
        membership,
        role_ids: BTreeSet::new(),
        joined_at: Utc::now(),
    }
}

pub fn teacher_member(class_id: i64, id: i64, user_id: i64) -> ClassMember {
    ClassMember {
        is_teacher: true,
        ..member(class_id, id, user_id, Membership::Unassigned)
    }
}

pub struct Fixture {
    pub state: ClassState,
    pub teacher: Actor,
    pub admin: Actor,
    pub students: Vec<Actor>,
    /// 角色ID，按创建顺序；第一个为组长角色
    pub roles: Vec<i64>,
    /// 任务ID，按链表顺序
    pub tasks: Vec<i64>,
}

impl Fixture {
    /// 未开始的空班级，只有一名教师成员
    pub fn new() -> Self {
        let mut state = ClassState::new(class(1));
        state.insert_member(teacher_member(1, 1, TEACHER_USER));
        Self {
            state,
            teacher: Actor::new(TEACHER_USER, UserType::Teacher),
            admin: Actor::new(1, UserType::Admin),
            students: Vec::new(),
            roles: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// 带组长角色与 n 个任务的未开始班级
    pub fn with_tasks(n: usize) -> Self {
        let mut fx = Self::new();
        fx.add_manager_role("manager");
        fx.add_tasks(n);
        fx
    }

    /// 分组阶段的班级：`roles[0]` 为组长角色，另有 n 名未分组学生
    pub fn grouping(roles: &[&str], n_students: usize) -> Self {
        let mut fx = Self::new();
        for (i, name) in roles.iter().enumerate() {
            if i == 0 {
                fx.add_manager_role(name);
            } else {
                fx.add_role(name);
            }
        }
        fx.add_students(n_students);
        fx.run_as_teacher(Command::StartGrouping).unwrap();
        fx
    }

    /// 教学阶段的班级：一个已审核分组，学生 0 为组长，学生 i 持有 `roles[i]`
    pub fn teaching(roles: &[&str], n_students: usize, n_tasks: usize) -> Self {
        let mut fx = Self::grouping(roles, n_students);
        fx.add_tasks(n_tasks);
        fx.run_as_student(
            0,
            Command::CreateGroup(CreateGroupRequest {
                name: "Alpha".into(),
                leader_member_id: None,
            }),
        )
        .unwrap();
        let group_id = fx.group_id();
        for i in 1..n_students {
            fx.assign_directly(group_id, i);
            if let Some(&role_id) = fx.roles.get(i) {
                let class_member_id = fx.member_id(i);
                fx.run_as_teacher(Command::AssignRoles {
                    group_id,
                    class_member_id,
                    role_ids: vec![role_id],
                })
                .unwrap();
            }
        }
        fx.run_as_teacher(Command::ApproveGroup { group_id }).unwrap();
        fx.run_as_teacher(Command::StartTeaching).unwrap();
        fx
    }

    pub fn run(&mut self, actor: Actor, command: Command) -> Result<Applied> {
        execute(&mut self.state, &actor, command)
    }

    pub fn run_as_teacher(&mut self, command: Command) -> Result<Applied> {
        self.run(self.teacher, command)
    }

    pub fn run_as_student(&mut self, index: usize, command: Command) -> Result<Applied> {
        self.run(self.students[index], command)
    }

    fn add_manager_role(&mut self, name: &str) -> i64 {
        self.create_role(name, true)
    }

    pub fn add_role(&mut self, name: &str) -> i64 {
        self.create_role(name, false)
    }

    fn create_role(&mut self, name: &str, is_manager: bool) -> i64 {
        let applied = self
            .run_as_teacher(Command::CreateRole(CreateRoleRequest {
                role_name: name.into(),
                role_description: None,
                is_manager,
            }))
            .unwrap();
        let Subject::Role { role_id } = applied.subject else {
            panic!("expected role subject");
        };
        self.roles.push(role_id);
        role_id
    }

    pub fn add_students(&mut self, n: usize) {
        for _ in 0..n {
            let user_id = FIRST_STUDENT_USER + self.students.len() as i64;
            self.run_as_teacher(Command::AddMember {
                user_id,
                is_teacher: false,
            })
            .unwrap();
            self.students.push(Actor::new(user_id, UserType::Student));
        }
    }

    pub fn add_tasks(&mut self, n: usize) {
        for _ in 0..n {
            let applied = self
                .run_as_teacher(Command::CreateTask(CreateTaskRequest {
                    name: format!("Task {}", self.tasks.len() + 1),
                    content: None,
                    specified_role: None,
                    grade_percentage: 20.0,
                }))
                .unwrap();
            let Subject::Task { task_id } = applied.subject else {
                panic!("expected task subject");
            };
            self.tasks.push(task_id);
        }
    }

    /// 教师直接把学生 i 分配进分组
    pub fn assign_directly(&mut self, group_id: i64, index: usize) {
        let class_member_id = self.member_id(index);
        self.run_as_teacher(Command::RequestMembership {
            group_id,
            class_member_id,
        })
        .unwrap();
    }

    pub fn member_id(&self, index: usize) -> i64 {
        self.state
            .member_by_user(self.students[index].user_id)
            .map(|m| m.id)
            .expect("student is not a class member")
    }

    /// 最早创建的分组
    pub fn group_id(&self) -> i64 {
        self.state
            .groups()
            .map(|g| g.id)
            .max()
            .expect("fixture has no group")
    }
}
