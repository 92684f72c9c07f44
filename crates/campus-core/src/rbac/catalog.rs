//! Default permission catalog — static grants per role.
//!
//! Permissions are `(resource, actions, scope, conditions?)` tuples.
//! `manage` subsumes every other action on its resource, and a grant on
//! the `system` resource matches any requested resource. The catalog is a
//! value: resolved onto the principal at authentication time, never
//! mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rbac::hierarchy::Role;

/// Closed enumeration of protected resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    Student,
    Teacher,
    Class,
    Subject,
    Attendance,
    Exam,
    Grade,
    Timetable,
    Fee,
    Tenant,
    Dashboard,
    Report,
    Audit,
    System,
}

impl ResourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Student => "student",
            ResourceKind::Teacher => "teacher",
            ResourceKind::Class => "class",
            ResourceKind::Subject => "subject",
            ResourceKind::Attendance => "attendance",
            ResourceKind::Exam => "exam",
            ResourceKind::Grade => "grade",
            ResourceKind::Timetable => "timetable",
            ResourceKind::Fee => "fee",
            ResourceKind::Tenant => "tenant",
            ResourceKind::Dashboard => "dashboard",
            ResourceKind::Report => "report",
            ResourceKind::Audit => "audit",
            ResourceKind::System => "system",
        }
    }

    pub fn from_name(name: &str) -> Option<ResourceKind> {
        match name {
            "user" => Some(ResourceKind::User),
            "student" => Some(ResourceKind::Student),
            "teacher" => Some(ResourceKind::Teacher),
            "class" => Some(ResourceKind::Class),
            "subject" => Some(ResourceKind::Subject),
            "attendance" => Some(ResourceKind::Attendance),
            "exam" => Some(ResourceKind::Exam),
            "grade" => Some(ResourceKind::Grade),
            "timetable" => Some(ResourceKind::Timetable),
            "fee" => Some(ResourceKind::Fee),
            "tenant" => Some(ResourceKind::Tenant),
            "dashboard" => Some(ResourceKind::Dashboard),
            "report" => Some(ResourceKind::Report),
            "audit" => Some(ResourceKind::Audit),
            "system" => Some(ResourceKind::System),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action verbs. `Manage` subsumes all others for its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Create,
    Read,
    Update,
    Delete,
    Manage,
    View,
    Export,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Read => "read",
            ActionKind::Update => "update",
            ActionKind::Delete => "delete",
            ActionKind::Manage => "manage",
            ActionKind::View => "view",
            ActionKind::Export => "export",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breadth of a permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionScope {
    Global,
    Tenant,
    Own,
}

impl PermissionScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionScope::Global => "global",
            PermissionScope::Tenant => "tenant",
            PermissionScope::Own => "own",
        }
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional constraints on a grant. A fixed shape, not a rule language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionConditions {
    /// Restrict student-record reads to the principal's own children.
    #[serde(default)]
    pub own_children_only: bool,
    /// Restrict class-related writes to classes the principal teaches.
    #[serde(default)]
    pub assigned_classes_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub resource: ResourceKind,
    pub actions: Vec<ActionKind>,
    pub scope: PermissionScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<PermissionConditions>,
}

impl Permission {
    pub fn new(resource: ResourceKind, actions: &[ActionKind], scope: PermissionScope) -> Self {
        Self {
            resource,
            actions: actions.to_vec(),
            scope,
            conditions: None,
        }
    }

    pub fn with_conditions(mut self, conditions: PermissionConditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Whether this grant covers the requested `(resource, action, scope)`.
    ///
    /// A `system` grant matches any resource, `manage` matches any action,
    /// and a `global` grant satisfies any requested scope.
    pub fn allows(
        &self,
        resource: ResourceKind,
        action: ActionKind,
        scope: Option<PermissionScope>,
    ) -> bool {
        let resource_ok = self.resource == resource || self.resource == ResourceKind::System;
        let action_ok =
            self.actions.contains(&action) || self.actions.contains(&ActionKind::Manage);
        let scope_ok = match scope {
            None => true,
            Some(requested) => self.scope == requested || self.scope == PermissionScope::Global,
        };
        resource_ok && action_ok && scope_ok
    }
}

/// The static default grants for a role.
pub fn default_permissions(role: Role) -> Vec<Permission> {
    use ActionKind::*;
    // PermissionScope::Tenant stays qualified: ResourceKind has a Tenant
    // variant too and the globs would collide.
    use PermissionScope::{Global, Own};
    use ResourceKind::*;

    match role {
        Role::SuperAdmin | Role::Manager => {
            vec![Permission::new(System, &[Manage], Global)]
        }
        Role::TenantAdmin => vec![
            Permission::new(User, &[Manage], PermissionScope::Tenant),
            Permission::new(Student, &[Manage], PermissionScope::Tenant),
            Permission::new(Teacher, &[Manage], PermissionScope::Tenant),
            Permission::new(Class, &[Manage], PermissionScope::Tenant),
            Permission::new(Subject, &[Manage], PermissionScope::Tenant),
            Permission::new(Attendance, &[Manage], PermissionScope::Tenant),
            Permission::new(Exam, &[Manage], PermissionScope::Tenant),
            Permission::new(Grade, &[Manage], PermissionScope::Tenant),
            Permission::new(Timetable, &[Manage], PermissionScope::Tenant),
            Permission::new(Fee, &[Manage], PermissionScope::Tenant),
            Permission::new(Dashboard, &[View], PermissionScope::Tenant),
            Permission::new(Report, &[View, Export], PermissionScope::Tenant),
            Permission::new(Audit, &[View, Export], PermissionScope::Tenant),
        ],
        Role::Admin => vec![
            Permission::new(User, &[Create, Read, Update], PermissionScope::Tenant),
            Permission::new(Student, &[Manage], PermissionScope::Tenant),
            Permission::new(Teacher, &[Create, Read, Update], PermissionScope::Tenant),
            Permission::new(Class, &[Manage], PermissionScope::Tenant),
            Permission::new(Subject, &[Manage], PermissionScope::Tenant),
            Permission::new(Attendance, &[Manage], PermissionScope::Tenant),
            Permission::new(Exam, &[Manage], PermissionScope::Tenant),
            Permission::new(Grade, &[Read, View], PermissionScope::Tenant),
            Permission::new(Timetable, &[Manage], PermissionScope::Tenant),
            Permission::new(Fee, &[Manage], PermissionScope::Tenant),
            Permission::new(Dashboard, &[View], PermissionScope::Tenant),
            Permission::new(Report, &[View], PermissionScope::Tenant),
        ],
        Role::Teacher => vec![
            Permission::new(Class, &[Read, Update], PermissionScope::Tenant).with_conditions(
                PermissionConditions {
                    assigned_classes_only: true,
                    ..Default::default()
                },
            ),
            Permission::new(Student, &[Read], PermissionScope::Tenant).with_conditions(
                PermissionConditions {
                    assigned_classes_only: true,
                    ..Default::default()
                },
            ),
            Permission::new(Attendance, &[Create, Read, Update], PermissionScope::Tenant).with_conditions(
                PermissionConditions {
                    assigned_classes_only: true,
                    ..Default::default()
                },
            ),
            Permission::new(Grade, &[Create, Read, Update], PermissionScope::Tenant).with_conditions(
                PermissionConditions {
                    assigned_classes_only: true,
                    ..Default::default()
                },
            ),
            Permission::new(Exam, &[Read], PermissionScope::Tenant),
            Permission::new(Timetable, &[View], PermissionScope::Tenant),
            Permission::new(Dashboard, &[View], Own),
        ],
        Role::Parent => vec![
            Permission::new(Student, &[Read], Own).with_conditions(PermissionConditions {
                own_children_only: true,
                ..Default::default()
            }),
            Permission::new(Grade, &[View], Own).with_conditions(PermissionConditions {
                own_children_only: true,
                ..Default::default()
            }),
            Permission::new(Attendance, &[View], Own).with_conditions(PermissionConditions {
                own_children_only: true,
                ..Default::default()
            }),
            Permission::new(Fee, &[View], Own),
            Permission::new(Exam, &[View], Own),
            Permission::new(Timetable, &[View], Own),
            Permission::new(Dashboard, &[View], Own),
        ],
        Role::Student => vec![
            Permission::new(Grade, &[View], Own),
            Permission::new(Attendance, &[View], Own),
            Permission::new(Exam, &[View], Own),
            Permission::new(Timetable, &[View], Own),
            Permission::new(Fee, &[View], Own),
            Permission::new(Dashboard, &[View], Own),
        ],
    }
}
