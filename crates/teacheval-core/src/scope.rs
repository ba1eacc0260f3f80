//! Supervisor scope resolution.
//!
//! A supervisor sees either the teachers listed explicitly in
//! `responsibleTeachers` or, when that list is empty, the teachers of the
//! colleges in `responsibleColleges`. The two sources are never combined.
//! Anything that does not resolve to a supervisor yields an empty scope.

use std::collections::HashSet;

use crate::id::EntityId;
use crate::model::{Course, Role, User};
use crate::store::Snapshot;

fn supervisor<'a>(snapshot: &'a Snapshot, supervisor_id: &EntityId) -> Option<&'a User> {
    snapshot
        .user(supervisor_id)
        .filter(|u| u.role == Role::Supervisor)
}

/// Teacher-role users within the supervisor's scope, in storage order.
pub fn supervisor_teachers<'a>(snapshot: &'a Snapshot, supervisor_id: &EntityId) -> Vec<&'a User> {
    let Some(sup) = supervisor(snapshot, supervisor_id) else {
        tracing::debug!(supervisor_id = %supervisor_id, "not a supervisor, empty scope");
        return Vec::new();
    };

    let teachers = snapshot.users.iter().filter(|u| u.role == Role::Teacher);

    if !sup.responsible_teachers.is_empty() {
        let wanted: HashSet<&EntityId> = sup.responsible_teachers.iter().collect();
        tracing::debug!(supervisor_id = %supervisor_id, "scope from explicit teacher list");
        return teachers.filter(|u| wanted.contains(&u.id)).collect();
    }

    if !sup.responsible_colleges.is_empty() {
        tracing::debug!(supervisor_id = %supervisor_id, "scope from responsible colleges");
        return teachers
            .filter(|u| sup.responsible_colleges.contains(&u.college))
            .collect();
    }

    Vec::new()
}

/// Ids of [`supervisor_teachers`].
pub fn supervisor_teacher_ids(snapshot: &Snapshot, supervisor_id: &EntityId) -> Vec<EntityId> {
    supervisor_teachers(snapshot, supervisor_id)
        .into_iter()
        .map(|u| u.id.clone())
        .collect()
}

/// Courses in the supervisor's scope.
///
/// A course qualifies when its college is a responsible college and its
/// teacher is a resolved teacher. Each condition holds vacuously when its
/// source set is empty.
pub fn supervisor_courses<'a>(snapshot: &'a Snapshot, supervisor_id: &EntityId) -> Vec<&'a Course> {
    let Some(sup) = supervisor(snapshot, supervisor_id) else {
        return Vec::new();
    };
    let colleges = &sup.responsible_colleges;
    let teacher_ids: HashSet<EntityId> = supervisor_teacher_ids(snapshot, supervisor_id)
        .into_iter()
        .collect();

    snapshot
        .courses
        .iter()
        .filter(|c| colleges.is_empty() || colleges.contains(&c.college))
        .filter(|c| teacher_ids.is_empty() || teacher_ids.contains(&c.teacher_id))
        .collect()
}

/// Users whose college is `college`.
pub fn college_users<'a>(snapshot: &'a Snapshot, college: &str) -> Vec<&'a User> {
    if college.trim().is_empty() {
        return Vec::new();
    }
    snapshot.users.iter().filter(|u| u.college == college).collect()
}

/// Courses offered by `college`.
pub fn college_courses<'a>(snapshot: &'a Snapshot, college: &str) -> Vec<&'a Course> {
    if college.trim().is_empty() {
        return Vec::new();
    }
    snapshot
        .courses
        .iter()
        .filter(|c| c.college == college)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::Credential;

    fn user(id: u64, role: Role, college: &str) -> User {
        User {
            id: EntityId::from(id),
            username: format!("u{id}"),
            credential: Credential::Legacy("x".into()),
            display_name: format!("User {id}"),
            role,
            college: college.into(),
            responsible_colleges: vec![],
            responsible_teachers: vec![],
        }
    }

    fn course(id: u64, teacher: u64, college: &str) -> Course {
        Course {
            id: EntityId::from(id),
            name: format!("Course {id}"),
            teacher_id: EntityId::from(teacher),
            teacher_name: String::new(),
            college: college.into(),
            semester: "2025 Spring".into(),
        }
    }

    /// Teachers 1, 2 in IE; teacher 3 in Math; admin 4 in IE.
    fn snapshot(sup: User) -> Snapshot {
        Snapshot {
            users: vec![
                user(1, Role::Teacher, "IE"),
                user(2, Role::Teacher, "IE"),
                user(3, Role::Teacher, "Math"),
                user(4, Role::CollegeAdmin, "IE"),
                sup,
            ],
            courses: vec![course(10, 1, "IE"), course(11, 2, "IE"), course(12, 3, "Math")],
            ..Snapshot::default()
        }
    }

    fn ids(users: &[&User]) -> Vec<u64> {
        users.iter().map(|u| u.id.as_str().parse().unwrap()).collect()
    }

    #[test]
    fn explicit_teachers_win_over_colleges() {
        let mut sup = user(9, Role::Supervisor, "IE");
        sup.responsible_teachers = vec![EntityId::from(1u64), EntityId::from(3u64)];
        sup.responsible_colleges = vec!["IE".into()];
        let snap = snapshot(sup);

        // Teacher 2 is in a responsible college but not in the explicit list.
        assert_eq!(ids(&supervisor_teachers(&snap, &EntityId::from(9u64))), vec![1, 3]);
    }

    #[test]
    fn explicit_list_ignores_non_teachers_and_unknown_ids() {
        let mut sup = user(9, Role::Supervisor, "IE");
        sup.responsible_teachers = vec![EntityId::from(4u64), EntityId::from(77u64), EntityId::from(2u64)];
        let snap = snapshot(sup);
        assert_eq!(ids(&supervisor_teachers(&snap, &EntityId::from(9u64))), vec![2]);
    }

    #[test]
    fn college_fallback_when_no_explicit_teachers() {
        let mut sup = user(9, Role::Supervisor, "IE");
        sup.responsible_colleges = vec!["IE".into()];
        let snap = snapshot(sup);
        assert_eq!(ids(&supervisor_teachers(&snap, &EntityId::from(9u64))), vec![1, 2]);
    }

    #[test]
    fn empty_or_invalid_scope_fails_closed() {
        let snap = snapshot(user(9, Role::Supervisor, "IE"));
        assert!(supervisor_teachers(&snap, &EntityId::from(9u64)).is_empty());
        // Not a supervisor.
        assert!(supervisor_teachers(&snap, &EntityId::from(4u64)).is_empty());
        // Unknown id.
        assert!(supervisor_teachers(&snap, &EntityId::from(404u64)).is_empty());
        assert!(supervisor_courses(&snap, &EntityId::from(404u64)).is_empty());
    }

    #[test]
    fn courses_and_both_filters() {
        let mut sup = user(9, Role::Supervisor, "IE");
        sup.responsible_teachers = vec![EntityId::from(2u64), EntityId::from(3u64)];
        sup.responsible_colleges = vec!["IE".into()];
        let snap = snapshot(sup);

        // Teacher 3 is in scope but teaches in Math, which is not a responsible college.
        let courses = supervisor_courses(&snap, &EntityId::from(9u64));
        let course_ids: Vec<&str> = courses.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(course_ids, vec!["11"]);
    }

    #[test]
    fn courses_with_no_constraints_are_all_courses() {
        // Supervisor with neither list: college filter and teacher filter are vacuous.
        let snap = snapshot(user(9, Role::Supervisor, "IE"));
        assert_eq!(supervisor_courses(&snap, &EntityId::from(9u64)).len(), 3);
    }

    #[test]
    fn college_lookups() {
        let snap = snapshot(user(9, Role::Supervisor, "IE"));
        assert_eq!(college_users(&snap, "IE").len(), 4);
        assert_eq!(college_courses(&snap, "Math").len(), 1);
        assert!(college_courses(&snap, " ").is_empty());
    }
}
