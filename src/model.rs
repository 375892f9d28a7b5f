use serde::{Deserialize, Serialize};

/// A student as it goes over the wire: no reference back to its classroom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub classroom_id: i64,
}

/// A classroom with its students nested underneath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
}

pub const SEED_CLASSROOMS: i64 = 5;
pub const SEED_STUDENTS_PER_CLASSROOM: i64 = 4;

/// The rows the initial migration inserts, in id order.
///
/// Classroom `n` owns students `4(n-1)+1 ..= 4n`.
pub fn seed_plan() -> Vec<Classroom> {
    (1..=SEED_CLASSROOMS)
        .map(|class_id| {
            let first = (class_id - 1) * SEED_STUDENTS_PER_CLASSROOM + 1;
            let students = (first..first + SEED_STUDENTS_PER_CLASSROOM)
                .map(|id| Student {
                    id,
                    name: format!("Student {}", id),
                    classroom_id: class_id,
                })
                .collect();
            Classroom {
                id: class_id,
                name: format!("Class {}", class_id),
                students,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn student_serializes_flat_with_camel_case_fk() {
        let s = Student {
            id: 3,
            name: "Student 3".into(),
            classroom_id: 1,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, json!({"id": 3, "name": "Student 3", "classroomId": 1}));
        assert!(v.get("classroom").is_none());
    }

    #[test]
    fn classroom_nests_students_without_back_reference() {
        let c = seed_plan().remove(0);
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["name"], "Class 1");
        let students = v["students"].as_array().unwrap();
        assert_eq!(students.len(), 4);
        for s in students {
            assert_eq!(s.as_object().unwrap().len(), 3);
            assert_eq!(s["classroomId"], 1);
        }
    }

    #[test]
    fn classroom_without_students_field_deserializes_empty() {
        let c: Classroom = serde_json::from_str(r#"{"id":9,"name":"Class 9"}"#).unwrap();
        assert!(c.students.is_empty());
    }

    #[test]
    fn seed_plan_layout() {
        let plan = seed_plan();
        assert_eq!(plan.len(), 5);
        let ids: Vec<i64> = plan
            .iter()
            .flat_map(|c| c.students.iter().map(|s| s.id))
            .collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(plan[4].students[0].name, "Student 17");
        assert!(plan
            .iter()
            .all(|c| c.students.iter().all(|s| s.classroom_id == c.id)));
    }
}
