// tests/reorder_test.rs

use course_studio::{
    editor::{EditorSession, LessonForm, MoveRequest, SectionForm},
    error::AppError,
    models::EntityId,
};

fn session_with_sections(titles: &[&str]) -> (EditorSession, Vec<EntityId>) {
    let mut session = EditorSession::new();
    let mut ids = Vec::new();
    for title in titles {
        let id = session.add_section();
        session
            .save_section(SectionForm {
                id: id.clone(),
                title: title.to_string(),
                description: None,
            })
            .unwrap();
        ids.push(id);
    }
    (session, ids)
}

fn add_titled_lesson(session: &mut EditorSession, section_id: &EntityId, title: &str) -> EntityId {
    let id = session.add_lesson(section_id).unwrap();
    let content = session.lesson(&id).unwrap().content.clone();
    session
        .save_lesson(
            section_id,
            LessonForm {
                id: id.clone(),
                title: title.to_string(),
                description: String::new(),
                content,
                duration_secs: 0,
                preview: false,
            },
        )
        .unwrap();
    id
}

#[test]
fn test_section_reorder_moves_and_renumbers() {
    // 场景: [A, B, C] 中把 C 拖到第 0 位
    let (mut session, _) = session_with_sections(&["A", "B", "C"]);

    let moved = session
        .apply_move(&MoveRequest::Section { from: 2, to: 0 })
        .unwrap();

    assert!(moved);
    let titles: Vec<&str> = session
        .sections_in_order()
        .iter()
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(titles, vec!["C", "A", "B"]);
    let orders: Vec<u32> = session.sections_in_order().iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_reorder_to_same_position_is_noop() {
    let (mut session, _) = session_with_sections(&["A", "B", "C"]);
    let before = session.clone();

    let moved = session
        .apply_move(&MoveRequest::Section { from: 1, to: 1 })
        .unwrap();

    // 同位置拖放是幂等的: 树按值与移动前完全相等
    assert!(!moved);
    assert_eq!(session, before);
}

#[test]
fn test_lesson_reorder_within_section() {
    let (mut session, section_ids) = session_with_sections(&["第一章"]);
    let section_id = section_ids[0].clone();
    add_titled_lesson(&mut session, &section_id, "一");
    add_titled_lesson(&mut session, &section_id, "二");
    add_titled_lesson(&mut session, &section_id, "三");

    let moved = session
        .apply_move(&MoveRequest::Lesson {
            from_section: section_id.clone(),
            to_section: section_id.clone(),
            from: 0,
            to: 2,
        })
        .unwrap();

    assert!(moved);
    let lessons = session.lessons_of(&section_id);
    let titles: Vec<&str> = lessons.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["二", "三", "一"]);
    let orders: Vec<u32> = lessons.iter().map(|l| l.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);
}

#[test]
fn test_cross_section_lesson_move_is_rejected_as_noop() {
    let (mut session, section_ids) = session_with_sections(&["第一章", "第二章"]);
    add_titled_lesson(&mut session, &section_ids[0], "一");
    add_titled_lesson(&mut session, &section_ids[1], "二");
    let before = session.clone();

    // 跨章节的课时移动不在支持范围内，作为 no-op 拒绝
    let moved = session
        .apply_move(&MoveRequest::Lesson {
            from_section: section_ids[0].clone(),
            to_section: section_ids[1].clone(),
            from: 0,
            to: 0,
        })
        .unwrap();

    assert!(!moved);
    assert_eq!(session, before);
}

#[test]
fn test_out_of_range_index_is_validation_error() {
    let (mut session, _) = session_with_sections(&["A", "B"]);

    let result = session.apply_move(&MoveRequest::Section { from: 0, to: 5 });

    assert!(matches!(
        result,
        Err(AppError::Validation { ref field, .. }) if field == "order"
    ));
}
