// tests/core_tests.rs
use annotator_core::{
    AnnotationCollection, DotRef, InputEvent, Outcome, PendingDelete, Point, SelectionBox, Session,
    UndoRedoManager,
    export::export_rows,
    geometry::is_dot_inside_box,
    template::find_builtin,
};

fn single_dot(frame: u32, x: f64, y: f64) -> (AnnotationCollection, DotRef) {
    let mut collection = AnnotationCollection::new();
    let dot = collection.add_dot(frame, Point::new(x, y), None).unwrap();
    (collection, dot)
}

#[test]
fn test_add_dot_on_empty_collection() {
    let (collection, dot) = single_dot(1, 10.0, 20.0);

    assert_eq!(collection.len(), 1);
    let annotation = collection.find(&dot.annotation_id).unwrap();
    assert_eq!(annotation.label, "");
    assert_eq!(annotation.frames.len(), 1);
    let record = &annotation.frames[0];
    assert_eq!(record.frame, 1);
    assert_eq!(record.dots.len(), 1);
    assert_eq!((record.dots[0].x, record.dots[0].y), (10.0, 20.0));
    assert_eq!(record.dots[0].color, "black");
    assert!(record.lines.is_empty());
}

#[test]
fn test_click_chain_draws_line_between_dots() {
    let mut session = Session::default();
    session.set_frame(1);

    let Outcome::DotAdded { dot: a, .. } = session.handle(&InputEvent::primary_click(10.0, 20.0)) else {
        panic!("expected a new dot");
    };
    assert_eq!(session.handle(&InputEvent::primary_click(11.0, 21.0)), Outcome::DotSelected(a.clone()));

    let Outcome::DotAdded { dot: b, line_id: Some(line_id) } = session.handle(&InputEvent::primary_click(80.0, 20.0)) else {
        panic!("expected a chained dot");
    };

    let collection = session.collection();
    assert_eq!(collection.len(), 1);
    let record = collection.frame_record(&a.annotation_id, 1).unwrap();
    assert_eq!(record.dots.len(), 2);
    assert_eq!(record.lines.len(), 1);
    assert_eq!(record.lines[0].id, line_id);
    assert_eq!(record.lines[0].start_dot_id, a.dot_id);
    assert_eq!(record.lines[0].end_dot_id, b.dot_id);
    assert_eq!(session.controller().selected(), Some(&b));
    assert_eq!(session.controller().previous_dot(), Some(&a));
}

#[test]
fn test_propagate_copies_nearest_earlier_frame() {
    let mut collection = AnnotationCollection::new();
    let a = collection.add_dot(3, Point::new(1.0, 1.0), None).unwrap();
    let b = collection.add_dot(3, Point::new(9.0, 9.0), Some(&a)).unwrap();
    collection.add_line(&a.annotation_id, 3, &a.dot_id, &b.dot_id);

    assert_eq!(collection.propagate_previous_frame(5), Some(3));

    let source = collection.frame_record(&a.annotation_id, 3).unwrap().clone();
    let copy = collection.frame_record(&a.annotation_id, 5).unwrap();
    assert_eq!(copy.frame, 5);
    assert_eq!(copy.dots, source.dots);
    assert_eq!(copy.lines, source.lines);
    assert!(collection.frame_record(&a.annotation_id, 4).is_none());

    // the copy is independent of its source
    collection.move_dot(&a.annotation_id, 5, &a.dot_id, 50.0, 50.0);
    assert_eq!(collection.dot(&a.annotation_id, 3, &a.dot_id).unwrap().x, 1.0);
}

#[test]
fn test_propagate_never_reads_frame_zero() {
    let (mut collection, _) = single_dot(0, 1.0, 1.0);
    let before = collection.clone();
    assert_eq!(collection.propagate_previous_frame(4), None);
    assert_eq!(collection, before);
}

#[test]
fn test_history_scenario() {
    let (mut collection, a) = single_dot(1, 0.0, 0.0);
    collection.add_dot(1, Point::new(5.0, 5.0), Some(&a));
    let mut manager = UndoRedoManager::new(&collection);

    let mut saves = Vec::new();
    for step in 0..3 {
        collection.move_dot(&a.annotation_id, 1, &a.dot_id, step as f64 * 10.0, 0.0);
        manager.save_state(&collection, "Move dot");
        saves.push(collection.clone());
    }

    manager.undo();
    let restored = manager.undo().unwrap();
    assert_eq!(restored, saves[0]);
}

#[test]
fn test_undo_redo_round_trip() {
    let mut collection = AnnotationCollection::new();
    let mut manager = UndoRedoManager::new(&collection);
    let n = 6;
    for i in 0..n {
        collection.add_dot(1, Point::new(i as f64, 0.0), None);
        manager.save_state(&collection, "Add dot");
    }
    let last = collection.clone();

    for _ in 0..n - 1 {
        assert!(manager.undo().is_some());
    }
    let mut state = None;
    for _ in 0..n - 1 {
        state = manager.redo();
    }
    assert_eq!(state, Some(last));
    assert!(manager.redo().is_none());
}

#[test]
fn test_saving_after_undo_drops_redo() {
    let mut collection = AnnotationCollection::new();
    let mut manager = UndoRedoManager::new(&collection);
    collection.add_dot(1, Point::new(0.0, 0.0), None);
    manager.save_state(&collection, "Add dot");
    collection.add_dot(1, Point::new(5.0, 0.0), None);
    manager.save_state(&collection, "Add dot");

    let mut rewound = manager.undo().unwrap();
    rewound.add_dot(2, Point::new(1.0, 1.0), None);
    manager.save_state(&rewound, "Add dot");

    assert!(manager.redo().is_none());
    assert!(!manager.can_redo());
}

#[test]
fn test_remove_dot_cascades_and_prunes() {
    let mut collection = AnnotationCollection::new();
    let a = collection.add_dot(2, Point::new(0.0, 0.0), None).unwrap();
    let b = collection.add_dot(2, Point::new(10.0, 0.0), Some(&a)).unwrap();
    let c = collection.add_dot(2, Point::new(20.0, 0.0), Some(&a)).unwrap();
    collection.add_line(&a.annotation_id, 2, &a.dot_id, &b.dot_id);
    collection.add_line(&a.annotation_id, 2, &b.dot_id, &c.dot_id);
    collection.add_line(&a.annotation_id, 2, &c.dot_id, &a.dot_id);

    collection.remove_dot(&a.annotation_id, 2, &b.dot_id);
    let record = collection.frame_record(&a.annotation_id, 2).unwrap();
    assert!(record.lines.iter().all(|l| !l.touches(&b.dot_id)));
    assert_eq!(record.lines.len(), 1);

    collection.remove_dot(&a.annotation_id, 2, &a.dot_id);
    collection.remove_dot(&a.annotation_id, 2, &c.dot_id);
    assert!(collection.find(&a.annotation_id).is_none());
    assert!(collection.is_empty());
}

#[test]
fn test_box_select_and_delete() {
    let mut session = Session::default();
    session.set_frame(1);
    for x in [10.0, 30.0, 200.0] {
        session.handle(&InputEvent::primary_click(x, 10.0));
    }
    assert_eq!(session.collection().dot_count(), 3);

    session.handle(&InputEvent::drag_start(0.0, 0.0).at_time(1_000));
    // too soon after the press to count as a box drag
    assert_eq!(session.handle(&InputEvent::drag_move(50.0, 50.0).at_time(1_100)), Outcome::Ignored);
    session.handle(&InputEvent::drag_move(50.0, 50.0).at_time(1_400));
    assert_eq!(
        session.handle(&InputEvent::drag_end(50.0, 50.0).at_time(1_500)),
        Outcome::BoxSelected { count: 2 }
    );
    assert_eq!(session.controller().box_selected().len(), 2);

    // a plain click while the box selection is active adds nothing
    assert_eq!(session.handle(&InputEvent::primary_click(120.0, 120.0)), Outcome::Ignored);

    let target = session.controller().box_selected()[0].clone();
    let outcome = session.handle(&InputEvent::secondary_click(10.0, 10.0).on_dot(target).at_screen(500.0, 300.0));
    let Outcome::ConfirmationRequested(PendingDelete::AllSelected { dots, .. }) = outcome else {
        panic!("expected a delete-all confirmation");
    };
    assert_eq!(dots.len(), 2);

    assert_eq!(session.confirm_delete(), Outcome::SelectionDeleted { count: 2 });
    assert_eq!(session.collection().dot_count(), 1);
    assert!(session.controller().box_selected().is_empty());

    assert!(session.undo());
    assert_eq!(session.collection().dot_count(), 3);
}

#[test]
fn test_middle_click_clears_frame_only() {
    let mut session = Session::default();
    session.set_frame(1);
    session.handle(&InputEvent::primary_click(10.0, 10.0));
    session.set_frame(2);
    session.handle(&InputEvent::primary_click(10.0, 10.0));
    session.handle(&InputEvent::primary_click(40.0, 10.0));

    assert_eq!(session.handle(&InputEvent::middle_click(0.0, 0.0)), Outcome::FrameCleared);
    assert_eq!(session.collection().dots_at(2).count(), 0);
    assert_eq!(session.collection().dots_at(1).count(), 1);
}

#[test]
fn test_dot_inside_box_is_inclusive() {
    let (collection, dot) = single_dot(1, 10.0, 20.0);
    let dot = collection.dot(&dot.annotation_id, 1, &dot.dot_id).unwrap();

    assert!(is_dot_inside_box(dot, &SelectionBox::new(10.0, 20.0, 5.0, 5.0)));
    assert!(is_dot_inside_box(dot, &SelectionBox::new(0.0, 0.0, 10.0, 20.0)));
    assert!(!is_dot_inside_box(dot, &SelectionBox::new(0.0, 0.0, 9.9, 20.0)));
    assert!(is_dot_inside_box(dot, &SelectionBox::new(30.0, 40.0, -20.0, -20.0).normalized()));
}

#[test]
fn test_templates_center_on_request() {
    for id in ["human-pose", "hand-pose", "face-landmarks"] {
        let template = find_builtin(id).unwrap();
        let result = template.apply(250.0, 125.0);
        let n = result.dots.len() as f64;
        let cx = result.dots.iter().map(|d| d.x).sum::<f64>() / n;
        let cy = result.dots.iter().map(|d| d.y).sum::<f64>() / n;
        assert!((cx - 250.0).abs() < 1e-9, "{} centroid x {}", id, cx);
        assert!((cy - 125.0).abs() < 1e-9, "{} centroid y {}", id, cy);
        assert!(result.dots.iter().all(|d| d.color == "red"));
    }
}

#[test]
fn test_export_rows_after_editing() {
    let mut session = Session::default();
    session.set_frame(30);
    session.handle(&InputEvent::primary_click(10.4, 20.6));
    session.handle(&InputEvent::primary_click(10.4, 20.6));
    session.handle(&InputEvent::primary_click(60.0, 20.0));

    let rows = export_rows(session.collection(), 15.0);
    assert_eq!(rows.dots.len(), 2);
    assert_eq!(rows.lines.len(), 1);
    assert_eq!(rows.dots[0].time_seconds, 2.0);
    assert_eq!((rows.dots[0].x, rows.dots[0].y), (10, 21));
    assert_eq!(rows.lines[0].start_dot_id, rows.dots[0].dot_id);
}

#[test]
fn test_save_and_load_file() -> annotator_core::Result<()> {
    let mut session = Session::default();
    session.set_frame(2);
    session.apply_template("hand-pose", 100.0, 100.0)?;
    let path = std::env::temp_dir().join(format!("annotator-core-{}.json", std::process::id()));

    session.collection().save(&path)?;
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"startDotId\""));
    let loaded = AnnotationCollection::load(&path)?;
    assert_eq!(&loaded, session.collection());

    std::fs::remove_file(&path).ok();
    Ok(())
}
