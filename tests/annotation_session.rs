//! Scan a photo tree, annotate through the controller, save and resume.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use camlabel::annotations::AnnotationStore;
use camlabel::config::Config;
use camlabel::controller::NavOutcome;
use camlabel::cursor::WindowPolicy;
use camlabel::error::{ControllerError, EditError};
use camlabel::schema::LabelSchema;
use camlabel::session::{Session, SessionOrigin};
use tempfile::{tempdir, TempDir};

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    File::create(path).unwrap();
}

/// Participants 3, 7 and 12 with 2, 5 and 1 photos, written out of order.
fn photo_tree() -> (TempDir, Config) {
    let dir = tempdir().unwrap();
    let photos = dir.path().join("photos");
    touch(&photos, "P12/B00000000_21I507_20150621_115702E.JPG");
    touch(&photos, "P7/B00000000_21I507_20141003_121614E.JPG");
    touch(&photos, "P7/B00000000_21I507_20141003_121214E.JPG");
    touch(&photos, "P7/B00000000_21I507_20141003_121514E.JPG");
    touch(&photos, "P7/B00000000_21I507_20141003_121314E.JPG");
    touch(&photos, "P7/B00000000_21I507_20141003_121414E.JPG");
    touch(&photos, "P3/B00000000_21I507_20141201_080100E.JPG");
    touch(&photos, "P3/B00000000_21I507_20141201_080000E.JPG");
    touch(&photos, "unsorted/B00000000_21I507_20141201_080000E.JPG");
    fs::write(dir.path().join("schema.txt"), "walking\nsitting;TV\n\nsleep\n").unwrap();

    let mut config = Config::default();
    config.session.images = Some(photos);
    config.session.schema = Some(dir.path().join("schema.txt"));
    config.session.output = dir.path().join("annotations.csv");
    config.display.width = 3;
    config.display.active = 1;
    config.scanner.workers = 3;
    (dir, config)
}

fn open(config: &Config) -> Session {
    Session::open(config).map_err(|e| e.to_string()).unwrap()
}

#[test]
fn clamped_session_walks_every_row() {
    let (_dir, config) = photo_tree();
    let mut session = open(&config);

    let SessionOrigin::Scanned { discovered, skipped, replaces_existing } = &session.origin else {
        panic!("expected a fresh scan");
    };
    assert_eq!(*discovered, 9);
    assert_eq!(skipped.len(), 1);
    assert!(!replaces_existing);

    let controller = &mut session.controller;
    let mut participants = vec![controller.render_state().unwrap().participant_id];
    while controller.advance().unwrap() == NavOutcome::Moved {
        let state = controller.render_state().unwrap();
        assert!(state.active_offset < state.photos.len());
        assert!(state.photos.len() <= 3);
        participants.push(state.participant_id);
    }
    assert_eq!(participants, vec![3, 3, 7, 7, 7, 7, 7, 12]);

    // The lone photo of participant 12 is shown on its own.
    let last = controller.render_state().unwrap();
    assert_eq!(last.photos.len(), 1);
    assert_eq!(last.active_offset, 0);
    assert_eq!(controller.advance().unwrap(), NavOutcome::AtBoundary);
    assert_eq!(controller.render_state().unwrap(), last);
}

#[test]
fn strict_session_skips_short_participants() {
    let (_dir, mut config) = photo_tree();
    config.display.policy = WindowPolicy::Strict;
    let mut session = open(&config);
    let controller = &mut session.controller;

    let mut rows = vec![controller.active_row().unwrap()];
    while controller.advance().unwrap() == NavOutcome::Moved {
        rows.push(controller.active_row().unwrap());
    }
    assert_eq!(rows, vec![3, 4, 5]);
    for photo in controller.render_state().unwrap().photos {
        assert_eq!(photo.participant_id, 7);
    }

    while controller.retreat().unwrap() == NavOutcome::Moved {}
    assert_eq!(controller.active_row().unwrap(), 3);
}

#[test]
fn annotations_survive_save_and_resume() {
    let (_dir, config) = photo_tree();
    let mut session = open(&config);
    let controller = &mut session.controller;

    controller.set_annotation("sitting;TV", "0.8").unwrap();
    controller.set_annotation("walking", "0.000001").unwrap();
    assert_eq!(
        controller.render_state().unwrap().annotations,
        vec![("sitting;TV".to_string(), 0.8)]
    );
    assert_eq!(controller.advance().unwrap(), NavOutcome::Moved);
    controller.update_comment("lens covered, \"mostly\"").unwrap();

    assert_eq!(
        controller.set_annotation("sleep", "abc"),
        Err(EditError::NotANumber("abc".to_string()))
    );
    assert_eq!(controller.set_annotation("sleep", "1.5"), Err(EditError::OutOfRange(1.5)));
    assert!(matches!(
        controller.set_annotation("not-a-real-label", "1"),
        Err(EditError::UnknownLabel(_))
    ));
    controller.save().unwrap();

    let saved = fs::read_to_string(&config.session.output).unwrap();
    let mut lines = saved.lines();
    assert_eq!(lines.next(), Some("time,id,path,comment,walking,sitting;TV,sleep"));
    // 08:00 GMT in December is 08:00 UTC.
    assert!(lines.next().unwrap().starts_with("2014-12-01T08:00:00+00:00,3,"));
    // 12:12 BST in October is 11:12 UTC.
    assert!(saved.contains("2014-10-03T11:12:14+00:00,7,"));

    let resumed = open(&config);
    assert!(matches!(resumed.origin, SessionOrigin::Resumed { .. }));
    assert_eq!(resumed.controller.active_row().unwrap(), 2);
    let store = resumed.controller.store();
    assert_eq!(store.confidence(0, "sitting;TV").unwrap(), 0.8);
    assert_eq!(store.comment(1).unwrap(), "lens covered, \"mostly\"");
}

#[test]
fn failed_save_blocks_navigation() {
    let (dir, mut config) = photo_tree();
    config.session.output = dir.path().join("missing").join("annotations.csv");
    let mut session = open(&config);

    let err = session.controller.advance().unwrap_err();
    assert!(matches!(err, ControllerError::Persist(_)));
    assert_eq!(session.controller.active_row().unwrap(), 0);
}

#[test]
fn reload_reproduces_table_order() {
    let (_dir, config) = photo_tree();
    let session = open(&config);
    session.controller.save().unwrap();

    let schema = Arc::new(LabelSchema::load(config.session.schema.as_deref().unwrap()).unwrap());
    let loaded = AnnotationStore::load(&config.session.output, schema).unwrap();
    assert_eq!(
        loaded.table().records(),
        session.controller.store().table().records()
    );
}
