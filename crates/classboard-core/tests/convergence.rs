//! Two boards wired through an in-process transport.

use classboard_core::hierarchy;
use classboard_core::objects::{InkStroke, Note, NoteSubtype, Zone, ZoneKind};
use classboard_core::{AlignEdge, Board, BoardConfig, ObjectId, SceneObject, SyncMessage, Transport};
use kurbo::Point;

/// Collects broadcasts so the test can deliver them by hand.
#[derive(Default)]
struct FakeTransport {
    sent: Vec<SyncMessage>,
}

impl Transport for FakeTransport {
    fn broadcast(&mut self, message: &SyncMessage) {
        self.sent.push(message.clone());
    }
}

/// Deliver everything `from` has queued to `to`, through the JSON wire format.
///
/// Fails if applying an inbound message makes `to` queue anything: inbound
/// messages must never be re-broadcast.
fn pump(from: &mut Board, to: &mut Board) -> usize {
    let mut wire = FakeTransport::default();
    let count = from.flush_to(&mut wire);
    for message in wire.sent {
        let json = message.to_json().unwrap();
        to.handle_message(&json).unwrap();
        assert!(
            !to.has_outgoing(),
            "applying inbound {} queued a re-broadcast",
            message.type_name()
        );
    }
    count
}

fn assert_converged(a: &Board, b: &Board) {
    assert_eq!(a.scene().snapshot(), b.scene().snapshot());
    assert!(hierarchy::is_consistent(a.scene()));
    assert!(hierarchy::is_consistent(b.scene()));
}

fn peers() -> (Board, Board) {
    let config = BoardConfig { jitter_seed: Some(42), ..BoardConfig::default() };
    (Board::with_config("host", config.clone()), Board::with_config("viewer", config))
}

fn note(text: &str) -> SceneObject {
    SceneObject::Note(Note::new(0.0, 0.0, text).with_size(120.0, 80.0))
}

fn cer(subtype: NoteSubtype) -> SceneObject {
    SceneObject::Note(Note::new(0.0, 0.0, "cer").with_subtype(subtype))
}

#[test]
fn test_zone_session_converges() {
    let (mut host, mut viewer) = peers();

    let zone = host.add_object(SceneObject::Zone(Zone::new(0.0, 0.0, "Ideas", ZoneKind::Plain)), false);
    let a = host.add_to_zone(note("a"), &zone).unwrap();
    let b = host.add_to_zone(note("b"), &zone).unwrap();
    let loose = host.add_object(note("loose"), true);
    assert!(pump(&mut host, &mut viewer) > 0);
    assert_converged(&host, &viewer);

    host.drop_into_zone(&loose, &zone, Point::new(10.0, 60.0));
    pump(&mut host, &mut viewer);
    assert_converged(&host, &viewer);
    let order: Vec<&str> = viewer.zone_members(&zone).iter().map(|m| m.id()).collect();
    assert_eq!(order, vec![loose.as_str(), a.as_str(), b.as_str()]);

    host.move_objects(&[zone.clone()], 40.0, 25.0);
    host.remove_from_zone(&a);
    pump(&mut host, &mut viewer);
    assert_converged(&host, &viewer);
}

#[test]
fn test_zone_delete_orphans_on_both_peers() {
    let (mut host, mut viewer) = peers();
    let zone = host.add_object(SceneObject::Zone(Zone::new(0.0, 0.0, "Exit", ZoneKind::ExitTicket)), false);
    let a = host.add_to_zone(note("a"), &zone).unwrap();
    pump(&mut host, &mut viewer);

    host.delete_many(&[zone.clone()]);
    pump(&mut host, &mut viewer);

    assert_converged(&host, &viewer);
    assert!(viewer.get_object(&zone).is_none());
    assert!(viewer.get_object(&a).unwrap().base().parent_zone_id.is_none());
}

#[test]
fn test_group_delete_converges() {
    let (mut host, mut viewer) = peers();
    let ids: Vec<ObjectId> = (0..3).map(|i| host.add_object(note(&i.to_string()), true)).collect();
    host.group(&ids);
    pump(&mut host, &mut viewer);
    assert_converged(&host, &viewer);

    host.delete_many(&ids[2..]);
    pump(&mut host, &mut viewer);
    assert!(viewer.scene().is_empty());
    assert_converged(&host, &viewer);
}

#[test]
fn test_cer_columns_converge() {
    let (mut host, mut viewer) = peers();
    let zone = host.add_object(SceneObject::Zone(Zone::new(0.0, 0.0, "CER", ZoneKind::Columns3)), false);
    let claim = host.add_to_zone(cer(NoteSubtype::Claim), &zone).unwrap();
    let evidence = host.add_to_zone(cer(NoteSubtype::Evidence), &zone).unwrap();
    let reasoning = host.add_to_zone(cer(NoteSubtype::Reasoning), &zone).unwrap();
    pump(&mut host, &mut viewer);

    assert_converged(&host, &viewer);
    let x = |id: &str| viewer.get_object(id).unwrap().base().x;
    assert!(x(&claim) < x(&evidence));
    assert!(x(&evidence) < x(&reasoning));
}

#[test]
fn test_undo_redo_reach_viewer() {
    let (mut host, mut viewer) = peers();
    host.add_object(note("a"), false);
    host.add_object(note("b"), true);
    pump(&mut host, &mut viewer);

    host.undo();
    pump(&mut host, &mut viewer);
    assert_eq!(viewer.scene().len(), 1);
    assert_converged(&host, &viewer);

    host.redo();
    pump(&mut host, &mut viewer);
    assert_eq!(viewer.scene().len(), 2);
    assert_converged(&host, &viewer);
}

#[test]
fn test_ink_converges() {
    let (mut host, mut viewer) = peers();
    host.add_ink(InkStroke::from_points(vec![Point::new(0.0, 0.0), Point::new(30.0, 30.0)], "#c00", 3.0));
    host.add_ink(InkStroke::from_points(vec![Point::new(300.0, 300.0)], "#00c", 3.0));
    pump(&mut host, &mut viewer);
    assert_converged(&host, &viewer);

    host.erase_ink(Point::new(29.0, 29.0), 4.0);
    pump(&mut host, &mut viewer);
    assert_eq!(viewer.scene().ink().len(), 1);
    assert_converged(&host, &viewer);
}

#[test]
fn test_edits_flow_both_ways() {
    let (mut host, mut viewer) = peers();
    let a = host.add_object(note("a"), false);
    pump(&mut host, &mut viewer);

    let b = viewer.add_object(note("b"), true);
    pump(&mut viewer, &mut host);
    host.align(&[a.clone(), b.clone()], AlignEdge::Top);
    pump(&mut host, &mut viewer);

    assert_converged(&host, &viewer);
    assert_eq!(
        viewer.get_object(&a).unwrap().base().y,
        viewer.get_object(&b).unwrap().base().y
    );
}

#[test]
fn test_late_joiner_gets_full_sync() {
    let (mut host, _) = peers();
    let zone = host.add_object(SceneObject::Zone(Zone::new(0.0, 0.0, "Z", ZoneKind::Freeform)), false);
    host.add_to_zone(note("a"), &zone);
    host.take_outgoing();

    let mut late = Board::new("late");
    host.broadcast_full_sync();
    pump(&mut host, &mut late);
    assert_converged(&host, &late);
}

#[test]
fn test_echo_is_harmless() {
    let (mut host, _) = peers();
    host.add_object(note("a"), false);
    let before = host.scene().snapshot();

    let mut wire = FakeTransport::default();
    host.flush_to(&mut wire);
    for message in wire.sent {
        assert!(!host.apply_remote(message));
    }
    assert!(!host.has_outgoing());
    assert_eq!(host.scene().snapshot(), before);
}

/// Feed `board` its own pending messages and check none of them counts as a change.
fn assert_echo_is_noop(board: &mut Board) {
    let mut wire = FakeTransport::default();
    board.flush_to(&mut wire);
    board.take_dirty();
    let before = board.scene().snapshot();
    for message in wire.sent {
        let kind = message.type_name();
        assert!(!board.apply_remote(message), "echoed {} reported a change", kind);
    }
    assert!(!board.is_dirty());
    assert_eq!(board.scene().snapshot(), before);
}

#[test]
fn test_echoed_updates_leave_board_clean() {
    let (mut host, _) = peers();
    let zone = host.add_object(SceneObject::Zone(Zone::new(0.0, 0.0, "Ideas", ZoneKind::Plain)), false);
    assert_echo_is_noop(&mut host);
    let a = host.add_to_zone(note("a"), &zone).unwrap();
    assert_echo_is_noop(&mut host);
    host.add_to_zone(note("b"), &zone).unwrap();
    assert_echo_is_noop(&mut host);

    host.move_objects(&[zone.clone()], 25.0, 0.0);
    assert_echo_is_noop(&mut host);

    let mut edited = host.get_object(&a).unwrap().clone();
    edited.base_mut().locked = true;
    assert!(host.update_object(edited));
    assert_echo_is_noop(&mut host);

    host.group(&[a, zone]);
    assert_echo_is_noop(&mut host);
}

#[test]
fn test_malformed_message_does_not_desync() {
    let (mut host, mut viewer) = peers();
    host.add_object(note("a"), false);
    pump(&mut host, &mut viewer);

    assert!(viewer.handle_message(r#"{"type":"NOTE_UPDATE","note":{"kind":"rocket"}}"#).is_err());
    assert_converged(&host, &viewer);
}
