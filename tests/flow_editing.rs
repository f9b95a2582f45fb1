//! End-to-end editing scenarios driven through the public store API.
mod common;
use chatflow_builder::config_panel::{apply_actions, PanelAction};
use chatflow_builder::prelude::*;
use common::*;
use egui::Pos2;
use std::sync::Arc;

#[test]
fn dropping_a_button_on_the_seeded_flow() {
    let mut store = FlowStore::seeded();
    assert_eq!(store.nodes().len(), 2);
    assert_eq!(store.edges().len(), 1);

    let id = store
        .drop_node(Some("button"), Pos2::new(100.0, 100.0), Pos2::ZERO)
        .expect("button drop should create a node");

    assert_eq!(store.nodes().len(), 3);
    let last = store.nodes().last().unwrap();
    assert_eq!(last.id, id);
    assert_eq!(last.kind(), NodeKind::Button);
    assert_eq!(last.position, Position::new(100.0, 100.0));
    assert_eq!(options_of(&store, &id), vec!["Button 1", "Button 2"]);
}

#[test]
fn programmatic_button_uses_yes_no_defaults() {
    let mut store = FlowStore::seeded();
    let id = store.add_node(NodeKind::Button, Position::new(10.0, 10.0));
    assert_eq!(options_of(&store, &id), vec!["Yes", "No"]);
}

#[test]
fn drop_respects_pan_and_zoom() {
    let mut store = FlowStore::seeded();
    *store.viewport_mut() = Viewport {
        x: 50.0,
        y: -20.0,
        zoom: 2.0,
    };
    let canvas_origin = Pos2::new(170.0, 40.0);
    let id = store
        .drop_node(Some("message"), Pos2::new(420.0, 220.0), canvas_origin)
        .unwrap();
    // (420 - 170 - 50) / 2 = 100, (220 - 40 + 20) / 2 = 100
    assert_eq!(store.node(&id).unwrap().position, Position::new(100.0, 100.0));
}

#[test]
fn rejected_drops_leave_the_flow_untouched() {
    let mut store = FlowStore::seeded();
    let before = store.document().clone();
    assert!(store.drop_node(None, Pos2::ZERO, Pos2::ZERO).is_none());
    assert!(store.drop_node(Some("delay"), Pos2::ZERO, Pos2::ZERO).is_none());
    assert!(store.drop_node(Some("start"), Pos2::ZERO, Pos2::ZERO).is_none());
    assert_eq!(store.document(), &before);
}

#[test]
fn button_options_can_be_added_renamed_and_removed() {
    let mut store = FlowStore::seeded();
    let id = store.drop_node(Some("button"), Pos2::ZERO, Pos2::ZERO).unwrap();

    assert!(store.update_node(&id, &NodeEdit::AddOption));
    assert_eq!(options_of(&store, &id), vec!["Button 1", "Button 2", "Button 3"]);

    assert!(store.update_node(&id, &NodeEdit::RenameOption(2, "Talk to sales".into())));
    assert!(store.update_node(&id, &NodeEdit::RemoveOption(0)));
    assert_eq!(options_of(&store, &id), vec!["Button 2", "Talk to sales"]);

    assert!(!store.update_node(&id, &NodeEdit::RemoveOption(7)));
    assert_eq!(options_of(&store, &id), vec!["Button 2", "Talk to sales"]);
}

#[test]
fn editing_one_node_keeps_the_others_shared() {
    let mut store = FlowStore::seeded();
    let id = store.add_node(NodeKind::Message, Position::default());
    let before: Vec<Arc<FlowNode>> = store.nodes().to_vec();

    assert!(store.select_node(&id));
    let outcome = apply_actions(
        &mut store,
        &id,
        &[PanelAction::Edit(NodeEdit::Content("Thanks for reaching out".into()))],
    );
    assert!(outcome.edited);

    for (old, new) in before.iter().zip(store.nodes()) {
        if old.id == id {
            assert!(!Arc::ptr_eq(old, new));
            assert_eq!(new.data.content(), Some("Thanks for reaching out"));
        } else {
            assert!(Arc::ptr_eq(old, new), "{} was reallocated", old.id);
        }
    }
}

#[test]
fn selection_is_single_and_cleared_on_delete() {
    let mut store = FlowStore::seeded();
    assert!(store.select_node("start"));
    assert!(store.select_node("welcome"));
    assert_eq!(store.selected_id(), Some("welcome"));
    assert!(!store.select_node("missing"));
    assert_eq!(store.selected_id(), Some("welcome"));

    assert!(store.delete_node("welcome"));
    assert!(store.selected_id().is_none());
    assert!(store.edges().is_empty());
}

#[test]
fn condition_branches_connect_through_named_handles() {
    let mut store = FlowStore::seeded();
    let cond = store.add_node(NodeKind::Condition, Position::new(250.0, 250.0));
    let yes = store.add_node(NodeKind::Message, Position::new(100.0, 350.0));
    let no = store.add_node(NodeKind::Message, Position::new(400.0, 350.0));

    store.connect("welcome", None, &cond, None);
    let yes_edge = store.connect(&cond, Some("yes"), &yes, None);
    store.connect(&cond, Some("no"), &no, None);

    let edge = store.document().edge(&yes_edge).unwrap();
    assert_eq!(edge.source_handle.as_deref(), Some("yes"));
    assert!(edge.animated);
    assert_eq!(store.document().edges_from(&cond).count(), 2);
}

#[test]
fn flow_checks_report_problems_in_an_edited_flow() {
    let mut store = FlowStore::new(create_branching_flow());
    assert!(check_flow(store.document()).is_empty());

    store.add_node(NodeKind::Start, Position::default());
    store.connect("no", None, "ask", None);
    store.connect("yes", None, "ghost", None);

    let issues = check_flow(store.document());
    assert!(matches!(issues[0], FlowIssue::MultipleStarts(_) | FlowIssue::DanglingEdge { .. }));
    assert!(issues.iter().any(|i| matches!(i, FlowIssue::MultipleStarts(ids) if ids.len() == 2)));
    assert!(issues
        .iter()
        .any(|i| matches!(i, FlowIssue::DanglingEdge { missing, .. } if missing == "ghost")));
    assert!(issues.iter().any(|i| matches!(i, FlowIssue::Cycle(_))));
    assert!(issues.iter().all(|i| !matches!(i, FlowIssue::Unreachable(id) if id == "yes")));
}
