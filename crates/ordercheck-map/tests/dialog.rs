//! Modal lifecycle of the mapping dialog.

mod common;

use common::{FakeApi, complete_preview, file_id, incomplete_preview};
use ordercheck_map::{DialogEvent, DialogOutcome, DialogStatus, MappingDialog, SessionPhase};
use ordercheck_model::MappingMode;

#[test]
fn show_reports_incomplete_auto_mapping() {
    let mut dialog = MappingDialog::new(FakeApi::new(incomplete_preview()));
    dialog.show(file_id("u-1"), "规格表.xlsx");

    assert!(dialog.is_open());
    assert!(dialog.confirm_enabled());
    assert_eq!(
        dialog.status(),
        &DialogStatus::AutoIncomplete {
            missing: vec!["product_name".to_string()]
        }
    );
    assert_eq!(dialog.active_tab(), MappingMode::Auto);
}

#[test]
fn auto_confirm_switches_to_custom_tab() {
    let mut dialog = MappingDialog::new(FakeApi::new(incomplete_preview()));
    let scope = dialog.show(file_id("u-1"), "规格表.xlsx");

    let err = dialog
        .handle(scope, DialogEvent::ConfirmClicked)
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(dialog.active_tab(), MappingMode::Custom);
    assert!(dialog.status().is_error());
    assert!(dialog.is_open());

    let outcome = dialog
        .handle(
            scope,
            DialogEvent::ColumnSelected {
                standard: "product_name".to_string(),
                original: Some("产品名称".to_string()),
            },
        )
        .unwrap();
    assert_eq!(outcome, DialogOutcome::Updated);

    let preview = dialog.preview().unwrap();
    assert_eq!(preview.mapped.column_names(), vec!["item_id", "product_name"]);

    match dialog.handle(scope, DialogEvent::ConfirmClicked).unwrap() {
        DialogOutcome::Confirmed(ack) => assert_eq!(ack.record_count, Some(40)),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!dialog.is_open());
    assert!(matches!(dialog.status(), DialogStatus::Confirmed { .. }));
    assert_eq!(dialog.api().confirm_calls.borrow().len(), 1);
}

#[test]
fn close_paths_hide_and_release_scope() {
    for event in [
        DialogEvent::CloseClicked,
        DialogEvent::BackdropClicked,
        DialogEvent::CancelClicked,
    ] {
        let mut dialog = MappingDialog::new(FakeApi::new(complete_preview()));
        let scope = dialog.show(file_id("u-1"), "spec.xlsx");

        assert_eq!(dialog.handle(scope, event).unwrap(), DialogOutcome::Closed);
        assert!(!dialog.is_open());
        assert_eq!(dialog.session().phase(), SessionPhase::Closed);
        assert_eq!(
            dialog.handle(scope, DialogEvent::ConfirmClicked).unwrap(),
            DialogOutcome::Ignored
        );
        assert!(dialog.api().confirm_calls.borrow().is_empty());
    }
}

#[test]
fn events_from_previous_showing_are_ignored() {
    let mut dialog = MappingDialog::new(FakeApi::new(complete_preview()));
    let old = dialog.show(file_id("u-1"), "a.xlsx");
    let current = dialog.show(file_id("u-2"), "b.xlsx");
    assert_ne!(old, current);

    let outcome = dialog
        .handle(old, DialogEvent::TabSelected(MappingMode::Custom))
        .unwrap();
    assert_eq!(outcome, DialogOutcome::Ignored);
    assert_eq!(dialog.active_tab(), MappingMode::Auto);
    assert_eq!(
        dialog.session().file_id().map(|id| id.as_str()),
        Some("u-2")
    );
}

#[test]
fn failed_load_can_be_retried() {
    let mut dialog = MappingDialog::new(FakeApi::failing_preview(500, "预览失败"));
    let scope = dialog.show(file_id("u-1"), "spec.xlsx");

    assert_eq!(dialog.status(), &DialogStatus::Error("预览失败".to_string()));
    assert!(!dialog.confirm_enabled());
    assert!(dialog.is_open());

    dialog.handle(scope, DialogEvent::RetryClicked).unwrap();
    assert_eq!(dialog.api().preview_calls.borrow().len(), 2);
    assert_eq!(dialog.session().phase(), SessionPhase::LoadFailed);
}
