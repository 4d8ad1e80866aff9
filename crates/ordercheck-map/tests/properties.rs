//! Property tests for override initialisation, validation and preview.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use common::{FakeApi, file_id, scenario_config};
use ordercheck_map::{MappingSession, SessionError, ValidationError, invert_mapping};
use ordercheck_model::{MappingMode, PreviewResponse, PreviewRow};
use proptest::prelude::*;
use serde_json::Value;

const STANDARD: [&str; 4] = ["item_id", "product_name", "size", "color"];
const ORIGINALS: [&str; 6] = ["编号", "名称", "尺码", "颜色", "备注", "单价"];

/// original -> standard, at most one original per standard column.
fn server_mapping() -> impl Strategy<Value = BTreeMap<String, String>> {
    proptest::collection::btree_map(0..ORIGINALS.len(), 0..STANDARD.len(), 0..=4).prop_map(
        |picks| {
            let mut used = BTreeSet::new();
            picks
                .into_iter()
                .filter(|(_, standard)| used.insert(*standard))
                .map(|(original, standard)| {
                    (ORIGINALS[original].to_string(), STANDARD[standard].to_string())
                })
                .collect::<BTreeMap<String, String>>()
        },
    )
}

fn preview(mapped: &BTreeMap<String, String>, success: bool) -> PreviewResponse {
    let row = PreviewRow {
        row_index: 1,
        original: ORIGINALS
            .iter()
            .map(|c| ((*c).to_string(), Value::String(format!("{c}-1"))))
            .collect(),
    };
    PreviewResponse {
        mapping_success: success,
        mapped_columns: mapped.clone(),
        original_columns: ORIGINALS.iter().map(|c| (*c).to_string()).collect(),
        preview_data: vec![row],
        ..PreviewResponse::default()
    }
}

fn open(api: &FakeApi) -> MappingSession {
    let mut session = MappingSession::new();
    session.open(api, file_id("p"), "p.xlsx").unwrap();
    session
}

proptest! {
    #[test]
    fn overrides_start_as_inverse(mapped in server_mapping(), success in any::<bool>()) {
        let api = FakeApi::new(preview(&mapped, success));
        let session = open(&api);
        prop_assert_eq!(session.overrides().unwrap(), &invert_mapping(&mapped));
    }

    #[test]
    fn custom_confirm_fails_iff_required_missing(
        mapped in server_mapping(),
        edits in proptest::collection::vec(
            (0..STANDARD.len(), proptest::option::of(0..ORIGINALS.len())),
            0..6,
        ),
    ) {
        let api = FakeApi::new(preview(&mapped, false));
        let mut session = open(&api);
        for (standard, original) in edits {
            session
                .set_override(STANDARD[standard], original.map(|o| ORIGINALS[o]))
                .unwrap();
        }
        let overrides = session.overrides().unwrap().clone();
        let missing = scenario_config()
            .required_columns
            .iter()
            .any(|c| !overrides.contains_key(c));

        let result = session.confirm(&api, MappingMode::Custom);
        if missing {
            let is_missing_required = matches!(
                result,
                Err(SessionError::Validation(ValidationError::MissingRequired(_)))
            );
            prop_assert!(is_missing_required);
            prop_assert!(api.confirm_calls.borrow().is_empty());
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(
                api.last_confirm().unwrap().column_mapping,
                Some(overrides)
            );
        }
    }

    #[test]
    fn auto_confirm_fails_iff_server_incomplete(
        mapped in server_mapping(),
        success in any::<bool>(),
        clear in proptest::collection::vec(0..STANDARD.len(), 0..4),
    ) {
        let api = FakeApi::new(preview(&mapped, success));
        let mut session = open(&api);
        for standard in clear {
            session.set_override(STANDARD[standard], None).unwrap();
        }

        let result = session.confirm(&api, MappingMode::Auto);
        if success {
            prop_assert!(result.is_ok());
        } else {
            let is_incomplete = matches!(
                result,
                Err(SessionError::Validation(ValidationError::AutoMappingIncomplete { .. }))
            );
            prop_assert!(is_incomplete);
        }
    }

    #[test]
    fn preview_is_pure(mapped in server_mapping(), mode_custom in any::<bool>()) {
        let api = FakeApi::new(preview(&mapped, true));
        let session = open(&api);
        let mode = if mode_custom { MappingMode::Custom } else { MappingMode::Auto };

        let first = session.preview(mode).unwrap();
        let second = session.preview(mode).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(session.overrides().unwrap(), &invert_mapping(&mapped));
        prop_assert_eq!(api.preview_calls.borrow().len(), 1);
    }
}
